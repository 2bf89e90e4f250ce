//! Core library for scanviz.
//!
//! Turns recorded table prefix scan traces (ordered JSON step arrays) into
//! styled Graphviz digraphs: one node per step, one edge per real parent
//! link, labels formatted per step type in either plain or linked mode.
//!
//! The pipeline is linear: [`trace::Trace`] loads and indexes the records,
//! [`label::Labeler`] builds per-step labels with prefixes resolved through
//! parent chains, [`render::render_trace`] assembles the graph, and
//! [`dot::Digraph`] serializes it and drives the Graphviz `dot` binary.

pub mod dot;
pub mod label;
pub mod registry;
pub mod render;
pub mod step;
pub mod trace;

pub use dot::{Digraph, DotError, Label, NodeStyle};
pub use label::{LabelError, LabelMode, Labeler};
pub use render::{check_trace, render_trace, RenderSummary, ROOT_SENTINEL_ID};
pub use step::{EntityKey, Step, StepData};
pub use trace::{Trace, TraceError};
