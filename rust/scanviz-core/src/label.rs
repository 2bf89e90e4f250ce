//! Per-step label construction.
//!
//! Labels come in two global modes. Plain mode shows full keys and query
//! predicates as compact bold-prefixed text. Linked mode strips enclosing
//! prefixes from keys and wraps them in tables hyperlinked to the package
//! registry. Both modes share one running query counter, incremented per
//! query step in input order.

use thiserror::Error;

use crate::dot::{escape_html, Label, NodeStyle};
use crate::registry;
use crate::step::{EntityKey, Step, StepData};
use crate::trace::{Trace, TraceError};

#[derive(Debug, Error)]
pub enum LabelError {
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("'{value}' does not start with prefix '{prefix}'")]
    PrefixMismatch { prefix: String, value: String },
    #[error("stripping prefix '{prefix}' from '{value}' left nothing")]
    EmptyAbbreviation { prefix: String, value: String },
}

/// Display mode for a whole render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMode {
    /// Compact text labels with full keys.
    #[default]
    Plain,
    /// Prefix-stripped keys hyperlinked to the package registry.
    Linked,
}

const START_STYLE: NodeStyle = NodeStyle {
    shape: "box",
    style: "rounded",
    fillcolor: None,
};
const SEGMENT_STYLE: NodeStyle = NodeStyle {
    shape: "box",
    style: "filled",
    fillcolor: Some("darkseagreen1"),
};
const PARTITION_KEY_QUERY_STYLE: NodeStyle = NodeStyle {
    shape: "box",
    style: "filled",
    fillcolor: Some("beige"),
};
const PREFIX_QUERY_STYLE: NodeStyle = NodeStyle {
    shape: "box",
    style: "filled",
    fillcolor: Some("darkslategray1"),
};

/// Strip `prefix` from `value`, marking the elision with `...`.
///
/// The value passes through unchanged when the prefix is empty or exactly
/// as long as the value. A value that does not start with the prefix, or a
/// strip that would leave an empty suffix, means the trace is inconsistent.
pub fn abbreviate(prefix: &str, value: &str) -> Result<String, LabelError> {
    if prefix.is_empty() || prefix.len() == value.len() {
        return Ok(value.to_string());
    }
    let Some(suffix) = value.strip_prefix(prefix) else {
        return Err(LabelError::PrefixMismatch {
            prefix: prefix.to_string(),
            value: value.to_string(),
        });
    };
    if suffix.is_empty() {
        return Err(LabelError::EmptyAbbreviation {
            prefix: prefix.to_string(),
            value: value.to_string(),
        });
    }
    Ok(format!("...{}", suffix))
}

/// Builds node labels for steps, carrying the running query counter.
#[derive(Debug)]
pub struct Labeler {
    mode: LabelMode,
    query_count: u64,
}

impl Labeler {
    pub fn new(mode: LabelMode) -> Self {
        Self {
            mode,
            query_count: 0,
        }
    }

    pub fn mode(&self) -> LabelMode {
        self.mode
    }

    /// Queries labeled so far, across both query types.
    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    /// Build the label and style for one step, or `None` when the step
    /// draws no node (the root marker in plain mode).
    ///
    /// The enclosing prefix is resolved before dispatch in every mode, so a
    /// broken parent chain fails the render even where the prefix would go
    /// unused.
    pub fn label(
        &mut self,
        step: &Step,
        trace: &Trace,
    ) -> Result<Option<(Label, NodeStyle)>, LabelError> {
        let prefix = trace.resolve_prefix(step)?;
        let labeled = match &step.data {
            StepData::Start { .. } => match self.mode {
                LabelMode::Plain => None,
                LabelMode::Linked => {
                    Some((Label::Html("<b>Start</b>".to_string()), START_STYLE))
                }
            },
            StepData::EntitySegment { count, first, last } => Some((
                self.entity_segment(*count, first, last, prefix)?,
                SEGMENT_STYLE,
            )),
            StepData::PartitionKeyQuery {
                partition_key,
                row_key_skip,
            } => {
                self.query_count += 1;
                let has_children = trace.has_children(step.id);
                Some((
                    self.partition_key_query(
                        partition_key,
                        row_key_skip.as_deref(),
                        prefix,
                        has_children,
                    )?,
                    PARTITION_KEY_QUERY_STYLE,
                ))
            }
            StepData::PrefixQuery {
                partition_key_prefix,
                partition_key_lower_bound,
            } => {
                self.query_count += 1;
                Some((
                    self.prefix_query(partition_key_prefix, partition_key_lower_bound, prefix)?,
                    PREFIX_QUERY_STYLE,
                ))
            }
        };
        Ok(labeled)
    }

    fn entity_segment(
        &self,
        count: u64,
        first: &EntityKey,
        last: &EntityKey,
        prefix: &str,
    ) -> Result<Label, LabelError> {
        match self.mode {
            LabelMode::Plain => {
                if count == 1 {
                    Ok(Label::Html(format!(
                        "<b>1 result</b>: {}, {}",
                        escape_html(&first.partition_key),
                        escape_html(&first.row_key)
                    )))
                } else {
                    Ok(Label::Html(format!(
                        "<b>{} results</b>: {}, {} - {}, {}",
                        count,
                        escape_html(&first.partition_key),
                        escape_html(&first.row_key),
                        escape_html(&last.partition_key),
                        escape_html(&last.row_key)
                    )))
                }
            }
            LabelMode::Linked => {
                if first.partition_key == last.partition_key {
                    // One partition: a single link, no version pinning.
                    let cell = linked_cell(&first.partition_key, None, prefix)?;
                    Ok(Label::Html(table(&format!(
                        "{}<td>({} total)</td>",
                        cell, count
                    ))))
                } else {
                    // A range: link both endpoints, pinned to their rows.
                    let first_cell =
                        linked_cell(&first.partition_key, Some(&first.row_key), prefix)?;
                    let last_cell = linked_cell(&last.partition_key, Some(&last.row_key), prefix)?;
                    Ok(Label::Html(table(&format!(
                        "{}<td>-</td>{}<td>({} total)</td>",
                        first_cell, last_cell, count
                    ))))
                }
            }
        }
    }

    fn partition_key_query(
        &self,
        partition_key: &str,
        row_key_skip: Option<&str>,
        prefix: &str,
        has_children: bool,
    ) -> Result<Label, LabelError> {
        match self.mode {
            LabelMode::Plain => Ok(Label::Html(format!(
                "<b>Query {}</b>: PK = '{}' and RK &gt; '{}'",
                self.query_count,
                escape_html(partition_key),
                escape_html(row_key_skip.unwrap_or(""))
            ))),
            LabelMode::Linked if has_children => {
                let cell = linked_cell(partition_key, None, prefix)?;
                Ok(Label::Html(table(&cell)))
            }
            LabelMode::Linked => Ok(Label::Text(format!(
                "pk: {}",
                abbreviate(prefix, partition_key)?
            ))),
        }
    }

    fn prefix_query(
        &self,
        partition_key_prefix: &str,
        partition_key_lower_bound: &str,
        prefix: &str,
    ) -> Result<Label, LabelError> {
        match self.mode {
            LabelMode::Plain if partition_key_lower_bound.is_empty() => Ok(Label::Html(format!(
                "<b>Query {}</b>: PK = '{}*'",
                self.query_count,
                escape_html(partition_key_prefix)
            ))),
            LabelMode::Plain => Ok(Label::Html(format!(
                "<b>Query {}</b>: PK = '{}*' and PK &gt; '{}'",
                self.query_count,
                escape_html(partition_key_prefix),
                escape_html(partition_key_lower_bound)
            ))),
            LabelMode::Linked => Ok(Label::Text(format!(
                "{}*",
                abbreviate(prefix, partition_key_prefix)?
            ))),
        }
    }
}

fn table(cells: &str) -> String {
    format!(
        "<table border=\"0\" cellspacing=\"0\" cellpadding=\"5\"><tr>{}</tr></table>",
        cells
    )
}

/// One `<td>` holding a partition key hyperlinked to its registry page.
///
/// The visible text is the prefix-stripped key, the tooltip the bare
/// package id; the link pins the row key as a version when given.
fn linked_cell(partition_key: &str, version: Option<&str>, prefix: &str) -> Result<String, LabelError> {
    let id = registry::package_id(partition_key);
    let url = registry::package_url(partition_key, version);
    let text = abbreviate(prefix, partition_key)?;
    Ok(format!(
        "<td href=\"{}\" title=\"{}\"><u><font color=\"blue\">{}</font></u></td>",
        escape_html(&url),
        escape_html(id),
        escape_html(&text)
    ))
}
