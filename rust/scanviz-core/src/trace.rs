//! Trace loading, indexing, and prefix resolution.
//!
//! A [`Trace`] owns the steps in input order and indexes them by id and by
//! parent id once, at construction. Records are never mutated afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::step::Step;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("cannot read trace '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trace JSON in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate step id {id}")]
    DuplicateId { id: i64 },
    #[error("broken parent chain above step {id}: no step with id {parent_id}")]
    MissingParent { id: i64, parent_id: i64 },
    #[error("no prefix-bearing ancestor above step {id}")]
    NoPrefixAncestor { id: i64 },
    #[error("cycle in parent chain above step {id}")]
    CyclicChain { id: i64 },
}

/// A loaded trace: steps in input order plus id and parent-id lookups.
#[derive(Debug)]
pub struct Trace {
    steps: Vec<Step>,
    by_id: HashMap<i64, usize>,
    by_parent: HashMap<i64, Vec<usize>>,
}

impl Trace {
    /// Read and index a JSON trace file.
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let content = std::fs::read_to_string(path).map_err(|source| TraceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let steps = serde_json::from_str(&content).map_err(|source| TraceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_steps(steps)
    }

    /// Index already-parsed steps, keeping their order.
    pub fn from_steps(steps: Vec<Step>) -> Result<Self, TraceError> {
        let mut by_id = HashMap::with_capacity(steps.len());
        let mut by_parent: HashMap<i64, Vec<usize>> = HashMap::new();
        for (index, step) in steps.iter().enumerate() {
            if by_id.insert(step.id, index).is_some() {
                return Err(TraceError::DuplicateId { id: step.id });
            }
            if let Some(parent_id) = step.parent_id {
                by_parent.entry(parent_id).or_default().push(index);
            }
        }
        Ok(Self {
            steps,
            by_id,
            by_parent,
        })
    }

    /// Steps in input order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Step> {
        self.by_id.get(&id).map(|&index| &self.steps[index])
    }

    /// Children of the given step, in input order.
    pub fn children(&self, id: i64) -> impl Iterator<Item = &Step> + '_ {
        self.by_parent
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&index| &self.steps[index])
    }

    pub fn has_children(&self, id: i64) -> bool {
        self.by_parent.contains_key(&id)
    }

    /// Nearest enclosing partition key prefix for `step`.
    ///
    /// Walks parent links upward until a prefix-bearing record (`Start` or
    /// `PrefixQuery`) is found. A parentless step has the empty prefix. A
    /// chain that references a missing id, runs out of parents before
    /// finding a bearer, or loops back on itself is malformed.
    pub fn resolve_prefix(&self, step: &Step) -> Result<&str, TraceError> {
        let Some(mut parent_id) = step.parent_id else {
            return Ok("");
        };
        // An acyclic chain visits each step at most once; more hops than
        // the trace has steps means the parent links loop.
        let mut remaining = self.steps.len();
        loop {
            let parent = self.get(parent_id).ok_or(TraceError::MissingParent {
                id: step.id,
                parent_id,
            })?;
            if let Some(prefix) = parent.data.partition_key_prefix() {
                return Ok(prefix);
            }
            match parent.parent_id {
                Some(next) if remaining > 0 => {
                    remaining -= 1;
                    parent_id = next;
                }
                Some(_) => return Err(TraceError::CyclicChain { id: step.id }),
                None => return Err(TraceError::NoPrefixAncestor { id: step.id }),
            }
        }
    }
}
