//! Step records for a recorded prefix scan trace.
//!
//! A trace is an ordered JSON array of steps, written while the scan runs.
//! Field names are PascalCase on the wire and payloads are tagged by
//! `Data.Type`; bookkeeping fields recorded alongside (`Depth`, `Timestamp`)
//! are ignored here.

use serde::{Deserialize, Serialize};

/// One node in the scan's execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Step {
    pub id: i64,
    /// `None` only for the root marker.
    pub parent_id: Option<i64>,
    pub data: StepData,
}

/// Payload of a step, tagged by `Type` on the wire.
///
/// The set is closed: a trace carrying any other tag fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "Type")]
pub enum StepData {
    /// Root marker. The writer records the scan's starting partition key
    /// prefix here (normally empty), anchoring prefix resolution for the
    /// whole tree.
    #[serde(rename_all = "PascalCase")]
    Start {
        #[serde(default)]
        partition_key_prefix: String,
    },
    /// A contiguous run of result rows, bounded by its first and last keys.
    #[serde(rename_all = "PascalCase")]
    EntitySegment {
        count: u64,
        first: EntityKey,
        last: EntityKey,
    },
    /// An equality query on one partition key, resuming past a row key.
    #[serde(rename_all = "PascalCase")]
    PartitionKeyQuery {
        partition_key: String,
        /// Exclusive row key lower bound, `null` for the scan's opening
        /// query.
        #[serde(default)]
        row_key_skip: Option<String>,
    },
    /// A range query over all partition keys sharing a prefix.
    #[serde(rename_all = "PascalCase")]
    PrefixQuery {
        partition_key_prefix: String,
        #[serde(default)]
        partition_key_lower_bound: String,
    },
}

/// Partition key / row key pair locating one entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityKey {
    pub partition_key: String,
    pub row_key: String,
}

impl StepData {
    /// The partition key prefix this step carries, if any.
    ///
    /// `Start` and `PrefixQuery` bear prefixes; the two other types take
    /// theirs from the nearest bearing ancestor.
    pub fn partition_key_prefix(&self) -> Option<&str> {
        match self {
            StepData::Start {
                partition_key_prefix,
            } => Some(partition_key_prefix),
            StepData::PrefixQuery {
                partition_key_prefix,
                ..
            } => Some(partition_key_prefix),
            StepData::EntitySegment { .. } | StepData::PartitionKeyQuery { .. } => None,
        }
    }
}
