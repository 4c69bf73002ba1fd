//! Merge policies.

use serde::{Deserialize, Serialize};

/// What a `null` entry value in a dynamic collection update does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Report a mismatch and keep the entry.
    #[default]
    Forbid,
    /// Remove the entry.
    Allow,
    /// Keep the entry without reporting anything.
    Ignore,
}

/// How a supplied list combines with the current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMergePolicy {
    /// The supplied list replaces the current one.
    #[default]
    Replace,
    /// Supplied items are appended. Merging the same update twice appends twice.
    Append,
}

/// Policies applied by the merge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergePolicy {
    pub collection_removal: RemovalPolicy,
    pub list_merge: ListMergePolicy,
}

impl MergePolicy {
    pub fn with_removal(mut self, policy: RemovalPolicy) -> Self {
        self.collection_removal = policy;
        self
    }

    pub fn with_list_merge(mut self, policy: ListMergePolicy) -> Self {
        self.list_merge = policy;
        self
    }
}
