//! Engine configuration.
//!
//! ```toml
//! strict = false
//! verify_round_trip = false
//!
//! [merge]
//! collection_removal = "forbid"   # forbid | allow | ignore
//! list_merge = "replace"          # replace | append
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::merge::MergePolicy;

/// Configuration for a tracker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Reject a whole update if any part of it is a problem.
    pub strict: bool,

    /// Check after every merge that the instance survives serialization.
    pub verify_round_trip: bool,

    /// Collection removal and list merge policies.
    pub merge: MergePolicy,
}

impl EngineConfig {
    /// Load configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge = policy;
        self
    }
}
