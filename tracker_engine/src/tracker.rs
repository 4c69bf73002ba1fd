//! Tracker session - one instance, its schema, and its lifecycle.
//!
//! Lifecycle:
//! ```text
//! Uninitialized -> Materialized -> Merged* -> Serialized
//!                                   ^            |
//!                                   +------------+
//! ```
//! A tracker can be merged into any number of times, and snapshots do not
//! end the session. There is no rollback; keep an earlier snapshot and
//! restore it into a fresh tracker instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use tracker_schema::{SchemaError, SchemaTree, TrackerDefinition};

use crate::config::EngineConfig;
use crate::convert::{parse_instance, serialize_instance, verify_round_trip};
use crate::error::{EngineError, Result};
use crate::instance::Instance;
use crate::materialize::materialize;
use crate::merge::{MergeReport, Merger};
use crate::prompt::{prompt_entries, PromptEntry};
use crate::validate::validate_instance;

/// Unique identifier for tracker sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackerId(pub Uuid);

impl TrackerId {
    /// Create a new random tracker ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackerState {
    #[default]
    Uninitialized,
    Materialized,
    Merged,
    Serialized,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackerState::Uninitialized => "uninitialized",
            TrackerState::Materialized => "materialized",
            TrackerState::Merged => "merged",
            TrackerState::Serialized => "serialized",
        };
        write!(f, "{}", name)
    }
}

/// A tracker session.
///
/// The schema is shared read-only between sessions; the instance belongs to
/// this tracker alone.
#[derive(Debug, Clone)]
pub struct Tracker {
    id: TrackerId,
    schema: Arc<SchemaTree>,
    config: EngineConfig,
    state: TrackerState,
    instance: Option<Instance>,
}

impl Tracker {
    /// Create an uninitialized tracker for a schema.
    ///
    /// Fails if the schema breaks any field invariant.
    pub fn new(schema: Arc<SchemaTree>, config: EngineConfig) -> Result<Self> {
        let problems = schema.validate();
        if !problems.is_empty() {
            return Err(SchemaError::Invalid(problems).into());
        }

        let id = TrackerId::new();
        debug!(tracker = %id, sections = schema.len(), "created tracker");
        Ok(Self {
            id,
            schema,
            config,
            state: TrackerState::Uninitialized,
            instance: None,
        })
    }

    /// Create a tracker from a named definition, checking its framework fields.
    pub fn from_definition(definition: &TrackerDefinition, config: EngineConfig) -> Result<Self> {
        let problems = definition.validate();
        if !problems.is_empty() {
            return Err(SchemaError::Definition(problems).into());
        }
        Self::new(Arc::new(definition.structure.clone()), config)
    }

    pub fn id(&self) -> TrackerId {
        self.id
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn schema(&self) -> &SchemaTree {
        &self.schema
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current instance, once materialized or restored.
    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    /// Build the default-valued instance.
    pub fn materialize(&mut self) -> Result<&Instance> {
        if self.state != TrackerState::Uninitialized {
            return Err(self.invalid("materialize"));
        }

        let instance = materialize(&self.schema);
        self.check(&instance)?;
        self.transition(TrackerState::Materialized);
        Ok(self.instance.insert(instance))
    }

    /// Merge a narrator update into the instance.
    ///
    /// The merged instance is validated (and round-trip checked when
    /// configured) before it replaces the current one. On any error the
    /// current instance is kept.
    pub fn apply_update(&mut self, update: &Value) -> Result<MergeReport> {
        let current = self.current("merge into")?;
        let outcome = Merger::new(&self.schema)
            .with_policy(self.config.merge)
            .strict(self.config.strict)
            .merge(current, update)?;

        self.check(&outcome.instance)?;
        self.instance = Some(outcome.instance);
        self.transition(TrackerState::Merged);
        Ok(outcome.report)
    }

    /// Merge a narrator update given as JSON text.
    pub fn apply_update_str(&mut self, text: &str) -> Result<MergeReport> {
        let update: Value = serde_json::from_str(text)?;
        self.apply_update(&update)
    }

    /// Serialize the instance for persistence.
    pub fn snapshot(&mut self) -> Result<Value> {
        let current = self.current("snapshot")?;
        if self.config.verify_round_trip {
            verify_round_trip(current, &self.schema)?;
        }
        let document = serialize_instance(current);
        self.transition(TrackerState::Serialized);
        Ok(document)
    }

    /// Load a persisted instance document into an uninitialized tracker.
    pub fn restore(&mut self, document: &Value) -> Result<&Instance> {
        if self.state != TrackerState::Uninitialized {
            return Err(self.invalid("restore"));
        }

        let instance =
            parse_instance(document, &self.schema).map_err(EngineError::Nonconforming)?;
        self.transition(TrackerState::Materialized);
        Ok(self.instance.insert(instance))
    }

    /// Schema guidance paired with current values, for prompt construction.
    pub fn prompt_entries(&self) -> Result<Vec<PromptEntry<'_>>> {
        let current = self.current("read prompts from")?;
        Ok(prompt_entries(&self.schema, current))
    }

    fn current(&self, action: &'static str) -> Result<&Instance> {
        self.instance.as_ref().ok_or(EngineError::InvalidTransition {
            from: self.state,
            action,
        })
    }

    fn check(&self, instance: &Instance) -> Result<()> {
        let problems = validate_instance(&self.schema, instance);
        if !problems.is_empty() {
            return Err(EngineError::Nonconforming(problems));
        }
        if self.config.verify_round_trip {
            verify_round_trip(instance, &self.schema)?;
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            from: self.state,
            action,
        }
    }

    fn transition(&mut self, to: TrackerState) {
        debug!(tracker = %self.id, from = %self.state, to = %to, "tracker transition");
        self.state = to;
    }
}
