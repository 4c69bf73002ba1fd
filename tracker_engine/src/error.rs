//! Engine error types.

use std::fmt;
use thiserror::Error;
use tracker_schema::{FieldPath, SchemaError};

use crate::tracker::TrackerState;

/// Ways an update or document can disagree with its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("field '{0}' is supplied more than once")]
    DuplicateField(String),
    #[error("expected {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },
    #[error("entry key is empty")]
    EmptyKey,
    #[error("removing entries is not allowed")]
    RemovalForbidden,
}

/// Category of an instance-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemKind {
    #[error("{0}")]
    SchemaMismatch(#[from] Mismatch),
    #[error("missing")]
    MissingValue,
}

/// A problem located at a path in an instance or document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub path: FieldPath,
    pub kind: ProblemKind,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Accumulated problems, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Problems(Vec<Problem>);

impl Problems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: FieldPath, kind: impl Into<ProblemKind>) {
        self.0.push(Problem {
            path,
            kind: kind.into(),
        });
    }

    /// Record a missing value at `path`.
    pub fn missing(&mut self, path: FieldPath) {
        self.push(path, ProblemKind::MissingValue);
    }

    pub fn extend(&mut self, other: Problems) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Problem> {
        self.0.iter()
    }

    /// Check if any problem is located exactly at `path`.
    pub fn has_problem_at(&self, path: &str) -> bool {
        self.0.iter().any(|p| p.path.to_string() == path)
    }
}

impl fmt::Display for Problems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", problem)?;
        }
        Ok(())
    }
}

impl IntoIterator for Problems {
    type Item = Problem;
    type IntoIter = std::vec::IntoIter<Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Problems {
    type Item = &'a Problem;
    type IntoIter = std::slice::Iter<'a, Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A strict-mode update had problems and was not applied.
    #[error("update rejected:\n{0}")]
    Rejected(Problems),

    /// An instance or document does not conform to its schema.
    #[error("instance does not conform to its schema:\n{0}")]
    Nonconforming(Problems),

    #[error("cannot {action} a tracker that is {from}")]
    InvalidTransition {
        from: TrackerState,
        action: &'static str,
    },

    /// Serializing then parsing an instance did not give it back. Always an engine defect.
    #[error("round trip lost data: {0}")]
    RoundTripLoss(String),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Toml(#[from] toml::de::Error),
}
