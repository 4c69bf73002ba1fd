//! Schema error types.

use std::fmt;
use thiserror::Error;

use crate::FieldPath;

/// A single way a template can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("expected a field definition object")]
    NotAnObject,
    #[error("a section must be a field definition or a list of them")]
    InvalidSection,
    #[error("field name is missing")]
    MissingName,
    #[error("field name is empty")]
    EmptyName,
    #[error("field type is missing")]
    MissingKind,
    #[error("unrecognized field type '{0}'")]
    UnknownKind(String),
    #[error("'{key}' must be {expected}")]
    InvalidKey { key: &'static str, expected: &'static str },
    #[error("leaf field has no default value")]
    MissingDefault,
    #[error("default value must be {expected}")]
    DefaultShape { expected: &'static str },
    #[error("example value {index} must be {expected}")]
    ExampleShape { index: usize, expected: &'static str },
    #[error("leaf field must not declare nested fields")]
    NestedOnLeaf,
    #[error("composite field must not declare a default or example values")]
    LeafValuesOnComposite,
    #[error("composite field has no nested fields")]
    NoChildren,
    #[error("duplicate name '{0}'")]
    DuplicateName(String),
    #[error("required field '{name}' of type {kind} is missing")]
    MissingFrameworkField { name: &'static str, kind: &'static str },
    #[error("required section is missing")]
    MissingSection,
    #[error("definition name {0}")]
    DefinitionName(&'static str),
}

/// A violation located at a path in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaProblem {
    pub path: FieldPath,
    pub violation: SchemaViolation,
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.violation)
    }
}

/// All problems found in a template, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaProblems(Vec<SchemaProblem>);

impl SchemaProblems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation at `path`.
    pub fn push(&mut self, path: FieldPath, violation: SchemaViolation) {
        self.0.push(SchemaProblem { path, violation });
    }

    pub fn extend(&mut self, other: SchemaProblems) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaProblem> {
        self.0.iter()
    }

    /// Check if any problem is located exactly at `path`.
    pub fn has_problem_at(&self, path: &str) -> bool {
        self.0.iter().any(|p| p.path.to_string() == path)
    }
}

impl fmt::Display for SchemaProblems {
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

impl IntoIterator for SchemaProblems {
    type Item = SchemaProblem;
    type IntoIter = std::vec::IntoIter<SchemaProblem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Errors that can occur while loading a template.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The template breaks the field invariants. Blocks activation.
    #[error("schema invalid:\n{0}")]
    Invalid(SchemaProblems),

    /// The template text is not valid JSON.
    #[error("failed to parse schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A named tracker definition failed its checks.
    #[error("invalid tracker definition:\n{0}")]
    Definition(SchemaProblems),
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
