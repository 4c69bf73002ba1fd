//! Field names - case-insensitive identifiers.

use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Normalize a field name to its canonical lookup form.
pub fn canonicalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Identifier of a field or section.
///
/// Equality and hashing use only the canonical form, so `mainCharacter` and
/// `MainCharacter` name the same field. The spelling the template declared is
/// kept as a label for output.
#[derive(Debug, Clone)]
pub struct FieldName {
    label: String,
    canonical: String,
}

impl FieldName {
    /// Create a field name from its declared spelling.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into().trim().to_string();
        let canonical = canonicalize(&label);
        Self { label, canonical }
    }

    /// The declared spelling.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The canonical (lowercased) form used for comparisons.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Check whether `other` names this field, ignoring letter casing.
    pub fn matches(&self, other: &str) -> bool {
        self.canonical == canonicalize(other)
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

impl PartialEq for FieldName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for FieldName {}

impl Hash for FieldName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

// Lets maps keyed by `FieldName` be queried with a canonical `&str`.
impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl From<&str> for FieldName {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for FieldName {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(FieldName::new("MainCharacter"), FieldName::new("mainCharacter"));
        assert_eq!(FieldName::new("TIME"), FieldName::new("time"));
        assert_ne!(FieldName::new("Time"), FieldName::new("Weather"));
    }

    #[test]
    fn test_label_preserved() {
        let name = FieldName::new("  PrimaryTopic ");
        assert_eq!(name.label(), "PrimaryTopic");
        assert_eq!(name.canonical(), "primarytopic");
        assert!(name.matches("PRIMARYTOPIC"));
    }

    #[test]
    fn test_map_lookup_by_canonical_str() {
        let mut map = HashMap::new();
        map.insert(FieldName::new("Inventory"), 1);

        assert_eq!(map.get(canonicalize("INVENTORY").as_str()), Some(&1));
        assert_eq!(map.get(&FieldName::new("inventory")), Some(&1));
    }
}
