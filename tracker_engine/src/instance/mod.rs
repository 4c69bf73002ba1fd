//! Instance - the concrete, mutable state of one tracker.
//!
//! An instance mirrors its schema section by section. Every leaf holds a
//! value, every object holds a record of its children, and every dynamic
//! collection holds its runtime entries in insertion order. Instances are
//! plain values: cloning one gives a fully independent copy.

mod record;

pub use record::*;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracker_schema::{canonicalize, FieldName, FieldPath, PathSegment};

/// Value of a top-level section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionValue {
    /// Value of a single-field section.
    Field(FieldValue),
    /// Values of a field-list section.
    Fields(Record),
}

/// A location resolved inside an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    Value(&'a FieldValue),
    Record(&'a Record),
}

/// The state of one tracker.
///
/// Equality is order-sensitive all the way down: sections, fields and
/// collection entries must line up.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    sections: IndexMap<FieldName, SectionValue>,
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.sections.len() == other.sections.len()
            && self.sections.iter().eq(other.sections.iter())
    }
}

impl Instance {
    /// Create an instance with no sections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a section by name, ignoring letter casing.
    pub fn section(&self, name: &str) -> Option<&SectionValue> {
        self.sections.get(canonicalize(name).as_str())
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut SectionValue> {
        self.sections.get_mut(canonicalize(name).as_str())
    }

    pub fn sections(&self) -> impl Iterator<Item = (&FieldName, &SectionValue)> {
        self.sections.iter()
    }

    pub(crate) fn insert_section(&mut self, name: FieldName, value: SectionValue) {
        self.sections.insert(name, value);
    }

    pub(crate) fn sections_mut(&mut self) -> &mut IndexMap<FieldName, SectionValue> {
        &mut self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Follow `path` down from the sections.
    ///
    /// Field segments ignore letter casing, entry segments are exact. Returns
    /// `None` for the root, for template (`[*]`) and index segments, and for
    /// anything that does not exist.
    pub fn resolve(&self, path: &FieldPath) -> Option<Resolved<'_>> {
        let (first, rest) = path.segments().split_first()?;
        let PathSegment::Field(name) = first else {
            return None;
        };

        let mut current = match self.section(name)? {
            SectionValue::Field(value) => Resolved::Value(value),
            SectionValue::Fields(record) => Resolved::Record(record),
        };

        for segment in rest {
            current = match (current, segment) {
                (Resolved::Record(record), PathSegment::Field(name)) => {
                    Resolved::Value(record.get(name)?)
                }
                (Resolved::Value(FieldValue::Object(record)), PathSegment::Field(name)) => {
                    Resolved::Value(record.get(name)?)
                }
                (Resolved::Value(FieldValue::Collection(entries)), PathSegment::Entry(key)) => {
                    Resolved::Record(entries.get(key)?)
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get the leaf value at `path`.
    pub fn leaf_at(&self, path: &FieldPath) -> Option<&Value> {
        match self.resolve(path)? {
            Resolved::Value(value) => value.as_leaf(),
            Resolved::Record(_) => None,
        }
    }

    /// Every leaf with its path, in document order.
    pub fn leaves(&self) -> Vec<(FieldPath, &Value)> {
        let mut out = Vec::new();
        for (name, section) in &self.sections {
            let path = FieldPath::root().field(name.label());
            match section {
                SectionValue::Field(value) => collect_leaves(value, path, &mut out),
                SectionValue::Fields(record) => collect_record_leaves(record, &path, &mut out),
            }
        }
        out
    }
}

fn collect_leaves<'a>(value: &'a FieldValue, path: FieldPath, out: &mut Vec<(FieldPath, &'a Value)>) {
    match value {
        FieldValue::Leaf(leaf) => out.push((path, leaf)),
        FieldValue::Object(record) => collect_record_leaves(record, &path, out),
        FieldValue::Collection(entries) => {
            for (key, record) in entries.iter() {
                collect_record_leaves(record, &path.entry(key), out);
            }
        }
    }
}

fn collect_record_leaves<'a>(
    record: &'a Record,
    path: &FieldPath,
    out: &mut Vec<(FieldPath, &'a Value)>,
) {
    for (name, value) in record.iter() {
        collect_leaves(value, path.field(name.label()), out);
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::convert::serialize_instance(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance() -> Instance {
        let mut keys = Record::new();
        keys.insert(FieldName::new("Quantity"), FieldValue::Leaf(json!("1")));
        let mut inventory = Entries::new();
        inventory.insert("Keys", keys);

        let mut main = Record::new();
        main.insert(FieldName::new("Name"), FieldValue::Leaf(json!("Ariel")));
        main.insert(FieldName::new("Inventory"), FieldValue::Collection(inventory));

        let mut instance = Instance::new();
        instance.insert_section(
            FieldName::new("CharactersPresent"),
            SectionValue::Field(FieldValue::Leaf(json!(["Ariel"]))),
        );
        instance.insert_section(FieldName::new("MainCharacter"), SectionValue::Fields(main));
        instance
    }

    #[test]
    fn test_resolve_leaf() {
        let instance = instance();
        let quantity = FieldPath::root()
            .field("mainCharacter")
            .field("inventory")
            .entry("Keys")
            .field("quantity");

        assert_eq!(instance.leaf_at(&quantity), Some(&json!("1")));
        assert_eq!(
            instance.leaf_at(&FieldPath::root().field("CharactersPresent")),
            Some(&json!(["Ariel"]))
        );
    }

    #[test]
    fn test_resolve_records() {
        let instance = instance();
        let keys = FieldPath::root().field("MainCharacter").field("Inventory").entry("Keys");

        assert!(matches!(instance.resolve(&keys), Some(Resolved::Record(_))));
        assert!(instance.resolve(&FieldPath::root()).is_none());
        assert!(instance
            .resolve(&FieldPath::root().field("MainCharacter").field("Inventory").entry("keys"))
            .is_none());
        assert!(instance
            .resolve(&FieldPath::root().field("MainCharacter").field("Inventory").any_entry())
            .is_none());
    }

    #[test]
    fn test_leaves_in_order() {
        let instance = instance();
        let paths: Vec<_> = instance
            .leaves()
            .into_iter()
            .map(|(path, _)| path.to_string())
            .collect();

        assert_eq!(
            paths,
            vec![
                "CharactersPresent",
                "MainCharacter.Name",
                r#"MainCharacter.Inventory["Keys"].Quantity"#,
            ]
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let original = instance();
        let mut copy = original.clone();

        if let Some(SectionValue::Fields(main)) = copy.section_mut("MainCharacter") {
            main.insert(FieldName::new("Name"), FieldValue::Leaf(json!("Kael")));
        }

        assert_ne!(original, copy);
        assert_eq!(
            original.leaf_at(&FieldPath::root().field("MainCharacter").field("Name")),
            Some(&json!("Ariel"))
        );
    }
}
