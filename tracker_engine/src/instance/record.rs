//! Field values and records.

use indexmap::IndexMap;
use serde_json::Value;
use tracker_schema::{canonicalize, FieldKind, FieldName};

/// The concrete value held by one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scalar or list value.
    Leaf(Value),
    /// Fixed children of an object field.
    Object(Record),
    /// Runtime entries of a dynamic collection.
    Collection(Entries),
}

impl FieldValue {
    /// Check whether this value has the variant a field of `kind` holds.
    pub fn fits(&self, kind: FieldKind) -> bool {
        match self {
            FieldValue::Leaf(_) => kind.is_leaf(),
            FieldValue::Object(_) => kind == FieldKind::Object,
            FieldValue::Collection(_) => kind == FieldKind::DynamicCollection,
        }
    }

    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            FieldValue::Leaf(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Object(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&Entries> {
        match self {
            FieldValue::Collection(entries) => Some(entries),
            _ => None,
        }
    }
}

/// Named field values in schema order.
///
/// Two records are equal only when their fields appear in the same order.
#[derive(Debug, Clone, Default)]
pub struct Record(IndexMap<FieldName, FieldValue>);

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().eq(other.0.iter())
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value by name, ignoring letter casing.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(canonicalize(name).as_str())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.0.get_mut(canonicalize(name).as_str())
    }

    /// Get a leaf value by name.
    pub fn leaf(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_leaf)
    }

    pub fn insert(&mut self, name: FieldName, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(name, value)
    }

    /// Get a field value, inserting one built by `make` if it is absent.
    pub fn get_or_insert_with(
        &mut self,
        name: &FieldName,
        make: impl FnOnce() -> FieldValue,
    ) -> &mut FieldValue {
        self.0.entry(name.clone()).or_insert_with(make)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&FieldName, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(FieldName, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (FieldName, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Entries of a dynamic collection, keyed by runtime key in insertion order.
///
/// Keys are taken exactly as supplied; unlike field names they are not
/// case-folded. Equality takes entry order into account.
#[derive(Debug, Clone, Default)]
pub struct Entries(IndexMap<String, Record>);

impl PartialEq for Entries {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().eq(other.0.iter())
    }
}

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert an entry. A new key goes last; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, record: Record) -> Option<Record> {
        self.0.insert(key.into(), record)
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.0.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
