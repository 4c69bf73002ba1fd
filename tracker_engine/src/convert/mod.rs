//! Converter - instance documents in and out.
//!
//! The instance document is the nested JSON form a tracker is persisted in:
//! one key per section, a field-list section as an object of its fields, a
//! single-field section as that field's value, and a dynamic collection as
//! an object of entry key to entry document, in insertion order. Keys are
//! written with their declared spelling and read back case-insensitively.

mod skeleton;

pub use skeleton::*;

use serde_json::{Map, Value};
use tracing::debug;
use tracker_schema::{describe_value, FieldNode, FieldPath, FieldShape, SchemaTree, SectionBody};

use crate::error::{EngineError, Mismatch, Problems, Result};
use crate::instance::{Entries, FieldValue, Instance, Record, SectionValue};
use crate::matching::match_names;

/// Write an instance as its nested document.
pub fn serialize_instance(instance: &Instance) -> Value {
    let sections = instance
        .sections()
        .map(|(name, section)| {
            let value = match section {
                SectionValue::Field(value) => field_to_document(value),
                SectionValue::Fields(record) => record_to_document(record),
            };
            (name.label().to_string(), value)
        })
        .collect();
    Value::Object(sections)
}

fn field_to_document(value: &FieldValue) -> Value {
    match value {
        FieldValue::Leaf(leaf) => leaf.clone(),
        FieldValue::Object(record) => record_to_document(record),
        FieldValue::Collection(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, record)| (key.to_string(), record_to_document(record)))
                .collect(),
        ),
    }
}

fn record_to_document(record: &Record) -> Value {
    Value::Object(
        record
            .iter()
            .map(|(name, value)| (name.label().to_string(), field_to_document(value)))
            .collect(),
    )
}

/// Read an instance document against `schema`.
///
/// Every declared field must be present with a value of the right shape, and
/// nothing undeclared may appear. All problems are returned together.
pub fn parse_instance(
    document: &Value,
    schema: &SchemaTree,
) -> std::result::Result<Instance, Problems> {
    let mut problems = Problems::new();
    let root = FieldPath::root();

    let Some(map) = document.as_object() else {
        problems.push(
            root,
            Mismatch::Shape {
                expected: "an object",
                found: describe_value(document),
            },
        );
        return Err(problems);
    };

    let slots = match_names(
        schema.sections().iter().map(|s| &s.name),
        map,
        &root,
        Mismatch::UnknownSection,
        &mut problems,
    );

    let mut instance = Instance::new();
    for (section, slot) in schema.sections().iter().zip(slots) {
        let path = root.field(section.name.label());
        let Some(value) = slot.filter(|v| !v.is_null()) else {
            problems.missing(path);
            continue;
        };

        let parsed = match &section.body {
            SectionBody::Field(node) => {
                parse_field(node, value, &path, &mut problems).map(SectionValue::Field)
            }
            SectionBody::Fields(nodes) => {
                parse_record(nodes, value, &path, &mut problems).map(SectionValue::Fields)
            }
        };
        if let Some(parsed) = parsed {
            instance.insert_section(section.name.clone(), parsed);
        }
    }

    if problems.is_empty() {
        Ok(instance)
    } else {
        Err(problems)
    }
}

fn parse_field(
    node: &FieldNode,
    value: &Value,
    path: &FieldPath,
    problems: &mut Problems,
) -> Option<FieldValue> {
    if value.is_null() {
        problems.missing(path.clone());
        return None;
    }

    match &node.shape {
        FieldShape::Scalar(_) | FieldShape::List(_) => {
            let kind = node.kind();
            if kind.accepts(value) {
                Some(FieldValue::Leaf(value.clone()))
            } else {
                problems.push(
                    path.clone(),
                    Mismatch::Shape {
                        expected: kind.describe(),
                        found: describe_value(value),
                    },
                );
                None
            }
        }
        FieldShape::Object(children) => {
            parse_record(children, value, path, problems).map(FieldValue::Object)
        }
        FieldShape::DynamicCollection(template) => {
            let map = object_or_report(value, path, problems)?;
            let mut entries = Entries::new();
            for (key, entry) in map {
                let entry_path = path.entry(key.as_str());
                if key.trim().is_empty() {
                    problems.push(entry_path, Mismatch::EmptyKey);
                    continue;
                }
                if let Some(record) = parse_record(template, entry, &entry_path, problems) {
                    entries.insert(key.as_str(), record);
                }
            }
            Some(FieldValue::Collection(entries))
        }
    }
}

fn parse_record(
    nodes: &[FieldNode],
    value: &Value,
    path: &FieldPath,
    problems: &mut Problems,
) -> Option<Record> {
    let map = object_or_report(value, path, problems)?;
    let slots = match_names(
        nodes.iter().map(|n| &n.name),
        map,
        path,
        Mismatch::UnknownField,
        problems,
    );

    let mut record = Record::new();
    for (node, slot) in nodes.iter().zip(slots) {
        let field_path = path.field(node.name.label());
        match slot {
            Some(value) => {
                if let Some(parsed) = parse_field(node, value, &field_path, problems) {
                    record.insert(node.name.clone(), parsed);
                }
            }
            None => problems.missing(field_path),
        }
    }
    Some(record)
}

fn object_or_report<'v>(
    value: &'v Value,
    path: &FieldPath,
    problems: &mut Problems,
) -> Option<&'v Map<String, Value>> {
    let map = value.as_object();
    if map.is_none() {
        problems.push(
            path.clone(),
            Mismatch::Shape {
                expected: "an object",
                found: describe_value(value),
            },
        );
    }
    map
}

/// Parse an instance document from JSON text.
pub fn parse_instance_str(text: &str, schema: &SchemaTree) -> Result<Instance> {
    let document: Value = serde_json::from_str(text)?;
    parse_instance(&document, schema).map_err(EngineError::Nonconforming)
}

/// Check that `instance` survives a serialize/parse round trip unchanged.
pub fn verify_round_trip(instance: &Instance, schema: &SchemaTree) -> Result<()> {
    let document = serialize_instance(instance);
    match parse_instance(&document, schema) {
        Ok(parsed) if parsed == *instance => {
            debug!("round trip verified");
            Ok(())
        }
        Ok(_) => Err(EngineError::RoundTripLoss(
            "parsed instance differs from the original".to_string(),
        )),
        Err(problems) => Err(EngineError::RoundTripLoss(problems.to_string())),
    }
}
