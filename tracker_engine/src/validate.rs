//! Instance-level and document-level validation.
//!
//! Never stops at the first problem: every problem comes back with its path,
//! e.g. `MainCharacter.Inventory["Keys"].Quantity: missing`.

use serde_json::Value;
use tracker_schema::{describe_value, FieldNode, FieldPath, FieldShape, SchemaTree, SectionBody};

use crate::convert::parse_instance;
use crate::error::{Mismatch, Problems};
use crate::instance::{FieldValue, Instance, Record, SectionValue};

/// Check that `instance` conforms to `schema`.
///
/// Every declared field must hold a value of the right shape, every
/// collection entry must match its template, and nothing undeclared may
/// appear.
pub fn validate_instance(schema: &SchemaTree, instance: &Instance) -> Problems {
    let mut problems = Problems::new();
    let root = FieldPath::root();

    for (name, _) in instance.sections() {
        if schema.section(name.canonical()).is_none() {
            problems.push(
                root.field(name.label()),
                Mismatch::UnknownSection(name.label().to_string()),
            );
        }
    }

    for section in schema.sections() {
        let path = root.field(section.name.label());
        match (&section.body, instance.section(section.name.canonical())) {
            (_, None) => problems.missing(path),
            (SectionBody::Field(node), Some(SectionValue::Field(value))) => {
                check_field(node, value, &path, &mut problems)
            }
            (SectionBody::Fields(nodes), Some(SectionValue::Fields(record))) => {
                check_record(nodes, record, &path, &mut problems)
            }
            (SectionBody::Field(node), Some(SectionValue::Fields(_))) => problems.push(
                path,
                Mismatch::Shape {
                    expected: node.kind().describe(),
                    found: "a field list",
                },
            ),
            (SectionBody::Fields(_), Some(SectionValue::Field(_))) => problems.push(
                path,
                Mismatch::Shape {
                    expected: "a field list",
                    found: "a single field",
                },
            ),
        }
    }

    problems
}

/// Check a serialized instance document against `schema`.
pub fn validate_document(schema: &SchemaTree, document: &Value) -> Problems {
    match parse_instance(document, schema) {
        Ok(_) => Problems::new(),
        Err(problems) => problems,
    }
}

fn check_record(nodes: &[FieldNode], record: &Record, path: &FieldPath, problems: &mut Problems) {
    for (name, _) in record.iter() {
        if !nodes.iter().any(|node| node.name == *name) {
            problems.push(
                path.field(name.label()),
                Mismatch::UnknownField(name.label().to_string()),
            );
        }
    }

    for node in nodes {
        let field_path = path.field(node.name.label());
        match record.get(node.name.canonical()) {
            Some(value) => check_field(node, value, &field_path, problems),
            None => problems.missing(field_path),
        }
    }
}

fn check_field(node: &FieldNode, value: &FieldValue, path: &FieldPath, problems: &mut Problems) {
    match (&node.shape, value) {
        (FieldShape::Scalar(_) | FieldShape::List(_), FieldValue::Leaf(leaf)) => {
            let kind = node.kind();
            if leaf.is_null() {
                problems.missing(path.clone());
            } else if !kind.accepts(leaf) {
                problems.push(
                    path.clone(),
                    Mismatch::Shape {
                        expected: kind.describe(),
                        found: describe_value(leaf),
                    },
                );
            }
        }
        (FieldShape::Object(children), FieldValue::Object(record)) => {
            check_record(children, record, path, problems)
        }
        (FieldShape::DynamicCollection(template), FieldValue::Collection(entries)) => {
            for (key, record) in entries.iter() {
                check_record(template, record, &path.entry(key), problems);
            }
        }
        (_, value) => problems.push(
            path.clone(),
            Mismatch::Shape {
                expected: node.kind().describe(),
                found: held(value),
            },
        ),
    }
}

fn held(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Leaf(leaf) => describe_value(leaf),
        FieldValue::Object(_) => "an object",
        FieldValue::Collection(_) => "an object of entries",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Entries;
    use crate::materialize::materialize;
    use crate::merge::merge;
    use serde_json::json;
    use tracker_schema::FieldName;

    fn schema() -> SchemaTree {
        SchemaTree::new()
            .with_fields("Story", vec![FieldNode::scalar("Time", "2024-10-16T09:15:30")])
            .with_fields(
                "MainCharacter",
                vec![FieldNode::collection(
                    "Inventory",
                    vec![
                        FieldNode::scalar("ItemName", "Smartphone"),
                        FieldNode::scalar("Quantity", "1"),
                    ],
                )],
            )
    }

    #[test]
    fn test_materialized_instance_is_valid() {
        let schema = schema();
        assert!(validate_instance(&schema, &materialize(&schema)).is_empty());
    }

    #[test]
    fn test_merged_instance_is_valid() {
        let schema = schema();
        let instance = merge(
            &materialize(&schema),
            &json!({"MainCharacter": {"Inventory": {"Keys": {"Quantity": "3"}}}}),
            &schema,
        )
        .instance;

        assert!(validate_instance(&schema, &instance).is_empty());
    }

    #[test]
    fn test_entry_missing_template_field() {
        let schema = schema();
        let mut instance = materialize(&schema);

        let mut keys = Record::new();
        keys.insert(FieldName::new("ItemName"), FieldValue::Leaf(json!("Keys")));
        let mut entries = Entries::new();
        entries.insert("Keys", keys);
        if let Some(SectionValue::Fields(main)) = instance.section_mut("MainCharacter") {
            main.insert(FieldName::new("Inventory"), FieldValue::Collection(entries));
        }

        let problems = validate_instance(&schema, &instance);
        assert_eq!(
            problems.to_string(),
            r#"MainCharacter.Inventory["Keys"].Quantity: missing"#
        );
    }

    #[test]
    fn test_out_of_schema_and_wrong_shape() {
        let schema = schema();
        let mut instance = materialize(&schema);

        if let Some(SectionValue::Fields(story)) = instance.section_mut("Story") {
            story.insert(FieldName::new("Time"), FieldValue::Leaf(json!(["noon"])));
            story.insert(FieldName::new("Mood"), FieldValue::Leaf(json!("tense")));
        }

        let problems = validate_instance(&schema, &instance);
        assert_eq!(problems.len(), 2);
        assert!(problems.to_string().contains("Story.Mood: unknown field 'Mood'"));
        assert!(problems
            .to_string()
            .contains("Story.Time: expected a scalar value, found a list"));
    }

    #[test]
    fn test_missing_section() {
        let schema = schema();
        let problems = validate_instance(&schema, &Instance::new());

        assert_eq!(problems.len(), 2);
        assert!(problems.has_problem_at("Story"));
        assert!(problems.has_problem_at("MainCharacter"));
    }

    #[test]
    fn test_validate_document() {
        let schema = schema();

        let good = json!({"Story": {"Time": "noon"}, "MainCharacter": {"Inventory": {}}});
        assert!(validate_document(&schema, &good).is_empty());

        let bad = json!({
            "Story": {"Time": "noon"},
            "MainCharacter": {"Inventory": {"Keys": {"ItemName": "Keys"}}}
        });
        let problems = validate_document(&schema, &bad);
        assert!(problems.has_problem_at(r#"MainCharacter.Inventory["Keys"].Quantity"#));
    }
}
