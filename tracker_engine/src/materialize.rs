//! Instance materializer - builds the default-valued instance of a schema.

use tracing::debug;
use tracker_schema::{FieldNode, FieldShape, SchemaTree, Section, SectionBody};

use crate::instance::{Entries, FieldValue, Instance, Record, SectionValue};

/// Build the initial instance of `schema`.
///
/// Leaves get a copy of their default, objects recurse, and dynamic
/// collections start empty.
pub fn materialize(schema: &SchemaTree) -> Instance {
    let mut instance = Instance::new();
    for section in schema.sections() {
        instance.insert_section(section.name.clone(), materialize_section(section));
    }
    debug!(sections = instance.len(), "materialized instance");
    instance
}

pub fn materialize_section(section: &Section) -> SectionValue {
    match &section.body {
        SectionBody::Field(node) => SectionValue::Field(materialize_node(node)),
        SectionBody::Fields(nodes) => SectionValue::Fields(materialize_record(nodes)),
    }
}

pub fn materialize_node(node: &FieldNode) -> FieldValue {
    match &node.shape {
        FieldShape::Scalar(spec) | FieldShape::List(spec) => FieldValue::Leaf(spec.default.clone()),
        FieldShape::Object(children) => FieldValue::Object(materialize_record(children)),
        FieldShape::DynamicCollection(_) => FieldValue::Collection(Entries::new()),
    }
}

/// Build a record holding the defaults of `nodes`, in declaration order.
///
/// Also used for every new dynamic collection entry.
pub fn materialize_record(nodes: &[FieldNode]) -> Record {
    nodes
        .iter()
        .map(|node| (node.name.clone(), materialize_node(node)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracker_schema::FieldPath;

    fn deep_schema(depth: usize) -> SchemaTree {
        let mut node = FieldNode::scalar("Value", "bottom");
        for level in 0..depth {
            node = FieldNode::object(format!("Level{level}"), vec![node]);
        }
        SchemaTree::new().with_field("Deep", node)
    }

    #[test]
    fn test_leaves_equal_defaults() {
        let schema = SchemaTree::new()
            .with_fields(
                "Story",
                vec![
                    FieldNode::scalar("Time", "2024-10-16T09:15:30"),
                    FieldNode::scalar("Weather", "Overcast, mild temperature"),
                ],
            )
            .with_field("CharactersPresent", FieldNode::list("CharactersPresent", ["No Characters"]));

        let instance = materialize(&schema);
        let story = FieldPath::root().field("Story");

        assert_eq!(instance.leaf_at(&story.field("Time")), Some(&json!("2024-10-16T09:15:30")));
        assert_eq!(
            instance.leaf_at(&FieldPath::root().field("CharactersPresent")),
            Some(&json!(["No Characters"]))
        );
        assert_eq!(instance.leaves().len(), 3);
    }

    #[test]
    fn test_collections_start_empty() {
        let schema = SchemaTree::new().with_fields(
            "MainCharacter",
            vec![FieldNode::collection(
                "Inventory",
                vec![FieldNode::scalar("ItemName", "Smartphone")],
            )],
        );

        let instance = materialize(&schema);
        let Some(SectionValue::Fields(main)) = instance.section("MainCharacter") else {
            panic!("expected a field-list section");
        };
        let entries = main.get("Inventory").and_then(FieldValue::as_entries).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_no_nesting_limit() {
        let instance = materialize(&deep_schema(64));
        let leaves = instance.leaves();

        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].1, &json!("bottom"));
        assert_eq!(leaves[0].0.segments().len(), 65);
    }

    #[test]
    fn test_record_follows_declaration_order() {
        let record = materialize_record(&[
            FieldNode::scalar("Zeta", "z"),
            FieldNode::scalar("Alpha", "a"),
        ]);
        let labels: Vec<_> = record.iter().map(|(name, _)| name.label()).collect();

        assert_eq!(labels, vec!["Zeta", "Alpha"]);
    }
}
