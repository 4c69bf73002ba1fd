//! Schema views handed to the narrator.
//!
//! Both views lay the schema out in the shape of an instance document. A
//! dynamic collection becomes a one-element array holding its entry
//! template, since entry keys are not known ahead of time. Updates must still
//! send a collection as an object keyed by entry; an array there is a shape
//! mismatch.

use serde_json::{json, Map, Value};
use tracker_schema::{FieldNode, FieldShape, SchemaTree, SectionBody};

/// Guidance for every field: prompt, default and examples.
pub fn prompt_document(schema: &SchemaTree) -> Value {
    schema_view(schema, guidance)
}

/// An empty response shape: text leaves as `""`, lists as `[]`.
///
/// Collections show their template as a one-element array. The narrator
/// answers with an object of entry key to entry fields instead.
pub fn output_skeleton(schema: &SchemaTree) -> Value {
    schema_view(schema, blank)
}

fn schema_view(schema: &SchemaTree, leaf: fn(&FieldNode) -> Value) -> Value {
    let sections = schema
        .sections()
        .iter()
        .map(|section| {
            let value = match &section.body {
                SectionBody::Field(node) => node_view(node, leaf),
                SectionBody::Fields(nodes) => nodes_view(nodes, leaf),
            };
            (section.name.label().to_string(), value)
        })
        .collect();
    Value::Object(sections)
}

fn nodes_view(nodes: &[FieldNode], leaf: fn(&FieldNode) -> Value) -> Value {
    let fields: Map<String, Value> = nodes
        .iter()
        .map(|node| (node.name.label().to_string(), node_view(node, leaf)))
        .collect();
    Value::Object(fields)
}

fn node_view(node: &FieldNode, leaf: fn(&FieldNode) -> Value) -> Value {
    match &node.shape {
        FieldShape::Scalar(_) | FieldShape::List(_) => leaf(node),
        FieldShape::Object(children) => nodes_view(children, leaf),
        FieldShape::DynamicCollection(template) => Value::Array(vec![nodes_view(template, leaf)]),
    }
}

fn guidance(node: &FieldNode) -> Value {
    let (default, examples) = match node.leaf() {
        Some(spec) => (spec.default.clone(), spec.examples.clone()),
        None => (Value::Null, Vec::new()),
    };
    json!({
        "prompt": node.prompt,
        "defaultValue": default,
        "exampleValues": examples,
    })
}

fn blank(node: &FieldNode) -> Value {
    match node.shape {
        FieldShape::List(_) => Value::Array(Vec::new()),
        _ => Value::String(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::materialize;
    use crate::merge::merge;

    fn schema() -> SchemaTree {
        SchemaTree::new()
            .with_fields(
                "Story",
                vec![FieldNode::scalar("Time", "2024-10-16T09:15:30")
                    .with_prompt("Current time.")
                    .with_examples(["2024-10-16T18:45:50"])],
            )
            .with_field("CharactersPresent", FieldNode::list("CharactersPresent", ["No Characters"]))
            .with_fields(
                "MainCharacter",
                vec![FieldNode::collection(
                    "Inventory",
                    vec![
                        FieldNode::scalar("ItemName", "Smartphone"),
                        FieldNode::list("Tags", ["electronics"]),
                    ],
                )],
            )
    }

    #[test]
    fn test_output_skeleton() {
        assert_eq!(
            output_skeleton(&schema()),
            json!({
                "Story": {"Time": ""},
                "CharactersPresent": [],
                "MainCharacter": {"Inventory": [{"ItemName": "", "Tags": []}]}
            })
        );
    }

    #[test]
    fn test_prompt_document() {
        let document = prompt_document(&schema());

        assert_eq!(
            document["Story"]["Time"],
            json!({
                "prompt": "Current time.",
                "defaultValue": "2024-10-16T09:15:30",
                "exampleValues": ["2024-10-16T18:45:50"]
            })
        );
        assert_eq!(
            document["MainCharacter"]["Inventory"][0]["ItemName"]["defaultValue"],
            json!("Smartphone")
        );
        assert_eq!(document["MainCharacter"]["Inventory"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_collection_answer_must_be_keyed() {
        let schema = schema();
        let instance = materialize(&schema);
        let skeleton = output_skeleton(&schema);

        let answer = json!({"MainCharacter": skeleton["MainCharacter"]});
        let echoed = merge(&instance, &answer, &schema);
        assert!(echoed
            .report
            .problems
            .to_string()
            .contains("MainCharacter.Inventory: expected an object, found a list"));

        let keyed = merge(
            &instance,
            &json!({"MainCharacter": {"Inventory": {"Keys": {"ItemName": "Keys"}}}}),
            &schema,
        );
        assert!(keyed.report.is_clean());
    }
}
