//! Prompt construction view - schema guidance paired with current values.

use serde_json::Value;
use tracker_schema::{
    FieldKind, FieldName, FieldNode, FieldPath, FieldShape, SchemaTree, SectionBody,
};

use crate::instance::{FieldValue, Instance, Record, SectionValue};

/// One field as the prompt builder sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptEntry<'a> {
    pub path: FieldPath,
    pub name: &'a FieldName,
    pub kind: FieldKind,
    pub prompt: &'a str,
    /// Current value, for leaves that exist in the instance.
    pub current: Option<&'a Value>,
    pub examples: &'a [Value],
}

/// Walk `schema` in declaration order, pairing each field with its value in
/// `instance`.
///
/// A dynamic collection yields its template fields once at `[*]` with no
/// current value, then the fields of each existing entry.
pub fn prompt_entries<'a>(
    schema: &'a SchemaTree,
    instance: &'a Instance,
) -> Vec<PromptEntry<'a>> {
    let mut entries = Vec::new();
    for section in schema.sections() {
        let path = FieldPath::root().field(section.name.label());
        let value = instance.section(section.name.canonical());
        match &section.body {
            SectionBody::Field(node) => {
                let current = match value {
                    Some(SectionValue::Field(current)) => Some(current),
                    _ => None,
                };
                walk_node(node, current, path, &mut entries);
            }
            SectionBody::Fields(nodes) => {
                let record = match value {
                    Some(SectionValue::Fields(record)) => Some(record),
                    _ => None,
                };
                walk_nodes(nodes, record, &path, &mut entries);
            }
        }
    }
    entries
}

fn walk_nodes<'a>(
    nodes: &'a [FieldNode],
    record: Option<&'a Record>,
    path: &FieldPath,
    out: &mut Vec<PromptEntry<'a>>,
) {
    for node in nodes {
        let value = record.and_then(|r| r.get(node.name.canonical()));
        walk_node(node, value, path.field(node.name.label()), out);
    }
}

fn walk_node<'a>(
    node: &'a FieldNode,
    value: Option<&'a FieldValue>,
    path: FieldPath,
    out: &mut Vec<PromptEntry<'a>>,
) {
    out.push(PromptEntry {
        path: path.clone(),
        name: &node.name,
        kind: node.kind(),
        prompt: &node.prompt,
        current: value.and_then(FieldValue::as_leaf),
        examples: node.leaf().map(|spec| spec.examples.as_slice()).unwrap_or_default(),
    });

    match &node.shape {
        FieldShape::Scalar(_) | FieldShape::List(_) => {}
        FieldShape::Object(children) => {
            walk_nodes(children, value.and_then(FieldValue::as_record), &path, out)
        }
        FieldShape::DynamicCollection(template) => {
            walk_nodes(template, None, &path.any_entry(), out);
            if let Some(entries) = value.and_then(FieldValue::as_entries) {
                for (key, record) in entries.iter() {
                    walk_nodes(template, Some(record), &path.entry(key), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::materialize;
    use crate::merge::merge;
    use serde_json::json;

    fn schema() -> SchemaTree {
        SchemaTree::new()
            .with_fields(
                "Story",
                vec![FieldNode::scalar("Time", "2024-10-16T09:15:30")
                    .with_prompt("Current time.")
                    .with_examples(["2024-10-16T18:45:50"])],
            )
            .with_fields(
                "MainCharacter",
                vec![FieldNode::collection("Skills", vec![FieldNode::scalar("Level", "Novice")])
                    .with_prompt("Skills the character has shown.")],
            )
    }

    #[test]
    fn test_entries_pair_guidance_and_values() {
        let schema = schema();
        let instance = materialize(&schema);
        let entries = prompt_entries(&schema, &instance);

        let time = &entries[0];
        assert_eq!(time.path.to_string(), "Story.Time");
        assert_eq!(time.prompt, "Current time.");
        assert_eq!(time.current, Some(&json!("2024-10-16T09:15:30")));
        assert_eq!(time.examples, &[json!("2024-10-16T18:45:50")]);
    }

    #[test]
    fn test_collection_template_and_entries() {
        let schema = schema();
        let instance = merge(
            &materialize(&schema),
            &json!({"MainCharacter": {"Skills": {"Negotiation": {"Level": "Expert"}}}}),
            &schema,
        )
        .instance;

        let entries = prompt_entries(&schema, &instance);
        let paths: Vec<_> = entries.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "Story.Time",
                "MainCharacter.Skills",
                "MainCharacter.Skills[*].Level",
                r#"MainCharacter.Skills["Negotiation"].Level"#,
            ]
        );

        assert_eq!(entries[1].kind, FieldKind::DynamicCollection);
        assert_eq!(entries[1].current, None);
        assert_eq!(entries[2].current, None);
        assert_eq!(entries[3].current, Some(&json!("Expert")));
    }
}
