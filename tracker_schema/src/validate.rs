//! Schema-level validation.
//!
//! Run once after a template is parsed. Every problem is collected with its
//! path so a template author can fix them all in one pass.

use std::collections::HashSet;

use crate::{
    FieldKind, FieldName, FieldNode, FieldPath, FieldShape, LeafSpec, SchemaProblems,
    SchemaTree, SchemaViolation,
};

/// Check every section of a schema.
pub fn validate_schema(schema: &SchemaTree) -> SchemaProblems {
    let mut problems = SchemaProblems::new();
    let root = FieldPath::root();

    check_unique(schema.sections().iter().map(|s| &s.name), &root, &mut problems);

    for section in schema.sections() {
        let path = root.field(section.name.label());
        if section.name.is_empty() {
            problems.push(path.clone(), SchemaViolation::EmptyName);
        }
        match &section.body {
            crate::SectionBody::Field(node) => check_node(node, &path, &mut problems),
            crate::SectionBody::Fields(nodes) => {
                if nodes.is_empty() {
                    problems.push(path.clone(), SchemaViolation::NoChildren);
                }
                check_nodes(nodes, &path, &mut problems);
            }
        }
    }

    problems
}

/// Check a single node and everything below it.
pub fn validate_node(node: &FieldNode) -> SchemaProblems {
    let mut problems = SchemaProblems::new();
    check_node(node, &FieldPath::root().field(node.name.label()), &mut problems);
    problems
}

fn check_nodes(nodes: &[FieldNode], parent: &FieldPath, problems: &mut SchemaProblems) {
    check_unique(nodes.iter().map(|n| &n.name), parent, problems);
    for node in nodes {
        check_node(node, &parent.field(node.name.label()), problems);
    }
}

fn check_node(node: &FieldNode, path: &FieldPath, problems: &mut SchemaProblems) {
    if node.name.is_empty() {
        problems.push(path.clone(), SchemaViolation::EmptyName);
    }

    match &node.shape {
        FieldShape::Scalar(spec) => check_leaf(spec, FieldKind::Scalar, path, problems),
        FieldShape::List(spec) => check_leaf(spec, FieldKind::List, path, problems),
        FieldShape::Object(children) | FieldShape::DynamicCollection(children) => {
            if children.is_empty() {
                problems.push(path.clone(), SchemaViolation::NoChildren);
            }
            check_nodes(children, path, problems);
        }
    }
}

fn check_leaf(spec: &LeafSpec, kind: FieldKind, path: &FieldPath, problems: &mut SchemaProblems) {
    let expected = kind.describe();
    if !kind.accepts(&spec.default) {
        problems.push(path.clone(), SchemaViolation::DefaultShape { expected });
    }
    for (index, example) in spec.examples.iter().enumerate() {
        if !kind.accepts(example) {
            problems.push(path.clone(), SchemaViolation::ExampleShape { index, expected });
        }
    }
}

fn check_unique<'a>(
    names: impl Iterator<Item = &'a FieldName>,
    parent: &FieldPath,
    problems: &mut SchemaProblems,
) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.canonical()) {
            problems.push(
                parent.clone(),
                SchemaViolation::DuplicateName(name.label().to_string()),
            );
        }
    }
}
