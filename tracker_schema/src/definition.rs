//! Tracker definitions - named, stored templates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::framework;
use crate::{
    FieldKind, FieldNode, FieldPath, Result, SchemaError, SchemaProblems, SchemaTree,
    SchemaViolation, Section, SectionBody,
};

/// Longest accepted definition name, in characters.
pub const MAX_DEFINITION_NAME_LEN: usize = 200;

/// Unique identifier for tracker definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefinitionId(pub Uuid);

impl DefinitionId {
    /// Create a new random definition ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DefinitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named template that adventures pick their tracker from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerDefinition {
    pub id: DefinitionId,
    pub name: String,
    pub structure: SchemaTree,
}

impl TrackerDefinition {
    /// Create a new definition with a fresh ID.
    pub fn new(name: impl Into<String>, structure: SchemaTree) -> Self {
        Self {
            id: DefinitionId::new(),
            name: name.into(),
            structure,
        }
    }

    /// Check the name, the schema invariants, and the framework fields.
    pub fn validate(&self) -> SchemaProblems {
        let mut problems = SchemaProblems::new();
        let root = FieldPath::root();

        if self.name.trim().is_empty() {
            problems.push(root.clone(), SchemaViolation::DefinitionName("is required"));
        } else if self.name.chars().count() > MAX_DEFINITION_NAME_LEN {
            problems.push(
                root,
                SchemaViolation::DefinitionName("must not exceed 200 characters"),
            );
        }

        problems.extend(self.structure.validate());
        problems.extend(framework_problems(&self.structure));
        problems
    }

    /// Consume the definition, returning it only if it passes [`validate`](Self::validate).
    pub fn into_validated(self) -> Result<Self> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(self)
        } else {
            Err(SchemaError::Definition(problems))
        }
    }
}

/// Check that a schema carries the fields the framework relies on.
///
/// - `Story` has `Time`, `Weather` and `Location` scalars
/// - `CharactersPresent` is a list
/// - `MainCharacter` has a `Name` scalar
/// - `Characters` has a `Name` scalar, directly or in its entry template
pub fn framework_problems(schema: &SchemaTree) -> SchemaProblems {
    let mut problems = SchemaProblems::new();

    let required_scalars: [(&str, &[&'static str]); 3] = [
        (
            framework::STORY,
            &[framework::TIME, framework::WEATHER, framework::LOCATION],
        ),
        (framework::MAIN_CHARACTER, &[framework::NAME]),
        (framework::CHARACTERS, &[framework::NAME]),
    ];

    for (section_name, fields) in required_scalars {
        let path = FieldPath::root().field(section_name);
        let Some(section) = schema.section(section_name) else {
            problems.push(path, SchemaViolation::MissingSection);
            continue;
        };
        for &field in fields {
            let present = field_candidates(section)
                .iter()
                .any(|n| n.name.matches(field) && n.kind() == FieldKind::Scalar);
            if !present {
                problems.push(
                    path.clone(),
                    SchemaViolation::MissingFrameworkField {
                        name: field,
                        kind: FieldKind::Scalar.tag(),
                    },
                );
            }
        }
    }

    let path = FieldPath::root().field(framework::CHARACTERS_PRESENT);
    match schema.section(framework::CHARACTERS_PRESENT) {
        Some(Section {
            body: SectionBody::Field(node),
            ..
        }) if node.kind() == FieldKind::List => {}
        Some(_) => problems.push(
            path,
            SchemaViolation::MissingFrameworkField {
                name: framework::CHARACTERS_PRESENT,
                kind: FieldKind::List.tag(),
            },
        ),
        None => problems.push(path, SchemaViolation::MissingSection),
    }

    problems
}

/// Fields a required field may be found among: the section's own fields, or
/// the entry template when the section is a single collection.
fn field_candidates(section: &Section) -> &[FieldNode] {
    match &section.body {
        SectionBody::Field(node) if node.kind() == FieldKind::DynamicCollection => node.children(),
        _ => section.nodes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_structure;

    #[test]
    fn test_default_definition_is_valid() {
        let definition = TrackerDefinition::new("Office drama", default_structure());
        assert!(definition.validate().is_empty(), "{}", definition.validate());
        assert!(definition.into_validated().is_ok());
    }

    #[test]
    fn test_definition_name_rules() {
        let empty = TrackerDefinition::new("  ", default_structure());
        assert!(empty.validate().to_string().contains("definition name is required"));

        let long = TrackerDefinition::new("x".repeat(201), default_structure());
        assert!(long
            .validate()
            .to_string()
            .contains("must not exceed 200 characters"));

        let exact = TrackerDefinition::new("x".repeat(200), default_structure());
        assert!(exact.validate().is_empty());
    }

    #[test]
    fn test_missing_framework_fields() {
        let schema = SchemaTree::new()
            .with_fields("Story", vec![FieldNode::scalar("Time", "noon")])
            .with_field("CharactersPresent", FieldNode::scalar("CharactersPresent", "nobody"))
            .with_fields("MainCharacter", vec![FieldNode::scalar("name", "Ariel")]);

        let problems = framework_problems(&schema);
        let text = problems.to_string();

        assert!(text.contains("Story: required field 'Weather' of type String is missing"));
        assert!(text.contains("Story: required field 'Location' of type String is missing"));
        assert!(text.contains("CharactersPresent: required field 'CharactersPresent' of type Array is missing"));
        assert!(text.contains("Characters: required section is missing"));
        assert!(!text.contains("MainCharacter"));
        assert_eq!(problems.len(), 4);
    }

    #[test]
    fn test_characters_as_field_list() {
        let schema = default_structure();
        let mut sections: Vec<Section> = schema.sections().to_vec();
        sections.retain(|s| !s.name.matches(framework::CHARACTERS));

        let mut rebuilt = SchemaTree::new();
        for section in sections {
            rebuilt = match section.body {
                SectionBody::Field(node) => rebuilt.with_field(section.name, node),
                SectionBody::Fields(nodes) => rebuilt.with_fields(section.name, nodes),
            };
        }
        let rebuilt = rebuilt.with_fields(
            framework::CHARACTERS,
            vec![FieldNode::scalar("Name", "Kael"), FieldNode::scalar("Age", "28")],
        );

        assert!(framework_problems(&rebuilt).is_empty());
    }

    #[test]
    fn test_invalid_definition_error() {
        let definition = TrackerDefinition::new("Broken", SchemaTree::new());
        match definition.into_validated() {
            Err(SchemaError::Definition(problems)) => assert!(!problems.is_empty()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_definition_serde() {
        let definition = TrackerDefinition::new("Office drama", default_structure());
        let text = serde_json::to_string(&definition).unwrap();
        let back: TrackerDefinition = serde_json::from_str(&text).unwrap();

        assert_eq!(definition, back);
    }
}
