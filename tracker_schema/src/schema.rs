//! Schema tree - the named top-level sections of a tracker template.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::slice;

use crate::{canonicalize, FieldName, FieldNode, SchemaProblems};

/// Body of a top-level section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// A single field, e.g. the list of characters present.
    Field(FieldNode),
    /// An ordered field list, e.g. scene attributes or one character's status.
    Fields(Vec<FieldNode>),
}

/// A named top-level section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: FieldName,
    pub body: SectionBody,
}

impl Section {
    /// The field definitions of this section, in declaration order.
    pub fn nodes(&self) -> &[FieldNode] {
        match &self.body {
            SectionBody::Field(node) => slice::from_ref(node),
            SectionBody::Fields(nodes) => nodes,
        }
    }

    /// Look up a field of a field-list section, ignoring letter casing.
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        match &self.body {
            SectionBody::Fields(nodes) => {
                let canonical = canonicalize(name);
                nodes.iter().find(|n| n.name.canonical() == canonical)
            }
            SectionBody::Field(_) => None,
        }
    }
}

/// The complete template: ordered, uniquely named sections.
///
/// Parsed once per tracker configuration and shared read-only by every
/// session that uses it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaTree {
    sections: Vec<Section>,
}

impl SchemaTree {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section holding a single field.
    pub fn with_field(mut self, name: impl Into<FieldName>, node: FieldNode) -> Self {
        self.sections.push(Section {
            name: name.into(),
            body: SectionBody::Field(node),
        });
        self
    }

    /// Add a section holding an ordered field list.
    pub fn with_fields(mut self, name: impl Into<FieldName>, nodes: Vec<FieldNode>) -> Self {
        self.sections.push(Section {
            name: name.into(),
            body: SectionBody::Fields(nodes),
        });
        self
    }

    pub(crate) fn push_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section by name, ignoring letter casing.
    pub fn section(&self, name: &str) -> Option<&Section> {
        let canonical = canonicalize(name);
        self.sections
            .iter()
            .find(|s| s.name.canonical() == canonical)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Run the schema-level checks over every section.
    pub fn validate(&self) -> SchemaProblems {
        crate::validate::validate_schema(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Serialize for SchemaTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        SchemaTree::from_document(&raw).map_err(D::Error::custom)
    }
}
