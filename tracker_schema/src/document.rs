//! Template documents - the nested JSON form of a schema.
//!
//! A template document is an object of sections. A section is either a field
//! definition object or an array of them. Each definition recognizes the keys
//! `name`, `type`, `prompt`, `defaultValue`, `exampleValues` and
//! `nestedFields`, in any letter casing. `null` means absent.
//!
//! ```json
//! {
//!   "story": [
//!     { "name": "Time", "type": "String", "prompt": "...",
//!       "defaultValue": "2024-10-16T09:15:30", "exampleValues": ["..."] }
//!   ],
//!   "mainCharacter": [
//!     { "name": "Inventory", "type": "ForEachObject", "prompt": "...",
//!       "nestedFields": [ ... ] }
//!   ]
//! }
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    canonicalize, FieldKind, FieldName, FieldNode, FieldPath, FieldShape, LeafSpec, Result,
    SchemaError, SchemaProblems, SchemaTree, SchemaViolation, Section, SectionBody,
};

const KEY_NAME: &str = "name";
const KEY_TYPE: &str = "type";
const KEY_PROMPT: &str = "prompt";
const KEY_DEFAULT: &str = "defaultValue";
const KEY_EXAMPLES: &str = "exampleValues";
const KEY_NESTED: &str = "nestedFields";

impl SchemaTree {
    /// Parse a template document.
    ///
    /// Fails with [`SchemaError::Invalid`] listing every problem found, both
    /// structural ones met while reading and the schema-level checks.
    pub fn from_document(raw: &Value) -> Result<Self> {
        let mut problems = SchemaProblems::new();
        let root = FieldPath::root();

        let Some(sections) = raw.as_object() else {
            problems.push(root, SchemaViolation::NotAnObject);
            return Err(SchemaError::Invalid(problems));
        };

        let mut tree = SchemaTree::new();
        for (key, value) in sections {
            let path = root.field(key.as_str());
            let body = match value {
                Value::Array(items) => {
                    let nodes: Vec<FieldNode> = items
                        .iter()
                        .enumerate()
                        .filter_map(|(i, item)| {
                            parse_node(item, &path, path.index(i), &mut problems)
                        })
                        .collect();
                    // Nothing usable was read; the per-node problems say why.
                    (items.is_empty() || !nodes.is_empty()).then_some(SectionBody::Fields(nodes))
                }
                Value::Object(_) => parse_node(value, &root, path.clone(), &mut problems)
                    .map(SectionBody::Field),
                _ => {
                    problems.push(path, SchemaViolation::InvalidSection);
                    None
                }
            };
            if let Some(body) = body {
                tree.push_section(Section {
                    name: FieldName::new(key.as_str()),
                    body,
                });
            }
        }

        problems.extend(tree.validate());
        if problems.is_empty() {
            debug!(sections = tree.len(), "parsed tracker schema");
            Ok(tree)
        } else {
            Err(SchemaError::Invalid(problems))
        }
    }

    /// Parse a template from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(text)?;
        Self::from_document(&raw)
    }

    /// Serialize the schema back into its template document form.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        for section in self.sections() {
            let value = match &section.body {
                SectionBody::Field(node) => node.to_document(),
                SectionBody::Fields(nodes) => {
                    Value::Array(nodes.iter().map(FieldNode::to_document).collect())
                }
            };
            doc.insert(section.name.label().to_string(), value);
        }
        Value::Object(doc)
    }
}

impl FieldNode {
    /// Parse a single field definition object.
    pub fn from_document(raw: &Value) -> Result<Self> {
        let mut problems = SchemaProblems::new();
        let root = FieldPath::root();
        let node = parse_node(raw, &root, root.clone(), &mut problems);
        if let Some(node) = &node {
            problems.extend(crate::validate::validate_node(node));
        }
        match node {
            Some(node) if problems.is_empty() => Ok(node),
            _ => Err(SchemaError::Invalid(problems)),
        }
    }

    /// Serialize this definition, with `nestedFields` for composites and
    /// `defaultValue`/`exampleValues` for leaves.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(KEY_NAME.into(), Value::String(self.name.label().to_string()));
        doc.insert(KEY_TYPE.into(), Value::String(self.kind().tag().to_string()));
        doc.insert(KEY_PROMPT.into(), Value::String(self.prompt.clone()));
        match &self.shape {
            FieldShape::Scalar(spec) | FieldShape::List(spec) => {
                doc.insert(KEY_DEFAULT.into(), spec.default.clone());
                doc.insert(KEY_EXAMPLES.into(), Value::Array(spec.examples.clone()));
            }
            FieldShape::Object(children) | FieldShape::DynamicCollection(children) => {
                doc.insert(
                    KEY_NESTED.into(),
                    Value::Array(children.iter().map(FieldNode::to_document).collect()),
                );
            }
        }
        Value::Object(doc)
    }
}

/// Definition keys looked up case-insensitively, `null` treated as absent.
struct NodeKeys<'a> {
    name: Option<&'a Value>,
    kind: Option<&'a Value>,
    prompt: Option<&'a Value>,
    default: Option<&'a Value>,
    examples: Option<&'a Value>,
    nested: Option<&'a Value>,
}

impl<'a> NodeKeys<'a> {
    fn collect(raw: &'a Map<String, Value>) -> Self {
        let mut keys = NodeKeys {
            name: None,
            kind: None,
            prompt: None,
            default: None,
            examples: None,
            nested: None,
        };
        for (key, value) in raw {
            if value.is_null() {
                continue;
            }
            let canonical = canonicalize(key);
            let slot = if canonical == canonicalize(KEY_NAME) {
                &mut keys.name
            } else if canonical == canonicalize(KEY_TYPE) {
                &mut keys.kind
            } else if canonical == canonicalize(KEY_PROMPT) {
                &mut keys.prompt
            } else if canonical == canonicalize(KEY_DEFAULT) {
                &mut keys.default
            } else if canonical == canonicalize(KEY_EXAMPLES) {
                &mut keys.examples
            } else if canonical == canonicalize(KEY_NESTED) {
                &mut keys.nested
            } else {
                debug!(key = %key, "ignoring unrecognized field definition key");
                continue;
            };
            *slot = Some(value);
        }
        keys
    }
}

/// Read one definition. Returns `None` when the node cannot be built at all;
/// everything that can be checked is still reported.
///
/// Problems are located at `parent.<name>`, or at `fallback` while the name is
/// not yet known.
fn parse_node(
    raw: &Value,
    parent: &FieldPath,
    fallback: FieldPath,
    problems: &mut SchemaProblems,
) -> Option<FieldNode> {
    let Some(object) = raw.as_object() else {
        problems.push(fallback, SchemaViolation::NotAnObject);
        return None;
    };
    let keys = NodeKeys::collect(object);

    let name = match keys.name {
        Some(Value::String(name)) => FieldName::new(name.as_str()),
        Some(_) => {
            problems.push(
                fallback,
                SchemaViolation::InvalidKey { key: KEY_NAME, expected: "text" },
            );
            return None;
        }
        None => {
            problems.push(fallback, SchemaViolation::MissingName);
            return None;
        }
    };
    let path = parent.field(name.label());

    let kind = match keys.kind {
        Some(Value::String(tag)) => match FieldKind::from_tag(tag) {
            Some(kind) => Some(kind),
            None => {
                problems.push(path.clone(), SchemaViolation::UnknownKind(tag.clone()));
                None
            }
        },
        Some(_) => {
            problems.push(
                path.clone(),
                SchemaViolation::InvalidKey { key: KEY_TYPE, expected: "text" },
            );
            None
        }
        None => {
            problems.push(path.clone(), SchemaViolation::MissingKind);
            None
        }
    };

    let prompt = match keys.prompt {
        Some(Value::String(prompt)) => prompt.clone(),
        Some(_) => {
            problems.push(
                path.clone(),
                SchemaViolation::InvalidKey { key: KEY_PROMPT, expected: "text" },
            );
            String::new()
        }
        None => String::new(),
    };

    // An empty nested list counts as absent.
    let nested = match keys.nested {
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            problems.push(
                path.clone(),
                SchemaViolation::InvalidKey { key: KEY_NESTED, expected: "a list" },
            );
            return None;
        }
        None => None,
    };

    let kind = kind?;
    let shape = if kind.is_leaf() {
        if nested.is_some() {
            problems.push(path.clone(), SchemaViolation::NestedOnLeaf);
        }
        let Some(default) = keys.default else {
            problems.push(path, SchemaViolation::MissingDefault);
            return None;
        };
        let examples = match keys.examples {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                problems.push(
                    path.clone(),
                    SchemaViolation::InvalidKey { key: KEY_EXAMPLES, expected: "a list" },
                );
                Vec::new()
            }
            None => Vec::new(),
        };
        let spec = LeafSpec {
            default: default.clone(),
            examples,
        };
        match kind {
            FieldKind::Scalar => FieldShape::Scalar(spec),
            _ => FieldShape::List(spec),
        }
    } else {
        if keys.default.is_some() || keys.examples.is_some() {
            problems.push(path.clone(), SchemaViolation::LeafValuesOnComposite);
        }
        let children: Vec<FieldNode> = nested
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| parse_node(item, &path, path.index(i), problems))
                    .collect()
            })
            .unwrap_or_default();
        match kind {
            FieldKind::Object => FieldShape::Object(children),
            _ => FieldShape::DynamicCollection(children),
        }
    };

    Some(FieldNode { name, prompt, shape })
}
