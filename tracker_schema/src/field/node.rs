//! The recursive field definition.

use serde_json::Value;
use std::fmt;

use super::{canonicalize, FieldName};

/// The four kinds of field a template can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single value (text, number or flag).
    Scalar,
    /// An ordered list of values, replaced as a whole.
    List,
    /// A fixed set of named child fields.
    Object,
    /// Unbounded keyed entries, each shaped by the child template.
    DynamicCollection,
}

impl FieldKind {
    /// Tag used in template documents.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "String",
            FieldKind::List => "Array",
            FieldKind::Object => "Object",
            FieldKind::DynamicCollection => "ForEachObject",
        }
    }

    /// Resolve a template `type` tag, ignoring letter casing.
    ///
    /// Accepts both the document tags and the kind names.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match canonicalize(tag).as_str() {
            "string" | "scalar" => Some(FieldKind::Scalar),
            "array" | "list" => Some(FieldKind::List),
            "object" => Some(FieldKind::Object),
            "foreachobject" | "dynamiccollection" => Some(FieldKind::DynamicCollection),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, FieldKind::Scalar | FieldKind::List)
    }

    /// What a value of this kind looks like, for problem messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "a scalar value",
            FieldKind::List => "a list",
            FieldKind::Object => "an object",
            FieldKind::DynamicCollection => "an object of entries",
        }
    }

    /// Check whether a JSON value has the shape this kind holds.
    ///
    /// A scalar is text, a number or a flag. `null` never fits; composites
    /// accept any object.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Scalar => matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_)),
            FieldKind::List => value.is_array(),
            FieldKind::Object | FieldKind::DynamicCollection => value.is_object(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Describe the shape of a JSON value, for problem messages.
pub fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a flag",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Default and example values of a leaf field.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSpec {
    pub default: Value,
    pub examples: Vec<Value>,
}

impl LeafSpec {
    pub fn new(default: Value) -> Self {
        Self {
            default,
            examples: Vec::new(),
        }
    }
}

/// Per-kind payload of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    Scalar(LeafSpec),
    List(LeafSpec),
    Object(Vec<FieldNode>),
    /// Children form the template of every runtime entry.
    DynamicCollection(Vec<FieldNode>),
}

impl FieldShape {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldShape::Scalar(_) => FieldKind::Scalar,
            FieldShape::List(_) => FieldKind::List,
            FieldShape::Object(_) => FieldKind::Object,
            FieldShape::DynamicCollection(_) => FieldKind::DynamicCollection,
        }
    }
}

/// A field definition: one node of a tracker template.
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub name: FieldName,

    /// Guidance text for the narrator. Descriptive only, never interpreted.
    pub prompt: String,

    pub shape: FieldShape,
}

impl FieldNode {
    /// Create a scalar field with the given default.
    pub fn scalar(name: impl Into<FieldName>, default: impl Into<Value>) -> Self {
        Self::with_shape(name, FieldShape::Scalar(LeafSpec::new(default.into())))
    }

    /// Create a list field with the given default items.
    pub fn list<V: Into<Value>>(
        name: impl Into<FieldName>,
        default: impl IntoIterator<Item = V>,
    ) -> Self {
        let items = default.into_iter().map(Into::into).collect();
        Self::with_shape(name, FieldShape::List(LeafSpec::new(Value::Array(items))))
    }

    /// Create an object field with fixed children.
    pub fn object(name: impl Into<FieldName>, children: Vec<FieldNode>) -> Self {
        Self::with_shape(name, FieldShape::Object(children))
    }

    /// Create a dynamic collection whose entries follow `template`.
    pub fn collection(name: impl Into<FieldName>, template: Vec<FieldNode>) -> Self {
        Self::with_shape(name, FieldShape::DynamicCollection(template))
    }

    fn with_shape(name: impl Into<FieldName>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            prompt: String::new(),
            shape,
        }
    }

    /// Set the guidance prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the example values. Ignored for composite fields.
    pub fn with_examples<V: Into<Value>>(mut self, examples: impl IntoIterator<Item = V>) -> Self {
        if let FieldShape::Scalar(spec) | FieldShape::List(spec) = &mut self.shape {
            spec.examples = examples.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn kind(&self) -> FieldKind {
        self.shape.kind()
    }

    pub fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    /// Default and examples, for leaf fields.
    pub fn leaf(&self) -> Option<&LeafSpec> {
        match &self.shape {
            FieldShape::Scalar(spec) | FieldShape::List(spec) => Some(spec),
            _ => None,
        }
    }

    /// Child definitions. Empty for leaf fields.
    pub fn children(&self) -> &[FieldNode] {
        match &self.shape {
            FieldShape::Object(children) | FieldShape::DynamicCollection(children) => children,
            _ => &[],
        }
    }

    /// Look up a child by name, ignoring letter casing.
    pub fn child(&self, name: &str) -> Option<&FieldNode> {
        let canonical = canonicalize(name);
        self.children()
            .iter()
            .find(|child| child.name.canonical() == canonical)
    }

    /// Check the leaf/composite invariants recursively.
    pub fn is_valid(&self) -> bool {
        crate::validate::validate_node(self).is_empty()
    }
}

/// Structural equality: kind, name, and children or default+examples.
/// The prompt does not take part.
impl PartialEq for FieldNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.shape == other.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inventory() -> FieldNode {
        FieldNode::collection(
            "Inventory",
            vec![
                FieldNode::scalar("ItemName", "Smartphone"),
                FieldNode::scalar("Description", "Black iPhone 14, cracked screen protector"),
                FieldNode::scalar("Quantity", "1"),
                FieldNode::scalar("Location", "Right pocket"),
            ],
        )
        .with_prompt("Track items the main character is carrying or has access to.")
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(FieldKind::from_tag("String"), Some(FieldKind::Scalar));
        assert_eq!(FieldKind::from_tag("array"), Some(FieldKind::List));
        assert_eq!(FieldKind::from_tag("OBJECT"), Some(FieldKind::Object));
        assert_eq!(FieldKind::from_tag("ForEachObject"), Some(FieldKind::DynamicCollection));
        assert_eq!(FieldKind::from_tag("dynamicCollection"), Some(FieldKind::DynamicCollection));
        assert_eq!(FieldKind::from_tag("Number"), None);
    }

    #[test]
    fn test_kind_accepts() {
        assert!(FieldKind::Scalar.accepts(&json!("text")));
        assert!(FieldKind::Scalar.accepts(&json!(28)));
        assert!(!FieldKind::Scalar.accepts(&json!(["a"])));
        assert!(!FieldKind::Scalar.accepts(&Value::Null));
        assert!(FieldKind::List.accepts(&json!([])));
        assert!(!FieldKind::List.accepts(&json!("a")));
        assert!(FieldKind::Object.accepts(&json!({})));
    }

    #[test]
    fn test_builders() {
        let node = FieldNode::scalar("Time", "2024-10-16T09:15:30")
            .with_prompt("ISO 8601")
            .with_examples(["2024-10-16T18:45:50"]);

        assert!(node.is_leaf());
        assert_eq!(node.leaf().unwrap().default, json!("2024-10-16T09:15:30"));
        assert_eq!(node.leaf().unwrap().examples.len(), 1);
        assert!(node.children().is_empty());

        let list = FieldNode::list("CharactersPresent", ["No Characters"]);
        assert_eq!(list.kind(), FieldKind::List);
        assert_eq!(list.leaf().unwrap().default, json!(["No Characters"]));
    }

    #[test]
    fn test_examples_ignored_on_composite() {
        let node = inventory().with_examples(["ignored"]);
        assert!(node.leaf().is_none());
        assert_eq!(node.children().len(), 4);
    }

    #[test]
    fn test_child_lookup_is_case_insensitive() {
        let node = inventory();
        assert!(node.child("quantity").is_some());
        assert!(node.child("ITEMNAME").is_some());
        assert!(node.child("Weight").is_none());
    }

    #[test]
    fn test_structural_equality_ignores_prompt() {
        let a = inventory();
        let b = inventory().with_prompt("Something else entirely");
        assert_eq!(a, b);
    }

    #[test]
    fn test_structural_equality_respects_child_order() {
        let a = FieldNode::object(
            "Stats",
            vec![FieldNode::scalar("A", "1"), FieldNode::scalar("B", "2")],
        );
        let b = FieldNode::object(
            "Stats",
            vec![FieldNode::scalar("B", "2"), FieldNode::scalar("A", "1")],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_structural_equality_compares_defaults() {
        let a = FieldNode::scalar("Age", "28");
        let b = FieldNode::scalar("age", "28");
        let c = FieldNode::scalar("Age", "32");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, FieldNode::list("Age", ["28"]));
    }
}
