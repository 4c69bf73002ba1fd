//! Paths into a tracker - used to name the exact location of a problem.

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field or section.
    Field(String),
    /// A runtime key inside a dynamic collection.
    Entry(String),
    /// The entry template of a dynamic collection (any entry).
    AnyEntry,
    /// Position inside a field list, used when a definition has no usable name.
    Index(usize),
}

/// A location inside a schema, instance or document.
///
/// Displays as `MainCharacter.Inventory["Keys"].Quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path (the document root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path with a named field.
    pub fn field(&self, name: impl Into<String>) -> Self {
        self.with(PathSegment::Field(name.into()))
    }

    /// Extend the path with a collection entry key.
    pub fn entry(&self, key: impl Into<String>) -> Self {
        self.with(PathSegment::Entry(key.into()))
    }

    /// Extend the path with the entry template of a collection.
    pub fn any_entry(&self) -> Self {
        self.with(PathSegment::AnyEntry)
    }

    /// Extend the path with a list position.
    pub fn index(&self, index: usize) -> Self {
        self.with(PathSegment::Index(index))
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check if `prefix` is an ancestor of (or equal to) this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Entry(key) => write!(f, "[{:?}]", key)?,
                PathSegment::AnyEntry => write!(f, "[*]")?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}
