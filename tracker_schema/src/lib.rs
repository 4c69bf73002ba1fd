//! # Tracker Schema
//!
//! The template crate - declares *what* a tracker records. A template is a tree
//! of field definitions: leaves carry a default value and example values,
//! composites carry ordered child definitions. This crate parses templates from
//! their nested JSON form, checks them, and serializes them back. It holds no
//! per-session state.
//!
//! ## Core Components
//!
//! - **field**: `FieldName`, `FieldKind` and the recursive `FieldNode`
//! - **schema**: `SchemaTree`, the named top-level sections of a template
//! - **document**: parsing and serializing the nested JSON template form
//! - **validate**: schema-level invariant checks
//! - **definition**: named tracker definitions and their framework fields

pub mod defaults;
pub mod definition;
pub mod document;
pub mod error;
pub mod field;
pub mod path;
pub mod schema;
pub mod validate;

pub use defaults::*;
pub use definition::*;
pub use error::*;
pub use field::*;
pub use path::*;
pub use schema::*;
