//! # Tracker Engine
//!
//! The state engine - keeps *what happened* in a tracker up to date. Given a
//! template from `tracker_schema`, the engine builds a default-valued
//! instance, merges the partial updates a narrator produces each turn,
//! checks instances and documents against the template, and converts
//! instances to and from their nested JSON form.
//!
//! The engine is synchronous and performs no I/O. Instances are plain
//! values owned by one session at a time.
//!
//! ## Core Components
//!
//! - **instance**: `Instance`, records, and dynamic collection entries
//! - **materialize**: building the initial instance from a schema
//! - **merge**: the merge engine and its policies
//! - **validate**: instance-level and document-level checks
//! - **convert**: instance documents, prompt documents and output skeletons
//! - **prompt**: schema guidance paired with current values
//! - **tracker**: a session tying a schema, its config and an instance together

pub mod config;
pub mod convert;
pub mod error;
pub mod instance;
pub mod materialize;
pub mod merge;
pub mod prompt;
pub mod tracker;
pub mod validate;

mod matching;

pub use config::*;
pub use convert::*;
pub use error::*;
pub use instance::*;
pub use materialize::*;
pub use merge::*;
pub use prompt::*;
pub use tracker::*;
pub use validate::*;
