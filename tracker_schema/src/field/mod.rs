//! Field definitions - the nodes of a tracker template.
//!
//! A field is either a leaf (`Scalar` or `List`, holding a default value and
//! example values) or a composite (`Object` or `DynamicCollection`, holding
//! ordered child definitions). The split is carried by [`FieldShape`], so a
//! node can never be both or neither.

mod name;
mod node;

pub use name::*;
pub use node::*;
