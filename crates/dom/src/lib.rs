pub mod node;
pub mod outline;
pub mod serialize;
pub mod traverse;
pub mod tree;

pub use crate::node::{Attr, FormState, NodeId, NodeKind, NodeType};
pub use crate::serialize::to_markup;
pub use crate::traverse::Descendants;
pub use crate::tree::Dom;

/// Namespace reserved for `xmlns` attribute declarations. Attributes in this
/// namespace must be written under their full qualified name (see
/// `Dom::set_attr_ns`).
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
