//! Document tree model.
//!
//! - [`node`]: node variants, per-node cached state, variables and properties
//! - [`tree`]: the arena owning the nodes and the structural operations
//! - [`clone`]: deep copies of nodes and whole trees
//! - [`visitor`]: depth-first traversal callbacks
//!
//! Processing state transitions (skippability, precomputation, the processor
//! loop) live in [`crate::engine`].

pub mod clone;
pub mod node;
pub mod tree;
pub mod visitor;

pub use node::{
    apply_dialect_prefix, normalize_name, Attribute, NodeData, NodeId, NodeKind, NodeType,
    NODE_PROPERTY_XML_ENCODING, NODE_PROPERTY_XML_STANDALONE, NODE_PROPERTY_XML_VERSION,
};
pub use tree::{Tree, TreeError, TreeResult};
pub use visitor::TreeVisitor;
