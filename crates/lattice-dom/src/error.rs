//! Error types for tree mutation
//!
//! Structural edits validate their arguments before touching the tree or
//! the backend, so a returned error always leaves both unchanged.

use thiserror::Error;

use crate::NodeId;

/// Errors returned by structural tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {child:?} contains {parent:?}; insertion would create a cycle")]
    AncestorInsertion { parent: NodeId, child: NodeId },

    #[error("node {node:?} belongs to a different shadow tree than {parent:?}")]
    CrossShadowTree { parent: NodeId, node: NodeId },

    #[error("node {node:?} already has a parent")]
    AlreadyParented { node: NodeId },

    #[error("node {node:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, node: NodeId },

    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("node {node:?} is not an element")]
    NotAnElement { node: NodeId },

    #[error("node {node:?} is not a component")]
    NotAComponent { node: NodeId },

    #[error("cannot replace with a node that already has a parent")]
    ReplacerParented { node: NodeId },

    #[error("text nodes cannot be replaced in place")]
    ReplaceOnText { node: NodeId },

    #[error("slot elements cannot take part in in-place replacement")]
    ReplaceOnSlot { node: NodeId },

    #[error("only virtual nodes may inherit slots")]
    InheritSlotsNonVirtual { node: NodeId },

    #[error("slot elements cannot inherit slots")]
    InheritSlotsOnSlot { node: NodeId },

    #[error("slot inheritance must be set before children are attached")]
    InheritSlotsNonEmpty { node: NodeId },
}

/// Convenience alias for fallible tree operations.
pub type Result<T> = std::result::Result<T, DomError>;
