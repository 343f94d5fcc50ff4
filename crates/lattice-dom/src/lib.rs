//! Logical node tree with shadow-DOM slot projection and incremental
//! backend synchronization.
//!
//! A [`Tree`] holds a forest of nodes (text, native elements, virtual
//! structure nodes, components, shadow roots). Components own shadow
//! trees whose slots receive the component's content per a configurable
//! slot mode, and every structural edit is translated on the fly into
//! calls against a pluggable rendering backend: either the shadow-tree
//! protocol, where the backend mirrors the logical tree, or a flattened
//! composed/DOM-like protocol, where virtual nodes disappear and slot
//! content is spliced into place.
//!
//! ```
//! use lattice_dom::{BackendDriver, Tree};
//! use lattice_backend::RecordingBackend;
//!
//! let mut tree = Tree::new(BackendDriver::composed(RecordingBackend::new()));
//! let root = tree.create_native_node("div");
//! let text = tree.create_text_node("hello");
//! tree.append_child(root, text).unwrap();
//! tree.pretend_attached(root);
//! ```

/// Handle to a node in a [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

/// Handle to a slot-chain node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ChainId(pub(crate) u32);

mod chain;
mod composed;
mod driver;
mod error;
mod node;
mod observer;
mod ops;
mod slot;
mod tree;
mod value;

pub use driver::BackendDriver;
pub use error::{DomError, Result};
pub use node::{ContainingSlot, ElementKind, Node};
pub use observer::{
    CollectingLifecycle, CollectingSink, DynamicSlotHandler, LifecycleEvent, LifecycleSink,
    MutationRecord, MutationSink, ObserverState, SlotValueSnapshot,
};
pub use slot::{SlotMode, SlotRegistry};
pub use tree::{ComponentOptions, ObserverOptions, Tree};
pub use value::{DeepCopyStrategy, SlotValue};

pub use lattice_backend::{BackendMode, BackendNode};
