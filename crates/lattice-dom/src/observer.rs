//! Mutation observation and lifecycle notification
//!
//! Every node carries a small observer state: which record kinds are
//! listened for directly, plus a counter of subtree listeners installed at
//! the node or any ancestor. The counter lets mutation paths skip record
//! construction entirely when nobody is listening below the edit point.

use crate::value::SlotValue;
use crate::NodeId;

/// A single observed mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationRecord {
    /// Children were added to or removed from `target`.
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// `target` became attached or detached.
    AttachStatus { target: NodeId, attached: bool },
    /// An attribute of `target` changed or was removed.
    Attribute {
        target: NodeId,
        name: String,
        value: Option<String>,
    },
    /// The text content of `target` changed.
    CharacterData { target: NodeId, content: String },
}

/// Receiver for mutation records
pub trait MutationSink {
    fn record(&mut self, record: MutationRecord);
}

/// Receiver for node lifecycle events
pub trait LifecycleSink {
    fn attached(&mut self, node: NodeId);
    fn detached(&mut self, node: NodeId);
    /// The node stayed attached but its location changed.
    fn moved(&mut self, node: NodeId);
}

/// Handler driving the content of a dynamically managed slot
pub trait DynamicSlotHandler {
    /// A slot became available; content for it should be generated.
    fn insert(&self, slot: NodeId, name: &str, values: SlotValueSnapshot);
    /// A slot is going away; its generated content should be dropped.
    fn remove(&self, slot: NodeId);
    /// Values of an existing slot changed.
    fn update(&self, slot: NodeId, values: SlotValueSnapshot);
}

/// Values handed to a dynamic slot handler, with the dirtied names
#[derive(Debug, Clone, Default)]
pub struct SlotValueSnapshot {
    pub values: std::collections::BTreeMap<String, SlotValue>,
    pub updated_names: std::collections::BTreeSet<String>,
}

/// Per-node observer flags and subtree listener counter
#[derive(Debug, Clone, Default)]
pub struct ObserverState {
    pub child_list: bool,
    pub attach_status: bool,
    pub attributes: bool,
    pub character_data: bool,
    /// Whether listeners at this node also cover its descendants.
    pub subtree: bool,
    /// Number of subtree listeners at this node or any ancestor.
    pub subtree_count: u32,
}

impl ObserverState {
    #[inline]
    pub fn wants_child_list(&self) -> bool {
        self.child_list || self.subtree_count > 0
    }

    #[inline]
    pub fn wants_attach_status(&self) -> bool {
        self.attach_status || self.subtree_count > 0
    }

    #[inline]
    pub fn wants_attributes(&self) -> bool {
        self.attributes || self.subtree_count > 0
    }

    #[inline]
    pub fn wants_character_data(&self) -> bool {
        self.character_data || self.subtree_count > 0
    }

    /// Listener weight this node contributes to its descendants.
    #[inline]
    pub fn own_subtree_weight(&self) -> u32 {
        u32::from(self.subtree)
    }
}

/// A sink that collects records into a vector, for tests
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub records: Vec<MutationRecord>,
}

impl MutationSink for CollectingSink {
    fn record(&mut self, record: MutationRecord) {
        self.records.push(record);
    }
}

/// One lifecycle event as collected by [`CollectingLifecycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Attached(NodeId),
    Detached(NodeId),
    Moved(NodeId),
}

/// A lifecycle sink that collects events into a vector, for tests
#[derive(Debug, Default)]
pub struct CollectingLifecycle {
    pub events: Vec<LifecycleEvent>,
}

impl LifecycleSink for CollectingLifecycle {
    fn attached(&mut self, node: NodeId) {
        self.events.push(LifecycleEvent::Attached(node));
    }

    fn detached(&mut self, node: NodeId) {
        self.events.push(LifecycleEvent::Detached(node));
    }

    fn moved(&mut self, node: NodeId) {
        self.events.push(LifecycleEvent::Moved(node));
    }
}
