//! Node model
//!
//! Nodes live in a [`Tree`](crate::tree::Tree) arena and reference each
//! other by [`NodeId`]. A node is either a text node or an element; elements
//! further split into native elements, virtual (structure-only) nodes,
//! components, and the shadow roots owned by components.

use lattice_backend::BackendNode;

use crate::observer::ObserverState;
use crate::slot::SlotRegistry;
use crate::{ChainId, NodeId};

/// Where a node stands in slot assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainingSlot {
    /// Not in a slot-capable location; composition follows the logical parent.
    #[default]
    Unassigned,
    /// In a slot-capable location but matched by no slot; not composed.
    None,
    /// Assigned to this slot element.
    Slot(NodeId),
}

impl ContainingSlot {
    #[inline]
    pub fn slot(self) -> Option<NodeId> {
        match self {
            ContainingSlot::Slot(s) => Some(s),
            _ => None,
        }
    }
}

/// Element flavor
#[derive(Debug)]
pub enum ElementKind {
    Native,
    /// Structure-only node, invisible to composed backends.
    Virtual,
    Component { shadow_root: NodeId },
    ShadowRoot { host: NodeId, registry: SlotRegistry },
}

/// Element-specific node state
#[derive(Debug)]
pub struct ElementData {
    pub(crate) tag: String,
    pub(crate) kind: ElementKind,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<NodeId>,
    /// `Some(name)` marks this element as a slot with that name.
    pub(crate) slot_name: Option<String>,
    /// Name of the slot this node targets when used as slot content.
    pub(crate) slot: String,
    /// Explicit target slot for dynamically managed trees.
    pub(crate) slot_element: Option<NodeId>,
    /// Virtual nodes with this flag splice their children into the
    /// enclosing slot context instead of consuming slot content themselves.
    pub(crate) inherit_slots: bool,
    /// Slot-chain node owned by this element, when it is a slot.
    pub(crate) chain_node: Option<ChainId>,
    /// First slot (in chain order) inside this element's subtree.
    pub(crate) subtree_slot_start: Option<ChainId>,
    /// Last slot (in chain order) inside this element's subtree.
    pub(crate) subtree_slot_end: Option<ChainId>,
    /// Content nodes currently assigned to this slot, in composed order.
    pub(crate) slot_nodes: Vec<NodeId>,
}

impl ElementData {
    pub(crate) fn new(tag: String, kind: ElementKind) -> Self {
        ElementData {
            tag,
            kind,
            attributes: Vec::new(),
            children: Vec::new(),
            slot_name: None,
            slot: String::new(),
            slot_element: None,
            inherit_slots: false,
            chain_node: None,
            subtree_slot_start: None,
            subtree_slot_end: None,
            slot_nodes: Vec::new(),
        }
    }
}

/// Text or element payload
#[derive(Debug)]
pub enum NodeContent {
    Text(String),
    Element(ElementData),
}

/// One node of the logical tree
#[derive(Debug)]
pub struct Node {
    pub(crate) backend: Option<BackendNode>,
    pub(crate) parent: Option<NodeId>,
    /// Index of this node within its parent's child list.
    pub(crate) parent_index: usize,
    pub(crate) containing_slot: ContainingSlot,
    /// Index of this node within its containing slot's content list.
    pub(crate) slot_index: usize,
    pub(crate) attached: bool,
    pub(crate) destroy_backend_on_detach: bool,
    pub(crate) backend_destroyed: bool,
    pub(crate) observer: ObserverState,
    pub(crate) content: NodeContent,
}

impl Node {
    pub(crate) fn new(content: NodeContent, backend: Option<BackendNode>) -> Self {
        Node {
            backend,
            parent: None,
            parent_index: 0,
            containing_slot: ContainingSlot::Unassigned,
            slot_index: 0,
            attached: false,
            destroy_backend_on_detach: false,
            backend_destroyed: false,
            observer: ObserverState::default(),
            content,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn backend_node(&self) -> Option<BackendNode> {
        self.backend
    }

    #[inline]
    pub fn containing_slot(&self) -> ContainingSlot {
        self.containing_slot
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[inline]
    pub fn is_text_node(&self) -> bool {
        matches!(self.content, NodeContent::Text(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.content {
            NodeContent::Element(el) => Some(el),
            NodeContent::Text(_) => None,
        }
    }

    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.content {
            NodeContent::Element(el) => Some(el),
            NodeContent::Text(_) => None,
        }
    }

    /// Element payload; panics on text nodes. Internal call sites only reach
    /// this after checking the node kind.
    #[inline]
    pub(crate) fn el(&self) -> &ElementData {
        self.as_element().expect("expected an element node")
    }

    #[inline]
    pub(crate) fn el_mut(&mut self) -> &mut ElementData {
        self.as_element_mut().expect("expected an element node")
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(s) => Some(s),
            NodeContent::Element(_) => None,
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }

    pub fn children(&self) -> &[NodeId] {
        self.as_element().map_or(&[], |el| &el.children)
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        matches!(
            self.as_element().map(|el| &el.kind),
            Some(ElementKind::Virtual)
        )
    }

    #[inline]
    pub fn is_component(&self) -> bool {
        matches!(
            self.as_element().map(|el| &el.kind),
            Some(ElementKind::Component { .. })
        )
    }

    #[inline]
    pub fn is_shadow_root(&self) -> bool {
        matches!(
            self.as_element().map(|el| &el.kind),
            Some(ElementKind::ShadowRoot { .. })
        )
    }

    /// The shadow root owned by this node, when it is a component.
    pub fn shadow_root(&self) -> Option<NodeId> {
        match self.as_element().map(|el| &el.kind) {
            Some(&ElementKind::Component { shadow_root }) => Some(shadow_root),
            _ => None,
        }
    }

    /// The host component, when this node is a shadow root.
    pub fn host(&self) -> Option<NodeId> {
        match self.as_element().map(|el| &el.kind) {
            Some(&ElementKind::ShadowRoot { host, .. }) => Some(host),
            _ => None,
        }
    }

    /// Whether this element is a slot.
    #[inline]
    pub fn is_slot(&self) -> bool {
        self.as_element()
            .is_some_and(|el| el.slot_name.is_some())
    }

    /// The slot name of this element, when it is a slot.
    pub fn slot_name(&self) -> Option<&str> {
        self.as_element().and_then(|el| el.slot_name.as_deref())
    }

    /// Target slot name this node carries as slot content. Empty for text
    /// nodes and elements without an explicit target.
    pub fn target_slot(&self) -> &str {
        self.as_element().map_or("", |el| el.slot.as_str())
    }

    pub fn inherits_slots(&self) -> bool {
        self.as_element().is_some_and(|el| el.inherit_slots)
    }

    /// Content nodes assigned to this slot, in composed order.
    pub fn slot_nodes(&self) -> &[NodeId] {
        self.as_element().map_or(&[], |el| &el.slot_nodes)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element().and_then(|el| {
            el.attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn attributes(&self) -> &[(String, String)] {
        self.as_element().map_or(&[], |el| &el.attributes)
    }
}
