//! Node arena and leaf-level mutation
//!
//! [`Tree`] owns every node of a document, the slot chain arena, the
//! backend driver and the observation sinks. Structural edits live in
//! [`ops`](crate::ops); this module covers node creation, attribute and
//! text updates, observer installation and backend handle lifetime.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::chain::ChainArena;
use crate::driver::BackendDriver;
use crate::node::{ElementData, ElementKind, Node, NodeContent};
use crate::observer::{
    LifecycleSink, MutationRecord, MutationSink, ObserverState,
};
use crate::slot::{SlotMode, SlotRegistry};
use crate::value::DeepCopyStrategy;
use crate::NodeId;

/// Construction options for a component node
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentOptions {
    pub slot_mode: SlotMode,
    pub copy_strategy: DeepCopyStrategy,
}

/// Observer flags requested for a node
#[derive(Debug, Clone, Copy, Default)]
pub struct ObserverOptions {
    pub child_list: bool,
    pub attach_status: bool,
    pub attributes: bool,
    pub character_data: bool,
    /// Also observe all descendants.
    pub subtree: bool,
}

/// A document: node arena plus backend binding
///
/// Node ids stay valid for the life of the tree; logical nodes are
/// never reclaimed, only their backend handles are released.
pub struct Tree {
    entries: Vec<Node>,
    pub(crate) chains: ChainArena,
    pub(crate) driver: BackendDriver,
    pub(crate) lifecycle: Option<Rc<RefCell<dyn LifecycleSink>>>,
    pub(crate) mutations: Option<Rc<RefCell<dyn MutationSink>>>,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.entries.len())
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl Tree {
    pub fn new(driver: BackendDriver) -> Self {
        Tree {
            entries: Vec::new(),
            chains: ChainArena::new(),
            driver,
            lifecycle: None,
            mutations: None,
        }
    }

    /// A headless tree that issues no backend calls.
    pub fn headless() -> Self {
        Tree::new(BackendDriver::None)
    }

    pub fn set_lifecycle_sink(&mut self, sink: Rc<RefCell<dyn LifecycleSink>>) {
        self.lifecycle = Some(sink);
    }

    pub fn set_mutation_sink(&mut self, sink: Rc<RefCell<dyn MutationSink>>) {
        self.mutations = Some(sink);
    }

    pub fn backend_mode(&self) -> Option<lattice_backend::BackendMode> {
        self.driver.mode()
    }

    fn insert_entry(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.entries.get(id.0 as usize)
    }

    /// Internal accessor; ids handed out by this tree are always valid.
    #[inline]
    pub(crate) fn n(&self, id: NodeId) -> &Node {
        &self.entries[id.0 as usize]
    }

    #[inline]
    pub(crate) fn n_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.entries[id.0 as usize]
    }

    // ---- factories ----

    pub fn create_text_node(&mut self, content: &str) -> NodeId {
        let backend = self
            .driver
            .with_shadow(|b| b.create_text_node(content))
            .or_else(|| self.driver.flat_create_text(content));
        self.insert_entry(Node::new(NodeContent::Text(content.to_string()), backend))
    }

    pub fn create_native_node(&mut self, tag: &str) -> NodeId {
        let backend = self
            .driver
            .with_shadow(|b| b.create_element(tag))
            .or_else(|| self.driver.flat_create_element(tag));
        let el = ElementData::new(tag.to_string(), ElementKind::Native);
        self.insert_entry(Node::new(NodeContent::Element(el), backend))
    }

    /// Create a structure-only node. Flat backends never see it.
    pub fn create_virtual_node(&mut self, name: &str) -> NodeId {
        let backend = self.driver.with_shadow(|b| b.create_virtual_node(name));
        let el = ElementData::new(name.to_string(), ElementKind::Virtual);
        self.insert_entry(Node::new(NodeContent::Element(el), backend))
    }

    /// Create a component and its shadow root.
    ///
    /// The returned id is the component node; its shadow root is reachable
    /// through [`Node::shadow_root`](crate::node::Node::shadow_root).
    pub fn create_component(&mut self, tag: &str, options: ComponentOptions) -> NodeId {
        let host_backend = self
            .driver
            .with_shadow(|b| b.create_component(tag))
            .or_else(|| self.driver.flat_create_element(tag));
        let host_el = ElementData::new(tag.to_string(), ElementKind::Component {
            // patched below once the shadow root exists
            shadow_root: NodeId(u32::MAX),
        });
        let host = self.insert_entry(Node::new(NodeContent::Element(host_el), host_backend));

        let root_backend = host_backend
            .and_then(|hb| self.driver.with_shadow(|b| b.create_shadow_root(hb)));
        let registry = SlotRegistry::new(options.slot_mode, options.copy_strategy);
        let root_el = ElementData::new(
            "shadow-root".to_string(),
            ElementKind::ShadowRoot { host, registry },
        );
        let root = self.insert_entry(Node::new(NodeContent::Element(root_el), root_backend));

        if let ElementKind::Component { shadow_root } = &mut self.n_mut(host).el_mut().kind {
            *shadow_root = root;
        }
        trace!(tag, ?host, ?root, "created component");
        host
    }

    // ---- observation ----

    /// Install or replace the observer flags of a node, propagating subtree
    /// listener counts through its descendants.
    pub fn set_observer(&mut self, id: NodeId, options: ObserverOptions) {
        let old_subtree = {
            let state = &mut self.n_mut(id).observer;
            let old = state.subtree;
            state.child_list = options.child_list;
            state.attach_status = options.attach_status;
            state.attributes = options.attributes;
            state.character_data = options.character_data;
            state.subtree = options.subtree;
            old
        };
        if old_subtree != options.subtree {
            let delta: i64 = if options.subtree { 1 } else { -1 };
            self.add_subtree_weight(id, delta);
        }
    }

    /// Add `delta` to the subtree listener count of `root` and all its
    /// descendants (crossing shadow boundaries via component shadow roots).
    pub(crate) fn add_subtree_weight(&mut self, root: NodeId, delta: i64) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.n_mut(id);
            node.observer.subtree_count =
                (node.observer.subtree_count as i64 + delta) as u32;
            if let Some(sr) = self.n(id).shadow_root() {
                stack.push(sr);
            }
            stack.extend_from_slice(self.n(id).children());
        }
    }

    pub(crate) fn emit_record(&self, record: MutationRecord) {
        if let Some(sink) = &self.mutations {
            sink.borrow_mut().record(record);
        }
    }

    pub(crate) fn observer(&self, id: NodeId) -> &ObserverState {
        &self.n(id).observer
    }

    // ---- leaf mutations ----

    pub fn set_text(&mut self, id: NodeId, content: &str) {
        let node = self.n_mut(id);
        let NodeContent::Text(stored) = &mut node.content else {
            return;
        };
        *stored = content.to_string();
        let backend = node.backend;
        if let Some(be) = backend {
            self.driver.set_text(be, content);
        }
        if self.observer(id).wants_character_data() {
            self.emit_record(MutationRecord::CharacterData {
                target: id,
                content: content.to_string(),
            });
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.n_mut(id).as_element_mut() else {
            return;
        };
        if let Some(pair) = el.attributes.iter_mut().find(|(n, _)| n == name) {
            pair.1 = value.to_string();
        } else {
            el.attributes.push((name.to_string(), value.to_string()));
        }
        if let Some(be) = self.n(id).backend {
            self.driver.set_attribute(be, name, value);
        }
        if self.observer(id).wants_attributes() {
            self.emit_record(MutationRecord::Attribute {
                target: id,
                name: name.to_string(),
                value: Some(value.to_string()),
            });
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let Some(el) = self.n_mut(id).as_element_mut() else {
            return;
        };
        let before = el.attributes.len();
        el.attributes.retain(|(n, _)| n != name);
        if el.attributes.len() == before {
            return;
        }
        if let Some(be) = self.n(id).backend {
            self.driver.remove_attribute(be, name);
        }
        if self.observer(id).wants_attributes() {
            self.emit_record(MutationRecord::Attribute {
                target: id,
                name: name.to_string(),
                value: None,
            });
        }
    }

    /// Release the backend handle of a node. Safe to call at most once; the
    /// node stays usable in the logical tree afterwards.
    pub fn destroy_backend_element(&mut self, id: NodeId) {
        let node = self.n_mut(id);
        if node.backend_destroyed {
            return;
        }
        node.backend_destroyed = true;
        if let Some(be) = node.backend {
            self.driver.release(be);
        }
    }

    /// Arrange for the backend handle to be released when the node is next
    /// detached (or immediately, if already detached).
    pub fn destroy_backend_element_on_detach(&mut self, id: NodeId) {
        if self.n(id).attached {
            self.n_mut(id).destroy_backend_on_detach = true;
        } else {
            self.destroy_backend_element(id);
        }
    }

    pub(crate) fn run_detach_destroy(&mut self, id: NodeId) {
        if self.n(id).destroy_backend_on_detach {
            self.n_mut(id).destroy_backend_on_detach = false;
            self.destroy_backend_element(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::CollectingSink;

    #[test]
    fn test_component_links_shadow_root_and_host() {
        let mut tree = Tree::headless();
        let comp = tree.create_component("x-item", ComponentOptions::default());
        let root = tree.n(comp).shadow_root().unwrap();
        assert_eq!(tree.n(root).host(), Some(comp));
        assert!(tree.n(root).is_shadow_root());
    }

    #[test]
    fn test_attribute_records_respect_flags() {
        let mut tree = Tree::headless();
        let sink = Rc::new(RefCell::new(CollectingSink::default()));
        tree.set_mutation_sink(sink.clone());
        let el = tree.create_native_node("div");

        tree.set_attribute(el, "id", "a");
        assert!(sink.borrow().records.is_empty());

        tree.set_observer(el, ObserverOptions {
            attributes: true,
            ..ObserverOptions::default()
        });
        tree.set_attribute(el, "id", "b");
        assert_eq!(sink.borrow().records.len(), 1);
        assert_eq!(tree.n(el).attribute("id"), Some("b"));
    }

    #[test]
    fn test_subtree_weight_crosses_shadow_boundary() {
        let mut tree = Tree::headless();
        let comp = tree.create_component("x-item", ComponentOptions::default());
        let root = tree.n(comp).shadow_root().unwrap();
        tree.set_observer(comp, ObserverOptions {
            child_list: true,
            subtree: true,
            ..ObserverOptions::default()
        });
        assert_eq!(tree.observer(root).subtree_count, 1);
        assert!(tree.observer(root).wants_child_list());
    }

    #[test]
    fn test_destroy_backend_element_is_idempotent() {
        let mut tree = Tree::headless();
        let el = tree.create_native_node("div");
        tree.destroy_backend_element(el);
        tree.destroy_backend_element(el);
    }
}
