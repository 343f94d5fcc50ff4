//! Shadow-mode backend protocol
//!
//! A shadow backend mirrors the logical tree directly: it receives one
//! structural call per logical edit (with the logical child index), plus
//! slot metadata so it can run its own composition. Fragments batch
//! contiguous runs.

use crate::BackendNode;

/// Capability set for shadow-tree-aware backends
pub trait ShadowBackend {
    fn create_element(&mut self, tag: &str) -> BackendNode;
    fn create_text_node(&mut self, content: &str) -> BackendNode;
    fn create_component(&mut self, tag: &str) -> BackendNode;
    fn create_virtual_node(&mut self, name: &str) -> BackendNode;
    /// Create the backend-side shadow root for a component node.
    fn create_shadow_root(&mut self, host: BackendNode) -> BackendNode;
    fn create_fragment(&mut self) -> BackendNode;

    fn append_child(&mut self, parent: BackendNode, child: BackendNode);
    fn insert_before(&mut self, parent: BackendNode, child: BackendNode, index: usize);
    fn remove_child(&mut self, parent: BackendNode, child: BackendNode, index: usize);
    fn replace_child(
        &mut self,
        parent: BackendNode,
        child: BackendNode,
        old_child: BackendNode,
        index: usize,
    );
    /// Remove `delete_count` children starting at `before`, then insert the
    /// fragment's children in their place.
    fn splice_before(
        &mut self,
        parent: BackendNode,
        before: BackendNode,
        delete_count: usize,
        fragment: BackendNode,
    );
    fn splice_append(&mut self, parent: BackendNode, fragment: BackendNode);
    fn splice_remove(&mut self, parent: BackendNode, before: BackendNode, delete_count: usize);

    /// Mark a node as a slot with the given name.
    fn set_slot_name(&mut self, node: BackendNode, name: &str);
    /// Set the `slot` attribute of a content node.
    fn set_slot(&mut self, node: BackendNode, name: &str, inherit: bool);
    /// Reassign the slot a content node composes under (`None` = no slot).
    fn set_containing_slot(&mut self, node: BackendNode, slot: Option<BackendNode>);
    fn splice_before_slot_nodes(
        &mut self,
        slot: BackendNode,
        before: usize,
        delete_count: usize,
        fragment: BackendNode,
    );
    fn splice_append_slot_nodes(&mut self, slot: BackendNode, fragment: BackendNode);
    fn splice_remove_slot_nodes(&mut self, slot: BackendNode, before: usize, delete_count: usize);

    fn set_text(&mut self, node: BackendNode, content: &str);
    fn set_attribute(&mut self, node: BackendNode, name: &str, value: &str);
    fn remove_attribute(&mut self, node: BackendNode, name: &str);
    fn release(&mut self, node: BackendNode);
}

/// A shadow backend that mints handles and does nothing else
///
/// Used for headless operation and lifecycle-only tests.
#[derive(Debug, Default)]
pub struct EmptyShadowBackend {
    next: u64,
}

impl EmptyShadowBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> BackendNode {
        self.next += 1;
        BackendNode(self.next)
    }
}

impl ShadowBackend for EmptyShadowBackend {
    fn create_element(&mut self, _tag: &str) -> BackendNode {
        self.mint()
    }
    fn create_text_node(&mut self, _content: &str) -> BackendNode {
        self.mint()
    }
    fn create_component(&mut self, _tag: &str) -> BackendNode {
        self.mint()
    }
    fn create_virtual_node(&mut self, _name: &str) -> BackendNode {
        self.mint()
    }
    fn create_shadow_root(&mut self, _host: BackendNode) -> BackendNode {
        self.mint()
    }
    fn create_fragment(&mut self) -> BackendNode {
        self.mint()
    }

    fn append_child(&mut self, _parent: BackendNode, _child: BackendNode) {}
    fn insert_before(&mut self, _parent: BackendNode, _child: BackendNode, _index: usize) {}
    fn remove_child(&mut self, _parent: BackendNode, _child: BackendNode, _index: usize) {}
    fn replace_child(
        &mut self,
        _parent: BackendNode,
        _child: BackendNode,
        _old_child: BackendNode,
        _index: usize,
    ) {
    }
    fn splice_before(
        &mut self,
        _parent: BackendNode,
        _before: BackendNode,
        _delete_count: usize,
        _fragment: BackendNode,
    ) {
    }
    fn splice_append(&mut self, _parent: BackendNode, _fragment: BackendNode) {}
    fn splice_remove(&mut self, _parent: BackendNode, _before: BackendNode, _delete_count: usize) {}

    fn set_slot_name(&mut self, _node: BackendNode, _name: &str) {}
    fn set_slot(&mut self, _node: BackendNode, _name: &str, _inherit: bool) {}
    fn set_containing_slot(&mut self, _node: BackendNode, _slot: Option<BackendNode>) {}
    fn splice_before_slot_nodes(
        &mut self,
        _slot: BackendNode,
        _before: usize,
        _delete_count: usize,
        _fragment: BackendNode,
    ) {
    }
    fn splice_append_slot_nodes(&mut self, _slot: BackendNode, _fragment: BackendNode) {}
    fn splice_remove_slot_nodes(&mut self, _slot: BackendNode, _before: usize, _delete_count: usize) {
    }

    fn set_text(&mut self, _node: BackendNode, _content: &str) {}
    fn set_attribute(&mut self, _node: BackendNode, _name: &str, _value: &str) {}
    fn remove_attribute(&mut self, _node: BackendNode, _name: &str) {}
    fn release(&mut self, _node: BackendNode) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_backend_mints_distinct_handles() {
        let mut b = EmptyShadowBackend::new();
        let a = b.create_element("div");
        let t = b.create_text_node("x");
        assert_ne!(a, t);
    }
}
