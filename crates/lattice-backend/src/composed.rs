//! Composed-mode backend protocol
//!
//! A composed backend only ever sees the flattened tree: virtual nodes and
//! shadow boundaries never reach it. The runtime performs slot composition
//! itself and translates logical edits into flat-tree splices.

use crate::BackendNode;

/// Capability set for flat-tree backends
pub trait ComposedBackend {
    fn create_element(&mut self, tag: &str) -> BackendNode;
    fn create_text_node(&mut self, content: &str) -> BackendNode;
    fn create_fragment(&mut self) -> BackendNode;

    fn append_child(&mut self, parent: BackendNode, child: BackendNode);
    fn insert_before(&mut self, parent: BackendNode, child: BackendNode, before: BackendNode);
    fn replace_child(&mut self, parent: BackendNode, child: BackendNode, old_child: BackendNode);
    fn remove_child(&mut self, parent: BackendNode, child: BackendNode);
    /// Remove `delete_count` children starting at `before`, then insert the
    /// fragment's children in their place. The fragment is emptied.
    fn splice_before(
        &mut self,
        parent: BackendNode,
        before: BackendNode,
        delete_count: usize,
        fragment: BackendNode,
    );
    fn splice_append(&mut self, parent: BackendNode, fragment: BackendNode);
    fn splice_remove(&mut self, parent: BackendNode, before: BackendNode, delete_count: usize);

    fn set_text(&mut self, node: BackendNode, content: &str);
    fn set_attribute(&mut self, node: BackendNode, name: &str, value: &str);
    fn remove_attribute(&mut self, node: BackendNode, name: &str);
    fn release(&mut self, node: BackendNode);
}

/// A composed backend that mints handles and discards every mutation
#[derive(Debug, Default)]
pub struct EmptyComposedBackend {
    next: u64,
}

impl EmptyComposedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> BackendNode {
        self.next += 1;
        BackendNode(self.next)
    }
}

impl ComposedBackend for EmptyComposedBackend {
    fn create_element(&mut self, _tag: &str) -> BackendNode {
        self.mint()
    }
    fn create_text_node(&mut self, _content: &str) -> BackendNode {
        self.mint()
    }
    fn create_fragment(&mut self) -> BackendNode {
        self.mint()
    }

    fn append_child(&mut self, _parent: BackendNode, _child: BackendNode) {}
    fn insert_before(&mut self, _parent: BackendNode, _child: BackendNode, _before: BackendNode) {}
    fn replace_child(&mut self, _parent: BackendNode, _child: BackendNode, _old_child: BackendNode) {
    }
    fn remove_child(&mut self, _parent: BackendNode, _child: BackendNode) {}
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

    fn set_text(&mut self, _node: BackendNode, _content: &str) {}
    fn set_attribute(&mut self, _node: BackendNode, _name: &str, _value: &str) {}
    fn remove_attribute(&mut self, _node: BackendNode, _name: &str) {}
    fn release(&mut self, _node: BackendNode) {}
}
