//! DOM-like backend protocol
//!
//! The DOM-like capability set matches what a browser DOM offers: flat-tree
//! structural calls, no splice batching and no explicit handle release.
//! Removal is position-free, so the caller walks siblings via
//! [`next_sibling`](DomlikeBackend::next_sibling) when it needs ranges.

use crate::BackendNode;

/// Capability set for DOM-shaped backends
pub trait DomlikeBackend {
    fn create_element(&mut self, tag: &str) -> BackendNode;
    fn create_text_node(&mut self, content: &str) -> BackendNode;
    fn create_fragment(&mut self) -> BackendNode;

    fn append_child(&mut self, parent: BackendNode, child: BackendNode);
    fn insert_before(&mut self, parent: BackendNode, child: BackendNode, before: BackendNode);
    fn replace_child(&mut self, parent: BackendNode, child: BackendNode, old_child: BackendNode);
    fn remove_child(&mut self, parent: BackendNode, child: BackendNode);

    fn next_sibling(&self, node: BackendNode) -> Option<BackendNode>;

    fn set_text(&mut self, node: BackendNode, content: &str);
    fn set_attribute(&mut self, node: BackendNode, name: &str, value: &str);
    fn remove_attribute(&mut self, node: BackendNode, name: &str);
}

/// A DOM-like backend that mints handles and does nothing else
///
/// Used for headless operation and lifecycle-only tests.
#[derive(Debug, Default)]
pub struct EmptyDomlikeBackend {
    next: u64,
}

impl EmptyDomlikeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> BackendNode {
        self.next += 1;
        BackendNode(self.next)
    }
}

impl DomlikeBackend for EmptyDomlikeBackend {
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

    fn next_sibling(&self, _node: BackendNode) -> Option<BackendNode> {
        None
    }

    fn set_text(&mut self, _node: BackendNode, _content: &str) {}
    fn set_attribute(&mut self, _node: BackendNode, _name: &str, _value: &str) {}
    fn remove_attribute(&mut self, _node: BackendNode, _name: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_backend_mints_distinct_handles() {
        let mut b = EmptyDomlikeBackend::new();
        let a = b.create_element("div");
        let t = b.create_text_node("x");
        assert_ne!(a, t);
    }
}
