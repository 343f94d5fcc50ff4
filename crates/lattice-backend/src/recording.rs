//! In-memory recording backend for tests
//!
//! [`RecordingBackend`] keeps a real flat node store and a call log, so
//! tests can assert both the final composed tree and the exact mutation
//! sequence that produced it. It implements the composed and DOM-like
//! capability sets; a DOM-like caller simply never issues splices.

use std::collections::HashMap;

use crate::composed::ComposedBackend;
use crate::domlike::DomlikeBackend;
use crate::BackendNode;

/// One structural call as observed by the backend
///
/// Fragment arguments are expanded to their member handles at call time, so
/// assertions do not depend on fragment identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    AppendChild {
        parent: BackendNode,
        child: BackendNode,
    },
    InsertBefore {
        parent: BackendNode,
        child: BackendNode,
        before: BackendNode,
    },
    ReplaceChild {
        parent: BackendNode,
        child: BackendNode,
        old_child: BackendNode,
    },
    RemoveChild {
        parent: BackendNode,
        child: BackendNode,
    },
    SpliceBefore {
        parent: BackendNode,
        before: BackendNode,
        delete_count: usize,
        inserted: Vec<BackendNode>,
    },
    SpliceAppend {
        parent: BackendNode,
        inserted: Vec<BackendNode>,
    },
    SpliceRemove {
        parent: BackendNode,
        before: BackendNode,
        delete_count: usize,
    },
    Release {
        node: BackendNode,
    },
}

#[derive(Debug, Default)]
struct StoredNode {
    tag: Option<String>,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<BackendNode>,
    parent: Option<BackendNode>,
    fragment: bool,
    released: bool,
}

/// A composed/DOM-like backend backed by a real node store
#[derive(Debug, Default)]
pub struct RecordingBackend {
    nodes: HashMap<u64, StoredNode>,
    next: u64,
    calls: Vec<RecordedCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self, node: StoredNode) -> BackendNode {
        self.next += 1;
        self.nodes.insert(self.next, node);
        BackendNode(self.next)
    }

    fn node(&self, handle: BackendNode) -> &StoredNode {
        self.nodes.get(&handle.0).expect("unknown backend handle")
    }

    fn node_mut(&mut self, handle: BackendNode) -> &mut StoredNode {
        self.nodes
            .get_mut(&handle.0)
            .expect("unknown backend handle")
    }

    fn detach(&mut self, child: BackendNode) {
        if let Some(old_parent) = self.node(child).parent {
            let siblings = &mut self.node_mut(old_parent).children;
            if let Some(at) = siblings.iter().position(|c| *c == child) {
                siblings.remove(at);
            }
        }
        self.node_mut(child).parent = None;
    }

    fn attach_at(&mut self, parent: BackendNode, child: BackendNode, at: usize) {
        self.detach(child);
        self.node_mut(parent).children.insert(at, child);
        self.node_mut(child).parent = Some(parent);
    }

    fn drain_fragment(&mut self, fragment: BackendNode) -> Vec<BackendNode> {
        assert!(self.node(fragment).fragment, "expected a fragment handle");
        let members = std::mem::take(&mut self.node_mut(fragment).children);
        for m in &members {
            self.node_mut(*m).parent = None;
        }
        members
    }

    fn child_index(&self, parent: BackendNode, child: BackendNode) -> usize {
        self.node(parent)
            .children
            .iter()
            .position(|c| *c == child)
            .expect("child not under parent")
    }

    /// The recorded call log, in issue order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Current child handles of a node.
    pub fn children_of(&self, parent: BackendNode) -> Vec<BackendNode> {
        self.node(parent).children.clone()
    }

    pub fn parent_of(&self, child: BackendNode) -> Option<BackendNode> {
        self.node(child).parent
    }

    pub fn tag_of(&self, node: BackendNode) -> Option<&str> {
        self.node(node).tag.as_deref()
    }

    pub fn text_of(&self, node: BackendNode) -> Option<&str> {
        self.node(node).text.as_deref()
    }

    pub fn attribute_of(&self, node: BackendNode, name: &str) -> Option<&str> {
        self.node(node)
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_released(&self, node: BackendNode) -> bool {
        self.node(node).released
    }

    /// Render a subtree as a compact string, e.g. `<div><span>hi</span></div>`.
    pub fn dump(&self, root: BackendNode) -> String {
        let mut out = String::new();
        self.dump_into(root, &mut out);
        out
    }

    fn dump_into(&self, handle: BackendNode, out: &mut String) {
        let n = self.node(handle);
        if let Some(text) = &n.text {
            out.push_str(text);
            return;
        }
        let tag = n.tag.as_deref().unwrap_or("fragment");
        out.push('<');
        out.push_str(tag);
        for (name, value) in &n.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        out.push('>');
        for child in n.children.clone() {
            self.dump_into(child, out);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

impl ComposedBackend for RecordingBackend {
    fn create_element(&mut self, tag: &str) -> BackendNode {
        self.mint(StoredNode {
            tag: Some(tag.to_string()),
            ..StoredNode::default()
        })
    }

    fn create_text_node(&mut self, content: &str) -> BackendNode {
        self.mint(StoredNode {
            text: Some(content.to_string()),
            ..StoredNode::default()
        })
    }

    fn create_fragment(&mut self) -> BackendNode {
        self.mint(StoredNode {
            fragment: true,
            ..StoredNode::default()
        })
    }

    fn append_child(&mut self, parent: BackendNode, child: BackendNode) {
        self.calls.push(RecordedCall::AppendChild { parent, child });
        let at = self.node(parent).children.len();
        self.attach_at(parent, child, at);
    }

    fn insert_before(&mut self, parent: BackendNode, child: BackendNode, before: BackendNode) {
        self.calls.push(RecordedCall::InsertBefore {
            parent,
            child,
            before,
        });
        let at = self.child_index(parent, before);
        self.attach_at(parent, child, at);
    }

    fn replace_child(&mut self, parent: BackendNode, child: BackendNode, old_child: BackendNode) {
        self.calls.push(RecordedCall::ReplaceChild {
            parent,
            child,
            old_child,
        });
        let at = self.child_index(parent, old_child);
        self.detach(old_child);
        self.attach_at(parent, child, at);
    }

    fn remove_child(&mut self, parent: BackendNode, child: BackendNode) {
        self.calls.push(RecordedCall::RemoveChild { parent, child });
        debug_assert_eq!(self.node(child).parent, Some(parent));
        self.detach(child);
    }

    fn splice_before(
        &mut self,
        parent: BackendNode,
        before: BackendNode,
        delete_count: usize,
        fragment: BackendNode,
    ) {
        let inserted = self.drain_fragment(fragment);
        self.calls.push(RecordedCall::SpliceBefore {
            parent,
            before,
            delete_count,
            inserted: inserted.clone(),
        });
        let at = self.child_index(parent, before);
        for removed in self.node(parent).children[at..at + delete_count].to_vec() {
            self.detach(removed);
        }
        for (offset, child) in inserted.into_iter().enumerate() {
            self.attach_at(parent, child, at + offset);
        }
    }

    fn splice_append(&mut self, parent: BackendNode, fragment: BackendNode) {
        let inserted = self.drain_fragment(fragment);
        self.calls.push(RecordedCall::SpliceAppend {
            parent,
            inserted: inserted.clone(),
        });
        for child in inserted {
            let at = self.node(parent).children.len();
            self.attach_at(parent, child, at);
        }
    }

    fn splice_remove(&mut self, parent: BackendNode, before: BackendNode, delete_count: usize) {
        self.calls.push(RecordedCall::SpliceRemove {
            parent,
            before,
            delete_count,
        });
        let at = self.child_index(parent, before);
        for removed in self.node(parent).children[at..at + delete_count].to_vec() {
            self.detach(removed);
        }
    }

    fn set_text(&mut self, node: BackendNode, content: &str) {
        self.node_mut(node).text = Some(content.to_string());
    }

    fn set_attribute(&mut self, node: BackendNode, name: &str, value: &str) {
        let attrs = &mut self.node_mut(node).attributes;
        if let Some(slot) = attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_string();
        } else {
            attrs.push((name.to_string(), value.to_string()));
        }
    }

    fn remove_attribute(&mut self, node: BackendNode, name: &str) {
        self.node_mut(node).attributes.retain(|(n, _)| n != name);
    }

    fn release(&mut self, node: BackendNode) {
        self.calls.push(RecordedCall::Release { node });
        let stored = self.node_mut(node);
        assert!(!stored.released, "double release of a backend handle");
        stored.released = true;
    }
}

impl DomlikeBackend for RecordingBackend {
    fn create_element(&mut self, tag: &str) -> BackendNode {
        ComposedBackend::create_element(self, tag)
    }

    fn create_text_node(&mut self, content: &str) -> BackendNode {
        ComposedBackend::create_text_node(self, content)
    }

    fn create_fragment(&mut self) -> BackendNode {
        ComposedBackend::create_fragment(self)
    }

    fn append_child(&mut self, parent: BackendNode, child: BackendNode) {
        // DOM semantics move fragment children on insertion.
        if self.node(child).fragment {
            let members = self.drain_fragment(child);
            self.calls.push(RecordedCall::SpliceAppend {
                parent,
                inserted: members.clone(),
            });
            for m in members {
                let at = self.node(parent).children.len();
                self.attach_at(parent, m, at);
            }
        } else {
            ComposedBackend::append_child(self, parent, child);
        }
    }

    fn insert_before(&mut self, parent: BackendNode, child: BackendNode, before: BackendNode) {
        if self.node(child).fragment {
            let members = self.drain_fragment(child);
            self.calls.push(RecordedCall::SpliceBefore {
                parent,
                before,
                delete_count: 0,
                inserted: members.clone(),
            });
            let at = self.child_index(parent, before);
            for (offset, m) in members.into_iter().enumerate() {
                self.attach_at(parent, m, at + offset);
            }
        } else {
            ComposedBackend::insert_before(self, parent, child, before);
        }
    }

    fn replace_child(&mut self, parent: BackendNode, child: BackendNode, old_child: BackendNode) {
        ComposedBackend::replace_child(self, parent, child, old_child);
    }

    fn remove_child(&mut self, parent: BackendNode, child: BackendNode) {
        ComposedBackend::remove_child(self, parent, child);
    }

    fn next_sibling(&self, node: BackendNode) -> Option<BackendNode> {
        let parent = self.node(node).parent?;
        let siblings = &self.node(parent).children;
        let at = siblings.iter().position(|c| *c == node)?;
        siblings.get(at + 1).copied()
    }

    fn set_text(&mut self, node: BackendNode, content: &str) {
        ComposedBackend::set_text(self, node, content);
    }

    fn set_attribute(&mut self, node: BackendNode, name: &str, value: &str) {
        ComposedBackend::set_attribute(self, node, name, value);
    }

    fn remove_attribute(&mut self, node: BackendNode, name: &str) {
        ComposedBackend::remove_attribute(self, node, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_before_expands_fragment_in_log() {
        let mut b = RecordingBackend::new();
        let parent = ComposedBackend::create_element(&mut b, "div");
        let anchor = ComposedBackend::create_text_node(&mut b, "anchor");
        ComposedBackend::append_child(&mut b, parent, anchor);

        let frag = ComposedBackend::create_fragment(&mut b);
        let a = ComposedBackend::create_text_node(&mut b, "a");
        let c = ComposedBackend::create_text_node(&mut b, "b");
        ComposedBackend::append_child(&mut b, frag, a);
        ComposedBackend::append_child(&mut b, frag, c);
        b.clear_calls();

        b.splice_before(parent, anchor, 0, frag);
        assert_eq!(
            b.calls(),
            &[RecordedCall::SpliceBefore {
                parent,
                before: anchor,
                delete_count: 0,
                inserted: vec![a, c],
            }]
        );
        assert_eq!(b.children_of(parent), vec![a, c, anchor]);
        assert_eq!(b.dump(parent), "<div>abanchor</div>");
    }

    #[test]
    fn test_splice_remove_detaches_range() {
        let mut b = RecordingBackend::new();
        let parent = ComposedBackend::create_element(&mut b, "div");
        let kids: Vec<_> = (0..4)
            .map(|i| ComposedBackend::create_text_node(&mut b, &i.to_string()))
            .collect();
        for k in &kids {
            ComposedBackend::append_child(&mut b, parent, *k);
        }

        b.splice_remove(parent, kids[1], 2);
        assert_eq!(b.children_of(parent), vec![kids[0], kids[3]]);
        assert_eq!(b.parent_of(kids[1]), None);
    }

    #[test]
    fn test_domlike_next_sibling_walk() {
        let mut b = RecordingBackend::new();
        let parent = DomlikeBackend::create_element(&mut b, "div");
        let a = DomlikeBackend::create_text_node(&mut b, "a");
        let c = DomlikeBackend::create_text_node(&mut b, "c");
        DomlikeBackend::append_child(&mut b, parent, a);
        DomlikeBackend::append_child(&mut b, parent, c);
        assert_eq!(DomlikeBackend::next_sibling(&b, a), Some(c));
        assert_eq!(DomlikeBackend::next_sibling(&b, c), None);
    }
}
