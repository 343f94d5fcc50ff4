//! Backend driver
//!
//! The tree talks to at most one backend, selected at construction. The
//! driver wraps the three capability sets behind one dispatch point and
//! centralizes the flat-tree branching shared by the composed and DOM-like
//! modes, so mutation code only ever asks for "shadow" or "flat" behavior.
//!
//! Backends are held behind `Rc<RefCell<..>>` so callers can keep their own
//! handle for inspection while the tree drives mutations.

use std::cell::RefCell;
use std::rc::Rc;

use lattice_backend::{
    BackendMode, BackendNode, ComposedBackend, DomlikeBackend, ShadowBackend,
};

/// The backend a tree is bound to
#[derive(Clone)]
pub enum BackendDriver {
    /// Headless; no backend calls are issued.
    None,
    Shadow(Rc<RefCell<dyn ShadowBackend>>),
    Composed(Rc<RefCell<dyn ComposedBackend>>),
    Domlike(Rc<RefCell<dyn DomlikeBackend>>),
}

impl std::fmt::Debug for BackendDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BackendDriver::None => "BackendDriver::None",
            BackendDriver::Shadow(_) => "BackendDriver::Shadow",
            BackendDriver::Composed(_) => "BackendDriver::Composed",
            BackendDriver::Domlike(_) => "BackendDriver::Domlike",
        })
    }
}

impl BackendDriver {
    pub fn shadow(backend: impl ShadowBackend + 'static) -> Self {
        BackendDriver::Shadow(Rc::new(RefCell::new(backend)))
    }

    pub fn composed(backend: impl ComposedBackend + 'static) -> Self {
        BackendDriver::Composed(Rc::new(RefCell::new(backend)))
    }

    pub fn domlike(backend: impl DomlikeBackend + 'static) -> Self {
        BackendDriver::Domlike(Rc::new(RefCell::new(backend)))
    }

    /// Bind to an already shared shadow backend. The caller keeps its clone
    /// of the `Rc` for inspection.
    pub fn shadow_shared(backend: Rc<RefCell<dyn ShadowBackend>>) -> Self {
        BackendDriver::Shadow(backend)
    }

    pub fn composed_shared(backend: Rc<RefCell<dyn ComposedBackend>>) -> Self {
        BackendDriver::Composed(backend)
    }

    pub fn domlike_shared(backend: Rc<RefCell<dyn DomlikeBackend>>) -> Self {
        BackendDriver::Domlike(backend)
    }

    pub fn mode(&self) -> Option<BackendMode> {
        match self {
            BackendDriver::None => None,
            BackendDriver::Shadow(_) => Some(BackendMode::Shadow),
            BackendDriver::Composed(_) => Some(BackendMode::Composed),
            BackendDriver::Domlike(_) => Some(BackendMode::Domlike),
        }
    }

    /// Whether the backend sees the flattened tree.
    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self, BackendDriver::Composed(_) | BackendDriver::Domlike(_))
    }

    /// Run `f` against the shadow backend, when bound to one.
    pub(crate) fn with_shadow<R>(
        &self,
        f: impl FnOnce(&mut dyn ShadowBackend) -> R,
    ) -> Option<R> {
        match self {
            BackendDriver::Shadow(b) => Some(f(&mut *b.borrow_mut())),
            _ => None,
        }
    }

    pub(crate) fn flat_create_element(&self, tag: &str) -> Option<BackendNode> {
        match self {
            BackendDriver::Composed(b) => Some(b.borrow_mut().create_element(tag)),
            BackendDriver::Domlike(b) => Some(b.borrow_mut().create_element(tag)),
            _ => None,
        }
    }

    pub(crate) fn flat_create_text(&self, content: &str) -> Option<BackendNode> {
        match self {
            BackendDriver::Composed(b) => Some(b.borrow_mut().create_text_node(content)),
            BackendDriver::Domlike(b) => Some(b.borrow_mut().create_text_node(content)),
            _ => None,
        }
    }

    pub(crate) fn flat_insert_before(
        &self,
        parent: BackendNode,
        child: BackendNode,
        before: Option<BackendNode>,
    ) {
        match self {
            BackendDriver::Composed(b) => {
                let mut b = b.borrow_mut();
                match before {
                    Some(anchor) => b.insert_before(parent, child, anchor),
                    None => b.append_child(parent, child),
                }
            }
            BackendDriver::Domlike(b) => {
                let mut b = b.borrow_mut();
                match before {
                    Some(anchor) => b.insert_before(parent, child, anchor),
                    None => b.append_child(parent, child),
                }
            }
            _ => {}
        }
    }

    pub(crate) fn flat_replace(
        &self,
        parent: BackendNode,
        child: BackendNode,
        old_child: BackendNode,
    ) {
        match self {
            BackendDriver::Composed(b) => b.borrow_mut().replace_child(parent, child, old_child),
            BackendDriver::Domlike(b) => b.borrow_mut().replace_child(parent, child, old_child),
            _ => {}
        }
    }

    /// Remove `delete_count` flat children starting at `before`, then insert
    /// `members` in their place. `before: None` appends at the end.
    ///
    /// Composed backends get a single splice driven by a transient fragment;
    /// DOM-like backends get an equivalent per-node call sequence driven by
    /// sibling walking.
    pub(crate) fn flat_splice(
        &self,
        parent: BackendNode,
        before: Option<BackendNode>,
        delete_count: usize,
        members: &[BackendNode],
    ) {
        match self {
            BackendDriver::Composed(b) => {
                let mut b = b.borrow_mut();
                if members.is_empty() {
                    if let Some(anchor) = before {
                        if delete_count > 0 {
                            b.splice_remove(parent, anchor, delete_count);
                        }
                    }
                    return;
                }
                let fragment = b.create_fragment();
                for m in members {
                    b.append_child(fragment, *m);
                }
                match before {
                    Some(anchor) => b.splice_before(parent, anchor, delete_count, fragment),
                    None => {
                        debug_assert_eq!(delete_count, 0);
                        b.splice_append(parent, fragment);
                    }
                }
                b.release(fragment);
            }
            BackendDriver::Domlike(b) => {
                let mut b = b.borrow_mut();
                let mut anchor = before;
                for _ in 0..delete_count {
                    let Some(cur) = anchor else { break };
                    anchor = b.next_sibling(cur);
                    b.remove_child(parent, cur);
                }
                for m in members {
                    match anchor {
                        Some(a) => b.insert_before(parent, *m, a),
                        None => b.append_child(parent, *m),
                    }
                }
            }
            _ => {}
        }
    }

    pub(crate) fn set_text(&self, node: BackendNode, content: &str) {
        match self {
            BackendDriver::None => {}
            BackendDriver::Shadow(b) => b.borrow_mut().set_text(node, content),
            BackendDriver::Composed(b) => b.borrow_mut().set_text(node, content),
            BackendDriver::Domlike(b) => b.borrow_mut().set_text(node, content),
        }
    }

    pub(crate) fn set_attribute(&self, node: BackendNode, name: &str, value: &str) {
        match self {
            BackendDriver::None => {}
            BackendDriver::Shadow(b) => b.borrow_mut().set_attribute(node, name, value),
            BackendDriver::Composed(b) => b.borrow_mut().set_attribute(node, name, value),
            BackendDriver::Domlike(b) => b.borrow_mut().set_attribute(node, name, value),
        }
    }

    pub(crate) fn remove_attribute(&self, node: BackendNode, name: &str) {
        match self {
            BackendDriver::None => {}
            BackendDriver::Shadow(b) => b.borrow_mut().remove_attribute(node, name),
            BackendDriver::Composed(b) => b.borrow_mut().remove_attribute(node, name),
            BackendDriver::Domlike(b) => b.borrow_mut().remove_attribute(node, name),
        }
    }

    /// Release a backend handle. DOM-like backends have no release call.
    pub(crate) fn release(&self, node: BackendNode) {
        match self {
            BackendDriver::Shadow(b) => b.borrow_mut().release(node),
            BackendDriver::Composed(b) => b.borrow_mut().release(node),
            _ => {}
        }
    }
}
