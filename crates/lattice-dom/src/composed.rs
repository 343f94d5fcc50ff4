//! Composed tree projection
//!
//! Flat backends only see the composed tree: virtual nodes expand to their
//! composed children, slots expand to their assigned content, components
//! contribute a single element. The helpers here answer the two questions
//! every flat edit needs: which backend element is the flat parent, and
//! which backend node is the insertion anchor.

use lattice_backend::BackendNode;

use crate::node::ContainingSlot;
use crate::slot::SlotMode;
use crate::tree::Tree;
use crate::NodeId;

impl Tree {
    /// Parent of a node in composed terms. `None` means the node is not
    /// composed at all (slot-capable content matched by no slot).
    pub fn composed_parent(&self, id: NodeId) -> Option<NodeId> {
        let node = self.n(id);
        if let Some(host) = node.host() {
            return Some(host);
        }
        match node.containing_slot {
            ContainingSlot::Slot(s) => Some(s),
            ContainingSlot::None => None,
            ContainingSlot::Unassigned => node.parent,
        }
    }

    /// The flat element under which composed children of `e` land.
    pub(crate) fn flat_parent_for_children(&self, e: NodeId) -> Option<BackendNode> {
        let mut cur = e;
        loop {
            let node = self.n(cur);
            if !node.is_virtual() && !node.is_shadow_root() {
                return if node.backend_destroyed {
                    None
                } else {
                    node.backend
                };
            }
            cur = self.composed_parent(cur)?;
        }
    }

    /// Composed child list of an element.
    pub fn composed_children(&self, e: NodeId) -> Vec<NodeId> {
        let node = self.n(e);
        if node.is_slot() && self.slot_receives_content(e) {
            // Assigned content stands in for the slot. Slot-inheriting
            // wrappers appear in the assignment list but expand through
            // their individually assigned children.
            return node
                .slot_nodes()
                .iter()
                .copied()
                .filter(|n| !self.n(*n).inherits_slots())
                .collect();
        }
        if let Some(sr) = node.shadow_root() {
            return self.n(sr).children().to_vec();
        }
        node.children().to_vec()
    }

    /// Whether a slot element takes part in content assignment, as opposed
    /// to composing its own children (direct-mode and free-floating slots).
    pub(crate) fn slot_receives_content(&self, slot: NodeId) -> bool {
        match self.owner_shadow_root(slot) {
            Some(sr) => self.registry(sr).mode() != SlotMode::Direct,
            None => false,
        }
    }

    /// First backend node in the composed expansion of `n`.
    pub(crate) fn first_flat(&self, n: NodeId) -> Option<BackendNode> {
        let mut stack = vec![n];
        while let Some(id) = stack.pop() {
            let node = self.n(id);
            if !node.is_virtual() && !node.is_shadow_root() {
                if !node.backend_destroyed && node.backend.is_some() {
                    return node.backend;
                }
                continue;
            }
            let kids = self.composed_children(id);
            for k in kids.iter().rev() {
                stack.push(*k);
            }
        }
        None
    }

    /// Number of backend nodes in the composed expansion of `n`.
    pub(crate) fn count_flat(&self, n: NodeId) -> usize {
        self.collect_flat(n).len()
    }

    /// All backend nodes in the composed expansion of `n`, in order.
    pub(crate) fn collect_flat(&self, n: NodeId) -> Vec<BackendNode> {
        let mut out = Vec::new();
        let mut stack = vec![n];
        while let Some(id) = stack.pop() {
            let node = self.n(id);
            if !node.is_virtual() && !node.is_shadow_root() {
                if !node.backend_destroyed {
                    if let Some(be) = node.backend {
                        out.push(be);
                    }
                }
                continue;
            }
            let kids = self.composed_children(id);
            for k in kids.iter().rev() {
                stack.push(*k);
            }
        }
        out
    }

    /// First backend node that composes after `e`, climbing virtual
    /// containers until the flat parent is reached.
    pub(crate) fn flat_anchor_after(&self, e: NodeId) -> Option<BackendNode> {
        let mut cur = e;
        loop {
            let node = self.n(cur);
            if node.host().is_some() {
                // A shadow root spans the whole of its host element.
                return None;
            }
            let (container, list, idx) = match node.containing_slot {
                ContainingSlot::Slot(s) => {
                    (s, self.n(s).slot_nodes().to_vec(), node.slot_index)
                }
                ContainingSlot::None => return None,
                ContainingSlot::Unassigned => {
                    let Some(p) = node.parent else { return None };
                    (p, self.n(p).children().to_vec(), node.parent_index)
                }
            };
            for sib in &list[idx + 1..] {
                if let Some(be) = self.first_flat(*sib) {
                    return Some(be);
                }
            }
            let cnode = self.n(container);
            if !cnode.is_virtual() && !cnode.is_shadow_root() {
                return None;
            }
            cur = container;
        }
    }

    /// Anchor for inserting at logical position `pos` under `parent`.
    pub(crate) fn flat_anchor_from(&self, parent: NodeId, pos: usize) -> Option<BackendNode> {
        let children = self.n(parent).children();
        for sib in &children[pos.min(children.len())..] {
            if let Some(be) = self.first_flat(*sib) {
                return Some(be);
            }
        }
        let p = self.n(parent);
        if !p.is_virtual() && !p.is_shadow_root() {
            None
        } else {
            self.flat_anchor_after(parent)
        }
    }

    /// Anchor for inserting at assignment position `k` of a slot.
    pub(crate) fn slot_anchor_from(&self, slot: NodeId, k: usize) -> Option<BackendNode> {
        let nodes = self.n(slot).slot_nodes();
        for n in &nodes[k.min(nodes.len())..] {
            if let Some(be) = self.first_flat(*n) {
                return Some(be);
            }
        }
        self.flat_anchor_after(slot)
    }

    /// Translate one logical edit under `shadow_parent` into flat backend
    /// calls. `pos` is the logical index the edit targets, taken before the
    /// logical child list changes. `rel` is the node being removed or
    /// replaced; `removal` selects remove/replace over plain insertion.
    pub(crate) fn insert_child_composed(
        &mut self,
        shadow_parent: NodeId,
        new_child: Option<NodeId>,
        rel: Option<NodeId>,
        removal: bool,
        pos: usize,
    ) {
        if !self.driver.is_flat() {
            return;
        }
        // Slot-inheriting wrappers defer the slotting decision upward.
        let mut slot_parent = shadow_parent;
        while self.n(slot_parent).inherits_slots() {
            match self.n(slot_parent).parent {
                Some(p) => slot_parent = p,
                None => break,
            }
        }
        if self.n(slot_parent).is_component() {
            self.edit_content_composed(slot_parent, shadow_parent, pos, new_child, rel, removal);
            return;
        }
        let Some(flat_parent) = self.flat_parent_for_children(slot_parent) else {
            return;
        };
        match (removal, new_child, rel) {
            (true, Some(c), Some(r)) => {
                let members = self.collect_flat(c);
                let r_first = self.first_flat(r);
                let r_count = self.count_flat(r);
                if members.len() == 1 && r_count == 1 {
                    self.driver
                        .flat_replace(flat_parent, members[0], r_first.unwrap());
                } else {
                    let anchor =
                        r_first.or_else(|| self.flat_anchor_from(shadow_parent, pos + 1));
                    self.driver.flat_splice(flat_parent, anchor, r_count, &members);
                }
            }
            (true, None, Some(r)) => {
                let count = self.count_flat(r);
                if count > 0 {
                    let first = self.first_flat(r);
                    self.driver.flat_splice(flat_parent, first, count, &[]);
                }
            }
            (false, Some(c), _) => {
                let members = self.collect_flat(c);
                if members.is_empty() {
                    return;
                }
                let anchor = self.flat_anchor_from(shadow_parent, pos);
                if members.len() == 1 {
                    self.driver.flat_insert_before(flat_parent, members[0], anchor);
                } else {
                    self.driver.flat_splice(flat_parent, anchor, 0, &members);
                }
            }
            _ => {}
        }
    }

    /// Flat edit for host content: each affected node routes through slot
    /// assignment of the host's shadow tree. The edit runs before the
    /// logical child list changes, so assignment positions come from the
    /// node's future document path under `shadow_parent` at `pos`.
    fn edit_content_composed(
        &mut self,
        host: NodeId,
        shadow_parent: NodeId,
        pos: usize,
        new_child: Option<NodeId>,
        rel: Option<NodeId>,
        removal: bool,
    ) {
        if removal {
            if let Some(r) = rel {
                self.remove_content_composed(host, r);
                // Drop the old node's slot assignments now so anchor
                // resolution below never lands on a detached sibling.
                self.apply_content_removal(r);
            }
        }
        let Some(c) = new_child else { return };
        let sr = self.n(host).shadow_root().expect("component without shadow root");
        for unit in self.collect_content_units(c) {
            if self.n(unit).inherits_slots() {
                continue;
            }
            match self.resolve_containing_slot(sr, unit) {
                ContainingSlot::Slot(s) => {
                    let Some(flat_parent) = self.flat_parent_for_children(s) else {
                        continue;
                    };
                    let members = self.collect_flat(unit);
                    if members.is_empty() {
                        continue;
                    }
                    let path = self.future_unit_path(shadow_parent, pos, c, unit);
                    let k = self.slot_insert_position_by_path(s, &path);
                    let anchor = self.slot_anchor_from(s, k);
                    if members.len() == 1 {
                        self.driver.flat_insert_before(flat_parent, members[0], anchor);
                    } else {
                        self.driver.flat_splice(flat_parent, anchor, 0, &members);
                    }
                }
                ContainingSlot::Unassigned => {
                    // Direct mode: content composes under the host element,
                    // anchored on the sibling the logical edit lands before.
                    let node = self.n(host);
                    if node.backend_destroyed {
                        continue;
                    }
                    let Some(flat_parent) = node.backend else { continue };
                    let members = self.collect_flat(unit);
                    if members.is_empty() {
                        continue;
                    }
                    let after = if removal { pos + 1 } else { pos };
                    let anchor = self.flat_anchor_from(shadow_parent, after);
                    if members.len() == 1 {
                        self.driver.flat_insert_before(flat_parent, members[0], anchor);
                    } else {
                        self.driver.flat_splice(flat_parent, anchor, 0, &members);
                    }
                }
                ContainingSlot::None => {}
            }
        }
    }

    pub(crate) fn remove_content_composed(&mut self, host: NodeId, r: NodeId) {
        for unit in self.collect_content_units(r) {
            if self.n(unit).inherits_slots() {
                continue;
            }
            let flat_parent = match self.n(unit).containing_slot {
                ContainingSlot::Slot(s) => self.flat_parent_for_children(s),
                ContainingSlot::Unassigned => {
                    let node = self.n(host);
                    if node.backend_destroyed {
                        None
                    } else {
                        node.backend
                    }
                }
                ContainingSlot::None => None,
            };
            let Some(flat_parent) = flat_parent else { continue };
            let count = self.count_flat(unit);
            if count > 0 {
                let first = self.first_flat(unit);
                self.driver.flat_splice(flat_parent, first, count, &[]);
            }
        }
    }

    /// Document path a unit of a not-yet-linked subtree will have once its
    /// root lands at `pos` under `parent`.
    fn future_unit_path(
        &self,
        parent: NodeId,
        pos: usize,
        root: NodeId,
        unit: NodeId,
    ) -> Vec<usize> {
        let mut path = self.doc_path(parent);
        path.push(pos);
        let mut rel = Vec::new();
        let mut cur = unit;
        while cur != root {
            rel.push(self.n(cur).parent_index);
            cur = self.n(cur).parent.expect("unit outside its subtree");
        }
        rel.reverse();
        path.extend(rel);
        path
    }

    /// The nodes of a content subtree that take part in slot assignment:
    /// the root itself, and through slot-inheriting wrappers, their
    /// children recursively.
    pub(crate) fn collect_content_units(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if self.n(id).inherits_slots() {
                for ch in self.n(id).children().iter().rev() {
                    stack.push(*ch);
                }
            }
        }
        // stack order already yields document order for this shape
        out
    }

    /// Iterate the composed children of an element, depth-expanded the way
    /// a flat backend sees them (one entry per logical node contributing
    /// structure, components opaque).
    pub fn for_each_composed_child(&self, e: NodeId, mut f: impl FnMut(NodeId)) {
        for c in self.composed_children(e) {
            f(c);
        }
    }
}
