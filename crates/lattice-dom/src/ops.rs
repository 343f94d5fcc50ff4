//! Structural tree operations
//!
//! Every edit follows the same shape: validate, detach the incoming node
//! from its old location (backend first, then bookkeeping), issue the
//! backend call for the new location, update the logical child list, and
//! finish with slot assignment, chain notifications, lifecycle events and
//! observer records. Errors are returned before anything is touched.

use tracing::debug;

use crate::error::{DomError, Result};
use crate::node::ContainingSlot;
use crate::observer::MutationRecord;
use crate::tree::Tree;
use crate::NodeId;

/// Batch insertions at or above this size go through one backend fragment.
const FRAGMENT_THRESHOLD: usize = 5;

impl Tree {
    // ---- public structural API ----

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.n(parent).children().len();
        self.single_op(parent, Some(child), None, false, len, false)
    }

    pub fn insert_child_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let len = self.n(parent).children().len();
        if index > len {
            return Err(DomError::IndexOutOfRange { index, len });
        }
        self.single_op(parent, Some(child), None, false, index, false)
    }

    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<()> {
        let idx = self.child_index_of(parent, before)?;
        self.single_op(parent, Some(child), None, false, idx, false)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let idx = self.child_index_of(parent, child)?;
        self.single_op(parent, None, Some(child), true, idx, false)
    }

    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<()> {
        let len = self.n(parent).children().len();
        if index >= len {
            return Err(DomError::IndexOutOfRange { index, len });
        }
        let child = self.n(parent).children()[index];
        self.single_op(parent, None, Some(child), true, index, false)
    }

    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<()> {
        let idx = self.child_index_of(parent, old_child)?;
        self.single_op(parent, Some(new_child), Some(old_child), true, idx, false)
    }

    pub fn replace_child_at(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        index: usize,
    ) -> Result<()> {
        let len = self.n(parent).children().len();
        if index >= len {
            return Err(DomError::IndexOutOfRange { index, len });
        }
        let old_child = self.n(parent).children()[index];
        self.single_op(parent, Some(new_child), Some(old_child), true, index, false)
    }

    fn child_index_of(&self, parent: NodeId, child: NodeId) -> Result<usize> {
        if self.n(parent).as_element().is_none() {
            return Err(DomError::NotAnElement { node: parent });
        }
        self.n(parent)
            .children()
            .iter()
            .position(|c| *c == child)
            .ok_or(DomError::NotAChild {
                parent,
                node: child,
            })
    }

    // ---- the single-edit engine ----

    fn single_op(
        &mut self,
        parent: NodeId,
        new_child: Option<NodeId>,
        rel: Option<NodeId>,
        removal: bool,
        mut pos: usize,
        suppress_backend: bool,
    ) -> Result<()> {
        if self.n(parent).as_element().is_none() {
            return Err(DomError::NotAnElement { node: parent });
        }
        if new_child.is_none() && !removal {
            return Ok(());
        }
        if new_child.is_some() && new_child == rel {
            return Ok(());
        }
        if let Some(c) = new_child {
            let mut a = Some(parent);
            while let Some(id) = a {
                if id == c {
                    return Err(DomError::AncestorInsertion { parent, child: c });
                }
                a = self.n(id).parent;
            }
            if self.n(c).parent.is_some()
                && self.owner_shadow_root(c) != self.owner_shadow_root(parent)
            {
                return Err(DomError::CrossShadowTree { parent, node: c });
            }
        }
        debug!(?parent, ?new_child, ?rel, removal, pos, "structural edit");

        let c_was_attached = new_child.is_some_and(|c| self.n(c).attached);
        let mut c_chain_removed: Option<(Vec<NodeId>, Option<NodeId>)> = None;

        // detach the incoming node from its old location
        if let Some(c) = new_child {
            if let Some(old_parent) = self.n(c).parent {
                let old_pos = self.n(c).parent_index;
                if !suppress_backend {
                    let opbe = self.backend_of(old_parent);
                    let cbe = self.backend_of(c);
                    if let (Some(opbe), Some(cbe)) = (opbe, cbe) {
                        self.driver
                            .with_shadow(|b| b.remove_child(opbe, cbe, old_pos));
                    }
                    self.insert_child_composed(old_parent, None, Some(c), true, old_pos);
                }
                if self.content_host_of(c).is_some() {
                    self.apply_content_removal(c);
                }
                c_chain_removed = self.chain_detach(c);
                self.unlink_child(old_parent, old_pos);
                self.n_mut(c).parent = None;
                let w = self.observer(old_parent).subtree_count;
                if w > 0 {
                    self.add_subtree_weight(c, -(i64::from(w)));
                }
                if self.observer(old_parent).wants_child_list() {
                    self.emit_record(MutationRecord::ChildList {
                        target: old_parent,
                        added: Vec::new(),
                        removed: vec![c],
                    });
                }
                if old_parent == parent && old_pos < pos {
                    pos -= 1;
                }
            }
        }

        // backend call for the new location, before the logical update
        if !suppress_backend {
            let pbe = self.backend_of(parent);
            match (removal, new_child, rel) {
                (true, Some(c), Some(r)) => {
                    if let (Some(pbe), Some(cbe), Some(rbe)) =
                        (pbe, self.backend_of(c), self.backend_of(r))
                    {
                        self.driver
                            .with_shadow(|b| b.replace_child(pbe, cbe, rbe, pos));
                    }
                    self.insert_child_composed(parent, Some(c), Some(r), true, pos);
                }
                (true, None, Some(r)) => {
                    if let (Some(pbe), Some(rbe)) = (pbe, self.backend_of(r)) {
                        self.driver.with_shadow(|b| b.remove_child(pbe, rbe, pos));
                    }
                    self.insert_child_composed(parent, None, Some(r), true, pos);
                }
                (false, Some(c), _) => {
                    let len = self.n(parent).children().len();
                    if let (Some(pbe), Some(cbe)) = (pbe, self.backend_of(c)) {
                        self.driver.with_shadow(|b| {
                            if pos == len {
                                b.append_child(pbe, cbe);
                            } else {
                                b.insert_before(pbe, cbe, pos);
                            }
                        });
                    }
                    self.insert_child_composed(parent, Some(c), None, false, pos);
                }
                _ => {}
            }
        }

        // bookkeeping for the node leaving the tree
        let mut rel_chain_removed: Option<(Vec<NodeId>, Option<NodeId>)> = None;
        if removal {
            if let Some(r) = rel {
                if self.content_host_of(r).is_some() {
                    self.apply_content_removal(r);
                }
                rel_chain_removed = self.chain_detach(r);
                let w = self.observer(parent).subtree_count;
                if w > 0 {
                    self.add_subtree_weight(r, -(i64::from(w)));
                }
            }
        }

        // logical child list update
        match (removal, new_child) {
            (true, Some(c)) => {
                let el = self.n_mut(parent).el_mut();
                el.children[pos] = c;
            }
            (true, None) => {
                self.unlink_child(parent, pos);
            }
            (false, Some(c)) => {
                let el = self.n_mut(parent).el_mut();
                el.children.insert(pos, c);
                let following = el.children[pos..].to_vec();
                for (i, id) in following.iter().enumerate() {
                    self.n_mut(*id).parent_index = pos + i;
                }
            }
            _ => {}
        }
        if let Some(c) = new_child {
            self.n_mut(c).parent = Some(parent);
            self.n_mut(c).parent_index = pos;
        }
        if removal {
            if let Some(r) = rel {
                self.n_mut(r).parent = None;
                self.n_mut(r).parent_index = 0;
            }
        }

        // slot assignment and chain attachment for the incoming node
        let mut new_sr = None;
        if let Some(c) = new_child {
            let w = self.observer(parent).subtree_count;
            if w > 0 {
                self.add_subtree_weight(c, i64::from(w));
            }
            if let Some((_, sr)) = self.content_host_of(c) {
                self.apply_content_insertion(sr, c);
            }
            new_sr = self.chain_attach(c);
        }

        // slot registry notifications: removals first, then insertions
        if let Some((values, Some(old_sr))) = rel_chain_removed {
            self.apply_slots_removal(old_sr, values, false);
        }
        let old_sr_opt = c_chain_removed.as_ref().and_then(|(_, o)| *o);
        let moved_slots = old_sr_opt.is_some() && old_sr_opt == new_sr;
        if let Some((values, Some(old_sr))) = c_chain_removed {
            self.apply_slots_removal(old_sr, values, moved_slots);
        }
        if let Some(nsr) = new_sr {
            if let Some(c) = new_child {
                let seg = self
                    .n(c)
                    .as_element()
                    .and_then(|el| Some((el.subtree_slot_start?, el.subtree_slot_end?)));
                if let Some((s, e)) = seg {
                    let values = self.chains.segment_values(s, e);
                    self.apply_slots_insertion(nsr, values, moved_slots);
                }
            }
        }

        // lifecycle events
        let parent_attached = self.n(parent).attached;
        if let Some(c) = new_child {
            match (c_was_attached, parent_attached) {
                (true, true) => self.notify_moved(c),
                (false, true) => self.walk_attach(c),
                (true, false) => self.walk_detach(c),
                (false, false) => {}
            }
        }
        if removal {
            if let Some(r) = rel {
                if self.n(r).attached {
                    self.walk_detach(r);
                }
            }
        }

        if self.observer(parent).wants_child_list() {
            self.emit_record(MutationRecord::ChildList {
                target: parent,
                added: new_child.into_iter().collect(),
                removed: if removal { rel.into_iter().collect() } else { Vec::new() },
            });
        }
        Ok(())
    }

    fn unlink_child(&mut self, parent: NodeId, pos: usize) {
        let following = {
            let el = self.n_mut(parent).el_mut();
            el.children.remove(pos);
            el.children[pos..].to_vec()
        };
        for (i, id) in following.iter().enumerate() {
            self.n_mut(*id).parent_index = pos + i;
        }
    }

    fn backend_of(&self, id: NodeId) -> Option<lattice_backend::BackendNode> {
        let node = self.n(id);
        if node.backend_destroyed {
            None
        } else {
            node.backend
        }
    }

    // ---- batch operations ----

    /// Insert several parentless nodes at one position. Large batches reach
    /// the backend as a single splice, fragment-backed in Shadow mode.
    pub fn insert_children(
        &mut self,
        parent: NodeId,
        children: &[NodeId],
        index: usize,
    ) -> Result<()> {
        if self.n(parent).as_element().is_none() {
            return Err(DomError::NotAnElement { node: parent });
        }
        let len = self.n(parent).children().len();
        if index > len {
            return Err(DomError::IndexOutOfRange { index, len });
        }
        for &c in children {
            if self.n(c).parent.is_some() {
                return Err(DomError::AlreadyParented { node: c });
            }
        }
        if children.is_empty() {
            return Ok(());
        }
        debug!(?parent, count = children.len(), index, "batch insert");

        let mut backend_done = false;
        if children.len() >= FRAGMENT_THRESHOLD {
            let pbe = self.backend_of(parent);
            let anchor = (index < len).then(|| self.n(parent).children()[index]);
            let anchor_be = anchor.and_then(|a| self.backend_of(a));
            let child_handles: Vec<_> =
                children.iter().filter_map(|&c| self.backend_of(c)).collect();
            if let Some(pbe) = pbe {
                let done = self.driver.with_shadow(|b| {
                    let frag = b.create_fragment();
                    for &cbe in &child_handles {
                        b.append_child(frag, cbe);
                    }
                    match anchor_be {
                        Some(abe) => b.splice_before(pbe, abe, 0, frag),
                        None => b.splice_append(pbe, frag),
                    }
                    b.release(frag);
                });
                backend_done = done.is_some();
            }
        }
        if !backend_done && children.len() >= FRAGMENT_THRESHOLD && self.driver.is_flat() {
            // Outside host content, the whole batch lands under one flat
            // parent and can go out as a single splice.
            let mut slot_parent = parent;
            while self.n(slot_parent).inherits_slots() {
                match self.n(slot_parent).parent {
                    Some(p) => slot_parent = p,
                    None => break,
                }
            }
            if !self.n(slot_parent).is_component() {
                if let Some(fp) = self.flat_parent_for_children(slot_parent) {
                    let members: Vec<_> = children
                        .iter()
                        .flat_map(|&c| self.collect_flat(c))
                        .collect();
                    if !members.is_empty() {
                        let anchor = self.flat_anchor_from(parent, index);
                        self.driver.flat_splice(fp, anchor, 0, &members);
                    }
                }
                backend_done = true;
            }
        }
        for (i, &c) in children.iter().enumerate() {
            self.single_op(parent, Some(c), None, false, index + i, backend_done)?;
        }
        Ok(())
    }

    /// Remove `count` children starting at `start`. Backends that support
    /// splices see one range removal.
    pub fn remove_children(&mut self, parent: NodeId, start: usize, count: usize) -> Result<()> {
        if self.n(parent).as_element().is_none() {
            return Err(DomError::NotAnElement { node: parent });
        }
        let len = self.n(parent).children().len();
        if start + count > len {
            return Err(DomError::IndexOutOfRange {
                index: start + count,
                len,
            });
        }
        if count == 0 {
            return Ok(());
        }
        debug!(?parent, start, count, "batch remove");
        let removed: Vec<NodeId> = self.n(parent).children()[start..start + count].to_vec();

        let mut backend_done = false;
        if let Some(pbe) = self.backend_of(parent) {
            if let Some(first_be) = self.backend_of(removed[0]) {
                let done = self
                    .driver
                    .with_shadow(|b| b.splice_remove(pbe, first_be, count));
                backend_done = done.is_some();
            }
        }
        if !backend_done && self.driver.is_flat() {
            // Outside host content, the range is contiguous under one flat
            // parent and can go out as a single splice.
            let mut slot_parent = parent;
            while self.n(slot_parent).inherits_slots() {
                match self.n(slot_parent).parent {
                    Some(p) => slot_parent = p,
                    None => break,
                }
            }
            if !self.n(slot_parent).is_component() {
                if let Some(fp) = self.flat_parent_for_children(slot_parent) {
                    let total: usize = removed.iter().map(|&r| self.count_flat(r)).sum();
                    if total > 0 {
                        let first = removed.iter().find_map(|&r| self.first_flat(r));
                        self.driver.flat_splice(fp, first, total, &[]);
                    }
                }
                backend_done = true;
            }
        }
        for i in (0..count).rev() {
            self.single_op(parent, None, Some(removed[i]), true, start + i, backend_done)?;
        }
        Ok(())
    }

    // ---- in-place replacement ----

    /// Replace a node with another in place: the replacer takes over the
    /// node's position and adopts its children. Used to swap structural
    /// placeholders for their final nodes.
    pub fn self_replace_with(&mut self, old: NodeId, replacer: NodeId) -> Result<()> {
        if self.n(old).is_text_node() {
            return Err(DomError::ReplaceOnText { node: old });
        }
        if self.n(replacer).is_text_node() {
            return Err(DomError::ReplaceOnText { node: replacer });
        }
        if self.n(old).is_slot() {
            return Err(DomError::ReplaceOnSlot { node: old });
        }
        if self.n(replacer).is_slot() {
            return Err(DomError::ReplaceOnSlot { node: replacer });
        }
        if self.n(replacer).parent.is_some() {
            return Err(DomError::ReplacerParented { node: replacer });
        }
        debug!(?old, ?replacer, "in-place replace");

        let children: Vec<NodeId> = self.n(old).children().to_vec();
        let parent = self.n(old).parent;
        let pos = self.n(old).parent_index;
        let old_attached = self.n(old).attached;
        let base = self.n(replacer).children().len();

        // shadow backend: move the children in one fragment, then swap
        if let (Some(obe), Some(rbe)) = (self.backend_of(old), self.backend_of(replacer)) {
            let child_handles: Vec<_> =
                children.iter().filter_map(|&c| self.backend_of(c)).collect();
            let pbe = parent.and_then(|p| self.backend_of(p));
            self.driver.with_shadow(|b| {
                if let Some(&first) = child_handles.first() {
                    b.splice_remove(obe, first, children.len());
                    let frag = b.create_fragment();
                    for &cbe in &child_handles {
                        b.append_child(frag, cbe);
                    }
                    b.splice_append(rbe, frag);
                    b.release(frag);
                }
                if let Some(pbe) = pbe {
                    b.replace_child(pbe, rbe, obe, pos);
                }
            });
        }

        // flat backend: pull the children out of the old node's context
        if self.driver.is_flat() {
            for i in (0..children.len()).rev() {
                self.insert_child_composed(old, None, Some(children[i]), true, i);
            }
            if let Some(p) = parent {
                self.insert_child_composed(p, Some(replacer), Some(old), true, pos);
            }
        }

        // content assignment leaves the old node's shadow tree
        if self.n(old).is_component() {
            for &ch in &children {
                self.apply_content_removal(ch);
            }
        }

        // the old node's slot segment transfers to the replacer, with the
        // replacer's own slots spliced in front of it
        let old_seg = self
            .n(old)
            .as_element()
            .and_then(|el| Some((el.subtree_slot_start?, el.subtree_slot_end?)));
        let rep_seg = self
            .n(replacer)
            .as_element()
            .and_then(|el| Some((el.subtree_slot_start?, el.subtree_slot_end?)));
        let rep_slot_values: Vec<NodeId> = rep_seg
            .map(|(s, e)| self.chains.segment_values(s, e))
            .unwrap_or_default();
        let chain_prev_next = match (old_seg, rep_seg) {
            (Some((os, _)), Some((rs, re))) => {
                let prev = self.chains.prev(os);
                self.chains.splice_in(rs, re, prev, Some(os));
                Some((prev, Some(os)))
            }
            (None, Some((rs, re))) => {
                let prev = self.chain_find_prev(parent, pos);
                let next = match prev {
                    Some(p) => self.chains.next(p),
                    None => parent.map(|_| {
                        let top = self.tree_top(old);
                        self.subtree_slot_start(top)
                    }).flatten(),
                };
                self.chains.splice_in(rs, re, prev, next);
                Some((prev, next))
            }
            _ => None,
        };

        // flat backend: compose the adopted children under the replacer
        if self.driver.is_flat() {
            for (i, &ch) in children.iter().enumerate() {
                self.insert_child_composed(replacer, Some(ch), None, false, base + i);
            }
        }

        // the replacer's own subtree, before it adopts the children
        let rep_subtree = self.collect_subtree(replacer);

        // logical swap
        if let Some(p) = parent {
            self.n_mut(p).el_mut().children[pos] = replacer;
            self.n_mut(replacer).parent = Some(p);
            self.n_mut(replacer).parent_index = pos;
            self.n_mut(old).parent = None;
            self.n_mut(old).parent_index = 0;
        }
        self.n_mut(replacer).containing_slot = self.n(old).containing_slot;
        self.n_mut(replacer).slot_index = self.n(old).slot_index;
        if let ContainingSlot::Slot(s) = self.n(replacer).containing_slot {
            let idx = self.n(replacer).slot_index;
            self.n_mut(s).el_mut().slot_nodes[idx] = replacer;
        }
        self.n_mut(old).containing_slot = ContainingSlot::Unassigned;
        {
            let el = self.n_mut(old).el_mut();
            el.children.clear();
        }
        for (i, &ch) in children.iter().enumerate() {
            self.n_mut(replacer).el_mut().children.push(ch);
            self.n_mut(ch).parent = Some(replacer);
            self.n_mut(ch).parent_index = base + i;
        }

        // endpoint transfer plus growth for the replacer's own segment
        {
            let new_start = rep_seg.map(|(s, _)| s).or(old_seg.map(|(s, _)| s));
            let new_end = old_seg.map(|(_, e)| e).or(rep_seg.map(|(_, e)| e));
            let el = self.n_mut(replacer).el_mut();
            el.subtree_slot_start = new_start;
            el.subtree_slot_end = new_end;
            let old_el = self.n_mut(old).el_mut();
            old_el.subtree_slot_start = None;
            old_el.subtree_slot_end = None;
        }
        if let (Some((rs, re)), Some((prev, next))) = (rep_seg, chain_prev_next) {
            let mut a = parent;
            while let Some(id) = a {
                let Some(ael) = self.n_mut(id).as_element_mut() else { break };
                let mut changed = false;
                if ael.subtree_slot_start.is_none() {
                    ael.subtree_slot_start = Some(rs);
                    ael.subtree_slot_end = Some(re);
                    changed = true;
                } else {
                    if next.is_some() && ael.subtree_slot_start == next {
                        ael.subtree_slot_start = Some(rs);
                        changed = true;
                    }
                    if prev.is_some() && ael.subtree_slot_end == prev {
                        ael.subtree_slot_end = Some(re);
                        changed = true;
                    }
                }
                if !changed {
                    break;
                }
                a = self.n(id).parent;
            }
        }

        // observer weights follow the ownership changes
        let old_w = self.observer(old).subtree_count;
        let new_w = self.observer(replacer).subtree_count;
        if old_w != new_w {
            let delta = i64::from(new_w) - i64::from(old_w);
            for &ch in &children {
                self.add_subtree_weight(ch, delta);
            }
        }

        // content assignment joins the replacer's shadow tree
        if let Some(sr) = self.n(replacer).shadow_root() {
            for &ch in &children {
                self.apply_content_insertion(sr, ch);
            }
        }

        // new slots entering the surrounding tree
        if !rep_slot_values.is_empty() {
            if let Some(sr) = self.owner_shadow_root(replacer) {
                self.apply_slots_insertion(sr, rep_slot_values, false);
            }
        }

        // lifecycle: the old node leaves, the replacer takes its place
        if old_attached {
            self.n_mut(old).attached = false;
            self.run_detach_destroy(old);
            if self.observer(old).wants_attach_status() {
                self.emit_record(MutationRecord::AttachStatus {
                    target: old,
                    attached: false,
                });
            }
            if let Some(sink) = self.lifecycle.clone() {
                sink.borrow_mut().detached(old);
            }
            // the adopted children stay attached and only count as moved
            for &id in &rep_subtree {
                self.n_mut(id).attached = true;
                if self.observer(id).wants_attach_status() {
                    self.emit_record(MutationRecord::AttachStatus {
                        target: id,
                        attached: true,
                    });
                }
            }
            if let Some(sink) = self.lifecycle.clone() {
                for &id in &rep_subtree {
                    sink.borrow_mut().attached(id);
                }
            }
            for &ch in &children {
                self.notify_moved(ch);
            }
        }

        if let Some(p) = parent {
            if self.observer(p).wants_child_list() {
                self.emit_record(MutationRecord::ChildList {
                    target: p,
                    added: vec![replacer],
                    removed: vec![old],
                });
            }
        }
        Ok(())
    }

    // ---- attach state ----

    /// Treat a detached subtree as attached, firing lifecycle events.
    pub fn pretend_attached(&mut self, node: NodeId) {
        if !self.n(node).attached {
            self.walk_attach(node);
        }
    }

    /// Treat a subtree as detached, firing lifecycle events.
    pub fn pretend_detached(&mut self, node: NodeId) {
        if self.n(node).attached {
            self.walk_detach(node);
        }
    }

    fn collect_subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for ch in self.n(id).children().iter().rev() {
                stack.push(*ch);
            }
            if let Some(sr) = self.n(id).shadow_root() {
                stack.push(sr);
            }
        }
        out
    }

    pub(crate) fn walk_attach(&mut self, root: NodeId) {
        let ids = self.collect_subtree(root);
        for &id in &ids {
            self.n_mut(id).attached = true;
            if self.observer(id).wants_attach_status() {
                self.emit_record(MutationRecord::AttachStatus {
                    target: id,
                    attached: true,
                });
            }
        }
        if let Some(sink) = self.lifecycle.clone() {
            for &id in &ids {
                sink.borrow_mut().attached(id);
            }
        }
    }

    pub(crate) fn walk_detach(&mut self, root: NodeId) {
        let ids = self.collect_subtree(root);
        for &id in &ids {
            self.n_mut(id).attached = false;
            self.run_detach_destroy(id);
            if self.observer(id).wants_attach_status() {
                self.emit_record(MutationRecord::AttachStatus {
                    target: id,
                    attached: false,
                });
            }
        }
        if let Some(sink) = self.lifecycle.clone() {
            // leaves first
            for &id in ids.iter().rev() {
                sink.borrow_mut().detached(id);
            }
        }
    }

    fn notify_moved(&mut self, node: NodeId) {
        if let Some(sink) = self.lifecycle.clone() {
            sink.borrow_mut().moved(node);
        }
    }
}
