//! Slot modes, slot assignment, and the per-shadow-tree registry
//!
//! Each shadow root carries a [`SlotRegistry`] that tracks its slots
//! according to the tree's slot mode:
//!
//! * `Direct` — no assignment; host content composes under the host.
//! * `Single` — all content goes to the first slot in document order.
//! * `Multiple` — content routes to the first slot carrying its target
//!   name; later slots with the same name are fallbacks.
//! * `Dynamic` — content targets explicit slot elements, and a handler
//!   drives per-slot generated content and value updates.
//!
//! Slot position bookkeeping rides on the slot chain (see
//! [`chain`](crate::chain)): structural edits hand this module the chain
//! segments that entered or left a shadow tree.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use tracing::debug;

use crate::error::{DomError, Result};
use crate::node::{ContainingSlot, ElementKind};
use crate::observer::{DynamicSlotHandler, SlotValueSnapshot};
use crate::tree::Tree;
use crate::value::{DeepCopyStrategy, SlotValue};
use crate::{ChainId, NodeId};

/// Content distribution policy of a shadow tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotMode {
    #[default]
    Direct,
    Single,
    Multiple,
    Dynamic,
}

/// Per-shadow-root slot bookkeeping
#[derive(Default)]
pub struct SlotRegistry {
    mode: SlotMode,
    copy_strategy: DeepCopyStrategy,
    /// Single mode: the slot currently receiving all content.
    single_active: Option<NodeId>,
    /// Multiple mode: slots per name, in chain order; the head receives
    /// the content, the rest are fallbacks.
    named: BTreeMap<String, Vec<NodeId>>,
    handler: Option<Rc<dyn DynamicSlotHandler>>,
    required_names: BTreeSet<String>,
    slot_values: BTreeMap<NodeId, BTreeMap<String, SlotValue>>,
    dirty: BTreeMap<NodeId, BTreeSet<String>>,
    /// Whether the initial dynamic insertion pass has run.
    inserted: bool,
}

impl std::fmt::Debug for SlotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotRegistry")
            .field("mode", &self.mode)
            .field("single_active", &self.single_active)
            .field("named", &self.named)
            .field("inserted", &self.inserted)
            .finish_non_exhaustive()
    }
}

impl SlotRegistry {
    pub(crate) fn new(mode: SlotMode, copy_strategy: DeepCopyStrategy) -> Self {
        SlotRegistry {
            mode,
            copy_strategy,
            ..SlotRegistry::default()
        }
    }

    #[inline]
    pub fn mode(&self) -> SlotMode {
        self.mode
    }
}

impl Tree {
    pub(crate) fn registry(&self, sr: NodeId) -> &SlotRegistry {
        match &self.n(sr).el().kind {
            ElementKind::ShadowRoot { registry, .. } => registry,
            _ => panic!("not a shadow root"),
        }
    }

    fn registry_mut(&mut self, sr: NodeId) -> &mut SlotRegistry {
        match &mut self.n_mut(sr).el_mut().kind {
            ElementKind::ShadowRoot { registry, .. } => registry,
            _ => panic!("not a shadow root"),
        }
    }

    /// The topmost ancestor reachable through parent links.
    pub(crate) fn tree_top(&self, n: NodeId) -> NodeId {
        let mut cur = n;
        while let Some(p) = self.n(cur).parent {
            cur = p;
        }
        cur
    }

    /// The shadow root a node belongs to, when it is inside one.
    pub(crate) fn owner_shadow_root(&self, n: NodeId) -> Option<NodeId> {
        let top = self.tree_top(n);
        self.n(top).is_shadow_root().then_some(top)
    }

    /// The component (and its shadow root) whose content a node is, looking
    /// through slot-inheriting wrappers.
    pub(crate) fn content_host_of(&self, n: NodeId) -> Option<(NodeId, NodeId)> {
        let mut p = self.n(n).parent?;
        while self.n(p).inherits_slots() {
            p = self.n(p).parent?;
        }
        let sr = self.n(p).shadow_root()?;
        Some((p, sr))
    }

    /// Slot mode of a component's shadow tree.
    pub fn slot_mode(&self, component: NodeId) -> Option<SlotMode> {
        let sr = self.n(component).shadow_root()?;
        Some(self.registry(sr).mode())
    }

    /// Slots of a component's shadow tree, in document order.
    pub fn slots(&self, component: NodeId) -> Vec<NodeId> {
        let Some(sr) = self.n(component).shadow_root() else {
            return Vec::new();
        };
        let Some(start) = self.subtree_slot_start(sr) else {
            return Vec::new();
        };
        self.chains.iter_from(start).map(|(_, v)| v).collect()
    }

    #[inline]
    pub(crate) fn subtree_slot_start(&self, e: NodeId) -> Option<ChainId> {
        self.n(e).as_element().and_then(|el| el.subtree_slot_start)
    }

    /// Visit every content unit of a component with the slot it is
    /// assigned to (`None` while unassigned or matched by no slot).
    pub fn for_each_node_in_slot(
        &self,
        component: NodeId,
        mut f: impl FnMut(NodeId, Option<NodeId>),
    ) {
        for &ch in self.n(component).children() {
            for unit in self.collect_content_units(ch) {
                if self.n(unit).inherits_slots() {
                    continue;
                }
                let slot = match self.n(unit).containing_slot {
                    ContainingSlot::Slot(s) => Some(s),
                    _ => None,
                };
                f(unit, slot);
            }
        }
    }

    /// Visit the content assigned to one slot, in composed order.
    pub fn for_each_node_in_specified_slot(&self, slot: NodeId, mut f: impl FnMut(NodeId)) {
        for &n in self.n(slot).slot_nodes() {
            f(n);
        }
    }

    /// The content assigned to a slot, in composed order.
    pub fn slot_content_array(&self, slot: NodeId) -> Vec<NodeId> {
        self.n(slot).slot_nodes().to_vec()
    }

    // ---- assignment resolution ----

    /// Which slot a content node of `sr`'s host should land in, per the
    /// tree's slot mode. Does not consult the node's current assignment.
    pub(crate) fn resolve_containing_slot(&self, sr: NodeId, unit: NodeId) -> ContainingSlot {
        let reg = self.registry(sr);
        match reg.mode {
            SlotMode::Direct => ContainingSlot::Unassigned,
            SlotMode::Single => match reg.single_active {
                Some(s) => ContainingSlot::Slot(s),
                None => ContainingSlot::None,
            },
            SlotMode::Multiple => {
                let name = self.n(unit).target_slot();
                match reg.named.get(name).and_then(|list| list.first()) {
                    Some(&s) => ContainingSlot::Slot(s),
                    None => ContainingSlot::None,
                }
            }
            SlotMode::Dynamic => {
                let target = self.n(unit).as_element().and_then(|el| el.slot_element);
                match target {
                    Some(s) if self.n(s).is_slot() => ContainingSlot::Slot(s),
                    _ => ContainingSlot::None,
                }
            }
        }
    }

    pub(crate) fn doc_path(&self, n: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cur = n;
        while let Some(p) = self.n(cur).parent {
            path.push(self.n(cur).parent_index);
            cur = p;
        }
        path.reverse();
        path
    }

    /// Assignment position for a node whose document path is `path`.
    pub(crate) fn slot_insert_position_by_path(&self, slot: NodeId, path: &[usize]) -> usize {
        let nodes = self.n(slot).slot_nodes();
        for (i, &existing) in nodes.iter().enumerate() {
            // an existing node at the same path is about to be displaced
            // to a later index, so the incoming node goes first
            if self.doc_path(existing).as_slice() >= path {
                return i;
            }
        }
        nodes.len()
    }

    /// Assignment position keeping `slot_nodes` in document order.
    pub(crate) fn find_slot_node_insert_position(&self, slot: NodeId, node: NodeId) -> usize {
        self.slot_insert_position_by_path(slot, &self.doc_path(node))
    }

    /// Add `unit` to a slot's content list at its document-order position.
    /// Logical and shadow-backend bookkeeping only; flat moves are the
    /// caller's concern.
    pub(crate) fn assign_to_slot(&mut self, s: NodeId, unit: NodeId) -> usize {
        let k = self.find_slot_node_insert_position(s, unit);
        let old_len = {
            let el = self.n_mut(s).el_mut();
            let len = el.slot_nodes.len();
            el.slot_nodes.insert(k, unit);
            len
        };
        let following = self.n(s).slot_nodes()[k..].to_vec();
        for (i, id) in following.iter().enumerate() {
            self.n_mut(*id).slot_index = k + i;
        }
        self.n_mut(unit).containing_slot = ContainingSlot::Slot(s);
        let ube = (!self.n(unit).backend_destroyed)
            .then_some(self.n(unit).backend)
            .flatten();
        let sbe = (!self.n(s).backend_destroyed)
            .then_some(self.n(s).backend)
            .flatten();
        if let (Some(ube), Some(sbe)) = (ube, sbe) {
            self.driver.with_shadow(|b| {
                b.set_containing_slot(ube, Some(sbe));
                let frag = b.create_fragment();
                b.append_child(frag, ube);
                if k == old_len {
                    b.splice_append_slot_nodes(sbe, frag);
                } else {
                    b.splice_before_slot_nodes(sbe, k, 0, frag);
                }
                b.release(frag);
            });
        }
        k
    }

    /// Remove `unit` from its slot's content list, leaving it unassigned.
    pub(crate) fn unassign_from_slot(&mut self, unit: NodeId) {
        let ContainingSlot::Slot(s) = self.n(unit).containing_slot else {
            self.n_mut(unit).containing_slot = ContainingSlot::Unassigned;
            return;
        };
        let k = self.n(unit).slot_index;
        let following = {
            let el = self.n_mut(s).el_mut();
            debug_assert_eq!(el.slot_nodes.get(k), Some(&unit));
            el.slot_nodes.remove(k);
            el.slot_nodes[k..].to_vec()
        };
        for (i, id) in following.iter().enumerate() {
            self.n_mut(*id).slot_index = k + i;
        }
        if !self.n(s).backend_destroyed {
            if let Some(sbe) = self.n(s).backend {
                self.driver
                    .with_shadow(|b| b.splice_remove_slot_nodes(sbe, k, 1));
            }
        }
        self.n_mut(unit).containing_slot = ContainingSlot::Unassigned;
    }

    /// Assign every content unit of a freshly linked subtree.
    pub(crate) fn apply_content_insertion(&mut self, sr: NodeId, root: NodeId) {
        for unit in self.collect_content_units(root) {
            match self.resolve_containing_slot(sr, unit) {
                ContainingSlot::Slot(s) => {
                    self.assign_to_slot(s, unit);
                }
                ContainingSlot::None => {
                    self.n_mut(unit).containing_slot = ContainingSlot::None;
                    if !self.n(unit).backend_destroyed {
                        if let Some(be) = self.n(unit).backend {
                            self.driver.with_shadow(|b| b.set_containing_slot(be, None));
                        }
                    }
                }
                ContainingSlot::Unassigned => {
                    self.n_mut(unit).containing_slot = ContainingSlot::Unassigned;
                }
            }
        }
    }

    /// Clear assignment for every content unit of a subtree leaving its
    /// host.
    pub(crate) fn apply_content_removal(&mut self, root: NodeId) {
        for unit in self.collect_content_units(root) {
            self.unassign_from_slot(unit);
        }
    }

    // ---- chain integration ----

    /// Previous chain node for a child sitting at `pos` under `parent`:
    /// the last slot among earlier siblings' subtrees, the parent's own
    /// chain node if the parent is a slot, or the same question one level
    /// up.
    pub(crate) fn chain_find_prev(
        &self,
        parent: Option<NodeId>,
        pos: usize,
    ) -> Option<ChainId> {
        let mut e = parent?;
        let mut idx = pos;
        loop {
            let children = self.n(e).children();
            for sib in children[..idx.min(children.len())].iter().rev() {
                let end = self.n(*sib).as_element().and_then(|el| el.subtree_slot_end);
                if end.is_some() {
                    return end;
                }
            }
            if let Some(chain) = self.n(e).as_element().and_then(|el| el.chain_node) {
                return Some(chain);
            }
            match self.n(e).parent {
                Some(p) => {
                    idx = self.n(e).parent_index;
                    e = p;
                }
                None => return None,
            }
        }
    }

    /// Splice a freshly linked child's slot segment into its new tree's
    /// chain and grow ancestor endpoints. Returns the owning shadow root
    /// when the child is now connected to one.
    pub(crate) fn chain_attach(&mut self, child: NodeId) -> Option<NodeId> {
        let seg = self
            .n(child)
            .as_element()
            .and_then(|el| Some((el.subtree_slot_start?, el.subtree_slot_end?)));
        let Some((seg_start, seg_end)) = seg else {
            return None;
        };
        let Some(parent) = self.n(child).parent else {
            return None;
        };
        let prev = self.chain_find_prev(Some(parent), self.n(child).parent_index);
        let top = self.tree_top(child);
        let next = match prev {
            Some(p) => self.chains.next(p),
            None => self.subtree_slot_start(top),
        };
        self.chains.splice_in(seg_start, seg_end, prev, next);
        let mut a = Some(parent);
        while let Some(id) = a {
            let Some(ael) = self.n_mut(id).as_element_mut() else {
                break;
            };
            let mut changed = false;
            if ael.subtree_slot_start.is_none() {
                ael.subtree_slot_start = Some(seg_start);
                ael.subtree_slot_end = Some(seg_end);
                changed = true;
            } else {
                if next.is_some() && ael.subtree_slot_start == next {
                    ael.subtree_slot_start = Some(seg_start);
                    changed = true;
                }
                if prev.is_some() && ael.subtree_slot_end == prev {
                    ael.subtree_slot_end = Some(seg_end);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            a = self.n(id).parent;
        }
        self.n(top).is_shadow_root().then_some(top)
    }

    /// Cut a still-linked child's slot segment out of its tree's chain and
    /// shrink ancestor endpoints. Returns the slots of the segment and the
    /// shadow root they left, if any.
    pub(crate) fn chain_detach(&mut self, child: NodeId) -> Option<(Vec<NodeId>, Option<NodeId>)> {
        let seg = self
            .n(child)
            .as_element()
            .and_then(|el| Some((el.subtree_slot_start?, el.subtree_slot_end?)));
        let Some((seg_start, seg_end)) = seg else {
            return None;
        };
        let top = self.tree_top(child);
        let owner = (top != child && self.n(top).is_shadow_root()).then_some(top);
        let values = self.chains.segment_values(seg_start, seg_end);
        let (prev, next) = self.chains.splice_out(seg_start, seg_end);
        let mut a = self.n(child).parent;
        while let Some(id) = a {
            let Some(ael) = self.n_mut(id).as_element_mut() else {
                break;
            };
            let mut changed = false;
            if ael.subtree_slot_start == Some(seg_start) && ael.subtree_slot_end == Some(seg_end) {
                ael.subtree_slot_start = None;
                ael.subtree_slot_end = None;
                changed = true;
            } else {
                if ael.subtree_slot_start == Some(seg_start) {
                    ael.subtree_slot_start = next;
                    changed = true;
                }
                if ael.subtree_slot_end == Some(seg_end) {
                    ael.subtree_slot_end = prev;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            a = self.n(id).parent;
        }
        Some((values, owner))
    }

    // ---- registry notifications ----

    /// Chain position a slot should take within a per-name fallback list:
    /// count how many list members precede it in the global chain.
    fn named_list_position(&self, sr: NodeId, slot: NodeId, list: &[NodeId]) -> usize {
        let Some(start) = self.subtree_slot_start(sr) else {
            return 0;
        };
        let mut k = 0;
        for (_, v) in self.chains.iter_from(start) {
            if v == slot {
                break;
            }
            if k < list.len() && v == list[k] {
                k += 1;
            }
        }
        k
    }

    /// Slots entered the shadow tree (already spliced into the chain).
    pub(crate) fn apply_slots_insertion(&mut self, sr: NodeId, slots: Vec<NodeId>, moved: bool) {
        match self.registry(sr).mode {
            SlotMode::Direct => {}
            SlotMode::Single => self.refresh_single_active(sr),
            SlotMode::Multiple => {
                for v in slots {
                    let name = self.n(v).slot_name().unwrap_or("").to_string();
                    let list = self.registry(sr).named.get(&name).cloned().unwrap_or_default();
                    let k = self.named_list_position(sr, v, &list);
                    self.registry_mut(sr)
                        .named
                        .entry(name.clone())
                        .or_default()
                        .insert(k, v);
                    if k == 0 {
                        let old_head = list.first().copied();
                        self.reassign_slot_content(sr, Some(&name), old_head, Some(v));
                    }
                }
            }
            SlotMode::Dynamic => {
                if moved {
                    return;
                }
                let (handler, inserted) = {
                    let reg = self.registry(sr);
                    (reg.handler.clone(), reg.inserted)
                };
                for v in slots {
                    self.registry_mut(sr).slot_values.entry(v).or_default();
                    if inserted {
                        if let Some(h) = &handler {
                            let name = self.n(v).slot_name().unwrap_or("").to_string();
                            let snap = self.slot_value_snapshot(sr, v, BTreeSet::new());
                            h.insert(v, &name, snap);
                        }
                    }
                }
            }
        }
    }

    /// Slots left the shadow tree (already cut from the chain).
    pub(crate) fn apply_slots_removal(&mut self, sr: NodeId, slots: Vec<NodeId>, moved: bool) {
        match self.registry(sr).mode {
            SlotMode::Direct => {}
            SlotMode::Single => {
                if !moved {
                    self.refresh_single_active(sr);
                }
            }
            SlotMode::Multiple => {
                for v in slots.iter().copied() {
                    let name = self.n(v).slot_name().unwrap_or("").to_string();
                    let removed = {
                        let reg = self.registry_mut(sr);
                        match reg.named.get_mut(&name) {
                            Some(list) => {
                                let pos = list.iter().position(|s| *s == v);
                                if let Some(p) = pos {
                                    list.remove(p);
                                }
                                let head_after = list.first().copied();
                                if list.is_empty() {
                                    reg.named.remove(&name);
                                }
                                pos.map(|p| (p, head_after))
                            }
                            None => None,
                        }
                    };
                    if let Some((0, head_after)) = removed {
                        if !moved {
                            self.reassign_slot_content(sr, Some(&name), Some(v), head_after);
                        }
                    }
                }
            }
            SlotMode::Dynamic => {
                if moved {
                    return;
                }
                let (handler, inserted) = {
                    let reg = self.registry(sr);
                    (reg.handler.clone(), reg.inserted)
                };
                for v in slots {
                    let reg = self.registry_mut(sr);
                    reg.slot_values.remove(&v);
                    reg.dirty.remove(&v);
                    if inserted {
                        if let Some(h) = &handler {
                            h.remove(v);
                        }
                    }
                }
            }
        }
    }

    fn refresh_single_active(&mut self, sr: NodeId) {
        let new_active = self
            .subtree_slot_start(sr)
            .map(|c| self.chains.value(c));
        let old = self.registry(sr).single_active;
        if old != new_active {
            self.registry_mut(sr).single_active = new_active;
            self.reassign_slot_content(sr, None, old, new_active);
        }
    }

    fn apply_slot_rename(&mut self, sr: NodeId, slot: NodeId, old_name: &str, new_name: &str) {
        match self.registry(sr).mode {
            SlotMode::Direct | SlotMode::Single => {}
            SlotMode::Multiple => {
                let removed = {
                    let reg = self.registry_mut(sr);
                    match reg.named.get_mut(old_name) {
                        Some(list) => {
                            let pos = list.iter().position(|s| *s == slot);
                            if let Some(p) = pos {
                                list.remove(p);
                            }
                            let head_after = list.first().copied();
                            if list.is_empty() {
                                reg.named.remove(old_name);
                            }
                            pos.map(|p| (p, head_after))
                        }
                        None => None,
                    }
                };
                if let Some((0, head_after)) = removed {
                    self.reassign_slot_content(sr, Some(old_name), Some(slot), head_after);
                }
                let list = self
                    .registry(sr)
                    .named
                    .get(new_name)
                    .cloned()
                    .unwrap_or_default();
                let k = self.named_list_position(sr, slot, &list);
                self.registry_mut(sr)
                    .named
                    .entry(new_name.to_string())
                    .or_default()
                    .insert(k, slot);
                if k == 0 {
                    self.reassign_slot_content(sr, Some(new_name), list.first().copied(), Some(slot));
                }
            }
            SlotMode::Dynamic => {
                let (handler, inserted) = {
                    let reg = self.registry(sr);
                    (reg.handler.clone(), reg.inserted)
                };
                if inserted {
                    if let Some(h) = handler {
                        h.remove(slot);
                        let snap = self.slot_value_snapshot(sr, slot, BTreeSet::new());
                        h.insert(slot, new_name, snap);
                    }
                }
            }
        }
    }

    /// Move every matching content node of the host from `old_slot` to
    /// `new_slot`. `name: None` matches all content (single mode).
    pub(crate) fn reassign_slot_content(
        &mut self,
        sr: NodeId,
        name: Option<&str>,
        old_slot: Option<NodeId>,
        new_slot: Option<NodeId>,
    ) {
        if old_slot == new_slot {
            return;
        }
        let Some(host) = self.n(sr).host() else {
            return;
        };
        let mut matching = Vec::new();
        for ch in self.n(host).children().to_vec() {
            for unit in self.collect_content_units(ch) {
                if name.is_none_or(|nm| self.n(unit).target_slot() == nm) {
                    matching.push(unit);
                }
            }
        }
        for unit in matching {
            let old_cs = self.n(unit).containing_slot;
            let new_cs = match new_slot {
                Some(s) => ContainingSlot::Slot(s),
                None => ContainingSlot::None,
            };
            if old_cs == new_cs {
                continue;
            }
            let is_wrapper = self.n(unit).inherits_slots();
            if self.driver.is_flat() && !is_wrapper {
                let old_fp = match old_cs {
                    ContainingSlot::Slot(s) => self.flat_parent_for_children(s),
                    ContainingSlot::Unassigned => {
                        let h = self.n(host);
                        if h.backend_destroyed { None } else { h.backend }
                    }
                    ContainingSlot::None => None,
                };
                if let Some(fp) = old_fp {
                    let count = self.count_flat(unit);
                    if count > 0 {
                        let first = self.first_flat(unit);
                        self.driver.flat_splice(fp, first, count, &[]);
                    }
                }
            }
            if matches!(old_cs, ContainingSlot::Slot(_)) {
                self.unassign_from_slot(unit);
            }
            match new_cs {
                ContainingSlot::Slot(s) => {
                    let k = self.assign_to_slot(s, unit);
                    if self.driver.is_flat() && !is_wrapper {
                        if let Some(fp) = self.flat_parent_for_children(s) {
                            let members = self.collect_flat(unit);
                            if !members.is_empty() {
                                let anchor = self.slot_anchor_from(s, k + 1);
                                self.driver.flat_splice(fp, anchor, 0, &members);
                            }
                        }
                    }
                }
                ContainingSlot::None => {
                    self.n_mut(unit).containing_slot = ContainingSlot::None;
                    if !self.n(unit).backend_destroyed {
                        if let Some(be) = self.n(unit).backend {
                            self.driver.with_shadow(|b| b.set_containing_slot(be, None));
                        }
                    }
                }
                ContainingSlot::Unassigned => unreachable!(),
            }
        }
    }

    // ---- public slot configuration ----

    /// Mark an element as a slot, or rename an existing slot.
    pub fn set_slot_name(&mut self, node: NodeId, name: &str) -> Result<()> {
        if self.n(node).as_element().is_none() {
            return Err(DomError::NotAnElement { node });
        }
        let old = self.n(node).el().slot_name.clone();
        if old.as_deref() == Some(name) {
            return Ok(());
        }
        debug!(?node, name, renamed = old.is_some(), "set slot name");
        self.n_mut(node).el_mut().slot_name = Some(name.to_string());
        if !self.n(node).backend_destroyed {
            if let Some(be) = self.n(node).backend {
                self.driver.with_shadow(|b| b.set_slot_name(be, name));
            }
        }
        match old {
            Some(old_name) => {
                if let Some(sr) = self.owner_shadow_root(node) {
                    self.apply_slot_rename(sr, node, &old_name, name);
                }
            }
            None => {
                let chain = self.chains.alloc(node);
                self.n_mut(node).el_mut().chain_node = Some(chain);
                let existing_start = self.subtree_slot_start(node);
                if let Some(start) = existing_start {
                    // the element's own chain node precedes its descendants
                    let prev = self.chains.prev(start);
                    self.chains.splice_in(chain, chain, prev, Some(start));
                    self.n_mut(node).el_mut().subtree_slot_start = Some(chain);
                    let mut a = self.n(node).parent;
                    while let Some(id) = a {
                        let Some(ael) = self.n_mut(id).as_element_mut() else {
                            break;
                        };
                        if ael.subtree_slot_start == Some(start) {
                            ael.subtree_slot_start = Some(chain);
                        } else {
                            break;
                        }
                        a = self.n(id).parent;
                    }
                } else {
                    let prev =
                        self.chain_find_prev(self.n(node).parent, self.n(node).parent_index);
                    let next = match prev {
                        Some(p) => self.chains.next(p),
                        None => {
                            let top = self.tree_top(node);
                            if top == node {
                                None
                            } else {
                                self.subtree_slot_start(top)
                            }
                        }
                    };
                    self.chains.splice_in(chain, chain, prev, next);
                    {
                        let el = self.n_mut(node).el_mut();
                        el.subtree_slot_start = Some(chain);
                        el.subtree_slot_end = Some(chain);
                    }
                    let mut a = self.n(node).parent;
                    while let Some(id) = a {
                        let Some(ael) = self.n_mut(id).as_element_mut() else {
                            break;
                        };
                        let mut changed = false;
                        if ael.subtree_slot_start.is_none() {
                            ael.subtree_slot_start = Some(chain);
                            ael.subtree_slot_end = Some(chain);
                            changed = true;
                        } else {
                            if next.is_some() && ael.subtree_slot_start == next {
                                ael.subtree_slot_start = Some(chain);
                                changed = true;
                            }
                            if prev.is_some() && ael.subtree_slot_end == prev {
                                ael.subtree_slot_end = Some(chain);
                                changed = true;
                            }
                        }
                        if !changed {
                            break;
                        }
                        a = self.n(id).parent;
                    }
                }
                if let Some(sr) = self.owner_shadow_root(node) {
                    self.apply_slots_insertion(sr, vec![node], false);
                }
            }
        }
        Ok(())
    }

    /// Make a childless virtual node splice its future children into the
    /// enclosing slot context.
    pub fn set_inherit_slots(&mut self, node: NodeId) -> Result<()> {
        let n = self.n(node);
        if !n.is_virtual() {
            return Err(DomError::InheritSlotsNonVirtual { node });
        }
        if n.is_slot() {
            return Err(DomError::InheritSlotsOnSlot { node });
        }
        if !n.children().is_empty() {
            return Err(DomError::InheritSlotsNonEmpty { node });
        }
        let slot = self.n(node).el().slot.clone();
        self.n_mut(node).el_mut().inherit_slots = true;
        if !self.n(node).backend_destroyed {
            if let Some(be) = self.n(node).backend {
                self.driver.with_shadow(|b| b.set_slot(be, &slot, true));
            }
        }
        Ok(())
    }

    /// Set the target slot name a content node carries.
    pub fn set_node_slot(&mut self, node: NodeId, name: &str) -> Result<()> {
        let Some(el) = self.n(node).as_element() else {
            return Err(DomError::NotAnElement { node });
        };
        if el.slot == name {
            return Ok(());
        }
        let inherit = el.inherit_slots;
        self.n_mut(node).el_mut().slot = name.to_string();
        if !self.n(node).backend_destroyed {
            if let Some(be) = self.n(node).backend {
                self.driver.with_shadow(|b| b.set_slot(be, name, inherit));
            }
        }
        if let Some((host, sr)) = self.content_host_of(node) {
            let new_cs = self.resolve_containing_slot(sr, node);
            if new_cs != self.n(node).containing_slot {
                self.move_content_assignment(host, node, new_cs);
            }
        }
        Ok(())
    }

    /// Point a content node at an explicit slot element (dynamic mode).
    pub fn set_slot_element(&mut self, node: NodeId, slot: Option<NodeId>) -> Result<()> {
        if self.n(node).as_element().is_none() {
            return Err(DomError::NotAnElement { node });
        }
        if self.n(node).el().slot_element == slot {
            return Ok(());
        }
        self.n_mut(node).el_mut().slot_element = slot;
        if let Some((host, sr)) = self.content_host_of(node) {
            if self.registry(sr).mode == SlotMode::Dynamic {
                let new_cs = self.resolve_containing_slot(sr, node);
                if new_cs != self.n(node).containing_slot {
                    self.move_content_assignment(host, node, new_cs);
                }
            }
        }
        Ok(())
    }

    /// Move a single already-linked content node to a new assignment.
    fn move_content_assignment(&mut self, host: NodeId, node: NodeId, new_cs: ContainingSlot) {
        let old_cs = self.n(node).containing_slot;
        let is_wrapper = self.n(node).inherits_slots();
        if self.driver.is_flat() && !is_wrapper {
            let old_fp = match old_cs {
                ContainingSlot::Slot(s) => self.flat_parent_for_children(s),
                ContainingSlot::Unassigned => {
                    let h = self.n(host);
                    if h.backend_destroyed { None } else { h.backend }
                }
                ContainingSlot::None => None,
            };
            if let Some(fp) = old_fp {
                let count = self.count_flat(node);
                if count > 0 {
                    let first = self.first_flat(node);
                    self.driver.flat_splice(fp, first, count, &[]);
                }
            }
        }
        if matches!(old_cs, ContainingSlot::Slot(_)) {
            self.unassign_from_slot(node);
        }
        match new_cs {
            ContainingSlot::Slot(s) => {
                let k = self.assign_to_slot(s, node);
                if self.driver.is_flat() && !is_wrapper {
                    if let Some(fp) = self.flat_parent_for_children(s) {
                        let members = self.collect_flat(node);
                        if !members.is_empty() {
                            let anchor = self.slot_anchor_from(s, k + 1);
                            self.driver.flat_splice(fp, anchor, 0, &members);
                        }
                    }
                }
            }
            ContainingSlot::None => {
                self.n_mut(node).containing_slot = ContainingSlot::None;
                if !self.n(node).backend_destroyed {
                    if let Some(be) = self.n(node).backend {
                        self.driver.with_shadow(|b| b.set_containing_slot(be, None));
                    }
                }
            }
            ContainingSlot::Unassigned => {
                self.n_mut(node).containing_slot = ContainingSlot::Unassigned;
            }
        }
    }

    // ---- dynamic slot values ----

    /// Install the handler that generates content for dynamically managed
    /// slots. `required` names the slot values whose changes should mark
    /// slots dirty.
    pub fn set_dynamic_slot_handler(
        &mut self,
        component: NodeId,
        handler: Rc<dyn DynamicSlotHandler>,
        required: Vec<String>,
    ) -> Result<()> {
        let sr = self
            .n(component)
            .shadow_root()
            .ok_or(DomError::NotAComponent { node: component })?;
        let reg = self.registry_mut(sr);
        reg.handler = Some(handler);
        reg.required_names = required.into_iter().collect();
        Ok(())
    }

    /// Store a value on a dynamically managed slot. The slot is marked
    /// dirty only when the value changed and its name is required.
    pub fn replace_slot_value(&mut self, slot: NodeId, name: &str, value: SlotValue) {
        let Some(sr) = self.owner_shadow_root(slot) else {
            return;
        };
        let reg = self.registry_mut(sr);
        let entry = reg.slot_values.entry(slot).or_default();
        if entry.get(name) == Some(&value) {
            return;
        }
        entry.insert(name.to_string(), value);
        if reg.required_names.contains(name) {
            reg.dirty.entry(slot).or_default().insert(name.to_string());
        }
    }

    /// Flush pending value updates of one slot to the handler.
    pub fn apply_slot_value_updates(&mut self, slot: NodeId) {
        let Some(sr) = self.owner_shadow_root(slot) else {
            return;
        };
        let (handler, inserted) = {
            let reg = self.registry(sr);
            (reg.handler.clone(), reg.inserted)
        };
        let (Some(handler), true) = (handler, inserted) else {
            return;
        };
        let Some(dirty) = self.registry_mut(sr).dirty.remove(&slot) else {
            return;
        };
        if dirty.is_empty() {
            return;
        }
        let snap = self.slot_value_snapshot(sr, slot, dirty);
        handler.update(slot, snap);
    }

    /// Run the dynamic slot pass for a component: the first call announces
    /// every slot currently in the tree, later calls flush each dirty slot
    /// exactly once.
    pub fn apply_slot_updates(&mut self, component: NodeId) -> Result<()> {
        let sr = self
            .n(component)
            .shadow_root()
            .ok_or(DomError::NotAComponent { node: component })?;
        if self.registry(sr).mode != SlotMode::Dynamic {
            return Ok(());
        }
        let (handler, inserted) = {
            let reg = self.registry(sr);
            (reg.handler.clone(), reg.inserted)
        };
        if !inserted {
            self.registry_mut(sr).inserted = true;
            let slots: Vec<NodeId> = self
                .subtree_slot_start(sr)
                .map(|start| self.chains.iter_from(start).map(|(_, v)| v).collect())
                .unwrap_or_default();
            for s in slots {
                let reg = self.registry_mut(sr);
                reg.slot_values.entry(s).or_default();
                reg.dirty.remove(&s);
                if let Some(h) = &handler {
                    let name = self.n(s).slot_name().unwrap_or("").to_string();
                    let snap = self.slot_value_snapshot(sr, s, BTreeSet::new());
                    h.insert(s, &name, snap);
                }
            }
        } else {
            let dirty_slots: Vec<NodeId> = self.registry(sr).dirty.keys().copied().collect();
            for s in dirty_slots {
                self.apply_slot_value_updates(s);
            }
        }
        Ok(())
    }

    fn slot_value_snapshot(
        &self,
        sr: NodeId,
        slot: NodeId,
        updated: BTreeSet<String>,
    ) -> SlotValueSnapshot {
        let reg = self.registry(sr);
        let strategy = reg.copy_strategy;
        let values = reg
            .slot_values
            .get(&slot)
            .map(|m| {
                m.iter()
                    .map(|(k, v)| (k.clone(), strategy.copy(v)))
                    .collect()
            })
            .unwrap_or_default();
        SlotValueSnapshot {
            values,
            updated_names: updated,
        }
    }
}
