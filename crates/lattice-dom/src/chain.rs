//! Slot chain arena
//!
//! Every slot element owns one chain node; chain nodes of the same shadow
//! tree form a doubly linked list in logical document order. The list makes
//! "which slots entered or left this subtree" answerable as a contiguous
//! segment, so structural edits can notify slot bookkeeping without
//! rescanning the tree.
//!
//! Nodes are stored in a single arena shared by all shadow trees of a
//! document; lists of different trees simply never link to each other.

use crate::{ChainId, NodeId};

#[derive(Debug)]
struct ChainNode {
    value: NodeId,
    prev: Option<ChainId>,
    next: Option<ChainId>,
}

/// Arena of doubly linked slot-chain nodes
///
/// A slot keeps its chain node for its whole life, so the arena only
/// ever grows; detached segments stay allocated for relinking.
#[derive(Debug, Default)]
pub(crate) struct ChainArena {
    entries: Vec<ChainNode>,
}

impl ChainArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: ChainId) -> &ChainNode {
        &self.entries[id.0 as usize]
    }

    fn node_mut(&mut self, id: ChainId) -> &mut ChainNode {
        &mut self.entries[id.0 as usize]
    }

    /// Allocate an unlinked chain node for a slot element.
    pub(crate) fn alloc(&mut self, value: NodeId) -> ChainId {
        let id = ChainId(self.entries.len() as u32);
        self.entries.push(ChainNode {
            value,
            prev: None,
            next: None,
        });
        id
    }

    #[inline]
    pub(crate) fn value(&self, id: ChainId) -> NodeId {
        self.node(id).value
    }

    #[inline]
    pub(crate) fn next(&self, id: ChainId) -> Option<ChainId> {
        self.node(id).next
    }

    #[inline]
    pub(crate) fn prev(&self, id: ChainId) -> Option<ChainId> {
        self.node(id).prev
    }

    /// Link the segment `start..=end` between `prev` and `next`. The segment
    /// must be internally linked already and detached from any list.
    pub(crate) fn splice_in(
        &mut self,
        start: ChainId,
        end: ChainId,
        prev: Option<ChainId>,
        next: Option<ChainId>,
    ) {
        self.node_mut(start).prev = prev;
        self.node_mut(end).next = next;
        if let Some(p) = prev {
            self.node_mut(p).next = Some(start);
        }
        if let Some(n) = next {
            self.node_mut(n).prev = Some(end);
        }
    }

    /// Cut the segment `start..=end` out of its list, returning its old
    /// neighbors. The segment stays internally linked.
    pub(crate) fn splice_out(&mut self, start: ChainId, end: ChainId) -> (Option<ChainId>, Option<ChainId>) {
        let prev = self.node(start).prev;
        let next = self.node(end).next;
        if let Some(p) = prev {
            self.node_mut(p).next = next;
        }
        if let Some(n) = next {
            self.node_mut(n).prev = prev;
        }
        self.node_mut(start).prev = None;
        self.node_mut(end).next = None;
        (prev, next)
    }

    /// Slot elements of the segment `start..=end`, in chain order.
    pub(crate) fn segment_values(&self, start: ChainId, end: ChainId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut it = Some(start);
        while let Some(id) = it {
            out.push(self.value(id));
            if id == end {
                break;
            }
            it = self.next(id);
        }
        out
    }

    /// Iterate values from `start` to the end of the list.
    pub(crate) fn iter_from(&self, start: ChainId) -> ChainIter<'_> {
        ChainIter {
            arena: self,
            cursor: Some(start),
        }
    }
}

pub(crate) struct ChainIter<'a> {
    arena: &'a ChainArena,
    cursor: Option<ChainId>,
}

impl Iterator for ChainIter<'_> {
    type Item = (ChainId, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.arena.next(id);
        Some((id, self.arena.value(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nid(n: u32) -> NodeId {
        NodeId(n)
    }

    #[test]
    fn test_splice_in_and_out_keeps_links_consistent() {
        let mut arena = ChainArena::new();
        let a = arena.alloc(nid(1));
        let b = arena.alloc(nid(2));
        let c = arena.alloc(nid(3));
        arena.splice_in(b, b, Some(a), None);
        arena.splice_in(c, c, Some(b), None);
        let order: Vec<_> = arena.iter_from(a).map(|(_, v)| v).collect();
        assert_eq!(order, vec![nid(1), nid(2), nid(3)]);

        let (prev, next) = arena.splice_out(b, b);
        assert_eq!(prev, Some(a));
        assert_eq!(next, Some(c));
        assert_eq!(arena.next(a), Some(c));
        assert_eq!(arena.prev(c), Some(a));
        assert_eq!(arena.prev(b), None);
        assert_eq!(arena.next(b), None);
    }

    #[test]
    fn test_segment_splice_moves_range() {
        let mut arena = ChainArena::new();
        let ids: Vec<_> = (1..=5).map(|n| arena.alloc(nid(n))).collect();
        for w in ids.windows(2) {
            arena.splice_in(w[1], w[1], Some(w[0]), arena.next(w[0]));
        }
        // Move [2, 3] to the end.
        arena.splice_out(ids[1], ids[2]);
        arena.splice_in(ids[1], ids[2], Some(ids[4]), None);
        let order: Vec<_> = arena.iter_from(ids[0]).map(|(_, v)| v).collect();
        assert_eq!(order, vec![nid(1), nid(4), nid(5), nid(2), nid(3)]);
    }
}
