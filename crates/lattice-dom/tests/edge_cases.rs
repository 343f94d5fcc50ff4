//! Validation failures, reorders and backend corner cases.

use std::cell::RefCell;
use std::rc::Rc;

use lattice_backend::{RecordedCall, RecordingBackend};
use lattice_dom::{
    BackendDriver, BackendNode, ComponentOptions, ContainingSlot, DomError, MutationRecord,
    NodeId, ObserverOptions, SlotMode, Tree,
};

fn composed_tree() -> (Rc<RefCell<RecordingBackend>>, Tree) {
    let backend = Rc::new(RefCell::new(RecordingBackend::new()));
    let tree = Tree::new(BackendDriver::composed_shared(backend.clone()));
    (backend, tree)
}

fn domlike_tree() -> (Rc<RefCell<RecordingBackend>>, Tree) {
    let backend = Rc::new(RefCell::new(RecordingBackend::new()));
    let tree = Tree::new(BackendDriver::domlike_shared(backend.clone()));
    (backend, tree)
}

fn handle(tree: &Tree, id: NodeId) -> BackendNode {
    tree.get(id).unwrap().backend_node().unwrap()
}

#[test]
fn test_cyclic_insertion_is_rejected() {
    let mut tree = Tree::headless();
    let a = tree.create_native_node("div");
    let b = tree.create_native_node("div");
    let c = tree.create_native_node("div");
    tree.append_child(a, b).unwrap();
    tree.append_child(b, c).unwrap();

    assert_eq!(
        tree.append_child(a, a),
        Err(DomError::AncestorInsertion { parent: a, child: a })
    );
    assert_eq!(
        tree.append_child(c, a),
        Err(DomError::AncestorInsertion { parent: c, child: a })
    );
    // the tree is untouched
    assert_eq!(tree.get(a).unwrap().parent(), None);
    assert_eq!(tree.get(a).unwrap().children(), &[b]);
}

#[test]
fn test_text_nodes_cannot_parent() {
    let mut tree = Tree::headless();
    let t = tree.create_text_node("x");
    let e = tree.create_native_node("div");
    assert_eq!(
        tree.append_child(t, e),
        Err(DomError::NotAnElement { node: t })
    );
}

#[test]
fn test_anchor_must_be_a_child() {
    let mut tree = Tree::headless();
    let p = tree.create_native_node("div");
    let stranger = tree.create_native_node("span");
    let child = tree.create_native_node("span");
    assert_eq!(
        tree.insert_before(p, child, stranger),
        Err(DomError::NotAChild {
            parent: p,
            node: stranger,
        })
    );
}

#[test]
fn test_index_bounds_are_checked() {
    let mut tree = Tree::headless();
    let p = tree.create_native_node("div");
    let c = tree.create_native_node("span");
    tree.append_child(p, c).unwrap();

    let d = tree.create_native_node("b");
    assert_eq!(
        tree.insert_child_at(p, d, 2),
        Err(DomError::IndexOutOfRange { index: 2, len: 1 })
    );
    assert_eq!(
        tree.remove_child_at(p, 1),
        Err(DomError::IndexOutOfRange { index: 1, len: 1 })
    );
    assert_eq!(
        tree.remove_children(p, 1, 1),
        Err(DomError::IndexOutOfRange { index: 2, len: 1 })
    );
}

#[test]
fn test_batch_insert_rejects_parented_nodes() {
    let mut tree = Tree::headless();
    let p = tree.create_native_node("div");
    let q = tree.create_native_node("div");
    let free = tree.create_native_node("span");
    let taken = tree.create_native_node("span");
    tree.append_child(q, taken).unwrap();

    assert_eq!(
        tree.insert_children(p, &[free, taken], 0),
        Err(DomError::AlreadyParented { node: taken })
    );
    assert!(tree.get(p).unwrap().children().is_empty());
}

#[test]
fn test_inherit_slots_validation() {
    let mut tree = Tree::headless();
    let native = tree.create_native_node("div");
    assert_eq!(
        tree.set_inherit_slots(native),
        Err(DomError::InheritSlotsNonVirtual { node: native })
    );

    let full = tree.create_virtual_node("block");
    let c = tree.create_native_node("span");
    tree.append_child(full, c).unwrap();
    assert_eq!(
        tree.set_inherit_slots(full),
        Err(DomError::InheritSlotsNonEmpty { node: full })
    );

    let named = tree.create_virtual_node("block");
    tree.set_slot_name(named, "s").unwrap();
    assert_eq!(
        tree.set_inherit_slots(named),
        Err(DomError::InheritSlotsOnSlot { node: named })
    );
}

#[test]
fn test_self_replace_validation() {
    let mut tree = Tree::headless();
    let p = tree.create_native_node("div");
    let old = tree.create_native_node("article");
    tree.append_child(p, old).unwrap();

    let text = tree.create_text_node("x");
    assert_eq!(
        tree.self_replace_with(old, text),
        Err(DomError::ReplaceOnText { node: text })
    );

    let parented = tree.create_native_node("section");
    tree.append_child(p, parented).unwrap();
    assert_eq!(
        tree.self_replace_with(old, parented),
        Err(DomError::ReplacerParented { node: parented })
    );

    let slotty = tree.create_native_node("slot");
    tree.set_slot_name(slotty, "s").unwrap();
    assert_eq!(
        tree.self_replace_with(old, slotty),
        Err(DomError::ReplaceOnSlot { node: slotty })
    );
}

#[test]
fn test_reinsert_within_same_parent_adjusts_index() {
    let mut tree = Tree::headless();
    let p = tree.create_native_node("div");
    let a = tree.create_native_node("i");
    let b = tree.create_native_node("i");
    let c = tree.create_native_node("i");
    tree.append_child(p, a).unwrap();
    tree.append_child(p, b).unwrap();
    tree.append_child(p, c).unwrap();

    // the index counts positions before a comes out of the list
    tree.insert_child_at(p, a, 2).unwrap();
    assert_eq!(tree.get(p).unwrap().children(), &[b, a, c]);
    for (i, &n) in [b, a, c].iter().enumerate() {
        assert_eq!(tree.get(p).unwrap().children()[i], n);
        assert_eq!(tree.get(n).unwrap().parent(), Some(p));
    }

    // inserting a node before itself leaves the list unchanged
    tree.insert_before(p, a, a).unwrap();
    assert_eq!(tree.get(p).unwrap().children(), &[b, a, c]);
}

#[test]
fn test_replace_child_swaps_in_place() {
    let (backend, mut tree) = composed_tree();
    let p = tree.create_native_node("div");
    let a = tree.create_text_node("a");
    let b = tree.create_text_node("b");
    let c = tree.create_text_node("c");
    tree.append_child(p, a).unwrap();
    tree.append_child(p, b).unwrap();
    tree.append_child(p, c).unwrap();

    let n = tree.create_text_node("n");
    backend.borrow_mut().clear_calls();
    tree.replace_child(p, n, b).unwrap();

    assert_eq!(tree.get(p).unwrap().children(), &[a, n, c]);
    assert_eq!(tree.get(b).unwrap().parent(), None);
    assert_eq!(backend.borrow().dump(handle(&tree, p)), "<div>anc</div>");
    // a one-for-one swap reaches the backend as a single replace
    assert_eq!(
        backend.borrow().calls(),
        &[RecordedCall::ReplaceChild {
            parent: handle(&tree, p),
            child: handle(&tree, n),
            old_child: handle(&tree, b),
        }]
    );
}

#[test]
fn test_domlike_range_removal_walks_siblings() {
    let (backend, mut tree) = domlike_tree();
    let root = tree.create_native_node("div");
    let a = tree.create_text_node("a");
    let b = tree.create_text_node("b");
    let c = tree.create_text_node("c");
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();
    tree.append_child(root, c).unwrap();

    backend.borrow_mut().clear_calls();
    tree.remove_children(root, 0, 2).unwrap();

    // no splice primitive: the driver removes the range node by node
    assert_eq!(
        backend.borrow().calls(),
        &[
            RecordedCall::RemoveChild {
                parent: handle(&tree, root),
                child: handle(&tree, a),
            },
            RecordedCall::RemoveChild {
                parent: handle(&tree, root),
                child: handle(&tree, b),
            },
        ]
    );
    assert_eq!(backend.borrow().dump(handle(&tree, root)), "<div>c</div>");
}

#[test]
fn test_slot_rename_picks_up_waiting_content() {
    let (backend, mut tree) = composed_tree();
    let comp = tree.create_component(
        "x-card",
        ComponentOptions {
            slot_mode: SlotMode::Multiple,
            ..ComponentOptions::default()
        },
    );
    let sr = tree.get(comp).unwrap().shadow_root().unwrap();
    let slot = tree.create_native_node("slot");
    tree.append_child(sr, slot).unwrap();
    tree.set_slot_name(slot, "a").unwrap();

    let content = tree.create_native_node("p");
    tree.set_node_slot(content, "b").unwrap();
    tree.append_child(comp, content).unwrap();

    // no slot is named "b" yet, so the content is not composed
    assert_eq!(
        tree.get(content).unwrap().containing_slot(),
        ContainingSlot::None
    );
    assert_eq!(
        backend.borrow().dump(handle(&tree, comp)),
        "<x-card><slot></slot></x-card>"
    );

    tree.set_slot_name(slot, "b").unwrap();
    assert_eq!(
        tree.get(content).unwrap().containing_slot(),
        ContainingSlot::Slot(slot)
    );
    assert_eq!(
        backend.borrow().dump(handle(&tree, comp)),
        "<x-card><slot><p></p></slot></x-card>"
    );
}

#[test]
fn test_retargeting_content_moves_it_between_slots() {
    let (backend, mut tree) = composed_tree();
    let comp = tree.create_component(
        "x-card",
        ComponentOptions {
            slot_mode: SlotMode::Multiple,
            ..ComponentOptions::default()
        },
    );
    let sr = tree.get(comp).unwrap().shadow_root().unwrap();
    let s1 = tree.create_native_node("slot");
    let s2 = tree.create_native_node("slot");
    tree.append_child(sr, s1).unwrap();
    tree.append_child(sr, s2).unwrap();
    tree.set_slot_name(s1, "left").unwrap();
    tree.set_slot_name(s2, "right").unwrap();

    let content = tree.create_native_node("p");
    tree.set_node_slot(content, "left").unwrap();
    tree.append_child(comp, content).unwrap();
    assert_eq!(
        backend.borrow().dump(handle(&tree, comp)),
        "<x-card><slot><p></p></slot><slot></slot></x-card>"
    );

    tree.set_node_slot(content, "right").unwrap();
    assert_eq!(
        tree.get(content).unwrap().containing_slot(),
        ContainingSlot::Slot(s2)
    );
    assert_eq!(
        backend.borrow().dump(handle(&tree, comp)),
        "<x-card><slot></slot><slot><p></p></slot></x-card>"
    );
}

#[test]
fn test_detach_destroy_releases_backend_handle() {
    let (backend, mut tree) = composed_tree();
    let root = tree.create_native_node("div");
    let child = tree.create_native_node("span");
    tree.append_child(root, child).unwrap();
    tree.pretend_attached(root);

    tree.destroy_backend_element_on_detach(child);
    let child_handle = handle(&tree, child);
    assert!(!backend.borrow().is_released(child_handle));

    tree.remove_child(root, child).unwrap();
    assert!(backend.borrow().is_released(child_handle));
    assert!(backend
        .borrow()
        .calls()
        .contains(&RecordedCall::Release { node: child_handle }));
}

#[test]
fn test_attach_status_records_fire_in_both_directions() {
    let mut tree = Tree::headless();
    let records = Rc::new(RefCell::new(lattice_dom::CollectingSink::default()));
    tree.set_mutation_sink(records.clone());

    let root = tree.create_native_node("div");
    let child = tree.create_native_node("span");
    tree.append_child(root, child).unwrap();
    tree.set_observer(
        child,
        ObserverOptions {
            attach_status: true,
            ..ObserverOptions::default()
        },
    );

    tree.pretend_attached(root);
    tree.pretend_detached(root);
    assert_eq!(
        records.borrow().records,
        vec![
            MutationRecord::AttachStatus {
                target: child,
                attached: true,
            },
            MutationRecord::AttachStatus {
                target: child,
                attached: false,
            },
        ]
    );
}

#[test]
fn test_text_and_attribute_updates_reach_backend() {
    let (backend, mut tree) = composed_tree();
    let root = tree.create_native_node("div");
    let t = tree.create_text_node("old");
    tree.append_child(root, t).unwrap();

    tree.set_text(t, "new");
    tree.set_attribute(root, "class", "on");
    assert_eq!(
        backend.borrow().dump(handle(&tree, root)),
        "<div class=\"on\">new</div>"
    );

    tree.remove_attribute(root, "class");
    assert_eq!(backend.borrow().dump(handle(&tree, root)), "<div>new</div>");
    // removing an absent attribute is a no-op
    tree.remove_attribute(root, "class");
}

#[test]
fn test_empty_batches_are_no_ops() {
    let (backend, mut tree) = composed_tree();
    let root = tree.create_native_node("div");
    backend.borrow_mut().clear_calls();
    tree.insert_children(root, &[], 0).unwrap();
    tree.remove_children(root, 0, 0).unwrap();
    assert!(backend.borrow().calls().is_empty());
}

#[test]
fn test_slot_content_survives_component_move() {
    let (backend, mut tree) = composed_tree();
    let outer = tree.create_native_node("main");
    let comp = tree.create_component(
        "x-card",
        ComponentOptions {
            slot_mode: SlotMode::Multiple,
            ..ComponentOptions::default()
        },
    );
    let sr = tree.get(comp).unwrap().shadow_root().unwrap();
    let slot = tree.create_native_node("slot");
    tree.append_child(sr, slot).unwrap();
    tree.set_slot_name(slot, "").unwrap();
    let content = tree.create_native_node("p");
    tree.append_child(comp, content).unwrap();
    tree.append_child(outer, comp).unwrap();

    let aside = tree.create_native_node("aside");
    tree.append_child(outer, aside).unwrap();
    // moving the whole component keeps its internal projection intact
    tree.append_child(aside, comp).unwrap();
    assert_eq!(
        backend.borrow().dump(handle(&tree, outer)),
        "<main><aside><x-card><slot><p></p></slot></x-card></aside></main>"
    );
    assert_eq!(tree.get(slot).unwrap().slot_nodes(), &[content]);
}

#[test]
fn test_direct_mode_content_composes_at_logical_position() {
    let (backend, mut tree) = composed_tree();
    let comp = tree.create_component("x-plain", ComponentOptions::default());
    let em = tree.create_native_node("em");
    tree.append_child(comp, em).unwrap();

    // a non-tail insert must land before its logical successor
    let strong = tree.create_native_node("strong");
    tree.insert_child_at(comp, strong, 0).unwrap();
    assert_eq!(tree.get(comp).unwrap().children(), &[strong, em]);
    assert_eq!(
        backend.borrow().dump(handle(&tree, comp)),
        "<x-plain><strong></strong><em></em></x-plain>"
    );

    // a replace keeps the trailing sibling behind the new node
    let i = tree.create_native_node("i");
    tree.replace_child(comp, i, strong).unwrap();
    assert_eq!(tree.get(comp).unwrap().children(), &[i, em]);
    assert_eq!(
        backend.borrow().dump(handle(&tree, comp)),
        "<x-plain><i></i><em></em></x-plain>"
    );
}

#[test]
fn test_moves_between_shadow_trees_are_rejected() {
    let mut tree = Tree::headless();
    let mk = |tree: &mut Tree, tag: &str| {
        tree.create_component(
            tag,
            ComponentOptions {
                slot_mode: SlotMode::Multiple,
                ..ComponentOptions::default()
            },
        )
    };
    let c1 = mk(&mut tree, "x-a");
    let c2 = mk(&mut tree, "x-b");
    let sr1 = tree.get(c1).unwrap().shadow_root().unwrap();
    let sr2 = tree.get(c2).unwrap().shadow_root().unwrap();
    let el = tree.create_native_node("div");
    tree.append_child(sr1, el).unwrap();

    assert_eq!(
        tree.append_child(sr2, el),
        Err(DomError::CrossShadowTree {
            parent: sr2,
            node: el,
        })
    );
    // both trees are untouched
    assert_eq!(tree.get(el).unwrap().parent(), Some(sr1));
    assert!(tree.get(sr2).unwrap().children().is_empty());

    // detached nodes may enter any tree
    tree.remove_child(sr1, el).unwrap();
    tree.append_child(sr2, el).unwrap();
    assert_eq!(tree.get(el).unwrap().parent(), Some(sr2));
}

#[test]
fn test_replacing_slotted_content_keeps_later_siblings_anchored() {
    let (backend, mut tree) = composed_tree();
    let comp = tree.create_component(
        "x-single",
        ComponentOptions {
            slot_mode: SlotMode::Single,
            ..ComponentOptions::default()
        },
    );
    let sr = tree.get(comp).unwrap().shadow_root().unwrap();
    let slot = tree.create_native_node("slot");
    tree.append_child(sr, slot).unwrap();
    tree.set_slot_name(slot, "anything").unwrap();

    let em = tree.create_native_node("em");
    let tail = tree.create_native_node("i");
    tree.append_child(comp, em).unwrap();
    tree.append_child(comp, tail).unwrap();

    let strong = tree.create_native_node("strong");
    tree.replace_child(comp, strong, em).unwrap();
    assert_eq!(
        backend.borrow().dump(handle(&tree, comp)),
        "<x-single><slot><strong></strong><i></i></slot></x-single>"
    );
    assert_eq!(tree.slot_content_array(slot), vec![strong, tail]);
}
