//! Concrete walker scenarios and universal invariants, run as black-box integration tests
//! against the public crate surface.

use eg_walker::causalgraph::graph::VersionOrdering;
use eg_walker::{ListOp, Walker};

#[test]
fn empty_walker_has_no_version_and_no_content() {
    let w: Walker<char> = Walker::new();
    assert!(w.get_version().is_empty());
    assert!(w.get_active_items().is_empty());
    assert_eq!(w.causal_graph().next_lv(), 0);
}

#[test]
fn single_local_insert_is_immediately_visible() {
    let mut w: Walker<char> = Walker::new();
    let lv = w.local_insert("A", 0, 'x').unwrap();
    assert_eq!(lv, 0);
    assert_eq!(w.get_active_items(), vec!['x']);
    assert_eq!(w.get_version(), &[0]);
    assert_eq!(w.causal_graph().lv_to_raw(0), Some(("A", 0)));
}

#[test]
fn insert_then_delete_then_retreat_to_insert() {
    let mut w: Walker<char> = Walker::new();
    let insert = w.local_insert("A", 0, 'x').unwrap();
    let delete = w.local_delete("A", 0).unwrap();
    assert_eq!((insert, delete), (0, 1));
    assert!(w.get_active_items().is_empty());

    w.retreat(&[insert]).unwrap();
    assert_eq!(w.get_active_items(), vec!['x']);
}

#[test]
fn checkout_an_earlier_version_does_not_move_the_walker() {
    let mut w: Walker<char> = Walker::new();
    let a = w.local_insert("A", 0, 'a').unwrap();
    let b = w.local_insert("A", 1, 'b').unwrap();
    assert_eq!((a, b), (0, 1));

    assert_eq!(w.checkout(&[a]).unwrap().contents, vec!['a']);
    assert_eq!(w.checkout(&[b]).unwrap().contents, vec!['a', 'b']);
    assert_eq!(w.get_version(), &[1]);
}

#[test]
fn diverging_agents_are_concurrent_and_merge_to_both_values() {
    let mut w: Walker<char> = Walker::new();
    let x = w.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    let y = w.integrate(ListOp::Insert { pos: 0, content: 'y' }, "B", Some(&[])).unwrap();
    assert_eq!((x, y), (0, 1));

    assert!(w.causal_graph().find_dominators(&[0, 1]).unwrap().is_empty());
    assert_eq!(w.causal_graph().compare_versions(0, 1).unwrap(), VersionOrdering::Concurrent);

    w.merge(&[0, 1]).unwrap();
    let items = w.get_active_items();
    assert_eq!(items.len(), 2);
    assert!(items.contains(&'x') && items.contains(&'y'));
}

#[test]
fn remote_delete_after_divergence_catches_up_to_a_single_item() {
    let mut w: Walker<char> = Walker::new();
    w.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    w.integrate(ListOp::Insert { pos: 0, content: 'y' }, "B", Some(&[])).unwrap();
    let delete = w
        .integrate(ListOp::Delete { pos: 0 }, "A", Some(&[("A", 0), ("B", 0)]))
        .unwrap();
    assert_eq!(delete, 2);

    w.merge(&[delete]).unwrap();
    assert_eq!(w.get_active_items().len(), 1);
}

#[test]
fn log_length_always_tracks_next_lv() {
    let mut w: Walker<char> = Walker::new();
    w.local_insert("A", 0, 'a').unwrap();
    w.local_insert("A", 1, 'b').unwrap();
    w.local_delete("A", 0).unwrap();
    assert_eq!(w.get_ops().len(), w.causal_graph().next_lv());
}

#[test]
fn every_lv_round_trips_through_raw_version() {
    let mut w: Walker<char> = Walker::new();
    w.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    w.integrate(ListOp::Insert { pos: 0, content: 'y' }, "B", Some(&[])).unwrap();
    w.integrate(ListOp::Insert { pos: 1, content: 'z' }, "A", Some(&[("A", 0)])).unwrap();

    let cg = w.causal_graph();
    for lv in 0..cg.next_lv() {
        let (agent, seq) = cg.lv_to_raw(lv).unwrap();
        assert_eq!(cg.raw_to_lv(agent, seq), Some(lv));
    }
}

#[test]
fn heads_contain_every_lv_in_their_own_history() {
    let mut w: Walker<char> = Walker::new();
    w.local_insert("A", 0, 'a').unwrap();
    w.local_insert("A", 1, 'b').unwrap();
    w.local_delete("A", 0).unwrap();

    let cg = w.causal_graph();
    for lv in 0..cg.next_lv() {
        assert!(cg.version_contains_lv(cg.heads(), lv).unwrap());
    }
}

#[test]
fn find_dominators_is_idempotent() {
    let mut w: Walker<char> = Walker::new();
    w.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    w.integrate(ListOp::Insert { pos: 0, content: 'y' }, "B", Some(&[])).unwrap();
    w.integrate(ListOp::Insert { pos: 0, content: 'z' }, "C", Some(&[])).unwrap();

    let cg = w.causal_graph();
    let d1 = cg.find_dominators(&[0, 1, 2]).unwrap();
    let d2 = cg.find_dominators(&d1).unwrap();
    assert_eq!(d1, d2);
}

#[test]
fn merge_is_commutative_across_two_target_frontiers() {
    let mut seed: Walker<char> = Walker::new();
    let x = seed.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    let y = seed.integrate(ListOp::Insert { pos: 0, content: 'y' }, "B", Some(&[])).unwrap();
    let z = seed
        .integrate(ListOp::Insert { pos: 0, content: 'z' }, "A", Some(&[("A", 0)]))
        .unwrap();

    let mut a: Walker<char> = Walker::new();
    a.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    a.integrate(ListOp::Insert { pos: 0, content: 'y' }, "B", Some(&[])).unwrap();
    a.integrate(ListOp::Insert { pos: 0, content: 'z' }, "A", Some(&[("A", 0)])).unwrap();
    a.merge(&[x]).unwrap();
    a.merge(&[x, y, z]).unwrap();

    let mut b: Walker<char> = Walker::new();
    b.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    b.integrate(ListOp::Insert { pos: 0, content: 'y' }, "B", Some(&[])).unwrap();
    b.integrate(ListOp::Insert { pos: 0, content: 'z' }, "A", Some(&[("A", 0)])).unwrap();
    b.merge(&[y]).unwrap();
    b.merge(&[x, y, z]).unwrap();

    assert_eq!(a.get_active_items(), b.get_active_items());
}

#[test]
fn checkout_does_not_depend_on_the_walkers_current_frontier() {
    let mut w1: Walker<char> = Walker::new();
    w1.local_insert("A", 0, 'a').unwrap();
    w1.local_insert("A", 1, 'b').unwrap();
    let snap_from_fresh = w1.checkout(&[0]).unwrap();

    let mut w2: Walker<char> = Walker::new();
    w2.local_insert("A", 0, 'a').unwrap();
    w2.local_insert("A", 1, 'b').unwrap();
    w2.retreat(&[0]).unwrap();
    let snap_after_retreat = w2.checkout(&[0]).unwrap();

    assert_eq!(snap_from_fresh.contents, snap_after_retreat.contents);
}

#[test]
fn duplicate_integrate_leaves_the_log_unchanged() {
    let mut w: Walker<char> = Walker::new();
    let first = w.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    let len_before = w.get_ops().len();
    let second = w.integrate(ListOp::Insert { pos: 0, content: 'x' }, "A", Some(&[])).unwrap();
    assert_eq!(first, second);
    assert_eq!(w.get_ops().len(), len_before);
}

#[test]
fn frontier_after_a_run_of_local_edits_is_the_last_lv() {
    let mut w: Walker<char> = Walker::new();
    w.local_insert("A", 0, 'a').unwrap();
    w.local_insert("A", 1, 'b').unwrap();
    let last = w.local_insert("A", 2, 'c').unwrap();
    assert_eq!(w.get_version(), &[last]);

    let cg = w.causal_graph();
    let (agent, seq) = cg.lv_to_raw(last).unwrap();
    assert_eq!(cg.raw_to_lv(agent, seq), Some(last));
}
