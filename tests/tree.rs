use std::collections::BTreeMap;

use ordered_tree::{
    Avl, AvlTree, Balance, Bst, Color, DfsOrder, IterationMode, NaturalOrder, NodeId, NodeRef, RedBlack,
    RedBlackTree, StoreValues, Tree, TreeError, TreeKind, TreeOptions, Unbalanced,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

const SIXTEEN: [i64; 16] = [11, 3, 15, 1, 8, 13, 16, 2, 6, 9, 12, 14, 4, 7, 10, 5];
const FIFTEEN: [i64; 15] = [10, 5, 15, 3, 7, 12, 20, 1, 4, 6, 8, 11, 13, 18, 25];

fn key_strategy() -> impl Strategy<Value = i64> {
    // Smaller than TEST_SIZE to force collisions.
    -500i64..500i64
}

// ─── Structural checks through the public API ───────────────────────────────

/// Parent links, size, ascending order and the extremum cache.
fn check_links<V, B: Balance, S: ordered_tree::Storage<Value = V>>(tree: &Tree<i64, V, B, NaturalOrder, S>) {
    let Some(root) = tree.root() else {
        assert_eq!(tree.len(), 0);
        assert!(tree.first().is_none() && tree.last().is_none());
        return;
    };
    assert_eq!(root.parent, None, "root has a parent");

    let mut count = 0;
    let mut stack = vec![root.id];
    while let Some(id) = stack.pop() {
        count += 1;
        let node = tree.node(id).expect("reachable node is live");
        for child in [node.left, node.right].into_iter().flatten() {
            assert_eq!(tree.node(child).unwrap().parent, Some(id), "broken parent link");
            stack.push(child);
        }
    }
    assert_eq!(count, tree.len(), "size differs from reachable nodes");

    let keys: Vec<i64> = tree.dfs(DfsOrder::In).iter().map(|node| *node.key).collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]), "keys not ascending: {keys:?}");
    assert_eq!(tree.first().map(|node| *node.key), keys.first().copied());
    assert_eq!(tree.last().map(|node| *node.key), keys.last().copied());
}

fn black_height<V>(tree: &RedBlackTree<i64, V>, id: Option<NodeId>) -> usize {
    let Some(id) = id else { return 1 };
    let node = tree.node(id).unwrap();
    let color = tree.color(id).unwrap();
    if color == Color::Red {
        for child in [node.left, node.right].into_iter().flatten() {
            assert_eq!(tree.color(child).unwrap(), Color::Black, "red node with red child");
        }
    }
    let left = black_height(tree, node.left);
    let right = black_height(tree, node.right);
    assert_eq!(left, right, "black-height differs");
    left + usize::from(color == Color::Black)
}

fn check_red_black<V>(tree: &RedBlackTree<i64, V>) {
    check_links(tree);
    if let Some(root) = tree.root() {
        assert_eq!(tree.color(root.id).unwrap(), Color::Black, "root is red");
    }
    black_height(tree, tree.root().map(|node| node.id));
}

fn avl_height<V>(tree: &AvlTree<i64, V>, id: Option<NodeId>) -> i32 {
    let Some(id) = id else { return 0 };
    let node = tree.node(id).unwrap();
    let left = avl_height(tree, node.left);
    let right = avl_height(tree, node.right);
    assert!((left - right).abs() <= 1, "balance factor out of range");
    assert_eq!(tree.balance_factor(id).unwrap(), left - right);
    let height = 1 + left.max(right);
    assert_eq!(tree.node_height(id).unwrap(), height, "stale height");
    height
}

fn check_avl<V>(tree: &AvlTree<i64, V>) {
    check_links(tree);
    avl_height(tree, tree.root().map(|node| node.id));
}

fn ids<V>(nodes: &[NodeRef<'_, i64, V>]) -> Vec<NodeId> {
    nodes.iter().map(|node| node.id).collect()
}

fn keys_of<V, B: Balance>(tree: &Tree<i64, V, B>) -> Vec<i64> {
    tree.keys().copied().collect()
}

// ─── Randomized comparison against BTreeMap ─────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Set(i64, i64),
    Delete(i64),
    Get(i64),
    Floor(i64),
    Ceiling(i64),
    Higher(i64),
    Lower(i64),
    PopFirst,
    PopLast,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| Op::Set(k, v)),
        3 => key_strategy().prop_map(Op::Delete),
        1 => key_strategy().prop_map(Op::Get),
        1 => key_strategy().prop_map(Op::Floor),
        1 => key_strategy().prop_map(Op::Ceiling),
        1 => key_strategy().prop_map(Op::Higher),
        1 => key_strategy().prop_map(Op::Lower),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
    ]
}

fn replay<B: Balance>(ops: &[Op], check: impl Fn(&Tree<i64, i64, B>)) -> Result<(), TestCaseError> {
    let mut tree: Tree<i64, i64, B> = Tree::default();
    let mut model: BTreeMap<i64, i64> = BTreeMap::new();

    for op in ops {
        match *op {
            Op::Set(k, v) => prop_assert_eq!(tree.set(k, v), model.insert(k, v).is_none(), "set({})", k),
            Op::Delete(k) => {
                let deleted = tree.delete(&k).map(|d| (d.key, d.value));
                prop_assert_eq!(deleted, model.remove_entry(&k), "delete({})", k);
            }
            Op::Get(k) => prop_assert_eq!(tree.get(&k), model.get(&k)),
            Op::Floor(k) => prop_assert_eq!(tree.floor(&k).map(|n| *n.key), model.range(..=k).next_back().map(|(k, _)| *k)),
            Op::Ceiling(k) => prop_assert_eq!(tree.ceiling(&k).map(|n| *n.key), model.range(k..).next().map(|(k, _)| *k)),
            Op::Higher(k) => prop_assert_eq!(
                tree.higher(&k).map(|n| *n.key),
                model.range(k + 1..).next().map(|(k, _)| *k)
            ),
            Op::Lower(k) => prop_assert_eq!(tree.lower(&k).map(|n| *n.key), model.range(..k).next_back().map(|(k, _)| *k)),
            Op::PopFirst => prop_assert_eq!(tree.pop_first(), model.pop_first()),
            Op::PopLast => prop_assert_eq!(tree.pop_last(), model.pop_last()),
        }
        check(&tree);
    }

    let entries: Vec<(i64, i64)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<(i64, i64)> = model.into_iter().collect();
    prop_assert_eq!(entries, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn bst_matches_btreemap(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        replay::<Unbalanced>(&ops, |tree| check_links(tree))?;
    }

    #[test]
    fn red_black_matches_btreemap(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        replay::<RedBlack>(&ops, check_red_black)?;
    }

    #[test]
    fn avl_matches_btreemap(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        replay::<Avl>(&ops, check_avl)?;
    }

    #[test]
    fn range_search_matches_btreemap(
        keys in proptest::collection::vec(key_strategy(), 0..TEST_SIZE),
        low in key_strategy(),
        span in 0i64..300,
    ) {
        let tree: RedBlackTree<i64, ()> = keys.iter().map(|&k| (k, ())).collect();
        let model: BTreeMap<i64, ()> = keys.iter().map(|&k| (k, ())).collect();
        let high = low + span;

        let found: Vec<i64> = tree.range_search(low..=high).unwrap().iter().map(|n| *n.key).collect();
        let expected: Vec<i64> = model.range(low..=high).map(|(k, _)| *k).collect();
        prop_assert_eq!(found, expected);

        let found: Vec<i64> = tree.range_search(low..high).unwrap().iter().map(|n| *n.key).collect();
        let expected: Vec<i64> = model.range(low..high).map(|(k, _)| *k).collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn predecessor_successor_are_inverse(keys in proptest::collection::vec(key_strategy(), 1..500)) {
        let tree: AvlTree<i64, ()> = keys.iter().map(|&k| (k, ())).collect();
        for node in tree.dfs(DfsOrder::In) {
            if let Some(prev) = tree.predecessor(node.id).unwrap() {
                prop_assert_eq!(tree.successor(prev.id).unwrap().map(|n| n.id), Some(node.id));
            }
            if let Some(next) = tree.successor(node.id).unwrap() {
                prop_assert_eq!(tree.predecessor(next.id).unwrap().map(|n| n.id), Some(node.id));
            }
        }
    }

    #[test]
    fn every_traversal_form_agrees(keys in proptest::collection::vec(key_strategy(), 0..500)) {
        let mut tree: RedBlackTree<i64, ()> = keys.iter().map(|&k| (k, ())).collect();
        for order in [DfsOrder::Pre, DfsOrder::In, DfsOrder::Post] {
            let iterative = ids(&tree.dfs_with(order, IterationMode::Iterative));
            let recursive = ids(&tree.dfs_with(order, IterationMode::Recursive));
            let threaded = ids(&tree.morris(order));
            prop_assert_eq!(&iterative, &recursive);
            prop_assert_eq!(&iterative, &threaded);
        }
        check_red_black(&tree);
    }

    #[test]
    fn external_store_matches_map_mode(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        let mut inline: RedBlackTree<i64, i64> = RedBlackTree::new();
        let mut external: Tree<i64, i64, RedBlack, NaturalOrder, StoreValues<i64>> = Tree::default();
        for op in &ops {
            match *op {
                Op::Set(k, v) => prop_assert_eq!(inline.insert(k, v), external.insert(k, v)),
                Op::Delete(k) => prop_assert_eq!(
                    inline.delete(&k).map(|d| (d.key, d.value)),
                    external.delete(&k).map(|d| (d.key, d.value))
                ),
                _ => {}
            }
        }
        prop_assert!(inline.iter().eq(external.iter()));
        prop_assert!(!external.is_map_mode());
    }
}

// ─── End-to-end scenarios ───────────────────────────────────────────────────

#[rstest]
#[case::insertion_order(SIXTEEN.to_vec())]
#[case::ascending((1..=16).collect())]
#[case::descending((1..=16).rev().collect())]
fn red_black_sixteen_keys_delete_all(#[case] deletions: Vec<i64>) {
    let mut tree: RedBlackTree<i64, ()> = RedBlackTree::new();
    for key in SIXTEEN {
        tree.set(key, ());
        check_red_black(&tree);
    }
    assert_eq!(keys_of(&tree), (1..=16).collect::<Vec<_>>());

    for key in deletions {
        assert!(tree.delete(&key).is_some());
        check_red_black(&tree);
    }
    assert_eq!(tree.len(), 0);
    assert!(tree.first().is_none());
    assert!(tree.last().is_none());
}

#[test]
fn red_black_reverse_deletion() {
    let keys = [7, 3, 18, 10, 22, 8, 11, 26];
    let mut tree: RedBlackTree<i64, ()> = RedBlackTree::new();
    for key in keys {
        tree.set(key, ());
        check_red_black(&tree);
    }
    for key in keys.iter().rev() {
        tree.delete(key);
        check_red_black(&tree);
    }
    assert!(tree.is_empty());
}

#[rstest]
#[case::floor_between(9, Some(8), Some(10))]
#[case::exact(12, Some(12), Some(12))]
#[case::below_all(0, None, Some(1))]
#[case::above_all(30, Some(25), None)]
fn floor_and_ceiling(#[case] key: i64, #[case] floor: Option<i64>, #[case] ceiling: Option<i64>) {
    let tree: Bst<i64, ()> = FIFTEEN.iter().map(|&k| (k, ())).collect();
    assert_eq!(tree.floor(&key).map(|n| *n.key), floor);
    assert_eq!(tree.ceiling(&key).map(|n| *n.key), ceiling);
}

#[test]
fn higher_of_maximum_is_absent() {
    let tree: Bst<i64, ()> = FIFTEEN.iter().map(|&k| (k, ())).collect();
    assert!(tree.higher(&25).is_none());
    assert!(tree.lower(&1).is_none());
    assert_eq!(tree.higher(&10).map(|n| *n.key), Some(11));
}

#[rstest]
#[case::inclusive(7..=12, vec![7, 8, 10, 11, 12])]
#[case::everything(0..=100, vec![1, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13, 15, 18, 20, 25])]
#[case::empty_gap(21..=24, vec![])]
fn range_search_on_sample_tree(#[case] range: std::ops::RangeInclusive<i64>, #[case] expected: Vec<i64>) {
    let tree: Bst<i64, ()> = FIFTEEN.iter().map(|&k| (k, ())).collect();
    let found: Vec<i64> = tree.range_search(range).unwrap().iter().map(|n| *n.key).collect();
    assert_eq!(found, expected);
}

#[test]
fn exclusive_bounds_and_invalid_ranges() {
    use std::ops::Bound::{Excluded, Included};

    let tree: Bst<i64, ()> = FIFTEEN.iter().map(|&k| (k, ())).collect();
    let found: Vec<i64> = tree.range_search((Excluded(7), Excluded(12))).unwrap().iter().map(|n| *n.key).collect();
    assert_eq!(found, [8, 10, 11]);
    assert!(tree.range_search((Included(7), Excluded(7))).unwrap().is_empty());
    assert_eq!(tree.range_search((Excluded(7), Excluded(7))).unwrap_err(), TreeError::InvalidRange);
    #[allow(clippy::reversed_empty_ranges)]
    let backwards = tree.range_search(12..=7);
    assert_eq!(backwards.unwrap_err(), TreeError::InvalidRange);
}

#[test]
fn avl_delete_odds_then_evens() {
    let mut tree: AvlTree<i64, ()> = (1..=31).map(|k| (k, ())).collect();
    check_avl(&tree);
    for key in (1..=31).step_by(2).chain((2..=31).step_by(2)) {
        assert!(tree.delete(&key).is_some());
        check_avl(&tree);
    }
    assert!(tree.is_empty());
}

#[test]
fn hint_below_minimum_updates_first() {
    let mut tree: RedBlackTree<i64, &str> = RedBlackTree::new();
    for key in [50, 30, 70, 20, 40] {
        tree.set(key, "old");
    }
    let hint = tree.get_node(&40).unwrap().id;
    let id = tree.set_with_hint(10, "new", Some(hint));
    check_red_black(&tree);
    assert_eq!(tree.first().map(|n| n.id), Some(id));
    assert_eq!(tree.first().map(|n| *n.key), Some(10));
}

#[test]
fn sorted_bulk_load_through_hints() {
    let mut tree: AvlTree<i64, i64> = AvlTree::new();
    let mut hint = None;
    for key in 0..1_000 {
        hint = Some(tree.set_with_hint(key, key, hint));
    }
    check_avl(&tree);
    assert_eq!(tree.len(), 1_000);
}

// ─── Deletion variants ──────────────────────────────────────────────────────

#[test]
fn deleting_absent_key_twice_is_a_no_op() {
    let mut tree: RedBlackTree<i64, ()> = FIFTEEN.iter().map(|&k| (k, ())).collect();
    assert!(tree.delete(&2).is_none());
    assert!(tree.delete(&2).is_none());
    assert_eq!(tree.len(), FIFTEEN.len());
}

#[test]
fn rebalance_root_reports_fixup_start() {
    let mut tree: Bst<i64, ()> = Bst::new();
    for key in [2, 1, 3] {
        tree.set(key, ());
    }
    let two = tree.get_node(&2).unwrap().id;
    let three = tree.get_node(&3).unwrap().id;

    let deleted = tree.delete(&1).unwrap();
    assert_eq!(deleted.rebalance_root, Some(two));

    // With two children the successor takes the root position and fixup starts at it.
    tree.set(1, ());
    let deleted = tree.delete(&2).unwrap();
    assert_eq!(deleted.rebalance_root, Some(three));
    assert_eq!(tree.root().map(|n| n.id), Some(three));
}

#[rstest]
#[case::last_node(&[1], 1)]
#[case::root_with_left_child(&[2, 1], 2)]
#[case::root_with_right_child(&[1, 2], 1)]
fn vacated_root_has_no_rebalance_root(#[case] keys: &[i64], #[case] doomed: i64) {
    let mut tree: Bst<i64, ()> = Bst::new();
    for &key in keys {
        tree.set(key, ());
    }
    let deleted = tree.delete(&doomed).unwrap();
    assert_eq!(deleted.rebalance_root, None);
    assert_eq!(tree.len(), keys.len() - 1);
}

#[test]
fn delete_node_rejects_stale_ids() {
    let mut tree: AvlTree<i64, &str> = AvlTree::from([(1, "a"), (2, "b")]);
    let id = tree.get_node(&1).unwrap().id;
    assert_eq!(tree.delete_node(id).unwrap().value, "a");
    assert_eq!(tree.delete_node(id).unwrap_err(), TreeError::StaleNode(id));
    assert!(tree.node(id).is_none());
    assert!(tree.predecessor(id).is_err());
}

#[test]
fn reused_slot_does_not_revive_deleted_id() {
    let mut tree: RedBlackTree<i64, i64> = (1..=5).map(|k| (k, k)).collect();
    let three = tree.get_node(&3).unwrap().id;
    assert_eq!(tree.delete_node(three).unwrap().key, 3);

    tree.set(100, 100);
    let hundred = tree.get_node(&100).unwrap().id;
    assert_ne!(hundred, three);
    assert_eq!(tree.delete_node(three).unwrap_err(), TreeError::StaleNode(three));
    assert!(tree.node(three).is_none());
    assert!(tree.successor(three).is_err());
    assert!(tree.color(three).is_err());
    assert!(tree.has(&100));
    assert_eq!(*tree.node(hundred).unwrap().key, 100);
}

#[test]
fn ids_are_scoped_to_their_tree() {
    let a: RedBlackTree<i64, ()> = (1..=5).map(|k| (k, ())).collect();
    let mut b: RedBlackTree<i64, ()> = (1..=5).map(|k| (k, ())).collect();
    let foreign = a.get_node(&1).unwrap().id;
    assert_eq!(b.delete_node(foreign).unwrap_err(), TreeError::StaleNode(foreign));
    assert_eq!(b.len(), 5);

    let copy = a.clone();
    assert!(copy.node(foreign).is_none());
    assert_eq!(*a.node(foreign).unwrap().key, 1);

    let own = b.get_node(&2).unwrap().id;
    b.clear();
    b.set(2, ());
    assert!(b.node(own).is_none());
    assert_eq!(b.set_with_hint(3, (), Some(own)), b.get_node(&3).unwrap().id);
}

#[test]
fn delete_where_and_first_match() {
    let mut tree: RedBlackTree<i64, i64> = (0..20).map(|k| (k, k * k)).collect();

    let first = tree.delete_first_where(|k, _| k % 7 == 6).unwrap();
    assert_eq!(first.key, 6);

    let evens: Vec<i64> = tree.delete_where(|k, _| k % 2 == 0).into_iter().map(|d| d.key).collect();
    assert_eq!(evens, [0, 2, 4, 8, 10, 12, 14, 16, 18]);
    check_red_black(&tree);

    let ranged: Vec<i64> = tree.delete_range(5..=11).unwrap().into_iter().map(|d| d.value).collect();
    assert_eq!(ranged, [25, 49, 81, 121]);
    assert_eq!(keys_of(&tree), [1, 3, 13, 15, 17, 19]);
    check_red_black(&tree);
}

// ─── Node identity, snapshots and construction ──────────────────────────────

#[test]
fn node_ids_survive_rebalancing() {
    let mut tree: RedBlackTree<i64, i64> = RedBlackTree::new();
    tree.set(0, 0);
    let id = tree.get_node(&0).unwrap().id;
    for key in 1..200 {
        tree.set(key, key);
    }
    tree.perfectly_balance();
    assert_eq!(*tree.node(id).unwrap().key, 0);
}

#[rstest]
#[case::bst(TreeKind::Bst)]
#[case::red_black(TreeKind::RedBlack)]
#[case::avl(TreeKind::Avl)]
fn perfectly_balance_reaches_minimal_height(#[case] kind: TreeKind) {
    // 2^8 - 1 nodes fit exactly into 8 levels.
    let entries = (0..255).map(|k| (k, ()));
    match kind {
        TreeKind::Bst => {
            let mut tree: Bst<i64, ()> = entries.collect();
            tree.perfectly_balance();
            assert_eq!(tree.height(), 8);
            check_links(&tree);
        }
        TreeKind::RedBlack => {
            let mut tree: RedBlackTree<i64, ()> = entries.collect();
            tree.perfectly_balance();
            assert_eq!(tree.height(), 8);
            check_red_black(&tree);
        }
        TreeKind::Avl => {
            let mut tree: AvlTree<i64, ()> = entries.collect();
            tree.perfectly_balance();
            assert_eq!(tree.height(), 8);
            check_avl(&tree);
        }
    }
}

#[test]
fn set_many_keeps_plain_bst_shallow() {
    let mut tree: Bst<i64, i64> = Bst::new();
    tree.set_many((0..1_000).map(|k| (k, k)));
    tree.set_many([(5, 50)]);
    assert_eq!(tree.height(), 10);
    assert_eq!(tree.get(&5), Some(&50));
    check_links(&tree);
}

#[test]
fn from_keys_later_duplicates_win() {
    let mut tree: Bst<i64, i64> = Bst::new();
    tree.set_many([(1, 1), (2, 2), (1, 10)]);
    assert_eq!(tree.get(&1), Some(&10));
    assert_eq!(tree.len(), 2);

    let keys: Bst<i64, ()> = Bst::from_keys([3, 1, 2, 3]);
    assert_eq!(keys_of(&keys), [1, 2, 3]);
}

#[test]
fn sorted_construction() {
    let tree = RedBlackTree::from_sorted_entries((0..100).map(|k| (k, k))).unwrap();
    check_red_black(&tree);
    let error = RedBlackTree::from_sorted_entries([(1, 1), (3, 3), (2, 2)]).unwrap_err();
    assert_eq!(error, TreeError::UnsortedInput { index: 2 });
}

#[test]
fn clone_is_independent() {
    let mut original: AvlTree<i64, String> = (0..50).map(|k| (k, k.to_string())).collect();
    let copy = original.clone();
    original.delete(&10);
    original.set(100, "hundred".to_string());
    assert_eq!(copy.len(), 50);
    assert_eq!(copy.get(&10).map(String::as_str), Some("10"));
    assert!(!copy.has(&100));
    check_avl(&copy);
    assert_ne!(original, copy);
}

#[test]
fn map_and_filter() {
    let tree: RedBlackTree<i64, i64> = (0..10).map(|k| (k, k)).collect();
    let doubled = tree.map(|_, v| v * 2);
    assert_eq!(doubled.get(&4), Some(&8));
    assert_eq!(doubled.kind(), TreeKind::RedBlack);
    check_red_black(&doubled);

    let odd = tree.filter(|k, _| k % 2 == 1);
    assert_eq!(keys_of(&odd), [1, 3, 5, 7, 9]);
    check_red_black(&odd);
}

/// A value that cannot be cloned.
#[derive(Debug, PartialEq)]
struct Payload(i64);

#[test]
fn map_accepts_values_that_are_not_clone() {
    let mut inline: AvlTree<i64, Payload> = AvlTree::new();
    let mut external: Tree<i64, Payload, Avl, NaturalOrder, StoreValues<Payload>> = Tree::default();
    for key in 0..40 {
        inline.set(key, Payload(key));
        external.set(key, Payload(key));
    }
    external.delete(&7);

    let from_inline = inline.map(|key, payload| Payload(payload.0 + key));
    let from_external = external.map(|_, payload| payload.0 * 10);
    assert_eq!(from_inline.get(&20), Some(&Payload(40)));
    assert_eq!(from_external.get(&39), Some(&390));
    assert_eq!(from_external.get(&7), None);
    check_avl(&from_inline);
    check_avl(&from_external);
}

#[test]
fn reverse_comparator() {
    let options = TreeOptions::with_comparator(|a: &i64, b: &i64| b.cmp(a));
    let mut tree = RedBlackTree::with_options(options);
    for key in [3, 1, 2] {
        tree.set(key, ());
    }
    let keys: Vec<i64> = tree.keys().copied().collect();
    assert_eq!(keys, [3, 2, 1]);
    assert_eq!(tree.floor(&0).map(|n| *n.key), Some(1));
    let found: Vec<i64> = tree.range_search(3..=2).unwrap().iter().map(|n| *n.key).collect();
    assert_eq!(found, [3, 2]);
}

#[test]
fn recursive_iteration_mode_drives_dfs() {
    let options = TreeOptions::new().iteration_mode(IterationMode::Recursive);
    let mut tree: AvlTree<i64, ()> = AvlTree::with_options(options);
    tree.set_many((0..7).map(|k| (k, ())));
    let preorder: Vec<i64> = tree.dfs(DfsOrder::Pre).iter().map(|n| *n.key).collect();
    assert_eq!(preorder, [3, 1, 0, 2, 5, 4, 6]);

    let mut copy: AvlTree<i64, ()> = AvlTree::with_options(tree.options());
    copy.set_many((0..7).map(|k| (k, ())));
    let copied: Vec<i64> = copy.dfs(DfsOrder::Post).iter().map(|n| *n.key).collect();
    assert_eq!(copied, [0, 2, 1, 4, 6, 5, 3]);
}
