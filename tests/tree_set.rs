use std::collections::BTreeSet;

use ordered_tree::{TreeError, TreeOptions, TreeSet};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

fn key_strategy() -> impl Strategy<Value = i32> {
    // Smaller than TEST_SIZE to force collisions.
    -400i32..400i32
}

#[derive(Debug, Clone)]
enum SetOp {
    Add(i32),
    Delete(i32),
    Has(i32),
    Higher(i32),
    Lower(i32),
    PopFirst,
    PopLast,
}

fn op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        6 => key_strategy().prop_map(SetOp::Add),
        3 => key_strategy().prop_map(SetOp::Delete),
        1 => key_strategy().prop_map(SetOp::Has),
        1 => key_strategy().prop_map(SetOp::Higher),
        1 => key_strategy().prop_map(SetOp::Lower),
        1 => Just(SetOp::PopFirst),
        1 => Just(SetOp::PopLast),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn matches_btreeset(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        let mut set = TreeSet::new();
        let mut model = BTreeSet::new();

        for op in &ops {
            match *op {
                SetOp::Add(k) => prop_assert_eq!(set.add(k), model.insert(k), "add({})", k),
                SetOp::Delete(k) => prop_assert_eq!(set.delete(&k), model.remove(&k), "delete({})", k),
                SetOp::Has(k) => prop_assert_eq!(set.has(&k), model.contains(&k)),
                SetOp::Higher(k) => prop_assert_eq!(set.higher(&k), model.range(k + 1..).next()),
                SetOp::Lower(k) => prop_assert_eq!(set.lower(&k), model.range(..k).next_back()),
                SetOp::PopFirst => prop_assert_eq!(set.pop_first(), model.pop_first()),
                SetOp::PopLast => prop_assert_eq!(set.pop_last(), model.pop_last()),
            }
            prop_assert_eq!(set.len(), model.len());
            prop_assert_eq!(set.first(), model.first());
            prop_assert_eq!(set.last(), model.last());
        }

        prop_assert!(set.iter().eq(model.iter()));
        prop_assert!(set.iter().rev().eq(model.iter().rev()));
        prop_assert!(set.into_iter().eq(model.into_iter()));
    }
}

#[rstest]
#[case(5, Some(5), Some(5))]
#[case(6, Some(5), Some(10))]
#[case(-1, None, Some(0))]
#[case(99, Some(20), None)]
fn floor_and_ceiling(#[case] key: i32, #[case] floor: Option<i32>, #[case] ceiling: Option<i32>) {
    let set = TreeSet::from([0, 5, 10, 15, 20]);
    assert_eq!(set.floor(&key).copied(), floor);
    assert_eq!(set.ceiling(&key).copied(), ceiling);
}

#[test]
fn range_search_and_delete_where() {
    let mut set: TreeSet<i32> = (1..=20).collect();
    assert_eq!(set.range_search(4..8).unwrap(), [&4, &5, &6, &7]);
    #[allow(clippy::reversed_empty_ranges)]
    let backwards = set.range_search(8..4);
    assert_eq!(backwards.unwrap_err(), TreeError::InvalidRange);

    let removed = set.delete_where(|k| k % 5 == 0);
    assert_eq!(removed, [5, 10, 15, 20]);
    assert_eq!(set.len(), 16);
    assert!(!set.has(&10));
}

#[test]
fn custom_order() {
    let mut set = TreeSet::with_options(TreeOptions::with_comparator(|a: &&str, b: &&str| {
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }));
    for word in ["ccc", "a", "bb", "aa", "b"] {
        set.add(word);
    }
    let words: Vec<&str> = set.iter().copied().collect();
    assert_eq!(words, ["a", "b", "aa", "bb", "ccc"]);
}

#[test]
fn debug_clone_and_equality() {
    let set = TreeSet::from([3, 1, 2]);
    assert_eq!(format!("{set:?}"), "{1, 2, 3}");

    let mut copy = set.clone();
    assert_eq!(copy, set);
    copy.add(4);
    assert_ne!(copy, set);
    assert_eq!(set.len(), 3);

    copy.clear();
    assert!(copy.is_empty());
    assert_eq!(copy.first(), None);
}
