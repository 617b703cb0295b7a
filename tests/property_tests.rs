//! Property-based tests using proptest
//!
//! These tests generate random sequences of operations, run them against a
//! heap and a simple model, and verify after every step that the heap agrees
//! with the model and that a full traversal finds no structural defect. For
//! the Fibonacci heap the traversal includes the `F(d+2)` subtree bound.

use mergeable_heaps::binomial::BinomialHeap;
use mergeable_heaps::fibonacci::FibonacciHeap;
use mergeable_heaps::skiplist::{SkipList, SkipListConfig};
use mergeable_heaps::{HeapError, MergeableHeap, StructureError};
use proptest::prelude::*;
use std::collections::BTreeSet;

trait Checked {
    fn check(&self) -> Result<(), StructureError>;
}

impl<K: Ord> Checked for FibonacciHeap<K> {
    fn check(&self) -> Result<(), StructureError> {
        self.check_structure()
    }
}

impl<K: Ord> Checked for BinomialHeap<K> {
    fn check(&self) -> Result<(), StructureError> {
        self.check_structure()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(i32),
    ExtractMin,
    /// Index into live handles, and how far to lower the key
    DecreaseKey(usize, i32),
    /// Index into live handles, and a key offset that may go up
    TryChangeKey(usize, i32),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-1000i32..1000).prop_map(Op::Insert),
        2 => Just(Op::ExtractMin),
        3 => (any::<usize>(), 0i32..500).prop_map(|(i, d)| Op::DecreaseKey(i, d)),
        1 => (any::<usize>(), -50i32..50).prop_map(|(i, d)| Op::TryChangeKey(i, d)),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

/// Runs `ops` against a heap and a model of (handle, key) pairs
fn run_model<H: MergeableHeap<i32> + Checked>(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut heap = H::new();
    let mut live: Vec<(H::Handle, i32)> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(k) => {
                let h = heap.insert(k);
                live.push((h, k));
            }
            Op::ExtractMin => {
                let expected = live.iter().map(|&(_, k)| k).min();
                let got = heap.extract_min();
                prop_assert_eq!(got, expected);
                if let Some(k) = got {
                    // Any live entry with that key may have been extracted;
                    // the one whose handle went stale is the one removed
                    let pos = live
                        .iter()
                        .position(|(h, key)| *key == k && heap.get(h).is_none());
                    prop_assert!(pos.is_some(), "extracted key {} has no stale handle", k);
                    live.swap_remove(pos.unwrap());
                }
            }
            Op::DecreaseKey(i, delta) => {
                if !live.is_empty() {
                    let idx = i % live.len();
                    let (h, k) = live[idx];
                    let new_key = k - delta;
                    prop_assert_eq!(heap.decrease_key(&h, new_key), Ok(()));
                    live[idx].1 = new_key;
                }
            }
            Op::TryChangeKey(i, delta) => {
                if !live.is_empty() {
                    let idx = i % live.len();
                    let (h, k) = live[idx];
                    let result = heap.decrease_key(&h, k + delta);
                    if delta > 0 {
                        prop_assert_eq!(result, Err(HeapError::InvalidArgument));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        live[idx].1 = k + delta;
                    }
                }
            }
            Op::Delete(i) => {
                if !live.is_empty() {
                    let idx = i % live.len();
                    let (h, k) = live.swap_remove(idx);
                    prop_assert_eq!(heap.delete(&h), Ok(k));
                    prop_assert_eq!(heap.delete(&h), Err(HeapError::InvalidHandle));
                }
            }
        }

        prop_assert_eq!(heap.check(), Ok(()));
        prop_assert_eq!(heap.len(), live.len());
        prop_assert_eq!(heap.is_empty(), live.is_empty());
        prop_assert_eq!(
            heap.find_min().copied(),
            live.iter().map(|&(_, k)| k).min()
        );
        for (h, k) in &live {
            prop_assert_eq!(heap.get(h), Some(k));
        }
    }

    // Draining yields the model's keys in sorted order
    let mut expected: Vec<i32> = live.iter().map(|&(_, k)| k).collect();
    expected.sort();
    let mut drained = Vec::new();
    while let Some(k) = heap.extract_min() {
        drained.push(k);
    }
    prop_assert_eq!(drained, expected);
    Ok(())
}

/// Merged heap holds the multiset union and keeps the handles of both heaps
fn run_merge<H: MergeableHeap<i32> + Checked>(
    left: Vec<i32>,
    right: Vec<i32>,
) -> Result<(), TestCaseError> {
    let mut heap1 = H::new();
    let mut heap2 = H::new();
    let left_handles: Vec<_> = left.iter().map(|&k| heap1.insert(k)).collect();
    let right_handles: Vec<_> = right.iter().map(|&k| heap2.insert(k)).collect();

    let mut heap = heap1.merge(heap2);
    prop_assert_eq!(heap.check(), Ok(()));
    prop_assert_eq!(heap.len(), left.len() + right.len());
    for (h, k) in left_handles.iter().zip(&left) {
        prop_assert_eq!(heap.get(h), Some(k));
    }
    for (h, k) in right_handles.iter().zip(&right) {
        prop_assert_eq!(heap.get(h), Some(k));
    }

    // Lower every other key from each side through its original handle
    let mut expected = Vec::new();
    let sides = [(&left_handles, &left), (&right_handles, &right)];
    for (handles, keys) in sides {
        for (i, (h, &k)) in handles.iter().zip(keys.iter()).enumerate() {
            let key = if i % 2 == 0 { k - 200 } else { k };
            prop_assert_eq!(heap.decrease_key(h, key), Ok(()));
            expected.push(key);
        }
    }
    prop_assert_eq!(heap.check(), Ok(()));
    expected.sort();

    let mut drained = Vec::new();
    while let Some(k) = heap.extract_min() {
        drained.push(k);
        prop_assert_eq!(heap.check(), Ok(()));
    }
    prop_assert_eq!(drained, expected);
    Ok(())
}

/// Adversarial decrease-key pattern: build trees, then decrease many keys deep
/// in them to drive long cascading-cut chains
fn run_cascade<H: MergeableHeap<i32> + Checked>(
    n: usize,
    victims: Vec<usize>,
) -> Result<(), TestCaseError> {
    let mut heap = H::new();
    let mut live: Vec<(H::Handle, i32)> =
        (0..n as i32).map(|k| (heap.insert(k * 10), k * 10)).collect();

    // Extract the minimum so the roots consolidate
    prop_assert_eq!(heap.extract_min(), Some(0));
    live.remove(0);

    let mut floor = -1;
    for v in victims {
        if live.is_empty() {
            break;
        }
        let idx = v % live.len();
        let (h, _) = live[idx];
        prop_assert_eq!(heap.decrease_key(&h, floor), Ok(()));
        live[idx].1 = floor;
        floor -= 1;
        prop_assert_eq!(heap.check(), Ok(()));

        // Periodic extraction re-consolidates, mixing marked nodes into new trees
        if floor % 7 == 0 {
            let expected = live.iter().map(|&(_, k)| k).min();
            prop_assert_eq!(heap.extract_min(), expected);
            let pos = live.iter().position(|&(_, k)| Some(k) == expected);
            live.remove(pos.unwrap());
            prop_assert_eq!(heap.check(), Ok(()));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_fibonacci_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        run_model::<FibonacciHeap<i32>>(ops)?;
    }

    #[test]
    fn test_binomial_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        run_model::<BinomialHeap<i32>>(ops)?;
    }

    #[test]
    fn test_fibonacci_merge(
        left in prop::collection::vec(-100i32..100, 0..60),
        right in prop::collection::vec(-100i32..100, 0..60)
    ) {
        run_merge::<FibonacciHeap<i32>>(left, right)?;
    }

    #[test]
    fn test_binomial_merge(
        left in prop::collection::vec(-100i32..100, 0..60),
        right in prop::collection::vec(-100i32..100, 0..60)
    ) {
        run_merge::<BinomialHeap<i32>>(left, right)?;
    }

    #[test]
    fn test_fibonacci_degree_bound_under_cascades(
        n in 2usize..300,
        victims in prop::collection::vec(any::<usize>(), 0..150)
    ) {
        run_cascade::<FibonacciHeap<i32>>(n, victims)?;
    }

    #[test]
    fn test_binomial_shape_under_decreases(
        n in 2usize..300,
        victims in prop::collection::vec(any::<usize>(), 0..150)
    ) {
        run_cascade::<BinomialHeap<i32>>(n, victims)?;
    }

    #[test]
    fn test_skiplist_matches_ordered_set(
        seed in any::<u64>(),
        ops in prop::collection::vec((prop::bool::weighted(0.6), -200i32..200), 0..300)
    ) {
        let mut list = SkipList::with_config(SkipListConfig {
            seed: Some(seed),
            ..SkipListConfig::default()
        }).unwrap();
        let mut model = BTreeSet::new();

        for (insert, key) in ops {
            if insert {
                prop_assert_eq!(list.insert(key), model.insert(key));
            } else {
                prop_assert_eq!(list.delete(&key), model.take(&key));
            }
            prop_assert_eq!(list.check_structure(), Ok(()));
            prop_assert_eq!(list.len(), model.len());
            prop_assert_eq!(list.find_min(), model.iter().next());
        }

        let listed: Vec<i32> = list.iter().copied().collect();
        let modeled: Vec<i32> = model.into_iter().collect();
        prop_assert_eq!(listed, modeled);
    }
}
