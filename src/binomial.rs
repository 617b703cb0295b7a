//! Binomial Heap implementation
//!
//! A binomial heap is a collection of binomial trees with:
//! - O(log n) insert and extract_min
//! - O(log n) decrease_key
//! - O(log n) root-list union on merge, after moving the smaller heap's nodes
//!   into the larger heap's arena
//!
//! Binomial heaps are simpler than Fibonacci heaps but have worse
//! amortized bounds for decrease_key.
//!
//! # Algorithm Overview
//!
//! The roots form a singly linked list sorted by ascending degree, with at most
//! one tree of each degree. This is analogous to the binary representation of n.
//!
//! **Binomial Tree Bₖ**: Recursively defined:
//! - B₀ is a single node
//! - Bₖ is formed by linking two B_{k-1} trees
//! - Bₖ has exactly 2ᵏ nodes and its root has children B_{k-1}, ..., B₀
//!
//! **Key Operations**:
//! - **Union**: interleave both root lists by degree, then walk the result and
//!   link equal-degree neighbours (carry propagation in binary addition)
//! - **Insert**: union with a single-node list
//! - **Extract-min**: remove the minimum root and union its reversed child list
//!   back into the root list
//! - **Decrease-key**: bubble the key up inside its tree (no cutting)
//!
//! # Handles
//!
//! Bubbling up moves keys between nodes instead of moving nodes. A handle
//! therefore names an entry in a small handle table, and every swap re-points
//! the two entries involved, so a handle keeps naming its own key. Entries of a
//! merged-in heap are reached through the heap's alias tables.

use crate::degree::{self, Degree};
use crate::storage::{Aliases, Arena, ArenaId, EntryKey, NodeKey};
use crate::traits::{Handle, HeapError, MergeableHeap, StructureError};
use log::{debug, trace};
use std::fmt;
use std::mem;

/// Handle to a key in a Binomial heap
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BinomialHandle {
    arena: ArenaId,
    entry: EntryKey,
}

impl Handle for BinomialHandle {}

/// Internal node structure for binomial heap
///
/// - `parent`: None if root
/// - `child`: head of the child list, None if leaf
/// - `sibling`: next root in the root list, or next child in the parent's child list
/// - `entry`: the handle table slot that currently points at this node
struct Node<K> {
    key: K,
    entry: EntryKey,
    parent: Option<NodeKey>,
    child: Option<NodeKey>,
    sibling: Option<NodeKey>,
    degree: Degree,
}

/// Binomial Heap
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::binomial::BinomialHeap;
/// use mergeable_heaps::MergeableHeap;
///
/// let mut heap = BinomialHeap::new();
/// let handle = heap.insert(5);
/// heap.insert(3);
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.find_min(), Some(&1));
/// ```
pub struct BinomialHeap<K> {
    nodes: Arena<NodeKey, Node<K>>,
    /// Handle table: entry -> node currently holding the entry's key
    entries: Arena<EntryKey, NodeKey>,
    /// Handle translation for entry tables absorbed by merges
    aliases: Aliases<EntryKey>,
    /// First root of the degree-ascending root list
    head: Option<NodeKey>,
}

impl<K: Ord> MergeableHeap<K> for BinomialHeap<K> {
    type Handle = BinomialHandle;

    fn new() -> Self {
        Self {
            nodes: Arena::new(),
            entries: Arena::new(),
            aliases: Aliases::new(),
            head: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts a new key
    ///
    /// **Time Complexity**: O(log n) worst-case, when the new B₀ tree triggers a
    /// carry through every degree.
    fn insert(&mut self, key: K) -> Self::Handle {
        let node = self.nodes.insert(Node {
            key,
            entry: EntryKey::default(),
            parent: None,
            child: None,
            sibling: None,
            degree: 0,
        });
        let entry = self.entries.insert(node);
        self.nodes[node].entry = entry;

        self.head = self.union(self.head, Some(node));

        BinomialHandle {
            arena: self.entries.id(),
            entry,
        }
    }

    /// Returns the minimum key by scanning the O(log n) roots
    fn find_min(&self) -> Option<&K> {
        self.min_root().map(|(_, root)| &self.nodes[root].key)
    }

    /// Removes and returns the minimum key
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// When the root of a Bₖ tree is removed, its children are Bₖ₋₁, ..., B₀
    /// trees; reversed, they form a valid degree-ascending root list.
    fn extract_min(&mut self) -> Option<K> {
        let (prev, root) = self.min_root()?;
        Some(self.remove_root(prev, root))
    }

    /// Moves the smaller heap's nodes into the larger heap's arena, then
    /// unions the root lists
    fn merge(mut self, mut other: Self) -> Self {
        if other.nodes.len() > self.nodes.len() {
            mem::swap(&mut self, &mut other);
        }

        let other_head = other.head;
        let node_map = self.nodes.absorb(other.nodes);
        let entry_map = self.entries.absorb(other.entries);
        self.aliases.absorb(&entry_map, other.aliases);

        for moved in node_map.moved() {
            let node = &mut self.nodes[moved];
            node.entry = entry_map.key(node.entry);
            node.parent = node.parent.map(|p| node_map.key(p));
            node.child = node.child.map(|c| node_map.key(c));
            node.sibling = node.sibling.map(|s| node_map.key(s));
        }
        for moved in entry_map.moved() {
            let target = &mut self.entries[moved];
            *target = node_map.key(*target);
        }

        let other_head = other_head.map(|h| node_map.key(h));
        self.head = self.union(self.head, other_head);
        debug!("binomial merge: {} nodes after merge", self.nodes.len());
        self
    }

    /// Decreases a key by bubbling it up inside its tree
    ///
    /// **Time Complexity**: O(log n) worst-case: the tree height is at most log n
    /// and each step is a swap with the parent.
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        let node = self.resolve(handle)?;

        if new_key > self.nodes[node].key {
            return Err(HeapError::InvalidArgument);
        }
        self.nodes[node].key = new_key;

        self.bubble_up(node, false);
        Ok(())
    }

    /// Bubbles the key to its tree root as if it were negative infinity, then
    /// removes that root
    fn delete(&mut self, handle: &Self::Handle) -> Result<K, HeapError> {
        let node = self.resolve(handle)?;
        let root = self.bubble_up(node, true);

        let mut prev = None;
        let mut current = self.head;
        while let Some(c) = current {
            if c == root {
                return Ok(self.remove_root(prev, root));
            }
            prev = Some(c);
            current = self.nodes[c].sibling;
        }
        // A consistent heap always finds the tree root in the root list
        Err(HeapError::InvalidHandle)
    }

    fn get(&self, handle: &Self::Handle) -> Option<&K> {
        self.resolve(handle).ok().map(|node| &self.nodes[node].key)
    }
}

impl<K: Ord> BinomialHeap<K> {
    /// Verifies every structural invariant by full traversal
    ///
    /// Checks that root degrees strictly ascend, that every subtree is a
    /// binomial tree of its degree, heap order, parent links, handle table
    /// back-pointers and the node count.
    pub fn check_structure(&self) -> Result<(), StructureError> {
        let mut count = 0;
        let mut last_degree: Option<Degree> = None;
        let mut current = self.head;

        while let Some(root) = current {
            let node = &self.nodes[root];
            if node.parent.is_some() {
                return Err(StructureError::BrokenParentLink);
            }
            if last_degree.is_some_and(|d| d >= node.degree) {
                return Err(StructureError::DuplicateRootDegree);
            }
            last_degree = Some(node.degree);
            count += self.check_tree(root)?;
            current = node.sibling;
        }

        if count != self.nodes.len() || count != self.entries.len() {
            return Err(StructureError::CountMismatch);
        }
        Ok(())
    }

    fn resolve(&self, handle: &BinomialHandle) -> Result<NodeKey, HeapError> {
        self.aliases
            .resolve(&self.entries, handle.arena, handle.entry)
            .map(|entry| self.entries[entry])
            .ok_or(HeapError::InvalidHandle)
    }

    /// Minimum root and its predecessor in the root list; ties keep the first root
    fn min_root(&self) -> Option<(Option<NodeKey>, NodeKey)> {
        let mut best_prev = None;
        let mut best = self.head?;
        let mut prev = best;
        let mut current = self.nodes[best].sibling;

        while let Some(c) = current {
            if self.nodes[c].key < self.nodes[best].key {
                best = c;
                best_prev = Some(prev);
            }
            prev = c;
            current = self.nodes[c].sibling;
        }
        Some((best_prev, best))
    }

    /// Splices `root` out of the root list and unions its children back in
    fn remove_root(&mut self, prev: Option<NodeKey>, root: NodeKey) -> K {
        let after = self.nodes[root].sibling;
        match prev {
            Some(p) => self.nodes[p].sibling = after,
            None => self.head = after,
        }

        // Children were linked newest-first (descending degree); reverse them
        let mut reversed = None;
        let mut child = self.nodes[root].child.take();
        while let Some(c) = child {
            let node = &mut self.nodes[c];
            child = node.sibling;
            node.sibling = reversed;
            node.parent = None;
            reversed = Some(c);
        }

        self.head = self.union(self.head, reversed);

        let removed = self
            .nodes
            .remove(root)
            .expect("removed root must be a live node");
        self.entries.remove(removed.entry);
        removed.key
    }

    /// Interleaves two degree-sorted root lists into one degree-sorted list
    ///
    /// The result may hold two roots of the same degree next to each other;
    /// [`union`](Self::union) resolves them.
    fn merge_root_lists(&mut self, a: Option<NodeKey>, b: Option<NodeKey>) -> Option<NodeKey> {
        let (mut a, mut b) = match (a, b) {
            (None, rest) | (rest, None) => return rest,
            (Some(a), Some(b)) => (Some(a), Some(b)),
        };

        let mut head: Option<NodeKey> = None;
        let mut tail: Option<NodeKey> = None;

        while let (Some(x), Some(y)) = (a, b) {
            let next = if self.nodes[x].degree <= self.nodes[y].degree {
                a = self.nodes[x].sibling;
                x
            } else {
                b = self.nodes[y].sibling;
                y
            };
            match tail {
                Some(t) => self.nodes[t].sibling = Some(next),
                None => head = Some(next),
            }
            tail = Some(next);
        }

        if let Some(t) = tail {
            self.nodes[t].sibling = a.or(b);
        }
        head
    }

    /// Unions two root lists, linking equal-degree roots like a binary carry
    ///
    /// Three consecutive roots of one degree happen when a carry meets two
    /// existing trees; the walk skips the first so the carry links with the
    /// later pair, keeping the list degree-sorted.
    fn union(&mut self, a: Option<NodeKey>, b: Option<NodeKey>) -> Option<NodeKey> {
        let mut head = self.merge_root_lists(a, b)?;

        let mut prev: Option<NodeKey> = None;
        let mut current = head;
        let mut next = self.nodes[current].sibling;

        while let Some(n) = next {
            let current_degree = self.nodes[current].degree;
            let third_matches = self.nodes[n]
                .sibling
                .is_some_and(|s| self.nodes[s].degree == current_degree);

            if current_degree != self.nodes[n].degree || third_matches {
                prev = Some(current);
                current = n;
            } else if self.nodes[current].key <= self.nodes[n].key {
                self.nodes[current].sibling = self.nodes[n].sibling;
                self.link(n, current);
            } else {
                match prev {
                    Some(p) => self.nodes[p].sibling = Some(n),
                    None => head = n,
                }
                self.link(current, n);
                current = n;
            }
            next = self.nodes[current].sibling;
        }

        Some(head)
    }

    /// Makes root `child` the first child of root `parent`
    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        trace!("binomial link at degree {}", self.nodes[parent].degree);
        let first = self.nodes[parent].child;
        {
            let c = &mut self.nodes[child];
            c.parent = Some(parent);
            c.sibling = first;
        }
        let p = &mut self.nodes[parent];
        p.child = Some(child);
        p.degree = degree::checked_increment(p.degree);
    }

    /// Moves the key at `node` upward by swapping with parents
    ///
    /// Stops when the parent key is not larger, or at the tree root when
    /// `to_root` is set. Returns the node now holding the key.
    fn bubble_up(&mut self, node: NodeKey, to_root: bool) -> NodeKey {
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            if !to_root && self.nodes[current].key >= self.nodes[parent].key {
                break;
            }
            self.swap_payload(current, parent);
            current = parent;
        }
        current
    }

    /// Swaps keys and handle entries between two nodes
    fn swap_payload(&mut self, a: NodeKey, b: NodeKey) {
        let [x, y] = self
            .nodes
            .get_disjoint_mut([a, b])
            .expect("parent and child are distinct live nodes");
        mem::swap(&mut x.key, &mut y.key);
        mem::swap(&mut x.entry, &mut y.entry);
        let (entry_a, entry_b) = (x.entry, y.entry);
        self.entries[entry_a] = a;
        self.entries[entry_b] = b;
    }

    /// Returns the size of the tree rooted at `root` after checking it is a
    /// binomial tree
    fn check_tree(&self, root: NodeKey) -> Result<usize, StructureError> {
        // (node, index of its parent in `order`); parents precede children
        let mut order: Vec<(NodeKey, Option<usize>)> = Vec::new();
        let mut stack = vec![(root, None)];

        while let Some((key, parent_index)) = stack.pop() {
            let index = order.len();
            order.push((key, parent_index));

            let node = &self.nodes[key];
            if self.entries.get(node.entry) != Some(&key) {
                return Err(StructureError::BrokenParentLink);
            }

            let mut seen_degrees: u64 = 0;
            let mut children = 0;
            let mut current = node.child;
            while let Some(c) = current {
                let child = &self.nodes[c];
                if child.parent != Some(key) {
                    return Err(StructureError::BrokenParentLink);
                }
                if child.key < node.key {
                    return Err(StructureError::HeapOrder);
                }
                if child.degree >= node.degree || seen_degrees & (1 << child.degree) != 0 {
                    return Err(StructureError::BinomialShape);
                }
                seen_degrees |= 1 << child.degree;
                children += 1;
                stack.push((c, Some(index)));
                current = child.sibling;
            }
            if children != node.degree as usize {
                return Err(StructureError::DegreeMismatch);
            }
        }

        let mut sizes = vec![1usize; order.len()];
        for index in (0..order.len()).rev() {
            let (key, parent_index) = order[index];
            if sizes[index] != 1usize << self.nodes[key].degree {
                return Err(StructureError::BinomialShape);
            }
            if let Some(p) = parent_index {
                sizes[p] += sizes[index];
            }
        }
        Ok(sizes[0])
    }
}

impl<K: Ord> Default for BinomialHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Extend<K> for BinomialHeap<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for BinomialHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for BinomialHeap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinomialHeap")
            .field("len", &self.nodes.len())
            .field("min", &self.find_min())
            .finish()
    }
}
