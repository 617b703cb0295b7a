//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) insert and find_min
//! - O(1) amortized decrease_key
//! - O(log n) amortized extract_min and delete
//! - merge: O(1) ring splice, plus moving the smaller heap's nodes into the
//!   larger heap's arena (O(log n) amortized per key over any merge sequence)
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked ring, and so is every node's list of children.
//! The heap maintains a pointer to the minimum root.
//!
//! Nodes live in an arena and every link is an arena key, so the rings are
//! index-based and a node can move between the root ring and any child ring by
//! rewriting its `next`/`prev`/`parent` fields. After a merge, handles issued by
//! either heap keep working through the heap's alias tables.
//!
//! # Algorithm Overview
//!
//! - **Insert / merge** splice into the root ring and do no cleanup.
//! - **Extract-min** promotes the children of the minimum to roots, then
//!   *consolidates*: roots of equal degree are linked until every degree is
//!   unique, which pays for all the cheap inserts before it.
//! - **Decrease-key** cuts a node whose key drops below its parent's, and
//!   *cascading cut* moves up through marked ancestors. A node loses at most
//!   one child before being cut itself, so a degree-`d` node always has at
//!   least `F(d+2)` nodes in its subtree.

use crate::degree::{self, Degree};
use crate::storage::{Aliases, Arena, ArenaId, NodeKey};
use crate::traits::{Handle, HeapError, MergeableHeap, StructureError};
use log::{debug, trace};
use std::fmt;
use std::mem;

/// Handle to a key in a Fibonacci heap
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FibonacciHandle {
    arena: ArenaId,
    node: NodeKey,
}

impl Handle for FibonacciHandle {}

struct Node<K> {
    key: K,
    parent: Option<NodeKey>,
    child: Option<NodeKey>,
    next: NodeKey,
    prev: NodeKey,
    degree: Degree,
    marked: bool,
}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::fibonacci::FibonacciHeap;
/// use mergeable_heaps::MergeableHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5);
/// heap.insert(3);
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.extract_min(), Some(1));
/// assert_eq!(heap.extract_min(), Some(3));
/// ```
pub struct FibonacciHeap<K> {
    nodes: Arena<NodeKey, Node<K>>,
    /// Handle translation for arenas absorbed by merges
    aliases: Aliases<NodeKey>,
    min: Option<NodeKey>,
}

impl<K: Ord> MergeableHeap<K> for FibonacciHeap<K> {
    type Handle = FibonacciHandle;

    fn new() -> Self {
        Self {
            nodes: Arena::new(),
            aliases: Aliases::new(),
            min: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn insert(&mut self, key: K) -> Self::Handle {
        let node = self.nodes.insert_with_key(|me| Node {
            key,
            parent: None,
            child: None,
            next: me,
            prev: me,
            degree: 0,
            marked: false,
        });

        self.add_root(node);
        if let Some(min) = self.min {
            if self.nodes[node].key < self.nodes[min].key {
                self.min = Some(node);
            }
        }

        FibonacciHandle {
            arena: self.nodes.id(),
            node,
        }
    }

    fn find_min(&self) -> Option<&K> {
        self.min.map(|min| &self.nodes[min].key)
    }

    fn extract_min(&mut self) -> Option<K> {
        let z = self.min?;

        // Promote every child to the root ring in one splice
        if let Some(child) = self.nodes[z].child.take() {
            for c in self.ring(child) {
                let node = &mut self.nodes[c];
                node.parent = None;
                node.marked = false;
            }
            self.concat_rings(z, child);
            self.nodes[z].degree = 0;
        }

        let next = self.nodes[z].next;
        if next == z {
            self.min = None;
        } else {
            self.unlink(z);
            self.min = Some(next);
            self.consolidate(next);
        }

        self.nodes.remove(z).map(|node| node.key)
    }

    /// Joins the root rings in O(1) after moving the smaller heap's nodes into
    /// the larger heap's arena
    fn merge(mut self, mut other: Self) -> Self {
        if other.nodes.len() > self.nodes.len() {
            mem::swap(&mut self, &mut other);
        }

        let other_min = other.min;
        let remap = self.nodes.absorb(other.nodes);
        self.aliases.absorb(&remap, other.aliases);

        for moved in remap.moved() {
            let node = &mut self.nodes[moved];
            node.parent = node.parent.map(|p| remap.key(p));
            node.child = node.child.map(|c| remap.key(c));
            node.next = remap.key(node.next);
            node.prev = remap.key(node.prev);
        }

        if let Some(other_min) = other_min.map(|m| remap.key(m)) {
            match self.min {
                None => self.min = Some(other_min),
                Some(min) => {
                    self.concat_rings(min, other_min);
                    if self.nodes[other_min].key < self.nodes[min].key {
                        self.min = Some(other_min);
                    }
                }
            }
        }
        debug!(
            "fibonacci merge: moved {} nodes, {} after merge",
            remap.moved().count(),
            self.nodes.len()
        );
        self
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        let node = self.resolve(handle)?;

        if new_key > self.nodes[node].key {
            return Err(HeapError::InvalidArgument);
        }
        self.nodes[node].key = new_key;

        if let Some(parent) = self.nodes[node].parent {
            if self.nodes[node].key < self.nodes[parent].key {
                self.cut(node, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(min) = self.min {
            if self.nodes[node].key < self.nodes[min].key {
                self.min = Some(node);
            }
        }
        Ok(())
    }

    fn delete(&mut self, handle: &Self::Handle) -> Result<K, HeapError> {
        let node = self.resolve(handle)?;

        // Same structural effect as decreasing to negative infinity
        if let Some(parent) = self.nodes[node].parent {
            self.cut(node, parent);
            self.cascading_cut(parent);
        }
        self.min = Some(node);

        self.extract_min().ok_or(HeapError::InvalidHandle)
    }

    fn get(&self, handle: &Self::Handle) -> Option<&K> {
        self.resolve(handle).ok().map(|node| &self.nodes[node].key)
    }
}

impl<K: Ord> FibonacciHeap<K> {
    /// Verifies every structural invariant by full traversal
    ///
    /// Checks ring consistency, parent links, heap order, stored degrees, the
    /// `F(d+2)` subtree bound, the minimum pointer and the node count.
    pub fn check_structure(&self) -> Result<(), StructureError> {
        let Some(min) = self.min else {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                Err(StructureError::CountMismatch)
            };
        };

        let mut count = 0;
        for root in self.checked_ring(min)? {
            if self.nodes[root].parent.is_some() {
                return Err(StructureError::BrokenParentLink);
            }
            if self.nodes[root].key < self.nodes[min].key {
                return Err(StructureError::StaleMinimum);
            }
            count += self.check_tree(root)?;
        }

        if count != self.nodes.len() {
            return Err(StructureError::CountMismatch);
        }
        Ok(())
    }

    fn resolve(&self, handle: &FibonacciHandle) -> Result<NodeKey, HeapError> {
        self.aliases
            .resolve(&self.nodes, handle.arena, handle.node)
            .ok_or(HeapError::InvalidHandle)
    }

    /// Keys of a ring, starting at `start`
    fn ring(&self, start: NodeKey) -> Vec<NodeKey> {
        let mut keys = vec![start];
        let mut current = self.nodes[start].next;
        while current != start {
            keys.push(current);
            current = self.nodes[current].next;
        }
        keys
    }

    /// Adds a detached node to the root ring, next to the minimum
    fn add_root(&mut self, node: NodeKey) {
        match self.min {
            None => {
                let n = &mut self.nodes[node];
                n.next = node;
                n.prev = node;
                self.min = Some(node);
            }
            Some(min) => self.insert_after(min, node),
        }
    }

    /// Splices a single node into the ring containing `anchor`
    fn insert_after(&mut self, anchor: NodeKey, node: NodeKey) {
        let after = self.nodes[anchor].next;
        {
            let n = &mut self.nodes[node];
            n.prev = anchor;
            n.next = after;
        }
        self.nodes[after].prev = node;
        self.nodes[anchor].next = node;
    }

    /// Removes a node from its ring, leaving it as a singleton ring
    fn unlink(&mut self, node: NodeKey) {
        let (prev, next) = {
            let n = &self.nodes[node];
            (n.prev, n.next)
        };
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        let n = &mut self.nodes[node];
        n.next = node;
        n.prev = node;
    }

    /// Joins two disjoint rings into one
    fn concat_rings(&mut self, a: NodeKey, b: NodeKey) {
        let a_next = self.nodes[a].next;
        let b_prev = self.nodes[b].prev;
        self.nodes[a].next = b;
        self.nodes[b].prev = a;
        self.nodes[b_prev].next = a_next;
        self.nodes[a_next].prev = b_prev;
    }

    /// Links roots of equal degree until every degree is unique
    fn consolidate(&mut self, start: NodeKey) {
        let roots = self.ring(start);
        let root_count = roots.len();
        let mut buckets: Vec<Option<NodeKey>> =
            vec![None; degree::bucket_capacity(self.nodes.len())];

        for root in roots {
            let mut x = root;
            let mut d = self.nodes[x].degree as usize;

            loop {
                if d >= buckets.len() {
                    buckets.resize(d + 1, None);
                }
                let Some(mut y) = buckets[d].take() else {
                    break;
                };
                if self.nodes[x].key > self.nodes[y].key {
                    mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                d += 1;
            }

            buckets[d] = Some(x);
        }

        // Survivors are still in the root ring; only the minimum moves
        self.min = None;
        let mut survivors = 0;
        for root in buckets.into_iter().flatten() {
            survivors += 1;
            let smaller = match self.min {
                Some(min) => self.nodes[root].key < self.nodes[min].key,
                None => true,
            };
            if smaller {
                self.min = Some(root);
            }
        }

        debug!(
            "fibonacci consolidate: {} roots -> {} roots",
            root_count, survivors
        );
    }

    /// Makes root `y` a child of root `x`
    fn link(&mut self, y: NodeKey, x: NodeKey) {
        self.unlink(y);
        {
            let child = &mut self.nodes[y];
            child.parent = Some(x);
            child.marked = false;
        }

        let first_child = self.nodes[x].child;
        match first_child {
            None => self.nodes[x].child = Some(y),
            Some(first) => self.insert_after(first, y),
        }

        let parent = &mut self.nodes[x];
        parent.degree = degree::checked_increment(parent.degree);
    }

    /// Moves `node` out of `parent`'s child ring into the root ring
    fn cut(&mut self, node: NodeKey, parent: NodeKey) {
        trace!("fibonacci cut");
        if self.nodes[parent].child == Some(node) {
            let next = self.nodes[node].next;
            self.nodes[parent].child = if next == node { None } else { Some(next) };
        }
        self.unlink(node);

        let p = &mut self.nodes[parent];
        p.degree = degree::saturating_decrement(p.degree);

        self.add_root(node);
        let n = &mut self.nodes[node];
        n.parent = None;
        n.marked = false;
    }

    /// Walks up from `start`, cutting marked ancestors until an unmarked one or a root
    fn cascading_cut(&mut self, start: NodeKey) {
        let mut current = start;
        while let Some(parent) = self.nodes[current].parent {
            if !self.nodes[current].marked {
                self.nodes[current].marked = true;
                return;
            }
            trace!("fibonacci cascading cut");
            self.cut(current, parent);
            current = parent;
        }
    }

    /// Ring keys, failing if any `prev` link disagrees with the `next` walk
    fn checked_ring(&self, start: NodeKey) -> Result<Vec<NodeKey>, StructureError> {
        let ring = self.ring(start);
        for (i, &node) in ring.iter().enumerate() {
            let expected_prev = ring[(i + ring.len() - 1) % ring.len()];
            if self.nodes[node].prev != expected_prev {
                return Err(StructureError::BrokenSiblingLink);
            }
        }
        Ok(ring)
    }

    /// Returns the size of the tree rooted at `root` after checking it
    ///
    /// Walks with an explicit stack: cut sequences can build trees of linear
    /// height.
    fn check_tree(&self, root: NodeKey) -> Result<usize, StructureError> {
        // (node, index of its parent in `order`); parents precede children
        let mut order: Vec<(NodeKey, Option<usize>)> = Vec::new();
        let mut stack = vec![(root, None)];

        while let Some((key, parent_index)) = stack.pop() {
            let index = order.len();
            order.push((key, parent_index));
            let node = &self.nodes[key];

            let Some(first) = node.child else {
                if node.degree != 0 {
                    return Err(StructureError::DegreeMismatch);
                }
                continue;
            };
            let children = self.checked_ring(first)?;
            if children.len() != node.degree as usize {
                return Err(StructureError::DegreeMismatch);
            }
            for child in children {
                if self.nodes[child].parent != Some(key) {
                    return Err(StructureError::BrokenParentLink);
                }
                if self.nodes[child].key < node.key {
                    return Err(StructureError::HeapOrder);
                }
                stack.push((child, Some(index)));
            }
        }

        let mut sizes = vec![1usize; order.len()];
        for index in (0..order.len()).rev() {
            let (key, parent_index) = order[index];
            if sizes[index] < degree::fibonacci_floor(self.nodes[key].degree) {
                return Err(StructureError::DegreeBound);
            }
            if let Some(p) = parent_index {
                sizes[p] += sizes[index];
            }
        }
        Ok(sizes[0])
    }
}

impl<K: Ord> Default for FibonacciHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Extend<K> for FibonacciHeap<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for FibonacciHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for FibonacciHeap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FibonacciHeap")
            .field("len", &self.nodes.len())
            .field("min", &self.find_min())
            .finish()
    }
}
