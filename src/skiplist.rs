//! Skip List implementation
//!
//! A probabilistic ordered set with O(1) access to its minimum.
//!
//! # Time Complexity
//!
//! | Operation  | Complexity        |
//! |------------|-------------------|
//! | `insert`   | O(log n) expected |
//! | `delete`   | O(log n) expected |
//! | `find_min` | O(1)              |
//! | `pop_min`  | O(1) expected     |
//!
//! Every node sits on tier 0 and is promoted to each further tier with
//! probability `P`, up to `max_level`. Tier 0 is a fully ordered list, so the
//! minimum is always the first node after the header.
//!
//! Unlike the heaps in this crate there is no `decrease_key`: keys are the
//! ordering, and changing one is a delete followed by an insert.
//!
//! # Example
//!
//! ```rust
//! use mergeable_heaps::skiplist::SkipList;
//!
//! let mut list = SkipList::new();
//! list.insert(10);
//! list.insert(5);
//! list.insert(20);
//! assert_eq!(list.find_min(), Some(&5));
//! assert_eq!(list.delete(&5), Some(5));
//! assert_eq!(list.find_min(), Some(&10));
//! ```

use crate::storage::{Arena, NodeKey};
use crate::traits::{HeapError, StructureError};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Default highest tier index; a list has `max_level + 1` tiers
pub const DEFAULT_MAX_LEVEL: usize = 6;

/// Largest accepted `max_level`; 2^64 keys never need more tiers
pub const MAX_LEVEL_LIMIT: usize = 64;

/// Default probability of promoting a node one tier up
pub const DEFAULT_PROMOTION_PROBABILITY: f64 = 0.5;

/// Forward pointers of one node, or of the header; inline for the default height
type Tower = SmallVec<[Option<NodeKey>; DEFAULT_MAX_LEVEL + 1]>;

/// Skip list settings
#[derive(Debug, Clone, PartialEq)]
pub struct SkipListConfig {
    /// Highest tier index
    pub max_level: usize,
    /// Success probability of each promotion coin flip, in `[0, 1]`
    pub promotion_probability: f64,
    /// Seed for the level generator; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            promotion_probability: DEFAULT_PROMOTION_PROBABILITY,
            seed: None,
        }
    }
}

struct Node<K> {
    key: K,
    forward: Tower,
}

/// Ordered set backed by a skip list
///
/// Duplicate keys are ignored.
pub struct SkipList<K> {
    nodes: Arena<NodeKey, Node<K>>,
    /// Header tower: first node on each tier
    head: Tower,
    /// Highest tier currently in use
    level: usize,
    config: SkipListConfig,
    rng: StdRng,
}

impl<K: Ord> SkipList<K> {
    /// Creates an empty list with the default configuration
    pub fn new() -> Self {
        Self::build(SkipListConfig::default())
    }

    /// Creates an empty list with the given configuration
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidArgument`] if the promotion probability is
    /// not a number in `[0, 1]`, or if `max_level` exceeds [`MAX_LEVEL_LIMIT`].
    pub fn with_config(config: SkipListConfig) -> Result<Self, HeapError> {
        if !(0.0..=1.0).contains(&config.promotion_probability)
            || config.max_level > MAX_LEVEL_LIMIT
        {
            return Err(HeapError::InvalidArgument);
        }
        Ok(Self::build(config))
    }

    fn build(config: SkipListConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            nodes: Arena::new(),
            head: smallvec![None; config.max_level + 1],
            level: 0,
            config,
            rng,
        }
    }

    /// Returns the number of keys
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the list holds no keys
    pub fn is_empty(&self) -> bool {
        self.head[0].is_none()
    }

    /// Highest tier currently holding a node (0 when empty)
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns the configuration the list was built with
    pub fn config(&self) -> &SkipListConfig {
        &self.config
    }

    /// Draws a tower height: count successful coin flips, capped at `max_level`
    pub fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level < self.config.max_level
            && self.rng.gen_bool(self.config.promotion_probability)
        {
            level += 1;
        }
        level
    }

    /// Inserts `key`; returns false if it was already present
    pub fn insert(&mut self, key: K) -> bool {
        let update = self.predecessors(&key);
        if self
            .forward(update[0], 0)
            .is_some_and(|n| self.nodes[n].key == key)
        {
            return false;
        }

        let height = self.random_level();
        if height > self.level {
            debug!("skiplist level {} -> {}", self.level, height);
            self.level = height;
        }

        let node = self.nodes.insert(Node {
            key,
            forward: smallvec![None; height + 1],
        });
        for (tier, &pred) in update.iter().enumerate().take(height + 1) {
            let next = self.forward(pred, tier);
            self.nodes[node].forward[tier] = next;
            self.set_forward(pred, tier, Some(node));
        }
        true
    }

    /// Removes `key`, returning it if it was present
    pub fn delete(&mut self, key: &K) -> Option<K> {
        let update = self.predecessors(key);
        let target = self.forward(update[0], 0)?;
        if self.nodes[target].key != *key {
            return None;
        }

        for (tier, &pred) in update.iter().enumerate().take(self.level + 1) {
            if self.forward(pred, tier) != Some(target) {
                break;
            }
            let next = self.nodes[target].forward[tier];
            self.set_forward(pred, tier, next);
        }

        self.shrink_level();
        self.nodes.remove(target).map(|node| node.key)
    }

    /// Returns the smallest key in O(1)
    pub fn find_min(&self) -> Option<&K> {
        self.head[0].map(|first| &self.nodes[first].key)
    }

    /// Removes and returns the smallest key
    ///
    /// The first node's predecessor on every tier it occupies is the header,
    /// so no search is needed.
    pub fn pop_min(&mut self) -> Option<K> {
        let first = self.head[0]?;
        let removed = self.nodes.remove(first)?;
        for (tier, next) in removed.forward.into_iter().enumerate() {
            self.head[tier] = next;
        }
        self.shrink_level();
        Some(removed.key)
    }

    /// Returns true if `key` is present
    pub fn contains(&self, key: &K) -> bool {
        let mut current = None;
        for tier in (0..=self.level).rev() {
            while let Some(next) = self.forward(current, tier) {
                match self.nodes[next].key.cmp(key) {
                    std::cmp::Ordering::Less => current = Some(next),
                    std::cmp::Ordering::Equal => return true,
                    std::cmp::Ordering::Greater => break,
                }
            }
        }
        false
    }

    /// Iterates the keys in ascending order
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            next: self.head[0],
        }
    }

    /// Verifies tier ordering, tower heights and the node count
    pub fn check_structure(&self) -> Result<(), StructureError> {
        for tier in 0..self.head.len() {
            let mut previous: Option<&K> = None;
            let mut current = self.head[tier];
            let mut count = 0;
            while let Some(node) = current {
                let n = &self.nodes[node];
                if n.forward.len() <= tier || tier > self.level {
                    return Err(StructureError::LevelMismatch);
                }
                if previous.is_some_and(|p| *p >= n.key) {
                    return Err(StructureError::UnorderedLevel);
                }
                previous = Some(&n.key);
                count += 1;
                current = n.forward[tier];
            }
            if tier == 0 && count != self.nodes.len() {
                return Err(StructureError::CountMismatch);
            }
        }
        if self.level > 0 && self.head[self.level].is_none() {
            return Err(StructureError::LevelMismatch);
        }
        Ok(())
    }

    /// Rightmost node strictly before `key` on every tier (`None` = header)
    fn predecessors(&self, key: &K) -> Tower {
        let mut update: Tower = smallvec![None; self.config.max_level + 1];
        let mut current = None;
        for tier in (0..=self.level).rev() {
            while let Some(next) = self.forward(current, tier) {
                if self.nodes[next].key < *key {
                    current = Some(next);
                } else {
                    break;
                }
            }
            update[tier] = current;
        }
        update
    }

    fn forward(&self, from: Option<NodeKey>, tier: usize) -> Option<NodeKey> {
        match from {
            Some(node) => self.nodes[node].forward[tier],
            None => self.head[tier],
        }
    }

    fn set_forward(&mut self, from: Option<NodeKey>, tier: usize, to: Option<NodeKey>) {
        match from {
            Some(node) => self.nodes[node].forward[tier] = to,
            None => self.head[tier] = to,
        }
    }

    fn shrink_level(&mut self) {
        let before = self.level;
        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }
        if self.level != before {
            debug!("skiplist level {} -> {}", before, self.level);
        }
    }
}

/// Ascending iterator over a [`SkipList`]
pub struct Iter<'a, K> {
    list: &'a SkipList<K>,
    next: Option<NodeKey>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.list.nodes[self.next?];
        self.next = node.forward[0];
        Some(&node.key)
    }
}

impl<'a, K: Ord> IntoIterator for &'a SkipList<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord> Default for SkipList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Extend<K> for SkipList<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for SkipList<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

/// Renders each tier top-down, one line per tier: `Level 1: 5 20`
impl<K: fmt::Display> fmt::Display for SkipList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tier in (0..=self.level).rev() {
            write!(f, "Level {}:", tier)?;
            let mut current = self.head[tier];
            while let Some(node) = current {
                write!(f, " {}", self.nodes[node].key)?;
                current = self.nodes[node].forward[tier];
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
