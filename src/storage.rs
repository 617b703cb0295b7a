//! Arena storage for heap nodes
//!
//! Every engine keeps its nodes in an [`Arena`], a `slotmap::SlotMap` tagged
//! with an [`ArenaId`]. Links between nodes (parent, child, sibling rings) are
//! plain slotmap keys, so cyclic structures never form ownership cycles and a
//! splice is a handful of key writes.
//!
//! # Handles across heaps
//!
//! Slotmap keys are generational, so a key whose slot was freed is detected.
//! A key from a *different* slotmap can still collide with a live one, which is
//! why public handles carry the arena id as well.
//!
//! # Absorbing another arena
//!
//! [`Arena::absorb`] moves every value of another arena into this one and
//! returns a [`Remap`] from old keys to new keys. Values are moved as-is;
//! the caller rewrites the links inside them with [`Remap::key`].
//!
//! Handles stamped with the absorbed arena's id keep working through
//! [`Aliases`]: the heap records each remap and [`Aliases::resolve`] follows it.
//! Alias tables of an absorbed heap are composed with the new remap, so a
//! handle survives any chain of merges.

use slotmap::{Key, SecondaryMap, SlotMap};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

slotmap::new_key_type! {
    /// Key of a heap node inside its arena
    pub(crate) struct NodeKey;

    /// Key of a binomial handle table entry
    pub(crate) struct EntryKey;
}

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one arena, unique for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ArenaId(u64);

impl ArenaId {
    fn fresh() -> Self {
        ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A `SlotMap` with an identity
///
/// Derefs to the underlying `SlotMap`, so indexing with a key panics if the
/// key is stale. Engines only index with keys reached through their own links;
/// keys supplied by callers go through [`Aliases::resolve`] first.
#[derive(Debug, Clone)]
pub(crate) struct Arena<K: Key, V> {
    id: ArenaId,
    slots: SlotMap<K, V>,
}

impl<K: Key, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            id: ArenaId::fresh(),
            slots: SlotMap::with_key(),
        }
    }

    pub(crate) fn id(&self) -> ArenaId {
        self.id
    }

    /// Moves all values of `other` into this arena
    ///
    /// Links stored inside the moved values still use `other`'s keys and must
    /// be rewritten through the returned [`Remap`].
    pub(crate) fn absorb(&mut self, other: Arena<K, V>) -> Remap<K> {
        let mut keys = SecondaryMap::with_capacity(other.slots.len());
        for (old, value) in other.slots {
            let new = self.slots.insert(value);
            keys.insert(old, new);
        }
        Remap {
            from: other.id,
            keys,
        }
    }
}

impl<K: Key, V> Deref for Arena<K, V> {
    type Target = SlotMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.slots
    }
}

impl<K: Key, V> DerefMut for Arena<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.slots
    }
}

/// Translation of keys after [`Arena::absorb`]
#[derive(Debug, Clone)]
pub(crate) struct Remap<K: Key> {
    from: ArenaId,
    keys: SecondaryMap<K, K>,
}

impl<K: Key> Remap<K> {
    /// New key of a value that lived in the absorbed arena
    ///
    /// # Panics
    ///
    /// Panics if `old` was not a live key of the absorbed arena. Links inside
    /// a consistent heap never point outside their own arena.
    pub(crate) fn key(&self, old: K) -> K {
        self.keys[old]
    }

    /// New keys of every moved value
    pub(crate) fn moved(&self) -> impl Iterator<Item = K> + '_ {
        self.keys.values().copied()
    }
}

/// Old handle keys of every arena a heap has absorbed, mapped to current keys
#[derive(Debug, Clone)]
pub(crate) struct Aliases<K: Key> {
    tables: HashMap<ArenaId, SecondaryMap<K, K>>,
}

impl<K: Key> Aliases<K> {
    pub(crate) fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Live key in `arena` named by a handle stamped with `stamp` and `key`
    ///
    /// Handles of `arena` itself resolve directly; handles of absorbed arenas
    /// go through their alias table. Stale keys resolve to `None` either way.
    pub(crate) fn resolve<V>(&self, arena: &Arena<K, V>, stamp: ArenaId, key: K) -> Option<K> {
        let current = if stamp == arena.id() {
            key
        } else {
            *self.tables.get(&stamp)?.get(key)?
        };
        arena.contains_key(current).then_some(current)
    }

    /// Records `remap` and takes over the alias tables of the absorbed heap
    ///
    /// `absorbed` still maps into the absorbed arena's keys; each entry is
    /// pushed through `remap`, dropping entries whose value was already removed.
    pub(crate) fn absorb(&mut self, remap: &Remap<K>, absorbed: Aliases<K>) {
        for (stamp, table) in absorbed.tables {
            let mut composed = SecondaryMap::with_capacity(table.len());
            for (old, mid) in table {
                if let Some(&new) = remap.keys.get(mid) {
                    composed.insert(old, new);
                }
            }
            self.tables.insert(stamp, composed);
        }
        self.tables.insert(remap.from, remap.keys.clone());
    }
}
