//! Common traits and error types for the mergeable heaps
//!
//! Both engines implement [`MergeableHeap`]. The trait is keyed only on the
//! priority itself: a heap stores keys of a totally ordered type `K`, and a
//! [`Handle`] returned by `insert` names one stored key until it is extracted.

use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The new key is greater than the key currently stored behind the handle
    InvalidArgument,
    /// The handle is no longer valid (element was removed, or it belongs to another heap)
    InvalidHandle,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::InvalidArgument => {
                write!(f, "new key is greater than the current key")
            }
            HeapError::InvalidHandle => {
                write!(f, "handle is no longer valid (element was removed)")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A structural defect found by a full traversal
///
/// None of these are reachable through the public API; they exist so tests can
/// assert that every operation leaves the linkage intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureError {
    /// A `next`/`prev` or `sibling` link does not agree with its neighbour
    BrokenSiblingLink,
    /// A child does not point back at its parent, or a root has a parent
    BrokenParentLink,
    /// A child key is smaller than its parent key
    HeapOrder,
    /// A node's stored degree differs from its number of children
    DegreeMismatch,
    /// Two binomial roots share a degree, or the root list is not degree-sorted
    DuplicateRootDegree,
    /// A binomial subtree does not have the shape of a binomial tree
    BinomialShape,
    /// A Fibonacci subtree is smaller than `F(degree + 2)`
    DegreeBound,
    /// The minimum pointer does not name the smallest root
    StaleMinimum,
    /// The number of reachable nodes differs from `len()`
    CountMismatch,
    /// A skip-list tier is not strictly ascending
    UnorderedLevel,
    /// A skip-list node is linked on a tier above its height, or the top level is wrong
    LevelMismatch,
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StructureError::BrokenSiblingLink => "sibling links are inconsistent",
            StructureError::BrokenParentLink => "parent links are inconsistent",
            StructureError::HeapOrder => "a child key is smaller than its parent key",
            StructureError::DegreeMismatch => "stored degree differs from child count",
            StructureError::DuplicateRootDegree => "root list has repeated or unsorted degrees",
            StructureError::BinomialShape => "subtree is not a binomial tree",
            StructureError::DegreeBound => "subtree is smaller than the Fibonacci degree bound",
            StructureError::StaleMinimum => "minimum pointer does not name the smallest root",
            StructureError::CountMismatch => "reachable node count differs from len()",
            StructureError::UnorderedLevel => "skip-list tier is not strictly ascending",
            StructureError::LevelMismatch => "skip-list tower heights are inconsistent",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for StructureError {}

/// A handle to a key stored in a heap, used for `decrease_key`, `delete` and `get`
///
/// Handles are small `Copy` values. A handle stays valid until its key is
/// extracted or deleted, including across merges; after that, every operation
/// taking it reports [`HeapError::InvalidHandle`].
pub trait Handle: Copy + PartialEq + Eq + fmt::Debug {}

/// Mergeable priority queue with decrease-key and arbitrary deletion
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::fibonacci::FibonacciHeap;
/// use mergeable_heaps::MergeableHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.insert(10);
/// heap.insert(20);
/// let thirty = heap.insert(30);
/// heap.decrease_key(&thirty, 1).unwrap();
/// assert_eq!(heap.find_min(), Some(&1));
/// ```
pub trait MergeableHeap<K: Ord>: Sized {
    /// The handle type for this heap
    type Handle: Handle;

    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of keys in the heap
    fn len(&self) -> usize;

    /// Inserts a key, returning a handle to it
    ///
    /// # Time Complexity
    /// - Fibonacci Heap: O(1)
    /// - Binomial Heap: O(log n) worst case
    fn insert(&mut self, key: K) -> Self::Handle;

    /// Returns the minimum key without removing it, or `None` when empty
    fn find_min(&self) -> Option<&K>;

    /// Removes and returns the minimum key, or `None` when empty
    ///
    /// # Time Complexity
    /// O(log n), amortized for the Fibonacci heap
    fn extract_min(&mut self) -> Option<K>;

    /// Consumes both heaps and returns one holding the union of their keys
    ///
    /// Handles issued by either heap stay valid on the result.
    ///
    /// # Time Complexity
    /// The smaller heap's nodes move into the larger heap's arena, so each key
    /// moves O(log n) times over any sequence of merges. On top of that:
    /// - Fibonacci Heap: O(1) root ring splice
    /// - Binomial Heap: O(log n) root list union
    fn merge(self, other: Self) -> Self;

    /// Lowers the key behind `handle` to `new_key`
    ///
    /// # Errors
    /// - [`HeapError::InvalidArgument`] if `new_key` is greater than the
    ///   current key. The heap is left untouched.
    /// - [`HeapError::InvalidHandle`] if the handle no longer names a key.
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError>;

    /// Removes the key behind `handle` and returns it
    ///
    /// Behaves like decreasing the key to negative infinity and extracting the
    /// minimum, so the removed key need not be the current minimum.
    fn delete(&mut self, handle: &Self::Handle) -> Result<K, HeapError>;

    /// Returns the key currently stored behind `handle`
    fn get(&self, handle: &Self::Handle) -> Option<&K>;
}
