//! Mergeable Heap Data Structures for Rust
//!
//! This crate provides two mergeable priority queues with `decrease_key` and
//! arbitrary deletion, plus a skip list with constant-time minimum access.
//!
//! # Features
//!
//! - **Fibonacci Heap**: O(1) insert, O(1) amortized decrease_key;
//!   O(log n) amortized extract_min and delete; merge splices root rings in O(1)
//! - **Binomial Heap**: O(log n) insert, extract_min, decrease_key, delete and merge
//! - **Skip List**: O(log n) expected insert and delete; O(1) find_min
//!
//! Both heaps keep their nodes in an arena and address them by generational
//! keys, so stale handles are reported as [`HeapError::InvalidHandle`] rather
//! than touching freed memory. A merge moves the smaller heap's nodes into the
//! larger heap's arena (O(log n) moves per key over any merge sequence), and
//! handles from both heaps keep working afterwards. Neither heap is thread-safe; wrap one in a mutex
//! to share it.
//!
//! # Example
//!
//! ```rust
//! use mergeable_heaps::fibonacci::FibonacciHeap;
//! use mergeable_heaps::MergeableHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.insert(5);
//! heap.insert(3);
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.find_min(), Some(&1));
//! ```
//!
//! # Logging
//!
//! Structural events (links, cuts, consolidation summaries) are emitted through
//! the [`log`](https://docs.rs/log) facade at `trace` and `debug` level. No
//! logger is installed by this crate.

pub mod binomial;
pub mod degree;
pub mod fibonacci;
pub mod skiplist;
mod storage;
pub mod traits;

// Re-export the main trait for convenience
pub use traits::{HeapError, MergeableHeap, StructureError};
