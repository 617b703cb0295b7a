//! Node degree type and the bounds derived from it.
//!
//! # Why u8?
//!
//! A node's degree (number of children) is at most about `log₂ n` in a
//! binomial heap and `log_φ n ≈ 1.44 log₂ n` in a Fibonacci heap. `u8`
//! covers any heap that fits in memory and keeps nodes small.

/// Type alias for node degree.
pub type Degree = u8;

/// Maximum representable degree.
pub const MAX_DEGREE: Degree = u8::MAX;

/// Increment a degree, panicking on overflow.
///
/// # Panics
///
/// Panics if `degree == MAX_DEGREE`, which would need more nodes than
/// addressable memory.
#[inline]
pub fn checked_increment(degree: Degree) -> Degree {
    degree
        .checked_add(1)
        .expect("degree overflow: a node cannot have 256 children in a consistent heap")
}

/// Decrement a degree, stopping at zero.
#[inline]
pub fn saturating_decrement(degree: Degree) -> Degree {
    degree.saturating_sub(1)
}

/// Initial number of buckets for a consolidation pass over `len` nodes.
///
/// `floor(sqrt(len)) + 1` bounds the maximum degree for every heap size
/// worth consolidating; the bucket vector still grows if a larger degree
/// shows up.
#[inline]
pub fn bucket_capacity(len: usize) -> usize {
    (len as f64).sqrt() as usize + 1
}

/// Smallest subtree size of a Fibonacci-heap node of the given degree: `F(degree + 2)`.
///
/// Saturates at `usize::MAX`.
pub fn fibonacci_floor(degree: Degree) -> usize {
    // (F(k), F(k+1)) starting at k = 1
    let (mut a, mut b) = (1usize, 1usize);
    for _ in 0..degree {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    b
}
