//! Aggregated book: price → total resting size, one instance per side.
//!
//! This view exists solely so NBBO reporting is O(1) instead of requiring a
//! traversal of the priority queue — see §4.1. It is not consulted by the
//! crossing algorithm, which walks the priority queue directly.

use std::collections::HashMap;

/// Price → aggregate resting size for one side of the book.
///
/// A price key is present iff its aggregate is strictly positive (I1).
#[derive(Debug, Default, Clone)]
pub struct AggregatedBook {
    levels: HashMap<u64, u64>,
}

impl AggregatedBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `size` to the aggregate at `price`, inserting the key if absent.
    ///
    /// Precondition: `size > 0`.
    pub fn add(&mut self, price: u64, size: u64) {
        debug_assert!(size > 0, "aggregated book add requires a positive size");
        *self.levels.entry(price).or_insert(0) += size;
    }

    /// Subtract `size` from the aggregate at `price`.
    ///
    /// If `price` is absent this is a silent no-op — it tolerates a cancel
    /// racing an already-applied match for the same id (see §9). If the
    /// result is zero the key is removed. Undershoot is forbidden by the
    /// invariants and only checked in debug builds.
    pub fn subtract(&mut self, price: u64, size: u64) {
        let Some(current) = self.levels.get_mut(&price) else {
            return;
        };
        debug_assert!(
            *current >= size,
            "aggregated book undershoot at price {price}: {current} < {size}"
        );
        *current = current.saturating_sub(size);
        if *current == 0 {
            self.levels.remove(&price);
        }
    }

    /// The aggregate at `price`, or zero if the price is absent.
    ///
    /// Callers reporting top-of-book guarantee the price exists because it
    /// was just read from a live order at the top of the matching priority
    /// queue; the zero fallback only matters for defensive callers.
    pub fn get(&self, price: u64) -> u64 {
        self.levels.get(&price).copied().unwrap_or(0)
    }
}
