//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the block that has not been accessed for the longest time. Each block
//! stores a recency timestamp drawn from a monotonically increasing clock; touching a block
//! stamps it with the next clock value. The victim is the first invalid way if there is one,
//! otherwise the way with the smallest timestamp, scanning from way 0 so the lowest way wins
//! ties.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1)
//!   - `victim()`: O(W) where W is the number of ways (associativity)
//! - **Space Complexity:** one `u64` per block
//! - **Best Case:** Working sets that fit within the associativity
//! - **Worst Case:** Cyclic scans of W+1 blocks through one set (every access misses)

use super::ReplacementPolicy;
use crate::cache::CacheBlock;

/// LRU Policy state.
#[derive(Debug, Default, Clone)]
pub struct LruPolicy {
    /// Last timestamp handed out; zero marks blocks never touched.
    clock: u64,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    pub const fn new() -> Self {
        Self { clock: 0 }
    }

    /// Last timestamp handed out.
    pub const fn clock(&self) -> u64 {
        self.clock
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Stamps `way` as the most recently used block of the set.
    fn touch(&mut self, set: &mut [CacheBlock], way: usize) {
        self.clock += 1;
        set[way].recency = self.clock;
    }

    /// Returns the first invalid way, or the least recently used one.
    fn victim(&self, set: &[CacheBlock]) -> usize {
        if let Some(way) = set.iter().position(|b| !b.valid) {
            return way;
        }
        let mut victim = 0;
        for (way, block) in set.iter().enumerate().skip(1) {
            if block.recency < set[victim].recency {
                victim = way;
            }
        }
        victim
    }
}
