//! Cache Replacement Policies.
//!
//! Implements the victim-selection algorithm used by every set-associative structure in the
//! hierarchy. Policies keep their per-block state in the blocks themselves (the `recency`
//! field), so one policy instance serves all sets of a cache.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used.

/// Least Recently Used replacement policy.
pub mod lru;

pub use lru::LruPolicy;

use super::CacheBlock;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim ways.
pub trait ReplacementPolicy: Send + Sync {
    /// Updates the policy state when a way is accessed or filled.
    ///
    /// # Arguments
    ///
    /// * `set` - The blocks of the accessed set.
    /// * `way` - The way index within the set that was accessed.
    fn touch(&mut self, set: &mut [CacheBlock], way: usize);

    /// Selects the way to fill in a set.
    ///
    /// # Arguments
    ///
    /// * `set` - The blocks of the target set.
    ///
    /// # Returns
    ///
    /// The index of the way to evict (or fill, if it is invalid).
    fn victim(&self, set: &[CacheBlock]) -> usize;
}
