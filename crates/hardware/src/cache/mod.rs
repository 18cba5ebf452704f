//! Set-Associative Caches.
//!
//! This module implements every cache structure of the hierarchy on top of a shared
//! tag store. It provides:
//! 1. **Tag Store:** `TagStore`, a set-associative array of `CacheBlock`s with pluggable
//!    replacement (`ReplacementPolicy`, LRU by default).
//! 2. **L1 Caches:** Tag-only instruction and data caches that defer misses to the L2.
//! 3. **L2 Cache:** A shared, data-holding, write-back cache with miss tracking (`Mshr`).
//! 4. **Blocking Cache:** A single-level cache that services misses synchronously from its
//!    backing store with a fixed penalty.

/// Single-level blocking cache with a fixed miss penalty.
pub mod blocking;

/// Tag-only L1 instruction/data caches.
pub mod l1;

/// Shared write-back L2 cache.
pub mod l2;

/// Miss status holding registers.
pub mod mshr;

/// Cache replacement policy implementations.
pub mod policies;

pub use self::blocking::{BlockingCache, CacheAccess};
pub use self::l1::{L1Cache, L1Lookup};
pub use self::l2::{FillOutcome, L2Cache, L2Response, MissDisposition};
pub use self::mshr::{Mshr, MshrEntry};
pub use self::policies::{LruPolicy, ReplacementPolicy};

use crate::common::{CacheGeometry, RequesterKind};

/// One way of one set.
///
/// Blocks are created invalid at initialization and replaced in place; the slot owns its
/// data words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheBlock {
    /// Tag bits of the resident block.
    pub tag: u32,
    /// Whether the slot holds a block.
    pub valid: bool,
    /// Whether the block differs from its backing store.
    pub dirty: bool,
    /// Replacement timestamp; larger is more recent.
    pub recency: u64,
    /// Requester the block was filled for.
    pub kind: RequesterKind,
    /// Data words; empty for tag-only caches.
    pub words: Box<[u32]>,
}

impl CacheBlock {
    /// An invalid block carrying `words` zeroed data words.
    pub fn empty(kind: RequesterKind, words: usize) -> Self {
        Self {
            tag: 0,
            valid: false,
            dirty: false,
            recency: 0,
            kind,
            words: vec![0; words].into_boxed_slice(),
        }
    }

    /// Whether this block is a valid copy of `(tag, kind)`.
    #[inline]
    pub fn matches(&self, tag: u32, kind: RequesterKind) -> bool {
        self.valid && self.tag == tag && self.kind == kind
    }
}

/// Set-associative array of blocks with a replacement policy.
///
/// Blocks are stored set-major: way `w` of set `s` lives at `s * ways + w`.
#[derive(Debug)]
pub struct TagStore<P: ReplacementPolicy = LruPolicy> {
    geometry: CacheGeometry,
    blocks: Vec<CacheBlock>,
    policy: P,
}

impl TagStore<LruPolicy> {
    /// Creates an LRU tag store.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Validated cache geometry.
    /// * `kind` - Requester kind the empty blocks start with.
    /// * `with_data` - Whether blocks hold data words.
    pub fn new(geometry: CacheGeometry, kind: RequesterKind, with_data: bool) -> Self {
        Self::with_policy(geometry, kind, with_data, LruPolicy::new())
    }
}

impl<P: ReplacementPolicy> TagStore<P> {
    /// Creates a tag store with an explicit replacement policy.
    pub fn with_policy(
        geometry: CacheGeometry,
        kind: RequesterKind,
        with_data: bool,
        policy: P,
    ) -> Self {
        let words = if with_data {
            geometry.words_per_line()
        } else {
            0
        };
        Self {
            geometry,
            blocks: vec![CacheBlock::empty(kind, words); geometry.sets() * geometry.ways()],
            policy,
        }
    }

    /// Geometry this store was built with.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// All blocks, set-major.
    pub fn blocks(&self) -> &[CacheBlock] {
        &self.blocks
    }

    /// The blocks of set `index`.
    pub fn set(&self, index: usize) -> &[CacheBlock] {
        let ways = self.geometry.ways();
        &self.blocks[index * ways..(index + 1) * ways]
    }

    fn set_mut(&mut self, index: usize) -> &mut [CacheBlock] {
        let ways = self.geometry.ways();
        &mut self.blocks[index * ways..(index + 1) * ways]
    }

    /// Way of set `index` holding `(tag, kind)`, if resident.
    pub fn find(&self, index: usize, tag: u32, kind: RequesterKind) -> Option<usize> {
        self.set(index).iter().position(|b| b.matches(tag, kind))
    }

    /// Marks `way` of set `index` as most recently used.
    pub fn touch(&mut self, index: usize, way: usize) {
        let ways = self.geometry.ways();
        let set = &mut self.blocks[index * ways..(index + 1) * ways];
        self.policy.touch(set, way);
    }

    /// Way the policy would fill next in set `index`.
    pub fn victim(&self, index: usize) -> usize {
        self.policy.victim(self.set(index))
    }

    /// Block at `(index, way)`.
    pub fn block(&self, index: usize, way: usize) -> &CacheBlock {
        &self.set(index)[way]
    }

    /// Mutable block at `(index, way)`.
    pub fn block_mut(&mut self, index: usize, way: usize) -> &mut CacheBlock {
        &mut self.set_mut(index)[way]
    }

    /// Overwrites `(index, way)` with a clean, valid `(tag, kind)` and stamps it recent.
    ///
    /// Data words are left as they were; the caller writes the new contents.
    pub fn install(
        &mut self,
        index: usize,
        way: usize,
        tag: u32,
        kind: RequesterKind,
    ) -> &mut CacheBlock {
        {
            let block = self.block_mut(index, way);
            block.tag = tag;
            block.valid = true;
            block.dirty = false;
            block.kind = kind;
        }
        self.touch(index, way);
        self.block_mut(index, way)
    }
}
