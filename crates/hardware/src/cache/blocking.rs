//! Blocking Single-Level Cache.
//!
//! A set-associative, write-back, write-allocate cache that services a miss synchronously
//! from its backing store. Every miss costs the same fixed penalty, whether or not a dirty
//! victim had to be written back first. Used as an instruction cache (reads only) or a data
//! cache (reads and writes).

use tracing::debug;

use super::{CacheBlock, TagStore};
use crate::common::{AccessResult, CacheGeometry, ConfigError, RequesterKind};
use crate::config::{BlockingConfig, CacheConfig};
use crate::soc::traits::BackingStore;

/// Result of one blocking access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheAccess {
    /// Word read, or the word just written.
    pub value: u32,
    /// Whether the block was resident.
    pub result: AccessResult,
    /// Cycles the access stalled for: zero on a hit, the miss penalty otherwise.
    pub latency: u64,
}

/// A data-holding cache that blocks on every miss.
#[derive(Debug)]
pub struct BlockingCache {
    kind: RequesterKind,
    store: TagStore,
    miss_penalty: u64,
}

impl BlockingCache {
    /// Creates an empty cache.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Validated cache geometry.
    /// * `kind` - Instruction or data path.
    /// * `miss_penalty` - Cycles charged per miss.
    pub fn new(geometry: CacheGeometry, kind: RequesterKind, miss_penalty: u64) -> Self {
        Self {
            kind,
            store: TagStore::new(geometry, kind, true),
            miss_penalty,
        }
    }

    /// Builds a cache of `kind` from its level settings and the model's miss penalty.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry is invalid for `word_bits`.
    pub fn from_config(
        cache: &CacheConfig,
        blocking: &BlockingConfig,
        word_bits: u32,
        kind: RequesterKind,
    ) -> Result<Self, ConfigError> {
        let geometry = CacheGeometry::from_config(cache, word_bits)?;
        Ok(Self::new(geometry, kind, blocking.miss_penalty))
    }

    /// Reads the word at `addr`, filling its block from `memory` on a miss.
    pub fn read<S: BackingStore + ?Sized>(&mut self, addr: u32, memory: &mut S) -> CacheAccess {
        let (index, way, offset, result) = self.locate(addr, memory);
        let value = self.store.block(index, way).words[offset];
        self.finish(value, result)
    }

    /// Writes `word` at `addr`, allocating its block from `memory` on a miss.
    ///
    /// The block is marked dirty and reaches `memory` only when evicted.
    pub fn write<S: BackingStore + ?Sized>(
        &mut self,
        addr: u32,
        word: u32,
        memory: &mut S,
    ) -> CacheAccess {
        let (index, way, offset, result) = self.locate(addr, memory);
        let line = self.store.block_mut(index, way);
        line.words[offset] = word;
        line.dirty = true;
        self.finish(word, result)
    }

    /// Finds or fills the block of `addr`; returns `(index, way, offset, result)`.
    fn locate<S: BackingStore + ?Sized>(
        &mut self,
        addr: u32,
        memory: &mut S,
    ) -> (usize, usize, usize, AccessResult) {
        let geometry = *self.store.geometry();
        let d = geometry.decode(addr);
        if let Some(way) = self.store.find(d.index, d.tag, self.kind) {
            self.store.touch(d.index, way);
            debug!(kind = %self.kind, addr, index = d.index, way, "blocking hit");
            return (d.index, way, d.offset, AccessResult::Hit);
        }

        let way = self.store.victim(d.index);
        let step = geometry.word_bytes();
        let victim = self.store.block(d.index, way);
        if victim.valid && victim.dirty {
            let start = geometry.block_start(victim.tag, d.index);
            for (i, &word) in victim.words.iter().enumerate() {
                memory.write_word(start + i as u32 * step, word);
            }
            debug!(kind = %self.kind, victim = start, "blocking write-back");
        }

        let line = self.store.install(d.index, way, d.tag, self.kind);
        for (i, slot) in line.words.iter_mut().enumerate() {
            *slot = memory.read_word(d.block_addr + i as u32 * step);
        }
        debug!(kind = %self.kind, addr, index = d.index, way, "blocking miss");
        (d.index, way, d.offset, AccessResult::Miss)
    }

    const fn finish(&self, value: u32, result: AccessResult) -> CacheAccess {
        let latency = match result {
            AccessResult::Hit => 0,
            AccessResult::Miss => self.miss_penalty,
        };
        CacheAccess {
            value,
            result,
            latency,
        }
    }

    /// Whether `addr` is resident, without touching recency.
    pub fn contains(&self, addr: u32) -> bool {
        let d = self.store.geometry().decode(addr);
        self.store.find(d.index, d.tag, self.kind).is_some()
    }

    /// Fixed miss penalty in cycles.
    pub const fn miss_penalty(&self) -> u64 {
        self.miss_penalty
    }

    /// Geometry of this cache.
    pub const fn geometry(&self) -> &CacheGeometry {
        self.store.geometry()
    }

    /// The blocks of set `index`.
    pub fn set(&self, index: usize) -> &[CacheBlock] {
        self.store.set(index)
    }
}
