//! L1 Instruction and Data Caches.
//!
//! The L1s of the timing hierarchy are tag-only: they track residency and LRU order but
//! hold no data. A lookup either hits (refreshing recency) or produces an L2 request that
//! the caller forwards with no latency. Residency is established later, when the L2's fill
//! notification is delivered and [`L1Cache::insert`] runs.

use tracing::debug;

use super::{CacheBlock, TagStore};
use crate::common::{AccessResult, BlockRequest, CacheGeometry, L2Request, RequesterKind};

/// Outcome of an L1 lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum L1Lookup {
    /// The block is resident.
    Hit,
    /// The block is absent; the request must be forwarded to the L2.
    Miss(L2Request),
}

impl L1Lookup {
    /// Collapses the lookup to hit/miss.
    pub const fn result(&self) -> AccessResult {
        match self {
            Self::Hit => AccessResult::Hit,
            Self::Miss(_) => AccessResult::Miss,
        }
    }
}

/// A tag-only set-associative L1 cache.
#[derive(Debug)]
pub struct L1Cache {
    kind: RequesterKind,
    store: TagStore,
}

impl L1Cache {
    /// Creates an empty L1 for `kind`.
    pub fn new(geometry: CacheGeometry, kind: RequesterKind) -> Self {
        Self {
            kind,
            store: TagStore::new(geometry, kind, false),
        }
    }

    /// Looks up `addr`; a hit refreshes recency.
    pub fn access(&mut self, addr: u32) -> L1Lookup {
        let d = self.store.geometry().decode(addr);
        if let Some(way) = self.store.find(d.index, d.tag, self.kind) {
            self.store.touch(d.index, way);
            debug!(kind = %self.kind, addr, index = d.index, way, "l1 hit");
            L1Lookup::Hit
        } else {
            debug!(kind = %self.kind, addr, index = d.index, "l1 miss");
            L1Lookup::Miss(L2Request::read(addr, self.kind))
        }
    }

    /// Installs a filled block.
    ///
    /// A block already resident is left alone. Otherwise the first invalid way of its set
    /// is used, or the least recently used way is evicted.
    ///
    /// Returns `true` if the block was installed.
    pub fn insert(&mut self, block: BlockRequest) -> bool {
        let d = self.store.geometry().decode(block.block_addr);
        if self.store.find(d.index, d.tag, self.kind).is_some() {
            debug!(kind = %self.kind, %block, "l1 duplicate fill ignored");
            return false;
        }
        let way = self.store.victim(d.index);
        let evicted = self.store.block(d.index, way);
        if evicted.valid {
            debug!(
                kind = %self.kind,
                %block,
                way,
                victim = self.store.geometry().block_start(evicted.tag, d.index),
                "l1 evict"
            );
        }
        let _ = self.store.install(d.index, way, d.tag, self.kind);
        debug!(kind = %self.kind, %block, index = d.index, way, "l1 insert");
        true
    }

    /// Builds the cancellation of an outstanding miss on `addr`.
    ///
    /// The caller forwards it to the L2. Resident blocks are never removed.
    pub const fn cancel(&self, addr: u32) -> L2Request {
        L2Request::read(addr, self.kind)
    }

    /// Whether `addr` is resident, without touching recency.
    pub fn contains(&self, addr: u32) -> bool {
        let d = self.store.geometry().decode(addr);
        self.store.find(d.index, d.tag, self.kind).is_some()
    }

    /// Requester kind this cache serves.
    pub const fn kind(&self) -> RequesterKind {
        self.kind
    }

    /// Geometry of this cache.
    pub const fn geometry(&self) -> &CacheGeometry {
        self.store.geometry()
    }

    /// All blocks, set-major.
    pub fn blocks(&self) -> &[CacheBlock] {
        self.store.blocks()
    }

    /// The blocks of set `index`.
    pub fn set(&self, index: usize) -> &[CacheBlock] {
        self.store.set(index)
    }
}
