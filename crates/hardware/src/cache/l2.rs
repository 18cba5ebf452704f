//! Shared L2 Cache.
//!
//! The L2 holds data for both requester kinds, with tags qualified by kind. It implements
//! the level's half of the miss/fill protocol:
//! 1. **Probe:** A hit on a read schedules an L2-to-L1 fill; a hit on a write updates the
//!    word in place and marks the block dirty. A miss merges into an outstanding MSHR
//!    entry, stalls if the MSHR is full, or records a new entry and sends the block
//!    request to memory.
//! 2. **Fill:** A block returning from memory clears its MSHR entry, writes back a dirty
//!    victim word-by-word, loads the block word-by-word from the backing store, and
//!    notifies the requesting L1 unless the miss was cancelled.

use tracing::{debug, warn};

use super::mshr::Mshr;
use super::{CacheBlock, TagStore};
use crate::common::{AccessResult, BlockRequest, CacheGeometry, L2Op, L2Request, RequesterKind};
use crate::soc::interconnect::{Direction, Interconnect};
use crate::soc::memory::SplitMemory;
use crate::soc::traits::BackingStore;

/// How a miss was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissDisposition {
    /// A new MSHR entry was recorded and the block requested from memory.
    Issued,
    /// The block was already in flight; the probe merged into its MSHR entry.
    Outstanding,
    /// The MSHR is full; the caller retries later.
    Stalled,
}

/// Outcome of an L2 probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum L2Response {
    /// The block is resident.
    Hit,
    /// The block is absent.
    Miss(MissDisposition),
}

impl L2Response {
    /// Collapses the response to hit/miss.
    pub const fn result(&self) -> AccessResult {
        match self {
            Self::Hit => AccessResult::Hit,
            Self::Miss(_) => AccessResult::Miss,
        }
    }
}

/// Side effects of one fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// Dirty victim written back to its backing store, if any.
    pub wrote_back: Option<BlockRequest>,
    /// Whether an L2-to-L1 fill notification was sent.
    pub notified: bool,
}

/// Shared, write-back L2 cache with miss tracking.
#[derive(Debug)]
pub struct L2Cache {
    store: TagStore,
    mshr: Mshr,
}

impl L2Cache {
    /// Creates an empty L2 with an MSHR of `mshr_entries` slots.
    pub fn new(geometry: CacheGeometry, mshr_entries: usize) -> Self {
        Self {
            store: TagStore::new(geometry, RequesterKind::Data, true),
            mshr: Mshr::new(mshr_entries),
        }
    }

    /// Handles a read or write forwarded from an L1.
    pub fn probe(&mut self, req: L2Request, ic: &mut Interconnect) -> L2Response {
        let d = self.store.geometry().decode(req.addr);
        let block = BlockRequest::new(d.block_addr, req.kind);

        if let Some(way) = self.store.find(d.index, d.tag, req.kind) {
            self.store.touch(d.index, way);
            match req.op {
                L2Op::Write(word) => {
                    let line = self.store.block_mut(d.index, way);
                    line.words[d.offset] = word;
                    line.dirty = true;
                    debug!(%block, offset = d.offset, word, "l2 write hit");
                }
                L2Op::Read => {
                    debug!(%block, "l2 read hit");
                    ic.send_on(block, Direction::L2ToL1);
                }
            }
            return L2Response::Hit;
        }

        let disposition = if self.mshr.contains(d.block_addr, req.kind) {
            self.mshr.rearm(d.block_addr, req.kind);
            MissDisposition::Outstanding
        } else if self.mshr.is_full() {
            MissDisposition::Stalled
        } else {
            self.mshr.add(d.block_addr, req.kind);
            ic.send_on(block, Direction::L2ToMemory);
            MissDisposition::Issued
        };
        debug!(%block, ?disposition, "l2 miss");
        L2Response::Miss(disposition)
    }

    /// Installs a block returned from memory.
    ///
    /// # Arguments
    ///
    /// * `block` - The block the DRAM controller retired.
    /// * `ic` - Interconnect carrying the L1 fill notification.
    /// * `memory` - Backing stores for the fill read and any victim write-back.
    pub fn fill<S: BackingStore>(
        &mut self,
        block: BlockRequest,
        ic: &mut Interconnect,
        memory: &mut SplitMemory<S>,
    ) -> FillOutcome {
        let geometry = *self.store.geometry();
        let d = geometry.decode(block.block_addr);
        let entry = self.mshr.invalidate(d.block_addr, block.kind);
        if entry.is_none() {
            warn!(%block, "l2 fill without an outstanding miss");
        }

        let mut outcome = FillOutcome::default();
        if let Some(way) = self.store.find(d.index, d.tag, block.kind) {
            self.store.touch(d.index, way);
            debug!(%block, way, "l2 duplicate fill");
        } else {
            let way = self.store.victim(d.index);
            outcome.wrote_back = Self::write_back(
                &geometry,
                self.store.block(d.index, way),
                d.index,
                memory,
            );

            let store = memory.select(block.kind);
            let step = geometry.word_bytes();
            let line = self.store.install(d.index, way, d.tag, block.kind);
            for (i, slot) in line.words.iter_mut().enumerate() {
                *slot = store.read_word(d.block_addr + i as u32 * step);
            }
            debug!(%block, index = d.index, way, "l2 fill");
        }

        if entry.is_some_and(|e| e.cancelled) {
            debug!(%block, "l2 fill notification suppressed");
        } else {
            ic.send_on(block, Direction::L2ToL1);
            outcome.notified = true;
        }
        outcome
    }

    /// Writes `victim` back word-by-word if it is valid and dirty.
    fn write_back<S: BackingStore>(
        geometry: &CacheGeometry,
        victim: &CacheBlock,
        index: usize,
        memory: &mut SplitMemory<S>,
    ) -> Option<BlockRequest> {
        if !(victim.valid && victim.dirty) {
            return None;
        }
        let start = geometry.block_start(victim.tag, index);
        let step = geometry.word_bytes();
        let store = memory.select_mut(victim.kind);
        for (i, &word) in victim.words.iter().enumerate() {
            store.write_word(start + i as u32 * step, word);
        }
        let evicted = BlockRequest::new(start, victim.kind);
        debug!(block = %evicted, "l2 write-back");
        Some(evicted)
    }

    /// Marks the outstanding miss on `req` so its fill skips the L1 notification.
    ///
    /// Returns `false` if no miss was outstanding.
    pub fn cancel(&mut self, req: L2Request) -> bool {
        let block_addr = self.store.geometry().block_addr(req.addr);
        let cancelled = self.mshr.cancel(block_addr, req.kind);
        debug!(block_addr, kind = %req.kind, cancelled, "l2 cancel");
        cancelled
    }

    /// Whether the block of `addr` is resident for `kind`, without touching recency.
    pub fn contains(&self, addr: u32, kind: RequesterKind) -> bool {
        let d = self.store.geometry().decode(addr);
        self.store.find(d.index, d.tag, kind).is_some()
    }

    /// Word at `addr` if its block is resident for `kind`, without touching recency.
    pub fn read_word(&self, addr: u32, kind: RequesterKind) -> Option<u32> {
        let d = self.store.geometry().decode(addr);
        let way = self.store.find(d.index, d.tag, kind)?;
        Some(self.store.block(d.index, way).words[d.offset])
    }

    /// Miss status holding registers.
    pub const fn mshr(&self) -> &Mshr {
        &self.mshr
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
