//! Miss Status Holding Registers.
//!
//! The MSHR is a fixed-capacity table of block misses the L2 has sent to memory and not yet
//! filled. A probe that misses on a block already in the table merges into the existing
//! entry instead of issuing a second memory request; a probe that finds the table full
//! stalls. Entries are qualified by requester kind.

use tracing::{debug, warn};

use crate::common::{BlockRequest, RequesterKind};

/// One in-flight block miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MshrEntry {
    /// Whether the slot is occupied.
    pub valid: bool,
    /// Block-aligned address of the outstanding miss.
    pub block_addr: u32,
    /// Requester the miss belongs to.
    pub kind: RequesterKind,
    /// Set when every requester withdrew; the fill then skips the L1 notification.
    pub cancelled: bool,
}

impl MshrEntry {
    const EMPTY: Self = Self {
        valid: false,
        block_addr: 0,
        kind: RequesterKind::Instruction,
        cancelled: false,
    };

    #[inline]
    fn matches(&self, block_addr: u32, kind: RequesterKind) -> bool {
        self.valid && self.block_addr == block_addr && self.kind == kind
    }

    /// The block this entry is waiting for.
    pub const fn request(&self) -> BlockRequest {
        BlockRequest::new(self.block_addr, self.kind)
    }
}

/// Fixed-capacity table of outstanding block misses.
#[derive(Clone, Debug)]
pub struct Mshr {
    entries: Vec<MshrEntry>,
}

impl Mshr {
    /// Creates an empty MSHR with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![MshrEntry::EMPTY; capacity],
        }
    }

    /// Whether `(block_addr, kind)` is outstanding.
    pub fn contains(&self, block_addr: u32, kind: RequesterKind) -> bool {
        self.entries.iter().any(|e| e.matches(block_addr, kind))
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.entries.iter().all(|e| e.valid)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    /// Whether no miss is outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// All slots, occupied or not, in slot order.
    pub fn entries(&self) -> &[MshrEntry] {
        &self.entries
    }

    /// Records a new outstanding miss in the first free slot.
    ///
    /// A duplicate or an add to a full table is ignored; callers check
    /// [`Mshr::contains`] and [`Mshr::is_full`] first.
    pub fn add(&mut self, block_addr: u32, kind: RequesterKind) {
        if self.contains(block_addr, kind) {
            warn!(block_addr, %kind, "mshr add ignored: entry already outstanding");
            return;
        }
        let Some(slot) = self.entries.iter_mut().find(|e| !e.valid) else {
            warn!(block_addr, %kind, "mshr add ignored: table full");
            return;
        };
        *slot = MshrEntry {
            valid: true,
            block_addr,
            kind,
            cancelled: false,
        };
        debug!(block_addr, %kind, outstanding = self.len(), "mshr add");
    }

    /// Clears the entry for `(block_addr, kind)`.
    ///
    /// Idempotent; returns the cleared entry if one was outstanding.
    pub fn invalidate(&mut self, block_addr: u32, kind: RequesterKind) -> Option<MshrEntry> {
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.matches(block_addr, kind))?;
        let cleared = *slot;
        *slot = MshrEntry::EMPTY;
        debug!(block_addr, %kind, cancelled = cleared.cancelled, "mshr invalidate");
        Some(cleared)
    }

    /// Marks an outstanding entry so its fill is not forwarded to the L1.
    ///
    /// Returns `false` if nothing was outstanding for `(block_addr, kind)`.
    pub fn cancel(&mut self, block_addr: u32, kind: RequesterKind) -> bool {
        match self.entries.iter_mut().find(|e| e.matches(block_addr, kind)) {
            Some(entry) => {
                entry.cancelled = true;
                true
            }
            None => false,
        }
    }

    /// Clears the cancellation mark of an outstanding entry.
    pub fn rearm(&mut self, block_addr: u32, kind: RequesterKind) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.matches(block_addr, kind)) {
            entry.cancelled = false;
        }
    }
}
