//! Backing Memory and DRAM Timing.
//!
//! This module implements the memory side of the hierarchy. It provides:
//! 1. **Flat Memory:** `FlatMemory`, a word array implementing `BackingStore`.
//! 2. **Split Memory:** `SplitMemory`, separate instruction and data stores selected by
//!    requester kind.
//! 3. **DRAM Timing:** Banks with row buffers, the shared command/data channel, and the
//!    FR-FCFS request controller.

/// DRAM bank row-buffer state and occupancy.
pub mod bank;

/// Shared command and data bus reservations.
pub mod channel;

/// FR-FCFS DRAM request controller.
pub mod controller;

/// DRAM requests, timing intervals, and phase plans.
pub mod request;

pub use self::bank::Bank;
pub use self::channel::Channel;
pub use self::controller::{DramController, DramTick};
pub use self::request::{Interval, MemoryRequest, Phase, ResourcePlan, RowBufferStatus};

use crate::common::RequesterKind;
use crate::soc::traits::BackingStore;

/// Word-addressable flat memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatMemory {
    words: Vec<u32>,
    word_bytes: u32,
}

impl FlatMemory {
    /// Creates a zeroed memory of `size_bytes` bytes.
    ///
    /// # Arguments
    ///
    /// * `size_bytes` - Capacity; rounded down to whole words.
    /// * `word_bytes` - Width of one word.
    pub fn new(size_bytes: u64, word_bytes: u32) -> Self {
        let count = size_bytes / u64::from(word_bytes.max(1));
        Self {
            words: vec![0; count as usize],
            word_bytes: word_bytes.max(1),
        }
    }

    /// Capacity in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.words.len() as u64 * u64::from(self.word_bytes)
    }

    /// Copies `data` into memory starting at byte address `addr`.
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit.
    pub fn load(&mut self, addr: u32, data: &[u32]) {
        let start = self.slot(addr);
        assert!(
            start + data.len() <= self.words.len(),
            "load of {} words at {addr:#x} exceeds memory",
            data.len()
        );
        self.words[start..start + data.len()].copy_from_slice(data);
    }

    /// All words in address order.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    fn slot(&self, addr: u32) -> usize {
        assert!(
            addr % self.word_bytes == 0,
            "unaligned word address {addr:#x}"
        );
        let slot = (addr / self.word_bytes) as usize;
        assert!(
            slot < self.words.len(),
            "address {addr:#x} outside {}-byte memory",
            self.size_bytes()
        );
        slot
    }
}

impl BackingStore for FlatMemory {
    fn word_bytes(&self) -> u32 {
        self.word_bytes
    }

    fn read_word(&self, addr: u32) -> u32 {
        self.words[self.slot(addr)]
    }

    fn write_word(&mut self, addr: u32, word: u32) {
        let slot = self.slot(addr);
        self.words[slot] = word;
    }
}

/// Separate instruction and data backing stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitMemory<S = FlatMemory> {
    /// Store behind the instruction path.
    pub instruction: S,
    /// Store behind the data path.
    pub data: S,
}

impl SplitMemory<FlatMemory> {
    /// Two zeroed flat memories of `size_bytes` each.
    pub fn flat(size_bytes: u64, word_bytes: u32) -> Self {
        Self {
            instruction: FlatMemory::new(size_bytes, word_bytes),
            data: FlatMemory::new(size_bytes, word_bytes),
        }
    }
}

impl<S> SplitMemory<S> {
    /// Wraps two existing stores.
    pub const fn new(instruction: S, data: S) -> Self {
        Self { instruction, data }
    }

    /// Store owning blocks of `kind`.
    pub const fn select(&self, kind: RequesterKind) -> &S {
        match kind {
            RequesterKind::Instruction => &self.instruction,
            RequesterKind::Data => &self.data,
        }
    }

    /// Mutable store owning blocks of `kind`.
    pub const fn select_mut(&mut self, kind: RequesterKind) -> &mut S {
        match kind {
            RequesterKind::Instruction => &mut self.instruction,
            RequesterKind::Data => &mut self.data,
        }
    }
}
