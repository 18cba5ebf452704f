//! Simulator: owns the whole hierarchy and advances it one cycle per tick.
//!
//! Each tick runs, in order:
//! 1. **Delivery:** interconnect messages that are due are dispatched to `L1Cache::insert`,
//!    `DramController::add_request`, or `L2Cache::fill`. Messages sent while dispatching
//!    start counting on the next tick.
//! 2. **DRAM retire:** completed requests are sent back towards the L2.
//! 3. **DRAM schedule:** at most one pending request is moved to ongoing.
//! 4. **Cycle advance.**
//!
//! L1-to-L2 probes and cancellations are direct calls made by `access`, `write`, and
//! `cancel` between ticks.

use tracing::debug;

use crate::cache::{L1Cache, L1Lookup, L2Cache, L2Response};
use crate::common::{AccessResult, CacheGeometry, ConfigError, L2Request, RequesterKind};
use crate::config::Config;
use crate::soc::interconnect::{Direction, Interconnect};
use crate::soc::memory::{DramController, FlatMemory, SplitMemory};
use crate::soc::traits::BackingStore;
use crate::stats::SimStats;

/// Top-level simulator context.
#[derive(Debug)]
pub struct Simulator<S: BackingStore = FlatMemory> {
    l1_i: L1Cache,
    l1_d: L1Cache,
    l2: L2Cache,
    interconnect: Interconnect,
    dram: DramController,
    memory: SplitMemory<S>,
    memory_bytes: u64,
    cycle: u64,
    stats: SimStats,
}

impl Simulator<FlatMemory> {
    /// Builds a simulator with zeroed flat instruction and data memories.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by [`Config::validate`].
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let memory = SplitMemory::flat(config.general.memory_bytes, config.word_bytes());
        Self::with_memory(config, memory)
    }
}

impl<S: BackingStore> Simulator<S> {
    /// Builds a simulator over caller-provided backing stores.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by [`Config::validate`].
    pub fn with_memory(config: &Config, memory: SplitMemory<S>) -> Result<Self, ConfigError> {
        config.validate()?;
        let word_bits = config.general.word_bits;
        let cache = &config.cache;
        let l2_geometry = CacheGeometry::from_config(&cache.l2, word_bits)?;
        Ok(Self {
            l1_i: L1Cache::new(
                CacheGeometry::from_config(&cache.l1_i, word_bits)?,
                RequesterKind::Instruction,
            ),
            l1_d: L1Cache::new(
                CacheGeometry::from_config(&cache.l1_d, word_bits)?,
                RequesterKind::Data,
            ),
            l2: L2Cache::new(l2_geometry, config.mshr.entries),
            interconnect: Interconnect::new(&config.interconnect),
            dram: DramController::new(&config.dram, l2_geometry.line_bytes()),
            memory,
            memory_bytes: config.general.memory_bytes,
            cycle: 0,
            stats: SimStats::default(),
        })
    }

    /// Looks up `addr` in the L1 of `kind`, forwarding a miss to the L2.
    ///
    /// A miss is retried by calling `access` again once the fill has been delivered.
    ///
    /// # Panics
    ///
    /// Panics if `addr` lies outside `general.memory_bytes`.
    pub fn access(&mut self, kind: RequesterKind, addr: u32) -> AccessResult {
        self.check_in_memory(addr);
        let lookup = match kind {
            RequesterKind::Instruction => self.l1_i.access(addr),
            RequesterKind::Data => self.l1_d.access(addr),
        };
        self.stats.record_l1(kind, lookup.result());
        if let L1Lookup::Miss(req) = lookup {
            let response = self.l2.probe(req, &mut self.interconnect);
            self.stats.record_l2(response);
        }
        lookup.result()
    }

    /// Stores `word` at data address `addr`.
    ///
    /// The word is committed to the L2 on an L2 hit. On a miss the block is requested and the
    /// store must be retried after the fill.
    ///
    /// # Panics
    ///
    /// Panics if `addr` lies outside `general.memory_bytes`.
    pub fn write(&mut self, addr: u32, word: u32) -> AccessResult {
        self.check_in_memory(addr);
        let lookup = self.l1_d.access(addr);
        self.stats.record_l1(RequesterKind::Data, lookup.result());
        let response = self
            .l2
            .probe(L2Request::write(addr, word), &mut self.interconnect);
        self.stats.record_l2(response);
        if response == L2Response::Hit {
            self.stats.l2_writes += 1;
        }
        response.result()
    }

    /// Withdraws the outstanding miss of `kind` on `addr`.
    ///
    /// The block still fills the L2 but is not forwarded to the L1. Returns `false` if no
    /// miss was outstanding.
    pub fn cancel(&mut self, kind: RequesterKind, addr: u32) -> bool {
        let req = self.l1(kind).cancel(addr);
        let cancelled = self.l2.cancel(req);
        if cancelled {
            self.stats.cancellations += 1;
        }
        cancelled
    }

    fn check_in_memory(&self, addr: u32) {
        assert!(
            u64::from(addr) < self.memory_bytes,
            "address {addr:#x} outside {}-byte memory",
            self.memory_bytes
        );
    }

    /// Advances the hierarchy by one cycle.
    pub fn tick(&mut self) {
        let now = self.cycle;

        for msg in self.interconnect.tick() {
            self.stats.messages_delivered += 1;
            let block = msg.block;
            match msg.direction {
                Direction::L2ToL1 => {
                    let l1 = match block.kind {
                        RequesterKind::Instruction => &mut self.l1_i,
                        RequesterKind::Data => &mut self.l1_d,
                    };
                    if l1.insert(block) {
                        self.stats.l1_fills += 1;
                    }
                }
                Direction::L2ToMemory => {
                    self.dram.add_request(block, now);
                    self.stats.dram_requests += 1;
                }
                Direction::MemoryToL2 => {
                    let outcome = self
                        .l2
                        .fill(block, &mut self.interconnect, &mut self.memory);
                    self.stats.l2_fills += 1;
                    if outcome.wrote_back.is_some() {
                        self.stats.l2_writebacks += 1;
                    }
                }
            }
        }

        let dram = self.dram.tick(now);
        for block in dram.retired {
            self.interconnect.send_on(block, Direction::MemoryToL2);
            self.stats.dram_retired += 1;
        }
        if let Some(request) = dram.scheduled {
            self.stats.record_row(request.status);
        }

        self.cycle += 1;
        self.stats.cycles = self.cycle;
    }

    /// Runs `cycles` ticks.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    /// Ticks until no transfer is in flight, for at most `limit` ticks.
    ///
    /// Returns the number of ticks run.
    pub fn run_until_quiescent(&mut self, limit: u64) -> u64 {
        let mut ran = 0;
        while ran < limit && !self.is_quiescent() {
            self.tick();
            ran += 1;
        }
        debug!(ran, cycle = self.cycle, quiescent = self.is_quiescent(), "run until quiescent");
        ran
    }

    /// Whether no message, DRAM request, or outstanding miss remains.
    pub fn is_quiescent(&self) -> bool {
        self.interconnect.is_empty() && self.dram.is_idle() && self.l2.mshr().is_empty()
    }

    /// L1 cache of `kind`.
    pub const fn l1(&self, kind: RequesterKind) -> &L1Cache {
        match kind {
            RequesterKind::Instruction => &self.l1_i,
            RequesterKind::Data => &self.l1_d,
        }
    }

    /// Shared L2 cache.
    pub const fn l2(&self) -> &L2Cache {
        &self.l2
    }

    /// Interconnect queue.
    pub const fn interconnect(&self) -> &Interconnect {
        &self.interconnect
    }

    /// DRAM controller.
    pub const fn dram(&self) -> &DramController {
        &self.dram
    }

    /// Instruction and data backing stores.
    pub const fn memory(&self) -> &SplitMemory<S> {
        &self.memory
    }

    /// Mutable backing stores, for loading contents before a run.
    pub const fn memory_mut(&mut self) -> &mut SplitMemory<S> {
        &mut self.memory
    }

    /// Cycles elapsed.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Counters collected so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }
}
