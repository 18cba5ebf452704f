//! DRAM requests and timing plans.
//!
//! A request's timing is a `ResourcePlan`: up to three command-bus intervals (one per
//! phase), one bank-occupancy interval, and one data-bus interval. The phases a request
//! needs come from the row-buffer status of its bank:
//!
//! | status   | phases                           |
//! |----------|----------------------------------|
//! | Conflict | precharge, activate, read/write  |
//! | Miss     | activate, read/write             |
//! | Hit      | read/write                       |
//!
//! Each phase occupies the command bus for `command_cycles` from its start and locks the bank
//! for `bank_busy_cycles`; the next phase starts when that lock elapses. The data bus is
//! occupied for `data_cycles` starting the cycle after the bank interval ends. All intervals
//! are inclusive.

use std::fmt;

use crate::common::BlockRequest;
use crate::config::DramConfig;

/// Inclusive cycle range `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    /// First occupied cycle.
    pub start: u64,
    /// Last occupied cycle.
    pub end: u64,
}

impl Interval {
    /// The `len` cycles starting at `start`; `len` must be at least one.
    pub const fn new(start: u64, len: u64) -> Self {
        Self {
            start,
            end: start + len - 1,
        }
    }

    /// Whether the two inclusive ranges share a cycle.
    #[inline]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// Row-buffer state of a request's bank relative to its row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowBufferStatus {
    /// The bank has the request's row open.
    Hit,
    /// The bank has no row open.
    Miss,
    /// The bank has a different row open.
    Conflict,
}

impl RowBufferStatus {
    /// Phases required to serve a request in this state, in issue order.
    pub const fn phases(self) -> &'static [Phase] {
        match self {
            Self::Conflict => &[Phase::Precharge, Phase::Activate, Phase::ReadWrite],
            Self::Miss => &[Phase::Activate, Phase::ReadWrite],
            Self::Hit => &[Phase::ReadWrite],
        }
    }
}

/// One DRAM command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Close the open row.
    Precharge,
    /// Open the request's row.
    Activate,
    /// Column access on the open row.
    ReadWrite,
}

/// Phase durations in cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseTiming {
    /// Command bus occupancy per phase.
    pub command_cycles: u64,
    /// Bank lock per phase.
    pub bank_busy_cycles: u64,
    /// Data bus occupancy per request.
    pub data_cycles: u64,
}

impl From<&DramConfig> for PhaseTiming {
    fn from(config: &DramConfig) -> Self {
        Self {
            command_cycles: config.command_cycles,
            bank_busy_cycles: config.bank_busy_cycles,
            data_cycles: config.data_cycles,
        }
    }
}

/// Resource intervals a request would occupy if scheduled at a given cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourcePlan {
    /// Command bus slot of the precharge, if required.
    pub precharge: Option<Interval>,
    /// Command bus slot of the activate, if required.
    pub activate: Option<Interval>,
    /// Command bus slot of the column access.
    pub read_write: Interval,
    /// Bank occupancy from the first phase to the end of the last bank lock.
    pub bank: Interval,
    /// Data bus slot of the block transfer.
    pub data: Interval,
}

impl ResourcePlan {
    /// Lays out the phases of `status` starting at cycle `now`.
    pub fn compute(status: RowBufferStatus, now: u64, timing: &PhaseTiming) -> Self {
        let mut precharge = None;
        let mut activate = None;
        let mut read_write = Interval::new(now, timing.command_cycles);
        let mut start = now;
        let mut bank_end = now;

        for &phase in status.phases() {
            let command = Interval::new(start, timing.command_cycles);
            match phase {
                Phase::Precharge => precharge = Some(command),
                Phase::Activate => activate = Some(command),
                Phase::ReadWrite => read_write = command,
            }
            bank_end = start + timing.bank_busy_cycles - 1;
            start = bank_end + 1;
        }

        Self {
            precharge,
            activate,
            read_write,
            bank: Interval {
                start: now,
                end: bank_end,
            },
            data: Interval::new(bank_end + 1, timing.data_cycles),
        }
    }

    /// Every command bus slot the plan uses, in issue order.
    pub fn commands(&self) -> impl Iterator<Item = Interval> + '_ {
        self.precharge
            .into_iter()
            .chain(self.activate)
            .chain(std::iter::once(self.read_write))
    }
}

impl fmt::Display for ResourcePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pre) = self.precharge {
            write!(f, "PRECHARGE {pre} ")?;
        }
        if let Some(act) = self.activate {
            write!(f, "ACTIVATE {act} ")?;
        }
        write!(
            f,
            "READ/WRITE {} DATA {} BANK {}",
            self.read_write, self.data, self.bank
        )
    }
}

/// A block request queued at or served by the DRAM controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRequest {
    /// Controller-assigned id, increasing in arrival order.
    pub id: u64,
    /// Block being fetched.
    pub block: BlockRequest,
    /// Target bank.
    pub bank: usize,
    /// Target row.
    pub row: u32,
    /// Cycle the request reached the controller.
    pub arrival: u64,
    /// Row-buffer status at the last planning.
    pub status: RowBufferStatus,
    /// Intervals from the last planning; fixed once scheduled.
    pub plan: ResourcePlan,
}

impl MemoryRequest {
    /// Whether this request and `other` would contend for the command bus, the data bus,
    /// or a shared bank.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        let command = self
            .plan
            .commands()
            .any(|mine| other.plan.commands().any(|theirs| mine.overlaps(&theirs)));
        let data = self.plan.data.overlaps(&other.plan.data);
        let bank = self.bank == other.bank && self.plan.bank.overlaps(&other.plan.bank);
        command || data || bank
    }
}
