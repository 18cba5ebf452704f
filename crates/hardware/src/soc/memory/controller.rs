//! FR-FCFS DRAM request controller.
//!
//! This module implements the DRAM scheduler. Each cycle it:
//! 1. **Retires** ongoing requests whose data transfer has ended, releasing their bus and
//!    bank reservations and handing their blocks back to the caller.
//! 2. **Replans** every pending request against the current row-buffer state and cycle.
//! 3. **Schedules** at most one request: among the pending requests whose plan overlaps no
//!    reservation on the command bus, the data bus, or its own bank, the first row hit in
//!    arrival order wins, otherwise the oldest candidate.
//!
//! The winner's phases are applied to its bank immediately and its intervals are reserved
//! until it retires. Scheduled requests are never cancelled.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::bank::Bank;
use super::channel::Channel;
use super::request::{MemoryRequest, PhaseTiming, ResourcePlan, RowBufferStatus};
use crate::common::BlockRequest;
use crate::config::DramConfig;

/// What one controller cycle did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DramTick {
    /// Blocks whose transfer completed, in scheduling order.
    pub retired: Vec<BlockRequest>,
    /// Request moved from pending to ongoing, if any.
    pub scheduled: Option<MemoryRequest>,
}

/// DRAM banks, channel, and request queues.
#[derive(Clone, Debug)]
pub struct DramController {
    banks: Vec<Bank>,
    channel: Channel,
    pending: VecDeque<MemoryRequest>,
    ongoing: Vec<MemoryRequest>,
    timing: PhaseTiming,
    line_shift: u32,
    row_shift: u32,
    next_id: u64,
}

impl DramController {
    /// Creates an idle controller.
    ///
    /// # Arguments
    ///
    /// * `config` - Bank count, row placement, and phase durations.
    /// * `line_bytes` - Block size; the bank is selected by the bits just above it.
    pub fn new(config: &DramConfig, line_bytes: u32) -> Self {
        Self {
            banks: vec![Bank::new(); config.banks as usize],
            channel: Channel::new(),
            pending: VecDeque::new(),
            ongoing: Vec::new(),
            timing: PhaseTiming::from(config),
            line_shift: line_bytes.trailing_zeros(),
            row_shift: config.row_shift,
            next_id: 0,
        }
    }

    /// Bank serving `addr`: the block number masked to the bank count.
    ///
    /// # Panics
    ///
    /// Panics if the bank count is not a power of two, so the mask would select a
    /// missing bank.
    pub fn bank_index(&self, addr: u32) -> usize {
        let banks = self.banks.len();
        assert!(banks.is_power_of_two(), "{banks} banks cannot be selected by a mask");
        ((addr >> self.line_shift) as usize) & (banks - 1)
    }

    /// Row of `addr`.
    pub const fn row(&self, addr: u32) -> u32 {
        addr >> self.row_shift
    }

    /// Queues a block request that arrived at cycle `now`.
    pub fn add_request(&mut self, block: BlockRequest, now: u64) {
        let bank = self.bank_index(block.block_addr);
        let row = self.row(block.block_addr);
        let status = self.banks[bank].status(row);
        let request = MemoryRequest {
            id: self.next_id,
            block,
            bank,
            row,
            arrival: now,
            status,
            plan: ResourcePlan::compute(status, now, &self.timing),
        };
        self.next_id += 1;
        debug!(%block, bank, row, id = request.id, "dram request added");
        self.pending.push_back(request);
    }

    /// Runs one controller cycle at cycle `now`.
    pub fn tick(&mut self, now: u64) -> DramTick {
        let retired = self.retire(now);
        let scheduled = self.schedule(now);
        DramTick { retired, scheduled }
    }

    fn retire(&mut self, now: u64) -> Vec<BlockRequest> {
        let mut retired = Vec::new();
        let mut i = 0;
        while i < self.ongoing.len() {
            if self.ongoing[i].plan.data.end <= now {
                let done = self.ongoing.remove(i);
                self.channel.release(done.id);
                self.banks[done.bank].release(done.id);
                debug!(block = %done.block, id = done.id, cycle = now, "dram request retired");
                retired.push(done.block);
            } else {
                i += 1;
            }
        }
        retired
    }

    fn schedule(&mut self, now: u64) -> Option<MemoryRequest> {
        let mut best = None;
        for i in 0..self.pending.len() {
            let (bank, row) = (self.pending[i].bank, self.pending[i].row);
            let status = self.banks[bank].status(row);
            let plan = ResourcePlan::compute(status, now, &self.timing);
            self.pending[i].status = status;
            self.pending[i].plan = plan;
            trace!(id = self.pending[i].id, ?status, %plan, "dram plan");

            if !self.is_candidate(&self.pending[i]) {
                continue;
            }
            if status == RowBufferStatus::Hit {
                best = Some(i);
                break;
            }
            if best.is_none() {
                best = Some(i);
            }
        }

        let request = self.pending.remove(best?)?;
        self.banks[request.bank].apply(request.status.phases(), request.row);
        self.banks[request.bank].reserve(request.id, request.plan.bank);
        self.channel.reserve(request.id, &request.plan);
        debug!(
            block = %request.block,
            id = request.id,
            status = ?request.status,
            cycle = now,
            "dram request scheduled"
        );
        self.ongoing.push(request);
        Some(request)
    }

    /// Whether `request`'s current plan overlaps no reserved bus slot or bank interval.
    pub fn is_candidate(&self, request: &MemoryRequest) -> bool {
        self.channel.is_free(&request.plan) && self.banks[request.bank].is_free(&request.plan.bank)
    }

    /// Requests waiting to be scheduled, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &MemoryRequest> {
        self.pending.iter()
    }

    /// Scheduled requests whose data transfer has not completed, in scheduling order.
    pub fn ongoing(&self) -> &[MemoryRequest] {
        &self.ongoing
    }

    /// All banks.
    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    /// The shared channel.
    pub const fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Whether nothing is pending or ongoing.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.ongoing.is_empty()
    }
}
