//! Latency-delayed interconnect between the L1s, the L2, and memory.
//!
//! This module implements the single message queue that carries block transfers between
//! levels. It provides:
//! 1. **Sending:** Messages are enqueued with a per-direction latency.
//! 2. **Delivery:** Each tick delivers, in FIFO order, every message whose countdown has
//!    already reached zero and decrements the rest.
//! 3. **Inspection:** Queue length and in-flight messages for tests and tracing.
//!
//! A message sent with latency `L` is enqueued with `remaining = L - 1` and is therefore
//! delivered during the `L`-th tick after it was sent. L1-to-L2 probes and cancellations do
//! not travel through the queue.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::common::BlockRequest;
use crate::config::InterconnectConfig;

/// Route of an interconnect message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Fill notification from the L2 to the L1 named by the block's requester kind.
    L2ToL1,
    /// Block request from the L2 to the DRAM controller.
    L2ToMemory,
    /// Retired DRAM block returning to the L2.
    MemoryToL2,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::L2ToL1 => "L2->L1",
            Self::L2ToMemory => "L2->MEM",
            Self::MemoryToL2 => "MEM->L2",
        };
        f.write_str(s)
    }
}

/// A block transfer in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    /// Block being transferred.
    pub block: BlockRequest,
    /// Ticks left before delivery; zero means the next tick delivers it.
    pub remaining: u64,
    /// Route.
    pub direction: Direction,
}

/// FIFO message queue with per-direction latencies.
#[derive(Clone, Debug)]
pub struct Interconnect {
    queue: VecDeque<Message>,
    l2_to_l1: u64,
    l2_to_memory: u64,
    memory_to_l2: u64,
}

impl Interconnect {
    /// Creates an empty interconnect with the configured latencies.
    pub fn new(config: &InterconnectConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            l2_to_l1: config.l2_to_l1,
            l2_to_memory: config.l2_to_memory,
            memory_to_l2: config.memory_to_l2,
        }
    }

    /// Configured latency of `direction`.
    pub const fn latency(&self, direction: Direction) -> u64 {
        match direction {
            Direction::L2ToL1 => self.l2_to_l1,
            Direction::L2ToMemory => self.l2_to_memory,
            Direction::MemoryToL2 => self.memory_to_l2,
        }
    }

    /// Enqueues `block` for delivery after `latency` ticks.
    ///
    /// A latency of zero behaves like one.
    pub fn send(&mut self, block: BlockRequest, latency: u64, direction: Direction) {
        let remaining = latency.saturating_sub(1);
        debug!(%block, %direction, latency, "interconnect send");
        self.queue.push_back(Message {
            block,
            remaining,
            direction,
        });
    }

    /// Enqueues `block` on `direction` with its configured latency.
    pub fn send_on(&mut self, block: BlockRequest, direction: Direction) {
        self.send(block, self.latency(direction), direction);
    }

    /// Advances every message by one tick and returns those delivered, oldest first.
    pub fn tick(&mut self) -> Vec<Message> {
        let mut delivered = Vec::new();
        self.queue.retain_mut(|msg| {
            if msg.remaining == 0 {
                delivered.push(*msg);
                false
            } else {
                msg.remaining -= 1;
                true
            }
        });
        for msg in &delivered {
            debug!(block = %msg.block, direction = %msg.direction, "interconnect deliver");
        }
        delivered
    }

    /// Number of messages in flight.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no message is in flight.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// In-flight messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.queue.iter()
    }
}
