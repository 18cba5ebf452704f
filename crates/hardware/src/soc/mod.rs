//! Memory-Side Components.
//!
//! This module organizes everything below the L2: the interconnect that delays block
//! transfers between levels, the backing stores, and the DRAM timing model.

/// Latency-delayed message queue between L1s, L2, and memory.
pub mod interconnect;

/// Backing stores and DRAM banks, channel, and controller.
pub mod memory;

/// Backing store trait.
pub mod traits;

pub use interconnect::{Direction, Interconnect, Message};
pub use memory::{DramController, FlatMemory, SplitMemory};
pub use traits::BackingStore;
