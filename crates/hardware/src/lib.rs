//! Cycle-level memory hierarchy simulator library.
//!
//! This crate models a split-L1 / shared-L2 / DRAM memory hierarchy with the following:
//! 1. **Caches:** Tag-only L1 instruction and data caches, a shared write-back L2 with an
//!    MSHR, and a blocking single-level cache model, all on one LRU tag store.
//! 2. **Interconnect:** A FIFO of latency-delayed block transfers between levels.
//! 3. **DRAM:** Banks with row buffers, a shared command/data channel, and an FR-FCFS
//!    scheduler over inclusive timing intervals.
//! 4. **Simulation:** The `Simulator` cycle driver, configuration, and statistics.

/// Common types (address decoding, request kinds, errors).
pub mod common;
/// Simulator configuration (defaults, hierarchical config structures, validation).
pub mod config;
/// Caches (tag store, LRU, L1, L2, MSHR, blocking cache).
pub mod cache;
/// Cycle driver.
pub mod sim;
/// Interconnect, backing stores, and DRAM timing.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Counters reported by the simulator.
pub use crate::stats::SimStats;
