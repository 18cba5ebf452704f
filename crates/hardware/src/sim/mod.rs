//! Simulation driver.
//!
//! Provides the `Simulator` context that owns every component of the hierarchy and advances
//! them one cycle at a time.

/// Cycle driver and driver-facing access API.
pub mod simulator;

pub use simulator::Simulator;
