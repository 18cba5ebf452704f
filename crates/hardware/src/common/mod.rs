//! Common types used throughout the memory hierarchy simulator.
//!
//! This module provides the building blocks shared by every level of the hierarchy. It includes:
//! 1. **Address Decoding:** Cache geometry and the tag/index/offset split of a byte address.
//! 2. **Constants:** Address-space and word-size limits.
//! 3. **Request Types:** Requester kinds, access outcomes, and the block references carried
//!    between levels.
//! 4. **Error Handling:** Configuration errors reported at construction time.

/// Cache geometry and address decoding.
pub mod addr;

/// Address-space and word-size constants.
pub mod constants;

/// Requester kinds, access outcomes, and inter-level request types.
pub mod data;

/// Configuration error type.
pub mod error;

pub use addr::{CacheGeometry, DecodedAddr};
pub use data::{AccessResult, BlockRequest, L2Op, L2Request, RequesterKind};
pub use error::ConfigError;
