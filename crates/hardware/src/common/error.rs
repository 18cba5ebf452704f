//! Configuration errors.
//!
//! Every error the simulator reports is a construction-time configuration problem. Runtime
//! capacity exhaustion (a full MSHR, no schedulable DRAM request) is reported as a stall,
//! and invariant violations panic.

use thiserror::Error;

/// Errors returned while validating a configuration or building hierarchy components.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A geometry or count parameter that must be a power of two is not.
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value supplied.
        value: u64,
    },

    /// The cache cannot hold even one set.
    #[error("cache of {size_bytes} bytes cannot hold {ways} ways of {line_bytes}-byte lines")]
    GeometryTooSmall {
        /// Total capacity in bytes.
        size_bytes: u32,
        /// Associativity.
        ways: u32,
        /// Line size in bytes.
        line_bytes: u32,
    },

    /// A cache line is narrower than one word.
    #[error("line of {line_bytes} bytes is smaller than a {word_bytes}-byte word")]
    LineSmallerThanWord {
        /// Line size in bytes.
        line_bytes: u32,
        /// Word size in bytes.
        word_bytes: u32,
    },

    /// One way spans more address bits than a word holds, leaving no tag.
    #[error("way of {way_bytes} bytes exceeds the {word_bits}-bit address space")]
    WayExceedsAddressSpace {
        /// Bytes per way (`size / ways`).
        way_bytes: u32,
        /// Word width in bits.
        word_bits: u32,
    },

    /// The caches of the timing hierarchy disagree on the line size.
    #[error("line sizes must match across levels (l1_i={l1_i}, l1_d={l1_d}, l2={l2})")]
    MismatchedLineSize {
        /// L1 instruction cache line size.
        l1_i: u32,
        /// L1 data cache line size.
        l1_d: u32,
        /// L2 cache line size.
        l2: u32,
    },

    /// A scalar parameter lies outside its accepted range.
    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value supplied.
        value: u64,
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },

    /// The DRAM row field overlaps the bank-select bits.
    #[error("row_shift {row_shift} overlaps the bank bits below bit {bank_top}")]
    RowOverlapsBank {
        /// Configured row shift.
        row_shift: u32,
        /// First bit above the bank-select field.
        bank_top: u32,
    },

    /// Malformed JSON configuration.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Checks that `value` is a non-zero power of two.
///
/// # Errors
///
/// Returns [`ConfigError::NotPowerOfTwo`] naming `field` otherwise.
pub(crate) fn require_power_of_two(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ConfigError::NotPowerOfTwo { field, value })
    }
}

/// Checks that `min <= value <= max`.
///
/// # Errors
///
/// Returns [`ConfigError::OutOfRange`] naming `field` otherwise.
pub(crate) fn require_range(
    field: &'static str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
