//! Global constants.
//!
//! Addresses are 32-bit byte addresses; data words are stored as `u32` regardless of the
//! configured word width.

/// Width of a byte address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Number of bits in a byte.
pub const BITS_PER_BYTE: u32 = 8;

/// Word widths (in bits) accepted by the address decoder.
pub const SUPPORTED_WORD_BITS: &[u32] = &[8, 16, 32];
