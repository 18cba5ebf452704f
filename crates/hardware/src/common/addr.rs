//! Cache Geometry and Address Decoding.
//!
//! This module splits byte addresses into the fields a set-associative cache indexes by.
//! It provides the following:
//! 1. **Geometry:** `CacheGeometry` validates size, associativity, and line size once, and
//!    precomputes every shift and mask the decoder needs.
//! 2. **Decoding:** `CacheGeometry::decode` maps an address to tag, set index, word offset,
//!    and block-aligned address without any further checks.
//! 3. **Reconstruction:** `CacheGeometry::block_start` rebuilds a block address from a
//!    (tag, index) pair, which is how write-backs locate a victim in the backing store.
//!
//! For a cache of `size` bytes, `ways` ways, and `line` bytes per block:
//!
//! ```text
//! index_bits = log2(size / (ways * line))
//! tag_shift  = log2(size / ways)
//! tag_bits   = word_bits - tag_shift
//! offset     = (addr mod line) / word_bytes
//! ```

use super::constants::{BITS_PER_BYTE, SUPPORTED_WORD_BITS};
use super::error::{ConfigError, require_power_of_two};
use crate::config::CacheConfig;

/// Low `bits` set, for `bits` in `0..=32`.
#[inline(always)]
const fn mask(bits: u32) -> u32 {
    ((1u64 << bits) - 1) as u32
}

/// Fields of a decoded byte address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedAddr {
    /// Tag bits above the way span.
    pub tag: u32,
    /// Set index.
    pub index: usize,
    /// Word offset within the block.
    pub offset: usize,
    /// Block-aligned byte address rebuilt from `tag` and `index`.
    pub block_addr: u32,
}

/// Immutable geometry of one set-associative cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    word_bits: u32,
    size_bytes: u32,
    ways: u32,
    line_bytes: u32,
    sets: u32,
    offset_bits: u32,
    index_bits: u32,
    tag_shift: u32,
    tag_bits: u32,
}

impl CacheGeometry {
    /// Validates a geometry and precomputes its decoding fields.
    ///
    /// # Arguments
    ///
    /// * `word_bits` - Word width in bits (8, 16, or 32). Bounds the tag width.
    /// * `size_bytes` - Total capacity.
    /// * `ways` - Associativity.
    /// * `line_bytes` - Block size.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when any value is not a power of two, the word width is
    /// unsupported, the line is narrower than a word, the cache cannot hold one set, or
    /// one way spans more address bits than `word_bits`.
    pub fn new(
        word_bits: u32,
        size_bytes: u32,
        ways: u32,
        line_bytes: u32,
    ) -> Result<Self, ConfigError> {
        if !SUPPORTED_WORD_BITS.contains(&word_bits) {
            return Err(ConfigError::OutOfRange {
                field: "word_bits",
                value: word_bits.into(),
                min: 8,
                max: 32,
            });
        }
        require_power_of_two("size_bytes", size_bytes.into())?;
        require_power_of_two("ways", ways.into())?;
        require_power_of_two("line_bytes", line_bytes.into())?;

        let word_bytes = word_bits / BITS_PER_BYTE;
        if line_bytes < word_bytes {
            return Err(ConfigError::LineSmallerThanWord {
                line_bytes,
                word_bytes,
            });
        }
        if u64::from(ways) * u64::from(line_bytes) > u64::from(size_bytes) {
            return Err(ConfigError::GeometryTooSmall {
                size_bytes,
                ways,
                line_bytes,
            });
        }

        let way_bytes = size_bytes / ways;
        let tag_shift = way_bytes.trailing_zeros();
        if tag_shift > word_bits {
            return Err(ConfigError::WayExceedsAddressSpace {
                way_bytes,
                word_bits,
            });
        }
        let sets = way_bytes / line_bytes;

        Ok(Self {
            word_bits,
            size_bytes,
            ways,
            line_bytes,
            sets,
            offset_bits: line_bytes.trailing_zeros(),
            index_bits: sets.trailing_zeros(),
            tag_shift,
            tag_bits: word_bits - tag_shift,
        })
    }

    /// Builds the geometry of a configured cache.
    ///
    /// # Errors
    ///
    /// See [`CacheGeometry::new`].
    pub fn from_config(config: &CacheConfig, word_bits: u32) -> Result<Self, ConfigError> {
        Self::new(word_bits, config.size_bytes, config.ways, config.line_bytes)
    }

    /// Splits `addr` into tag, index, word offset, and block-aligned address.
    #[inline]
    pub const fn decode(&self, addr: u32) -> DecodedAddr {
        let tag = if self.tag_bits == 0 {
            0
        } else {
            (addr >> self.tag_shift) & mask(self.tag_bits)
        };
        let index = (addr >> self.index_shift()) & mask(self.index_bits);
        let offset = (addr & (self.line_bytes - 1)) / self.word_bytes();
        DecodedAddr {
            tag,
            index: index as usize,
            offset: offset as usize,
            block_addr: self.block_start(tag, index as usize),
        }
    }

    /// Rebuilds the block-aligned address of `(tag, index)`.
    #[inline]
    pub const fn block_start(&self, tag: u32, index: usize) -> u32 {
        let tag_part = ((tag as u64) << self.tag_shift) as u32;
        tag_part | ((index as u32) << self.index_shift())
    }

    /// Block-aligned address of `addr`.
    #[inline]
    pub const fn block_addr(&self, addr: u32) -> u32 {
        self.decode(addr).block_addr
    }

    /// Word width in bits.
    pub const fn word_bits(&self) -> u32 {
        self.word_bits
    }

    /// Word width in bytes.
    pub const fn word_bytes(&self) -> u32 {
        self.word_bits / BITS_PER_BYTE
    }

    /// Total capacity in bytes.
    pub const fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways as usize
    }

    /// Block size in bytes.
    pub const fn line_bytes(&self) -> u32 {
        self.line_bytes
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.sets as usize
    }

    /// Words held by one block.
    pub const fn words_per_line(&self) -> usize {
        (self.line_bytes / self.word_bytes()) as usize
    }

    /// Width of the block offset field (`log2(line)`).
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Width of the set index field.
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Width of the tag field.
    pub const fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Bit position of the tag field (`log2(size / ways)`).
    pub const fn tag_shift(&self) -> u32 {
        self.tag_shift
    }

    /// Bit position of the index field, equal to [`CacheGeometry::offset_bits`].
    pub const fn index_shift(&self) -> u32 {
        self.offset_bits
    }
}
