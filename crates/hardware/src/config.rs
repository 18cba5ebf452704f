//! Configuration system for the memory hierarchy simulator.
//!
//! This module defines the configuration tree used to parameterize every component. It provides:
//! 1. **Defaults:** Baseline geometry, latencies, and DRAM phase durations.
//! 2. **Structures:** Hierarchical config for general settings, caches, MSHR, interconnect,
//!    DRAM, and the blocking cache model.
//! 3. **Validation:** `Config::validate` rejects geometries and timings the simulator
//!    cannot model before any component is built.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`) or built in
//! code starting from `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::CacheGeometry;
use crate::common::constants::{ADDRESS_BITS, BITS_PER_BYTE};
use crate::common::error::{ConfigError, require_power_of_two, require_range};

/// Default configuration constants for the simulator.
///
/// These values reproduce the reference hierarchy when a field is not
/// explicitly overridden in the JSON configuration.
mod defaults {
    /// Word width in bits.
    pub const WORD_BITS: u32 = 32;

    /// Size of each backing store (instruction and data) in bytes (1 MiB).
    pub const MEMORY_BYTES: u64 = 1024 * 1024;

    /// Cache line size shared by every level (32 bytes).
    pub const LINE_BYTES: u32 = 32;

    /// L1 instruction cache size (8 KiB).
    pub const L1_I_SIZE: u32 = 8 * 1024;

    /// L1 instruction cache associativity.
    pub const L1_I_WAYS: u32 = 4;

    /// L1 data cache size (64 KiB).
    pub const L1_D_SIZE: u32 = 64 * 1024;

    /// L1 data cache associativity.
    pub const L1_D_WAYS: u32 = 8;

    /// Shared L2 cache size (256 KiB).
    pub const L2_SIZE: u32 = 256 * 1024;

    /// L2 cache associativity.
    pub const L2_WAYS: u32 = 16;

    /// Number of miss status holding registers in the L2.
    pub const MSHR_ENTRIES: usize = 16;

    /// Cycles for an L2-to-L1 fill notification.
    pub const L2_TO_L1: u64 = 15;

    /// Cycles for an L2 block request to reach the DRAM controller.
    pub const L2_TO_MEMORY: u64 = 5;

    /// Cycles for a retired DRAM block to reach the L2.
    pub const MEMORY_TO_L2: u64 = 5;

    /// Number of DRAM banks.
    pub const BANKS: u32 = 8;

    /// Bit position of the DRAM row field.
    pub const ROW_SHIFT: u32 = 16;

    /// Command bus occupancy per phase.
    pub const COMMAND_CYCLES: u64 = 4;

    /// Bank lock per phase.
    ///
    /// The next phase of the same request starts after this many cycles.
    pub const BANK_BUSY_CYCLES: u64 = 100;

    /// Data bus occupancy per request.
    pub const DATA_CYCLES: u64 = 50;

    /// Fixed miss penalty of the blocking cache model.
    pub const MISS_PENALTY: u64 = 50;
}

/// Root configuration structure for the simulator.
///
/// Every section is optional in JSON; a missing section takes its `Default`.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use memsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.cache.l1_d.size_bytes, 64 * 1024);
/// assert_eq!(config.mshr.entries, 16);
/// assert!(config.validate().is_ok());
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use memsim_core::config::Config;
///
/// let json = r#"{
///     "general": { "memory_bytes": 65536 },
///     "cache": {
///         "l1_d": { "size_bytes": 1024, "ways": 2, "line_bytes": 32 }
///     },
///     "interconnect": { "l2_to_l1": 3 },
///     "dram": { "banks": 4 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cache.l1_d.ways, 2);
/// assert_eq!(config.cache.l2.ways, 16);
/// assert_eq!(config.interconnect.l2_to_l1, 3);
/// assert_eq!(config.interconnect.memory_to_l2, 5);
/// assert_eq!(config.dram.banks, 4);
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Word width and backing store size
    #[serde(default)]
    pub general: GeneralConfig,
    /// L1 instruction, L1 data, and L2 geometry
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    /// L2 miss tracking
    #[serde(default)]
    pub mshr: MshrConfig,
    /// Message latencies between levels
    #[serde(default)]
    pub interconnect: InterconnectConfig,
    /// DRAM banks and phase durations
    #[serde(default)]
    pub dram: DramConfig,
    /// Blocking single-level cache model
    #[serde(default)]
    pub blocking: BlockingConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    ///
    /// The result is not validated; call [`Config::validate`] before building components.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown value types.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and [`ConfigError::Parse`] if it
    /// is not a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks every parameter the simulator depends on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking cache geometry, line-size agreement,
    /// backing store size, MSHR capacity, latencies, then DRAM layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let word_bits = self.general.word_bits;
        let _ = CacheGeometry::from_config(&self.cache.l1_i, word_bits)?;
        let _ = CacheGeometry::from_config(&self.cache.l1_d, word_bits)?;
        let _ = CacheGeometry::from_config(&self.cache.l2, word_bits)?;

        let line = self.cache.l2.line_bytes;
        if self.cache.l1_i.line_bytes != line || self.cache.l1_d.line_bytes != line {
            return Err(ConfigError::MismatchedLineSize {
                l1_i: self.cache.l1_i.line_bytes,
                l1_d: self.cache.l1_d.line_bytes,
                l2: line,
            });
        }

        require_power_of_two("general.memory_bytes", self.general.memory_bytes)?;
        require_range(
            "general.memory_bytes",
            self.general.memory_bytes,
            line.into(),
            1 << ADDRESS_BITS,
        )?;

        require_range("mshr.entries", self.mshr.entries as u64, 1, 1 << 16)?;

        require_range("interconnect.l2_to_l1", self.interconnect.l2_to_l1, 1, u64::MAX)?;
        require_range(
            "interconnect.l2_to_memory",
            self.interconnect.l2_to_memory,
            1,
            u64::MAX,
        )?;
        require_range(
            "interconnect.memory_to_l2",
            self.interconnect.memory_to_l2,
            1,
            u64::MAX,
        )?;

        self.dram.validate(line)
    }

    /// Word width in bytes.
    pub const fn word_bytes(&self) -> u32 {
        self.general.word_bits / BITS_PER_BYTE
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Word width in bits (8, 16, or 32); bounds the tag field of every cache
    #[serde(default = "GeneralConfig::default_word_bits")]
    pub word_bits: u32,

    /// Size in bytes of each backing store (instruction and data)
    #[serde(default = "GeneralConfig::default_memory_bytes")]
    pub memory_bytes: u64,
}

impl GeneralConfig {
    /// Returns the default word width.
    const fn default_word_bits() -> u32 {
        defaults::WORD_BITS
    }

    /// Returns the default backing store size.
    const fn default_memory_bytes() -> u64 {
        defaults::MEMORY_BYTES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            word_bits: defaults::WORD_BITS,
            memory_bytes: defaults::MEMORY_BYTES,
        }
    }
}

/// Geometry of one set-associative cache.
///
/// A level given explicitly in JSON must name `size_bytes` and `ways`; `line_bytes`
/// defaults to 32.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Total capacity in bytes
    pub size_bytes: u32,

    /// Associativity
    pub ways: u32,

    /// Block size in bytes
    #[serde(default = "CacheConfig::default_line_bytes")]
    pub line_bytes: u32,
}

impl CacheConfig {
    /// Creates a cache configuration.
    pub const fn new(size_bytes: u32, ways: u32, line_bytes: u32) -> Self {
        Self {
            size_bytes,
            ways,
            line_bytes,
        }
    }

    /// Returns the default line size.
    const fn default_line_bytes() -> u32 {
        defaults::LINE_BYTES
    }
}

/// Configuration for the cache hierarchy.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache
    #[serde(default = "CacheHierarchyConfig::default_l1_i")]
    pub l1_i: CacheConfig,

    /// L1 data cache
    #[serde(default = "CacheHierarchyConfig::default_l1_d")]
    pub l1_d: CacheConfig,

    /// Shared L2 cache
    #[serde(default = "CacheHierarchyConfig::default_l2")]
    pub l2: CacheConfig,
}

impl CacheHierarchyConfig {
    /// 8 KiB, 4-way.
    const fn default_l1_i() -> CacheConfig {
        CacheConfig::new(defaults::L1_I_SIZE, defaults::L1_I_WAYS, defaults::LINE_BYTES)
    }

    /// 64 KiB, 8-way.
    const fn default_l1_d() -> CacheConfig {
        CacheConfig::new(defaults::L1_D_SIZE, defaults::L1_D_WAYS, defaults::LINE_BYTES)
    }

    /// 256 KiB, 16-way.
    const fn default_l2() -> CacheConfig {
        CacheConfig::new(defaults::L2_SIZE, defaults::L2_WAYS, defaults::LINE_BYTES)
    }
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1_i: Self::default_l1_i(),
            l1_d: Self::default_l1_d(),
            l2: Self::default_l2(),
        }
    }
}

/// Miss status holding register configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MshrConfig {
    /// Number of in-flight block misses the L2 can track
    #[serde(default = "MshrConfig::default_entries")]
    pub entries: usize,
}

impl MshrConfig {
    /// Returns the default MSHR capacity.
    const fn default_entries() -> usize {
        defaults::MSHR_ENTRIES
    }
}

impl Default for MshrConfig {
    fn default() -> Self {
        Self {
            entries: defaults::MSHR_ENTRIES,
        }
    }
}

/// Interconnect message latencies in cycles.
///
/// A message sent with latency `L` before a tick is delivered during the `L`-th tick.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InterconnectConfig {
    /// L2 fill notification to an L1
    #[serde(default = "InterconnectConfig::default_l2_to_l1")]
    pub l2_to_l1: u64,

    /// L2 block request to the DRAM controller
    #[serde(default = "InterconnectConfig::default_l2_to_memory")]
    pub l2_to_memory: u64,

    /// Retired DRAM block to the L2
    #[serde(default = "InterconnectConfig::default_memory_to_l2")]
    pub memory_to_l2: u64,
}

impl InterconnectConfig {
    /// Returns the default L2-to-L1 latency.
    const fn default_l2_to_l1() -> u64 {
        defaults::L2_TO_L1
    }

    /// Returns the default L2-to-memory latency.
    const fn default_l2_to_memory() -> u64 {
        defaults::L2_TO_MEMORY
    }

    /// Returns the default memory-to-L2 latency.
    const fn default_memory_to_l2() -> u64 {
        defaults::MEMORY_TO_L2
    }
}

impl Default for InterconnectConfig {
    fn default() -> Self {
        Self {
            l2_to_l1: defaults::L2_TO_L1,
            l2_to_memory: defaults::L2_TO_MEMORY,
            memory_to_l2: defaults::MEMORY_TO_L2,
        }
    }
}

/// DRAM organization and phase timing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DramConfig {
    /// Number of banks; the bank is selected by the address bits just above the block offset
    #[serde(default = "DramConfig::default_banks")]
    pub banks: u32,

    /// Row number is `addr >> row_shift`
    #[serde(default = "DramConfig::default_row_shift")]
    pub row_shift: u32,

    /// Command bus occupancy of each phase (precharge, activate, read/write)
    #[serde(default = "DramConfig::default_command_cycles")]
    pub command_cycles: u64,

    /// Bank lock per phase; the next phase starts after it elapses
    #[serde(default = "DramConfig::default_bank_busy_cycles")]
    pub bank_busy_cycles: u64,

    /// Data bus occupancy of the block transfer
    #[serde(default = "DramConfig::default_data_cycles")]
    pub data_cycles: u64,
}

impl DramConfig {
    /// Returns the default bank count.
    const fn default_banks() -> u32 {
        defaults::BANKS
    }

    /// Returns the default row shift.
    const fn default_row_shift() -> u32 {
        defaults::ROW_SHIFT
    }

    /// Returns the default command bus occupancy.
    const fn default_command_cycles() -> u64 {
        defaults::COMMAND_CYCLES
    }

    /// Returns the default per-phase bank lock.
    const fn default_bank_busy_cycles() -> u64 {
        defaults::BANK_BUSY_CYCLES
    }

    /// Returns the default data bus occupancy.
    const fn default_data_cycles() -> u64 {
        defaults::DATA_CYCLES
    }

    /// Checks bank count, row placement, and phase durations for a given line size.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the bank count is not a power of two, the row field
    /// overlaps the bank-select bits or leaves the address space, or a duration is zero or
    /// wider than 32 bits.
    pub fn validate(&self, line_bytes: u32) -> Result<(), ConfigError> {
        require_power_of_two("dram.banks", self.banks.into())?;
        let bank_top = line_bytes.trailing_zeros() + self.banks.trailing_zeros();
        if self.row_shift < bank_top {
            return Err(ConfigError::RowOverlapsBank {
                row_shift: self.row_shift,
                bank_top,
            });
        }
        require_range(
            "dram.row_shift",
            self.row_shift.into(),
            bank_top.into(),
            u64::from(ADDRESS_BITS - 1),
        )?;
        let max = u64::from(u32::MAX);
        require_range("dram.command_cycles", self.command_cycles, 1, max)?;
        require_range("dram.bank_busy_cycles", self.bank_busy_cycles, 1, max)?;
        require_range("dram.data_cycles", self.data_cycles, 1, max)?;
        Ok(())
    }
}

impl Default for DramConfig {
    fn default() -> Self {
        Self {
            banks: defaults::BANKS,
            row_shift: defaults::ROW_SHIFT,
            command_cycles: defaults::COMMAND_CYCLES,
            bank_busy_cycles: defaults::BANK_BUSY_CYCLES,
            data_cycles: defaults::DATA_CYCLES,
        }
    }
}

/// Blocking cache model settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BlockingConfig {
    /// Cycles charged for every miss, independent of write-backs
    #[serde(default = "BlockingConfig::default_miss_penalty")]
    pub miss_penalty: u64,
}

impl BlockingConfig {
    /// Returns the default miss penalty.
    const fn default_miss_penalty() -> u64 {
        defaults::MISS_PENALTY
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            miss_penalty: defaults::MISS_PENALTY,
        }
    }
}
