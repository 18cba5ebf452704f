//! Configuration Unit Tests.
//!
//! Verifies the documented defaults, partial JSON overrides, file loading, and
//! every rejection path of `Config::validate`.

use std::io::Write;

use memsim_core::common::ConfigError;
use memsim_core::config::{CacheConfig, Config};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn defaults_match_reference_hierarchy() {
    let config = Config::default();
    assert_eq!(config.general.word_bits, 32);
    assert_eq!(config.general.memory_bytes, 1024 * 1024);
    assert_eq!(config.cache.l1_i, CacheConfig::new(8 * 1024, 4, 32));
    assert_eq!(config.cache.l1_d, CacheConfig::new(64 * 1024, 8, 32));
    assert_eq!(config.cache.l2, CacheConfig::new(256 * 1024, 16, 32));
    assert_eq!(config.mshr.entries, 16);
    assert_eq!(config.interconnect.l2_to_l1, 15);
    assert_eq!(config.interconnect.l2_to_memory, 5);
    assert_eq!(config.interconnect.memory_to_l2, 5);
    assert_eq!(config.dram.banks, 8);
    assert_eq!(config.dram.row_shift, 16);
    assert_eq!(config.dram.command_cycles, 4);
    assert_eq!(config.dram.bank_busy_cycles, 100);
    assert_eq!(config.dram.data_cycles, 50);
    assert_eq!(config.blocking.miss_penalty, 50);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_json_is_default() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
}

// ══════════════════════════════════════════════════════════
// 2. Overrides
// ══════════════════════════════════════════════════════════

#[test]
fn partial_sections_keep_other_defaults() {
    let config = Config::from_json(
        r#"{
            "cache": { "l2": { "size_bytes": 131072, "ways": 8 } },
            "dram": { "bank_busy_cycles": 40 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.cache.l2, CacheConfig::new(128 * 1024, 8, 32));
    assert_eq!(config.cache.l1_d, CacheConfig::new(64 * 1024, 8, 32));
    assert_eq!(config.dram.bank_busy_cycles, 40);
    assert_eq!(config.dram.data_cycles, 50);
}

#[test]
fn explicit_cache_level_requires_size_and_ways() {
    let err = Config::from_json(r#"{ "cache": { "l1_i": { "ways": 2 } } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "mshr": {{ "entries": 4 }}, "blocking": {{ "miss_penalty": 20 }} }}"#)
        .unwrap();
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.mshr.entries, 4);
    assert_eq!(config.blocking.miss_penalty, 20);
}

// ══════════════════════════════════════════════════════════
// 3. Validation
// ══════════════════════════════════════════════════════════

#[test]
fn line_sizes_must_agree() {
    let mut config = Config::default();
    config.cache.l1_d.line_bytes = 64;
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MismatchedLineSize {
            l1_i: 32,
            l1_d: 64,
            l2: 32
        }
    ));
}

#[test]
fn invalid_cache_geometry_is_reported() {
    let mut config = Config::default();
    config.cache.l2.size_bytes = 300_000;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPowerOfTwo {
            field: "size_bytes",
            ..
        })
    ));
}

#[test]
fn mshr_needs_an_entry() {
    let mut config = Config::default();
    config.mshr.entries = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            field: "mshr.entries",
            ..
        })
    ));
}

#[test]
fn latencies_must_be_positive() {
    let mut config = Config::default();
    config.interconnect.memory_to_l2 = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            field: "interconnect.memory_to_l2",
            ..
        })
    ));
}

#[test]
fn memory_must_be_power_of_two() {
    let mut config = Config::default();
    config.general.memory_bytes = 1000;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPowerOfTwo {
            field: "general.memory_bytes",
            ..
        })
    ));
}

#[test]
fn bank_count_must_be_power_of_two() {
    let mut config = Config::default();
    config.dram.banks = 6;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPowerOfTwo {
            field: "dram.banks",
            value: 6
        })
    ));
}

/// 32-byte lines and 8 banks use bits 5..8, so the row may start at bit 8 but not below.
#[test]
fn row_field_must_clear_bank_bits() {
    let mut config = Config::default();
    config.dram.row_shift = 7;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::RowOverlapsBank {
            row_shift: 7,
            bank_top: 8
        })
    ));
    config.dram.row_shift = 8;
    assert!(config.validate().is_ok());
}

#[test]
fn phase_durations_must_be_positive() {
    let mut config = Config::default();
    config.dram.data_cycles = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            field: "dram.data_cycles",
            ..
        })
    ));
}

#[test]
fn phase_durations_must_fit_in_32_bits() {
    let mut config = Config::default();
    config.dram.bank_busy_cycles = u64::MAX;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            field: "dram.bank_busy_cycles",
            max,
            ..
        }) if max == u64::from(u32::MAX)
    ));
    config.dram.bank_busy_cycles = u64::from(u32::MAX);
    config.dram.command_cycles = u64::from(u32::MAX) + 1;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            field: "dram.command_cycles",
            ..
        })
    ));
    config.dram.command_cycles = u64::from(u32::MAX);
    config.dram.data_cycles = u64::from(u32::MAX);
    assert!(config.validate().is_ok());
}
