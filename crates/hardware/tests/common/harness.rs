use memsim_core::Simulator;
use memsim_core::common::{AccessResult, RequesterKind};
use memsim_core::config::{CacheConfig, Config};
use tracing_subscriber::EnvFilter;

/// Upper bound on ticks any single test transfer may take.
pub const TICK_LIMIT: u64 = 10_000;

/// Installs a test-writer fmt subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A small hierarchy that fills quickly and evicts after a handful of blocks.
///
/// - L1-I / L1-D: 256 B, 2-way, 32 B lines (4 sets, tag shift 7)
/// - L2: 1 KiB, 4-way, 32 B lines (8 sets, tag shift 8)
/// - MSHR: 4 entries; all interconnect latencies 1
/// - Backing stores: 64 KiB each
pub fn small_config() -> Config {
    let mut config = Config::default();
    config.general.memory_bytes = 64 * 1024;
    config.cache.l1_i = CacheConfig::new(256, 2, 32);
    config.cache.l1_d = CacheConfig::new(256, 2, 32);
    config.cache.l2 = CacheConfig::new(1024, 4, 32);
    config.mshr.entries = 4;
    config.interconnect.l2_to_l1 = 1;
    config.interconnect.l2_to_memory = 1;
    config.interconnect.memory_to_l2 = 1;
    config
}

pub struct TestContext {
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(&small_config())
    }
}

impl TestContext {
    pub fn new(config: &Config) -> Self {
        init_tracing();
        let sim = Simulator::new(config).expect("test configuration must validate");
        Self { sim }
    }

    /// Retries a read until it hits; returns the ticks spent waiting.
    pub fn read_until_hit(&mut self, kind: RequesterKind, addr: u32) -> u64 {
        let start = self.sim.cycle();
        while self.sim.access(kind, addr) == AccessResult::Miss {
            assert!(
                self.sim.cycle() - start < TICK_LIMIT,
                "read of {addr:#x} never hit"
            );
            self.sim.tick();
        }
        self.sim.cycle() - start
    }

    /// Retries a store until the L2 accepts it; returns the ticks spent waiting.
    pub fn write_until_hit(&mut self, addr: u32, word: u32) -> u64 {
        let start = self.sim.cycle();
        while self.sim.write(addr, word) == AccessResult::Miss {
            assert!(
                self.sim.cycle() - start < TICK_LIMIT,
                "write of {addr:#x} never hit"
            );
            self.sim.tick();
        }
        self.sim.cycle() - start
    }

    /// Ticks until nothing is in flight.
    pub fn settle(&mut self) {
        let _ = self.sim.run_until_quiescent(TICK_LIMIT);
        assert!(self.sim.is_quiescent(), "hierarchy did not settle");
    }
}
