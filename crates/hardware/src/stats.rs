//! Simulation statistics collection and reporting.
//!
//! This module tracks performance counters for the memory hierarchy. It provides:
//! 1. **Cycles:** Total simulated cycles and host throughput.
//! 2. **Cache hierarchy:** Hit/miss counts for L1-I, L1-D, and L2, fills, and write-backs.
//! 3. **Miss tracking:** MSHR issues, merges, stalls, and cancellations.
//! 4. **DRAM:** Requests, row-buffer outcomes, and retired transfers.

use std::fmt::Write as _;
use std::time::Instant;

use crate::cache::{L2Response, MissDisposition};
use crate::common::{AccessResult, RequesterKind};
use crate::soc::memory::RowBufferStatus;

/// Simulation statistics structure tracking all hierarchy counters.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,

    /// L1 instruction cache hit count.
    pub icache_hits: u64,
    /// L1 instruction cache miss count.
    pub icache_misses: u64,
    /// L1 data cache hit count.
    pub dcache_hits: u64,
    /// L1 data cache miss count.
    pub dcache_misses: u64,
    /// Blocks installed in either L1.
    pub l1_fills: u64,

    /// L2 probe hit count (reads and writes).
    pub l2_hits: u64,
    /// L2 probe miss count, whatever their disposition.
    pub l2_misses: u64,
    /// Words written into the L2 by write hits.
    pub l2_writes: u64,
    /// Blocks installed in the L2 from memory.
    pub l2_fills: u64,
    /// Dirty L2 victims written back to a backing store.
    pub l2_writebacks: u64,

    /// Misses that allocated an MSHR entry and went to memory.
    pub mshr_issued: u64,
    /// Misses merged into an outstanding MSHR entry.
    pub mshr_merges: u64,
    /// Misses refused because the MSHR was full.
    pub mshr_stalls: u64,
    /// Cancellations that marked an outstanding MSHR entry.
    pub cancellations: u64,

    /// Block requests that reached the DRAM controller.
    pub dram_requests: u64,
    /// Scheduled requests that found their row open.
    pub dram_row_hits: u64,
    /// Scheduled requests that found their bank closed.
    pub dram_row_misses: u64,
    /// Scheduled requests that found another row open.
    pub dram_row_conflicts: u64,
    /// Requests whose data transfer completed.
    pub dram_retired: u64,

    /// Interconnect messages delivered.
    pub messages_delivered: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            icache_hits: 0,
            icache_misses: 0,
            dcache_hits: 0,
            dcache_misses: 0,
            l1_fills: 0,
            l2_hits: 0,
            l2_misses: 0,
            l2_writes: 0,
            l2_fills: 0,
            l2_writebacks: 0,
            mshr_issued: 0,
            mshr_merges: 0,
            mshr_stalls: 0,
            cancellations: 0,
            dram_requests: 0,
            dram_row_hits: 0,
            dram_row_misses: 0,
            dram_row_conflicts: 0,
            dram_retired: 0,
            messages_delivered: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"cache"`, `"mshr"`, `"dram"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "cache", "mshr", "dram"];

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl SimStats {
    /// Counts an L1 lookup.
    pub const fn record_l1(&mut self, kind: RequesterKind, result: AccessResult) {
        match (kind, result) {
            (RequesterKind::Instruction, AccessResult::Hit) => self.icache_hits += 1,
            (RequesterKind::Instruction, AccessResult::Miss) => self.icache_misses += 1,
            (RequesterKind::Data, AccessResult::Hit) => self.dcache_hits += 1,
            (RequesterKind::Data, AccessResult::Miss) => self.dcache_misses += 1,
        }
    }

    /// Counts an L2 probe.
    pub const fn record_l2(&mut self, response: L2Response) {
        match response {
            L2Response::Hit => self.l2_hits += 1,
            L2Response::Miss(disposition) => {
                self.l2_misses += 1;
                match disposition {
                    MissDisposition::Issued => self.mshr_issued += 1,
                    MissDisposition::Outstanding => self.mshr_merges += 1,
                    MissDisposition::Stalled => self.mshr_stalls += 1,
                }
            }
        }
    }

    /// Counts the row-buffer outcome of a scheduled DRAM request.
    pub const fn record_row(&mut self, status: RowBufferStatus) {
        match status {
            RowBufferStatus::Hit => self.dram_row_hits += 1,
            RowBufferStatus::Miss => self.dram_row_misses += 1,
            RowBufferStatus::Conflict => self.dram_row_conflicts += 1,
        }
    }

    /// Renders the requested sections as text.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]; an empty slice renders
    /// every section.
    pub fn report(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let mut out = String::new();

        if want("summary") {
            let khz = if seconds > 0.0 {
                self.cycles as f64 / seconds / 1000.0
            } else {
                0.0
            };
            let _ = writeln!(out, "\n==========================================================");
            let _ = writeln!(out, "MEMORY HIERARCHY SIMULATION STATISTICS");
            let _ = writeln!(out, "==========================================================");
            let _ = writeln!(out, "host_seconds             {seconds:.4} s");
            let _ = writeln!(out, "sim_cycles               {}", self.cycles);
            let _ = writeln!(out, "sim_freq                 {khz:.2} kHz");
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("cache") {
            let i_total = self.icache_hits + self.icache_misses;
            let d_total = self.dcache_hits + self.dcache_misses;
            let l2_total = self.l2_hits + self.l2_misses;
            let _ = writeln!(out, "CACHE HIERARCHY");
            let _ = writeln!(
                out,
                "  l1i.accesses           {i_total} (hit {:.2}%)",
                ratio(self.icache_hits, i_total)
            );
            let _ = writeln!(
                out,
                "  l1d.accesses           {d_total} (hit {:.2}%)",
                ratio(self.dcache_hits, d_total)
            );
            let _ = writeln!(out, "  l1.fills               {}", self.l1_fills);
            let _ = writeln!(
                out,
                "  l2.accesses            {l2_total} (hit {:.2}%)",
                ratio(self.l2_hits, l2_total)
            );
            let _ = writeln!(out, "  l2.writes              {}", self.l2_writes);
            let _ = writeln!(out, "  l2.fills               {}", self.l2_fills);
            let _ = writeln!(out, "  l2.writebacks          {}", self.l2_writebacks);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("mshr") {
            let _ = writeln!(out, "MISS TRACKING");
            let _ = writeln!(out, "  mshr.issued            {}", self.mshr_issued);
            let _ = writeln!(out, "  mshr.merges            {}", self.mshr_merges);
            let _ = writeln!(out, "  mshr.stalls            {}", self.mshr_stalls);
            let _ = writeln!(out, "  mshr.cancellations     {}", self.cancellations);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("dram") {
            let scheduled = self.dram_row_hits + self.dram_row_misses + self.dram_row_conflicts;
            let _ = writeln!(out, "DRAM");
            let _ = writeln!(out, "  dram.requests          {}", self.dram_requests);
            let _ = writeln!(
                out,
                "  dram.row_hits          {} ({:.2}%)",
                self.dram_row_hits,
                ratio(self.dram_row_hits, scheduled)
            );
            let _ = writeln!(out, "  dram.row_misses        {}", self.dram_row_misses);
            let _ = writeln!(out, "  dram.row_conflicts     {}", self.dram_row_conflicts);
            let _ = writeln!(out, "  dram.retired           {}", self.dram_retired);
            let _ = writeln!(out, "  interconnect.delivered {}", self.messages_delivered);
            let _ = writeln!(out, "==========================================================");
        }
        out
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.report(sections));
    }

    /// Prints every section to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
