//! L2 Cache Unit Tests.
//!
//! Covers the probe dispositions (hit, issued, outstanding, stalled), kind
//! qualification of tags and MSHR entries, fills from the backing store, dirty
//! write-back ordering, and cancellation of the L1 notification.

use memsim_core::cache::{L2Cache, L2Response, MissDisposition};
use memsim_core::common::{BlockRequest, CacheGeometry, L2Request, RequesterKind};
use memsim_core::config::InterconnectConfig;
use memsim_core::soc::{BackingStore, Direction, Interconnect, SplitMemory};
use mockall::Sequence;
use mockall::predicate::eq;
use pretty_assertions::assert_eq;

use crate::common::mocks::memory::MockStore;

const I: RequesterKind = RequesterKind::Instruction;
const D: RequesterKind = RequesterKind::Data;

/// 1 KiB, 4-way, 32 B lines: 8 sets, tag shift 8, so `t << 8` all map to set 0.
fn l2(mshr_entries: usize) -> L2Cache {
    L2Cache::new(CacheGeometry::new(32, 1024, 4, 32).unwrap(), mshr_entries)
}

fn interconnect() -> Interconnect {
    Interconnect::new(&InterconnectConfig::default())
}

fn memory() -> SplitMemory {
    SplitMemory::flat(64 * 1024, 4)
}

/// Probes a read miss and fills it, as the simulator would.
fn bring_in(l2: &mut L2Cache, ic: &mut Interconnect, mem: &mut SplitMemory, addr: u32) {
    let _ = l2.probe(L2Request::read(addr, D), ic);
    let _ = l2.fill(BlockRequest::new(addr, D), ic, mem);
}

// ══════════════════════════════════════════════════════════
// 1. Probe dispositions
// ══════════════════════════════════════════════════════════

#[test]
fn cold_miss_issues_one_memory_request() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let response = l2.probe(L2Request::read(0x104, D), &mut ic);
    assert_eq!(response, L2Response::Miss(MissDisposition::Issued));
    assert_eq!(ic.len(), 1);
    let msg = ic.messages().next().unwrap();
    assert_eq!(msg.direction, Direction::L2ToMemory);
    assert_eq!(msg.block, BlockRequest::new(0x100, D));
    assert!(l2.mshr().contains(0x100, D));
}

#[test]
fn repeated_miss_merges_into_outstanding_entry() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let _ = l2.probe(L2Request::read(0x100, D), &mut ic);
    let again = l2.probe(L2Request::read(0x11C, D), &mut ic);
    assert_eq!(again, L2Response::Miss(MissDisposition::Outstanding));
    assert_eq!(ic.len(), 1, "a merged miss must not reach memory twice");
    assert_eq!(l2.mshr().len(), 1);
}

#[test]
fn kinds_miss_independently_on_same_address() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let _ = l2.probe(L2Request::read(0x100, D), &mut ic);
    let other = l2.probe(L2Request::read(0x100, I), &mut ic);
    assert_eq!(other, L2Response::Miss(MissDisposition::Issued));
    assert_eq!(l2.mshr().len(), 2);
    assert_eq!(ic.len(), 2);
}

#[test]
fn full_mshr_stalls_without_sending() {
    let mut l2 = l2(2);
    let mut ic = interconnect();
    let _ = l2.probe(L2Request::read(0x000, D), &mut ic);
    let _ = l2.probe(L2Request::read(0x100, D), &mut ic);
    let stalled = l2.probe(L2Request::read(0x200, D), &mut ic);
    assert_eq!(stalled, L2Response::Miss(MissDisposition::Stalled));
    assert_eq!(ic.len(), 2);
    assert!(!l2.mshr().contains(0x200, D));
}

#[test]
fn read_hit_sends_fill_to_l1() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    bring_in(&mut l2, &mut ic, &mut mem, 0x100);
    let before = ic.len();

    assert_eq!(l2.probe(L2Request::read(0x108, D), &mut ic), L2Response::Hit);
    assert_eq!(ic.len(), before + 1);
    let last = ic.messages().last().unwrap();
    assert_eq!(last.direction, Direction::L2ToL1);
    assert_eq!(last.block, BlockRequest::new(0x100, D));
}

#[test]
fn write_hit_updates_word_without_messages() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    bring_in(&mut l2, &mut ic, &mut mem, 0x100);
    let before = ic.len();

    assert_eq!(l2.probe(L2Request::write(0x10C, 7), &mut ic), L2Response::Hit);
    assert_eq!(ic.len(), before);
    assert_eq!(l2.read_word(0x10C, D), Some(7));
    let set = l2.set(0);
    assert!(set.iter().any(|b| b.valid && b.dirty && b.tag == 1));
}

#[test]
fn write_miss_is_issued_like_a_read() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let response = l2.probe(L2Request::write(0x200, 1), &mut ic);
    assert_eq!(response, L2Response::Miss(MissDisposition::Issued));
    assert_eq!(l2.read_word(0x200, D), None);
}

// ══════════════════════════════════════════════════════════
// 2. Fills and write-back
// ══════════════════════════════════════════════════════════

#[test]
fn fill_loads_block_from_backing_store() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    mem.data.load(0x100, &[1, 2, 3, 4, 5, 6, 7, 8]);

    let _ = l2.probe(L2Request::read(0x104, D), &mut ic);
    let outcome = l2.fill(BlockRequest::new(0x100, D), &mut ic, &mut mem);
    assert!(outcome.notified);
    assert_eq!(outcome.wrote_back, None);
    assert!(l2.mshr().is_empty());
    assert_eq!(l2.read_word(0x104, D), Some(2));
    assert_eq!(l2.read_word(0x11C, D), Some(8));
    assert!(!l2.contains(0x100, I));
}

#[test]
fn instruction_fill_reads_instruction_store() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    mem.instruction.load(0x40, &[0x13; 8]);
    mem.data.load(0x40, &[0xFF; 8]);

    let _ = l2.probe(L2Request::read(0x40, I), &mut ic);
    let _ = l2.fill(BlockRequest::new(0x40, I), &mut ic, &mut mem);
    assert_eq!(l2.read_word(0x44, I), Some(0x13));
    assert_eq!(l2.read_word(0x44, D), None);
}

#[test]
fn dirty_victim_is_written_back() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    bring_in(&mut l2, &mut ic, &mut mem, 0x000);
    let _ = l2.probe(L2Request::write(0x000, 0xDEAD), &mut ic);
    for addr in [0x100, 0x200, 0x300] {
        bring_in(&mut l2, &mut ic, &mut mem, addr);
    }

    let _ = l2.probe(L2Request::read(0x400, D), &mut ic);
    let outcome = l2.fill(BlockRequest::new(0x400, D), &mut ic, &mut mem);
    assert_eq!(outcome.wrote_back, Some(BlockRequest::new(0x000, D)));
    assert_eq!(mem.data.read_word(0x000), 0xDEAD);
    assert_eq!(mem.instruction.read_word(0x000), 0);
    assert!(!l2.contains(0x000, D));
    assert!(l2.contains(0x400, D));
}

#[test]
fn clean_victim_is_dropped() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    for addr in [0x000, 0x100, 0x200, 0x300] {
        bring_in(&mut l2, &mut ic, &mut mem, addr);
    }
    let _ = l2.probe(L2Request::read(0x400, D), &mut ic);
    let outcome = l2.fill(BlockRequest::new(0x400, D), &mut ic, &mut mem);
    assert_eq!(outcome.wrote_back, None);
    assert!(mem.data.words().iter().all(|&w| w == 0));
}

/// One-set L2: the dirty victim must be written word by word, in address order,
/// to the data store, before the incoming block is read.
#[test]
fn write_back_traffic_is_ordered_word_by_word() {
    let mut l2 = L2Cache::new(CacheGeometry::new(32, 128, 4, 32).unwrap(), 8);
    let mut ic = interconnect();

    let mut data = MockStore::new();
    let _ = data.expect_read_word().returning(|addr| addr);
    let mut seq = Sequence::new();
    for i in 0..8u32 {
        let word = if i == 1 { 0xAB } else { i * 4 };
        let _ = data
            .expect_write_word()
            .with(eq(i * 4), eq(word))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
    }
    let mut mem = SplitMemory::new(MockStore::new(), data);

    for addr in [0x00, 0x20, 0x40, 0x60, 0x80] {
        let _ = l2.probe(L2Request::read(addr, D), &mut ic);
        let outcome = l2.fill(BlockRequest::new(addr, D), &mut ic, &mut mem);
        if addr == 0x00 {
            assert_eq!(l2.probe(L2Request::write(0x04, 0xAB), &mut ic), L2Response::Hit);
        }
        if addr == 0x80 {
            assert_eq!(outcome.wrote_back, Some(BlockRequest::new(0x00, D)));
        }
    }
    assert_eq!(l2.read_word(0x84, D), Some(0x84));
}

#[test]
fn duplicate_fill_keeps_block_contents() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    bring_in(&mut l2, &mut ic, &mut mem, 0x100);
    let _ = l2.probe(L2Request::write(0x100, 9), &mut ic);

    let outcome = l2.fill(BlockRequest::new(0x100, D), &mut ic, &mut mem);
    assert_eq!(outcome.wrote_back, None);
    assert_eq!(l2.read_word(0x100, D), Some(9));
    assert_eq!(l2.set(0).iter().filter(|b| b.valid).count(), 1);
}

// ══════════════════════════════════════════════════════════
// 3. Cancellation
// ══════════════════════════════════════════════════════════

#[test]
fn cancelled_fill_skips_l1_notification() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    let _ = l2.probe(L2Request::read(0x100, D), &mut ic);
    assert!(l2.cancel(L2Request::read(0x104, D)));

    let before = ic.len();
    let outcome = l2.fill(BlockRequest::new(0x100, D), &mut ic, &mut mem);
    assert!(!outcome.notified);
    assert_eq!(ic.len(), before);
    assert!(l2.contains(0x100, D), "a cancelled block still fills the L2");
}

#[test]
fn repeat_probe_rearms_cancelled_miss() {
    let mut l2 = l2(4);
    let mut ic = interconnect();
    let mut mem = memory();
    let _ = l2.probe(L2Request::read(0x100, D), &mut ic);
    assert!(l2.cancel(L2Request::read(0x100, D)));
    let again = l2.probe(L2Request::read(0x100, D), &mut ic);
    assert_eq!(again, L2Response::Miss(MissDisposition::Outstanding));

    let outcome = l2.fill(BlockRequest::new(0x100, D), &mut ic, &mut mem);
    assert!(outcome.notified);
}

#[test]
fn cancel_without_outstanding_miss_is_refused() {
    let mut l2 = l2(4);
    assert!(!l2.cancel(L2Request::read(0x100, D)));
    let mut ic = interconnect();
    let _ = l2.probe(L2Request::read(0x100, D), &mut ic);
    assert!(!l2.cancel(L2Request::read(0x100, I)));
}
