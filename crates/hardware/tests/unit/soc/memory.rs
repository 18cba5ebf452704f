//! Backing Memory Unit Tests.
//!
//! Covers word and block access on `FlatMemory`, preloading, the alignment and
//! bounds invariants, and kind selection in `SplitMemory`.

use memsim_core::common::RequesterKind;
use memsim_core::soc::{BackingStore, FlatMemory, SplitMemory};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════
// 1. Flat memory
// ══════════════════════════════════════════════════════════

#[test]
fn starts_zeroed_with_requested_size() {
    let mem = FlatMemory::new(4096, 4);
    assert_eq!(mem.size_bytes(), 4096);
    assert_eq!(mem.words().len(), 1024);
    assert_eq!(mem.word_bytes(), 4);
    assert_eq!(mem.read_word(0xFFC), 0);
}

#[test]
fn word_write_is_read_back() {
    let mut mem = FlatMemory::new(4096, 4);
    mem.write_word(0x10, 0x1234_5678);
    assert_eq!(mem.read_word(0x10), 0x1234_5678);
    assert_eq!(mem.read_word(0x0C), 0);
    assert_eq!(mem.read_word(0x14), 0);
}

#[test]
fn block_access_walks_consecutive_words() {
    let mut mem = FlatMemory::new(4096, 4);
    mem.write_block(0x20, &[1, 2, 3, 4]);
    assert_eq!(mem.read_block(0x20, 4), vec![1, 2, 3, 4]);
    assert_eq!(mem.read_word(0x2C), 4);
    assert_eq!(mem.read_block(0x24, 2), vec![2, 3]);
}

#[test]
fn load_places_image_at_address() {
    let mut mem = FlatMemory::new(256, 4);
    mem.load(0x80, &[7, 8, 9]);
    assert_eq!(&mem.words()[0x20..0x23], &[7, 8, 9]);
}

#[test]
fn halfword_memory_uses_two_byte_slots() {
    let mut mem = FlatMemory::new(64, 2);
    assert_eq!(mem.words().len(), 32);
    mem.write_word(0x02, 0xBEEF);
    assert_eq!(mem.words()[1], 0xBEEF);
}

#[test]
#[should_panic(expected = "outside")]
fn out_of_range_read_panics() {
    let mem = FlatMemory::new(256, 4);
    let _ = mem.read_word(0x100);
}

#[test]
#[should_panic(expected = "unaligned")]
fn unaligned_write_panics() {
    let mut mem = FlatMemory::new(256, 4);
    mem.write_word(0x02, 1);
}

#[test]
#[should_panic(expected = "exceeds memory")]
fn oversized_load_panics() {
    let mut mem = FlatMemory::new(16, 4);
    mem.load(0x8, &[1, 2, 3]);
}

// ══════════════════════════════════════════════════════════
// 2. Split memory
// ══════════════════════════════════════════════════════════

#[test]
fn kinds_select_separate_stores() {
    let mut mem = SplitMemory::flat(1024, 4);
    mem.select_mut(RequesterKind::Instruction).write_word(0, 0x13);
    mem.select_mut(RequesterKind::Data).write_word(0, 0xFF);
    assert_eq!(mem.select(RequesterKind::Instruction).read_word(0), 0x13);
    assert_eq!(mem.select(RequesterKind::Data).read_word(0), 0xFF);
    assert_eq!(mem.instruction.read_word(0), 0x13);
    assert_eq!(mem.data.read_word(0), 0xFF);
}
