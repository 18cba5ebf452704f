//! Backing store trait for the memory behind the caches.
//!
//! This module defines the `BackingStore` trait implemented by every word-addressable
//! memory the hierarchy reads fills from and writes victims back to. It provides:
//! 1. **Word access:** `read_word` / `write_word` at word-aligned byte addresses.
//! 2. **Block access:** `read_block` / `write_block` over consecutive words, with default
//!    word-by-word implementations.
//!
//! Out-of-range addresses are invariant violations; implementors panic on them.

/// Word-addressable memory behind the cache hierarchy.
pub trait BackingStore {
    /// Width of one word in bytes.
    fn word_bytes(&self) -> u32;

    /// Reads the word at byte address `addr`.
    fn read_word(&self, addr: u32) -> u32;

    /// Writes `word` at byte address `addr`.
    fn write_word(&mut self, addr: u32, word: u32);

    /// Reads `words` consecutive words starting at `addr`.
    fn read_block(&self, addr: u32, words: usize) -> Vec<u32> {
        let step = self.word_bytes();
        (0..words)
            .map(|i| self.read_word(addr + i as u32 * step))
            .collect()
    }

    /// Writes consecutive words starting at `addr`.
    fn write_block(&mut self, addr: u32, words: &[u32]) {
        let step = self.word_bytes();
        for (i, &word) in words.iter().enumerate() {
            self.write_word(addr + i as u32 * step, word);
        }
    }
}
