//! Request and Access Types.
//!
//! This module defines the values that flow between the levels of the hierarchy:
//! 1. **Requester Kind:** Which L1 (instruction or data) a request originates from and
//!    which backing store a block belongs to.
//! 2. **Access Results:** The hit/miss outcome returned to the driver.
//! 3. **Block References:** Block-aligned addresses tagged with their requester, carried by
//!    interconnect messages and DRAM requests.

use std::fmt;

/// Origin of a memory request.
///
/// The kind is the handle used to resolve the destination L1 when a fill is delivered.
/// It also qualifies L2 tags and MSHR entries, so an instruction block and a data block
/// at the same address are tracked independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequesterKind {
    /// Instruction fetch path (L1-I, instruction memory).
    Instruction,
    /// Data load/store path (L1-D, data memory).
    Data,
}

impl fmt::Display for RequesterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction => write!(f, "I"),
            Self::Data => write!(f, "D"),
        }
    }
}

/// Outcome of a single cache access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessResult {
    /// The block was resident.
    Hit,
    /// The block was not resident; residency is established later by a fill.
    Miss,
}

/// Operation carried by an L1-to-L2 request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum L2Op {
    /// Read the block; a hit schedules a fill back to the requesting L1.
    Read,
    /// Write one word; a hit updates the block in place and marks it dirty.
    Write(u32),
}

/// A block-aligned address together with the requester that owns it.
///
/// This is the payload of every interconnect message and DRAM request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockRequest {
    /// Block-aligned byte address.
    pub block_addr: u32,
    /// Requester the block belongs to.
    pub kind: RequesterKind,
}

impl BlockRequest {
    /// Creates a block reference.
    pub const fn new(block_addr: u32, kind: RequesterKind) -> Self {
        Self { block_addr, kind }
    }
}

impl fmt::Display for BlockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#010x}", self.kind, self.block_addr)
    }
}

/// A lookup or cancellation forwarded from an L1 to the L2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct L2Request {
    /// Byte address of the access (not necessarily block aligned).
    pub addr: u32,
    /// Requesting L1.
    pub kind: RequesterKind,
    /// Read or write.
    pub op: L2Op,
}

impl L2Request {
    /// A read request for `addr`.
    pub const fn read(addr: u32, kind: RequesterKind) -> Self {
        Self {
            addr,
            kind,
            op: L2Op::Read,
        }
    }

    /// A data write of `word` to `addr`.
    pub const fn write(addr: u32, word: u32) -> Self {
        Self {
            addr,
            kind: RequesterKind::Data,
            op: L2Op::Write(word),
        }
    }
}
