//! DRAM bank row-buffer state.
//!
//! A bank holds at most one open row. Precharge closes it, activate opens a row, and a
//! column access requires the target row to be open. The bank also records the occupancy
//! intervals of the scheduled requests it is serving, keyed by request id.

use super::request::{Interval, Phase, RowBufferStatus};

/// One DRAM bank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bank {
    open_row: Option<u32>,
    reservations: Vec<(u64, Interval)>,
}

impl Bank {
    /// A bank with no row open.
    pub const fn new() -> Self {
        Self {
            open_row: None,
            reservations: Vec::new(),
        }
    }

    /// The open row, if any.
    pub const fn open_row(&self) -> Option<u32> {
        self.open_row
    }

    /// Row-buffer status of an access to `row`.
    pub fn status(&self, row: u32) -> RowBufferStatus {
        match self.open_row {
            None => RowBufferStatus::Miss,
            Some(open) if open == row => RowBufferStatus::Hit,
            Some(_) => RowBufferStatus::Conflict,
        }
    }

    /// Closes the open row.
    pub const fn precharge(&mut self) {
        self.open_row = None;
    }

    /// Opens `row`.
    ///
    /// # Panics
    ///
    /// Panics if another row is still open.
    pub fn activate(&mut self, row: u32) {
        assert!(
            self.open_row.is_none(),
            "activate of row {row:#x} with row {:#x?} open",
            self.open_row
        );
        self.open_row = Some(row);
    }

    /// Column access on `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not the open row.
    pub fn access(&self, row: u32) {
        assert_eq!(self.open_row, Some(row), "column access to a closed row");
    }

    /// Issues `phases` for an access to `row` in order.
    pub fn apply(&mut self, phases: &[Phase], row: u32) {
        for phase in phases {
            match phase {
                Phase::Precharge => self.precharge(),
                Phase::Activate => self.activate(row),
                Phase::ReadWrite => self.access(row),
            }
        }
    }

    /// Records that request `id` occupies this bank during `interval`.
    pub fn reserve(&mut self, id: u64, interval: Interval) {
        self.reservations.push((id, interval));
    }

    /// Drops the reservation of request `id`.
    pub fn release(&mut self, id: u64) {
        self.reservations.retain(|&(owner, _)| owner != id);
    }

    /// Whether `interval` overlaps no reservation.
    pub fn is_free(&self, interval: &Interval) -> bool {
        !self
            .reservations
            .iter()
            .any(|(_, reserved)| reserved.overlaps(interval))
    }

    /// Current reservations, oldest first.
    pub fn reservations(&self) -> &[(u64, Interval)] {
        &self.reservations
    }
}
