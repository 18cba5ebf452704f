//! Shared DRAM channel.
//!
//! All banks share one command bus and one data bus. The channel records which cycles each
//! scheduled request holds on either bus.

use super::request::{Interval, ResourcePlan};

/// Command and data bus reservations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Channel {
    command: Vec<(u64, Interval)>,
    data: Vec<(u64, Interval)>,
}

impl Channel {
    /// An idle channel.
    pub const fn new() -> Self {
        Self {
            command: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Reserves every bus slot of `plan` for request `id`.
    pub fn reserve(&mut self, id: u64, plan: &ResourcePlan) {
        self.command.extend(plan.commands().map(|slot| (id, slot)));
        self.data.push((id, plan.data));
    }

    /// Drops every reservation of request `id`.
    pub fn release(&mut self, id: u64) {
        self.command.retain(|&(owner, _)| owner != id);
        self.data.retain(|&(owner, _)| owner != id);
    }

    /// Whether none of `plan`'s command slots and not its data slot is reserved.
    pub fn is_free(&self, plan: &ResourcePlan) -> bool {
        let command_free = plan.commands().all(|slot| {
            !self
                .command
                .iter()
                .any(|(_, reserved)| reserved.overlaps(&slot))
        });
        let data_free = !self
            .data
            .iter()
            .any(|(_, reserved)| reserved.overlaps(&plan.data));
        command_free && data_free
    }

    /// Reserved command bus slots.
    pub fn command_reservations(&self) -> &[(u64, Interval)] {
        &self.command
    }

    /// Reserved data bus slots.
    pub fn data_reservations(&self) -> &[(u64, Interval)] {
        &self.data
    }
}
