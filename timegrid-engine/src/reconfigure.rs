//! Grid reconfiguration.
//!
//! Blocks and notes live in absolute minutes, so a new window or step needs
//! no data migration. Only the slot projection is rebuilt.

use crate::engine::ScheduleEngine;
use crate::pending::PendingOpKind;
use timegrid_core::{GridConfigPatch, TimegridResult};
use timegrid_storage::CalendarConfigRow;

impl ScheduleEngine {
    /// Apply a partial grid change and re-materialize.
    ///
    /// An invalid result is rejected before any state changes. An empty
    /// patch, or one that leaves the config as it was, is a no-op.
    pub fn set_config(&mut self, patch: &GridConfigPatch) -> TimegridResult<()> {
        let next = self.config.apply(patch);
        next.validate()?;
        if next == self.config {
            return Ok(());
        }

        let previous = self.config;
        self.config = next;
        self.rematerialize();
        self.pending
            .push(PendingOpKind::UpsertConfig(CalendarConfigRow::from(&next)));

        tracing::info!(
            from_step = previous.step_minutes,
            to_step = next.step_minutes,
            window_start = next.window_start(),
            window_end = next.window_end(),
            slots = next.slot_count(),
            "Grid reconfigured"
        );
        Ok(())
    }
}
