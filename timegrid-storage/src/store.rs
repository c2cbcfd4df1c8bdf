//! Async persistence contract.
//!
//! The backend is a remote relational store reached through CRUD-style
//! calls. Every call is scoped to the principal (the single writer) that
//! owns the rows.

use crate::rows::{CalendarConfigRow, InstanceNoteRow, LabelRow, ScheduleEntryRow};
use async_trait::async_trait;
use timegrid_core::TimegridResult;
use uuid::Uuid;

/// Async storage trait over the four logical tables.
///
/// Implementations must apply each call atomically with respect to the
/// principal's rows. Ordering across calls is the caller's responsibility.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    // ========================================================================
    // SCHEDULE ENTRIES
    // ========================================================================

    /// Read every schedule entry of the principal.
    async fn schedule_entries_list(&self, principal: Uuid) -> TimegridResult<Vec<ScheduleEntryRow>>;

    /// Delete every schedule entry of the principal.
    async fn schedule_entries_delete_all(&self, principal: Uuid) -> TimegridResult<()>;

    /// Insert schedule entries.
    async fn schedule_entries_insert(
        &self,
        principal: Uuid,
        rows: &[ScheduleEntryRow],
    ) -> TimegridResult<()>;

    // ========================================================================
    // INSTANCE NOTES
    // ========================================================================

    /// Read every note of the principal.
    async fn instance_notes_list(&self, principal: Uuid) -> TimegridResult<Vec<InstanceNoteRow>>;

    /// Delete every note of the principal.
    async fn instance_notes_delete_all(&self, principal: Uuid) -> TimegridResult<()>;

    /// Insert notes.
    async fn instance_notes_insert(
        &self,
        principal: Uuid,
        rows: &[InstanceNoteRow],
    ) -> TimegridResult<()>;

    /// Insert or replace one note by key.
    async fn instance_note_upsert(&self, principal: Uuid, row: &InstanceNoteRow) -> TimegridResult<()>;

    /// Delete one note by key. Deleting a missing key is not an error.
    async fn instance_note_delete(&self, principal: Uuid, key: &str) -> TimegridResult<()>;

    // ========================================================================
    // CALENDAR CONFIG
    // ========================================================================

    /// Read the principal's single config row, if any.
    async fn calendar_config_get(&self, principal: Uuid) -> TimegridResult<Option<CalendarConfigRow>>;

    /// Insert or replace the principal's config row.
    async fn calendar_config_upsert(
        &self,
        principal: Uuid,
        row: &CalendarConfigRow,
    ) -> TimegridResult<()>;

    // ========================================================================
    // LABELS
    // ========================================================================

    /// Read every label of the principal, in creation order.
    async fn labels_list(&self, principal: Uuid) -> TimegridResult<Vec<LabelRow>>;

    /// Insert or replace one label by id.
    async fn label_upsert(&self, principal: Uuid, row: &LabelRow) -> TimegridResult<()>;

    /// Delete one label by id. Deleting a missing id is not an error.
    async fn label_delete(&self, principal: Uuid, id: &str) -> TimegridResult<()>;

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Check if the storage backend is reachable.
    async fn health_check(&self) -> TimegridResult<bool>;
}
