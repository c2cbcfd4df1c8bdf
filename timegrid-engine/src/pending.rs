//! Deferred persistence operations.
//!
//! Every mutation captures the rows it needs to write at enqueue time. Ops
//! are plain values, so later edits can never change the payload of an op
//! that is already queued.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;
use timegrid_core::TimegridResult;
use timegrid_storage::{
    CalendarConfigRow, InstanceNoteRow, LabelRow, ScheduleEntryRow, ScheduleStore,
};
use uuid::Uuid;

/// What a pending op writes.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOpKind {
    /// Full replace of `schedule_entries` and `instance_notes`.
    ReplaceSchedule {
        entries: Vec<ScheduleEntryRow>,
        notes: Vec<InstanceNoteRow>,
    },
    UpsertNote(InstanceNoteRow),
    DeleteNote { key: String },
    UpsertConfig(CalendarConfigRow),
    UpsertLabel(LabelRow),
    DeleteLabel { id: String },
}

impl PendingOpKind {
    pub fn name(&self) -> &'static str {
        match self {
            PendingOpKind::ReplaceSchedule { .. } => "replace_schedule",
            PendingOpKind::UpsertNote(_) => "upsert_note",
            PendingOpKind::DeleteNote { .. } => "delete_note",
            PendingOpKind::UpsertConfig(_) => "upsert_config",
            PendingOpKind::UpsertLabel(_) => "upsert_label",
            PendingOpKind::DeleteLabel { .. } => "delete_label",
        }
    }
}

/// A queued op and the time it was queued.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOp {
    pub kind: PendingOpKind,
    pub enqueued_at: DateTime<Utc>,
}

impl PendingOp {
    pub fn new(kind: PendingOpKind) -> Self {
        Self {
            kind,
            enqueued_at: Utc::now(),
        }
    }

    /// Write the snapshot through the store.
    ///
    /// Each kind is idempotent against its tables, so re-running an op that
    /// partly applied before a failure is safe.
    pub async fn apply(&self, store: &dyn ScheduleStore, principal: Uuid) -> TimegridResult<()> {
        match &self.kind {
            PendingOpKind::ReplaceSchedule { entries, notes } => {
                store.schedule_entries_delete_all(principal).await?;
                if !entries.is_empty() {
                    store.schedule_entries_insert(principal, entries).await?;
                }
                store.instance_notes_delete_all(principal).await?;
                if !notes.is_empty() {
                    store.instance_notes_insert(principal, notes).await?;
                }
            }
            PendingOpKind::UpsertNote(row) => store.instance_note_upsert(principal, row).await?,
            PendingOpKind::DeleteNote { key } => store.instance_note_delete(principal, key).await?,
            PendingOpKind::UpsertConfig(row) => {
                store.calendar_config_upsert(principal, row).await?
            }
            PendingOpKind::UpsertLabel(row) => store.label_upsert(principal, row).await?,
            PendingOpKind::DeleteLabel { id } => store.label_delete(principal, id).await?,
        }
        Ok(())
    }
}

/// Per-kind counts of queued ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingSummary {
    pub schedule_replaces: usize,
    pub note_upserts: usize,
    pub note_deletes: usize,
    pub config_upserts: usize,
    pub label_upserts: usize,
    pub label_deletes: usize,
}

impl PendingSummary {
    pub fn total(&self) -> usize {
        self.schedule_replaces
            + self.note_upserts
            + self.note_deletes
            + self.config_upserts
            + self.label_upserts
            + self.label_deletes
    }
}

impl fmt::Display for PendingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "schedule={} notes=+{}/-{} config={} labels=+{}/-{}",
            self.schedule_replaces,
            self.note_upserts,
            self.note_deletes,
            self.config_upserts,
            self.label_upserts,
            self.label_deletes
        )
    }
}

/// Ordered queue of ops awaiting commit.
///
/// Ops flush strictly in enqueue order, one at a time.
#[derive(Debug, Clone, Default)]
pub struct PendingBuffer {
    ops: VecDeque<PendingOp>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: PendingOpKind) {
        self.ops.push_back(PendingOp::new(kind));
    }

    /// True while at least one op is queued.
    pub fn is_dirty(&self) -> bool {
        !self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingOp> {
        self.ops.iter()
    }

    /// Drop every queued op without running it.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn summary(&self) -> PendingSummary {
        let mut summary = PendingSummary::default();
        for op in &self.ops {
            match op.kind {
                PendingOpKind::ReplaceSchedule { .. } => summary.schedule_replaces += 1,
                PendingOpKind::UpsertNote(_) => summary.note_upserts += 1,
                PendingOpKind::DeleteNote { .. } => summary.note_deletes += 1,
                PendingOpKind::UpsertConfig(_) => summary.config_upserts += 1,
                PendingOpKind::UpsertLabel(_) => summary.label_upserts += 1,
                PendingOpKind::DeleteLabel { .. } => summary.label_deletes += 1,
            }
        }
        summary
    }

    /// Flush every op in order, awaiting each before starting the next.
    ///
    /// An op leaves the queue only after it succeeded. On failure the
    /// failing op and everything after it stay queued and the error is
    /// returned. Returns the number of ops flushed.
    pub async fn commit(&mut self, store: &dyn ScheduleStore, principal: Uuid) -> TimegridResult<usize> {
        let mut flushed = 0;
        while let Some(op) = self.ops.front() {
            if let Err(e) = op.apply(store, principal).await {
                tracing::warn!(
                    op = op.kind.name(),
                    flushed,
                    remaining = self.ops.len(),
                    error = %e,
                    "Pending op failed, stopping flush"
                );
                return Err(e);
            }
            self.ops.pop_front();
            flushed += 1;
        }
        Ok(flushed)
    }
}
