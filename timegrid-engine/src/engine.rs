//! Schedule mutation engine.
//!
//! The engine owns the raw blocks, the note store and the cached
//! [`MaterializedView`]. Every edit updates in-memory state and the view
//! synchronously, then queues a snapshot op for the next commit.

use crate::config::EngineConfig;
use crate::pending::{PendingBuffer, PendingOpKind};
use std::sync::Arc;
use timegrid_core::{
    is_valid_day, materialize, optimize, remove_erased_notes, slice, to_absolute_key,
    visible_notes, CellRef, GridConfig, Label, LabelId, MaterializedView, MinuteRange, NoteStore,
    RawBlock,
};
use timegrid_storage::{InstanceNoteRow, ScheduleEntryRow, ScheduleStore};
use uuid::Uuid;

/// One editing session for a single principal.
///
/// Construct with [`ScheduleEngine::load`]. Reads go through the cached
/// view; writes go through the methods below.
pub struct ScheduleEngine {
    pub(crate) store: Arc<dyn ScheduleStore>,
    pub(crate) settings: EngineConfig,
    pub(crate) config: GridConfig,
    pub(crate) blocks: Vec<RawBlock>,
    pub(crate) notes: NoteStore,
    pub(crate) labels: Vec<Label>,
    pub(crate) view: MaterializedView,
    pub(crate) pending: PendingBuffer,
    pub(crate) locked: bool,
}

impl std::fmt::Debug for ScheduleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleEngine")
            .field("principal", &self.settings.principal_id)
            .field("config", &self.config)
            .field("blocks", &self.blocks.len())
            .field("notes", &self.notes.len())
            .field("labels", &self.labels.len())
            .field("pending", &self.pending.len())
            .field("locked", &self.locked)
            .finish()
    }
}

impl ScheduleEngine {
    /// Engine with empty state; callers populate it through a reload.
    pub(crate) fn empty(store: Arc<dyn ScheduleStore>, settings: EngineConfig) -> Self {
        let config = settings.default_grid;
        Self {
            store,
            settings,
            config,
            blocks: Vec::new(),
            notes: NoteStore::new(),
            labels: Vec::new(),
            view: MaterializedView::default(),
            pending: PendingBuffer::new(),
            locked: false,
        }
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn principal(&self) -> Uuid {
        self.settings.principal_id
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Raw blocks, optimized.
    pub fn blocks(&self) -> &[RawBlock] {
        &self.blocks
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn label(&self, id: &LabelId) -> Option<&Label> {
        self.labels.iter().find(|l| &l.id == id)
    }

    pub fn view(&self) -> &MaterializedView {
        &self.view
    }

    pub fn pending(&self) -> &PendingBuffer {
        &self.pending
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.pending.is_dirty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Flip the edit lock. While locked, grid edits are ignored.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        tracing::debug!(locked = self.locked, "Edit lock toggled");
        self.locked
    }

    // ========================================================================
    // GRID EDITS
    // ========================================================================

    /// Paint `cells` with `label`, or erase them when `label` is `None`.
    ///
    /// Cells outside the week or the visible window are skipped. Notes whose
    /// time point is overwritten are deleted. Returns the number of cells
    /// applied; nothing is queued when that is zero.
    pub fn paint_cells(&mut self, cells: &[CellRef], label: Option<&LabelId>) -> usize {
        if self.locked {
            tracing::debug!(cells = cells.len(), "Paint ignored, grid is locked");
            return 0;
        }

        let mut blocks = self.blocks.clone();
        let mut discarded: Vec<MinuteRange> = Vec::new();
        let mut applied = 0;

        for cell in cells {
            let range = is_valid_day(cell.day)
                .then(|| self.config.slot_range(cell.slot))
                .flatten();
            let Some((cell_start, cell_end)) = range else {
                tracing::debug!(day = cell.day, slot = cell.slot, "Skipping out-of-range cell");
                continue;
            };
            let outcome = slice(&blocks, cell.day, cell_start, cell_end, label);
            blocks = outcome.blocks;
            discarded.extend(outcome.discarded);
            applied += 1;
        }

        if applied == 0 {
            return 0;
        }

        self.blocks = optimize(&blocks);
        let erased = remove_erased_notes(&mut self.notes, &discarded);
        self.rematerialize();
        self.enqueue_schedule_replace();

        tracing::debug!(
            cells = applied,
            label_id = label.map(LabelId::as_str),
            erased_notes = erased.len(),
            blocks = self.blocks.len(),
            "Cells painted"
        );
        applied
    }

    /// Remove every block and note.
    pub fn clear_all(&mut self) -> bool {
        if self.locked {
            tracing::debug!("Clear ignored, grid is locked");
            return false;
        }
        self.blocks.clear();
        self.notes.clear();
        self.rematerialize();
        self.enqueue_schedule_replace();
        tracing::info!("Schedule cleared");
        true
    }

    /// Drop every block painted with `label_id`. Notes under them are kept
    /// and simply stop being visible.
    pub fn remove_blocks_for_label(&mut self, label_id: &LabelId) -> usize {
        let before = self.blocks.len();
        self.blocks.retain(|b| &b.label_id != label_id);
        let removed = before - self.blocks.len();
        if removed > 0 {
            self.rematerialize();
            self.enqueue_schedule_replace();
        }
        tracing::debug!(label_id = %label_id, removed, "Blocks removed for label");
        removed
    }

    /// Set the note at a slot's time point. Blank content deletes it.
    pub fn set_note(&mut self, day: i32, slot: i32, content: &str) -> bool {
        if self.locked {
            tracing::debug!(day, slot, "Note edit ignored, grid is locked");
            return false;
        }
        if !is_valid_day(day) || self.config.slot_range(slot).is_none() {
            tracing::debug!(day, slot, "Skipping note on out-of-range cell");
            return false;
        }

        let key = to_absolute_key(&self.config, day, slot);
        if content.trim().is_empty() {
            if self.notes.remove(&key).is_some() {
                self.pending.push(PendingOpKind::DeleteNote {
                    key: key.to_string(),
                });
            }
        } else {
            self.notes.insert(key, content.to_string());
            self.pending
                .push(PendingOpKind::UpsertNote(InstanceNoteRow::new(key, content)));
        }

        self.view.visible_notes = visible_notes(&self.config, &self.blocks, &self.notes);
        tracing::debug!(note_key = %key, "Note updated");
        true
    }

    /// Paint an absolute time range, optionally with a note on its first
    /// cell.
    ///
    /// The range covers `ceil(duration / step)` slots starting at the slot
    /// that contains the start time. Returns `false` without editing when
    /// the start falls before the window, after it, or the duration is not
    /// positive. Slots past the window end are dropped.
    pub fn schedule_event(
        &mut self,
        day: i32,
        start_hour: i32,
        start_minute: i32,
        duration_minutes: i32,
        label_id: &LabelId,
        note: Option<&str>,
    ) -> bool {
        if self.locked {
            tracing::debug!(day, "Event ignored, grid is locked");
            return false;
        }
        let Some(start) = start_hour
            .checked_mul(60)
            .and_then(|minutes| minutes.checked_add(start_minute))
        else {
            tracing::debug!(day, start_hour, start_minute, "Event start out of range");
            return false;
        };
        let step = self.config.step_minutes;
        if start < self.config.window_start() || duration_minutes <= 0 || step <= 0 {
            tracing::debug!(day, start, duration_minutes, "Event outside the grid");
            return false;
        }
        let Some(first_slot) = self.config.slot_at_minute(start) else {
            tracing::debug!(day, start, "Event starts after the window");
            return false;
        };

        let slots_needed = duration_minutes / step + i32::from(duration_minutes % step != 0);
        let slots_needed = slots_needed.min(self.config.slot_count() - first_slot);
        let cells: Vec<CellRef> = (first_slot..first_slot + slots_needed)
            .map(|slot| CellRef::new(day, slot))
            .collect();
        if self.paint_cells(&cells, Some(label_id)) == 0 {
            return false;
        }
        if let Some(note) = note {
            self.set_note(day, first_slot, note);
        }
        true
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    pub(crate) fn rematerialize(&mut self) {
        self.view = materialize(&self.config, &self.blocks, &self.notes);
    }

    pub(crate) fn enqueue_schedule_replace(&mut self) {
        let entries: Vec<ScheduleEntryRow> = self.blocks.iter().map(ScheduleEntryRow::from).collect();
        let notes: Vec<InstanceNoteRow> = self
            .notes
            .iter()
            .map(|(key, content)| InstanceNoteRow::new(*key, content.clone()))
            .collect();
        self.pending
            .push(PendingOpKind::ReplaceSchedule { entries, notes });
    }
}
