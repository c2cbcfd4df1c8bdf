//! Timegrid Test Utilities
//!
//! Shared test infrastructure for the Timegrid workspace:
//! - Proptest generators for grid configs, cells and blocks
//! - Fixtures for the common paint/erase scenarios
//! - Store seeding helpers
//! - Custom assertions for schedule invariants

pub use timegrid_storage::{InMemoryStore, ScheduleStore};

pub use timegrid_core::{
    has_overlaps, optimize, ConfigError, GridConfig, Label, LabelError, LabelId, NoteKey,
    NoteStore, RawBlock, SlotKey, StorageError, Table, TimegridError, TimegridResult,
};

use timegrid_storage::{CalendarConfigRow, InstanceNoteRow, LabelRow, ScheduleEntryRow};
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Timegrid types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a valid day index.
    pub fn arb_day() -> impl Strategy<Value = i32> {
        0..7i32
    }

    /// Generate a short label id from a small alphabet so collisions happen.
    pub fn arb_label_id() -> impl Strategy<Value = LabelId> {
        prop_oneof![
            Just(LabelId::from("work")),
            Just(LabelId::from("rest")),
            Just(LabelId::from("gym")),
        ]
    }

    /// Generate a step that keeps the grid small.
    pub fn arb_step() -> impl Strategy<Value = i32> {
        prop_oneof![Just(5), Just(10), Just(15), Just(20), Just(30), Just(45), Just(60)]
    }

    /// Generate a GridConfig that passes validation.
    pub fn arb_grid_config() -> impl Strategy<Value = GridConfig> {
        (0i32..20, 0i32..60, 2i32..10, arb_step()).prop_map(
            |(start_hour, start_minute, span_hours, step_minutes)| {
                let end_hour = (start_hour + span_hours).min(24);
                let end_minute = if end_hour == 24 { 0 } else { start_minute };
                GridConfig {
                    start_hour,
                    start_minute,
                    end_hour,
                    end_minute,
                    step_minutes,
                }
            },
        )
    }

    /// Generate a cell that is visible under `config`.
    pub fn arb_cell(config: GridConfig) -> impl Strategy<Value = SlotKey> {
        let slots = config.slot_count().max(1);
        (arb_day(), 0..slots).prop_map(|(day, slot)| SlotKey::new(day, slot))
    }

    /// Generate a run of contiguous slots on one day, as `(day, first, last)`.
    pub fn arb_slot_run(config: GridConfig) -> impl Strategy<Value = (i32, i32, i32)> {
        let slots = config.slot_count().max(1);
        (arb_day(), 0..slots, 0..slots).prop_map(|(day, a, b)| (day, a.min(b), a.max(b)))
    }

    /// Generate a block in absolute time, possibly outside any window.
    pub fn arb_block() -> impl Strategy<Value = RawBlock> {
        (arb_day(), 0i32..1380, 1i32..240, arb_label_id()).prop_map(
            |(day, start, duration, label)| RawBlock::new(day, start, duration, label),
        )
    }

    /// Generate a list of blocks (may overlap).
    pub fn arb_blocks(max: usize) -> impl Strategy<Value = Vec<RawBlock>> {
        prop::collection::vec(arb_block(), 0..max)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for the common scenarios.

    use super::*;

    /// 05:00–21:00, 30 minute slots.
    pub fn default_config() -> GridConfig {
        GridConfig::default()
    }

    pub fn work() -> LabelId {
        LabelId::from("work")
    }

    pub fn rest() -> LabelId {
        LabelId::from("rest")
    }

    /// A label with a fixed id, for tests that paint by id.
    pub fn work_label() -> Label {
        Label::with_id(work(), "Work", "#10B981")
    }

    pub fn rest_label() -> Label {
        Label::with_id(rest(), "Rest", "#3B82F6")
    }

    /// Cells `first..=last` on one day.
    pub fn cells(day: i32, first: i32, last: i32) -> Vec<SlotKey> {
        (first..=last).map(|slot| SlotKey::new(day, slot)).collect()
    }

    /// Day 0, 05:00–07:00 as one "work" block.
    pub fn morning_work_block() -> RawBlock {
        RawBlock::new(0, 300, 120, work())
    }

    pub fn test_principal() -> Uuid {
        Uuid::now_v7()
    }

    /// Seed a store with rows for `principal`. Writes are journaled, so the
    /// journal is cleared before returning.
    pub async fn seeded_store(
        principal: Uuid,
        config: Option<GridConfig>,
        labels: &[Label],
        blocks: &[RawBlock],
        notes: &[(NoteKey, &str)],
    ) -> TimegridResult<InMemoryStore> {
        let store = InMemoryStore::new();
        if let Some(config) = config {
            store
                .calendar_config_upsert(principal, &CalendarConfigRow::from(&config))
                .await?;
        }
        for label in labels {
            store.label_upsert(principal, &LabelRow::try_from(label)?).await?;
        }
        let entries: Vec<ScheduleEntryRow> = blocks.iter().map(ScheduleEntryRow::from).collect();
        store.schedule_entries_insert(principal, &entries).await?;
        let note_rows: Vec<InstanceNoteRow> = notes
            .iter()
            .map(|(key, content)| InstanceNoteRow::new(*key, *content))
            .collect();
        store.instance_notes_insert(principal, &note_rows).await?;
        store.clear_journal()?;
        Ok(store)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for schedule invariants and error variants.

    use super::*;

    /// Assert that a TimegridResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &TimegridResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a TimegridResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &TimegridResult<T>) {
        match result {
            Err(TimegridError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert that a TimegridResult is a write failure on `table`.
    #[track_caller]
    pub fn assert_write_failed<T: std::fmt::Debug>(result: &TimegridResult<T>, table: Table) {
        match result {
            Err(TimegridError::Storage(StorageError::WriteFailed { table: t, .. })) => {
                assert_eq!(*t, table, "Wrong table in WriteFailed error");
            }
            other => panic!("Expected WriteFailed on {}, got: {:?}", table, other),
        }
    }

    /// Assert that a TimegridResult is a Label error.
    #[track_caller]
    pub fn assert_label_error<T: std::fmt::Debug>(result: &TimegridResult<T>) {
        match result {
            Err(TimegridError::Label(_)) => {}
            other => panic!("Expected Label error, got: {:?}", other),
        }
    }

    /// Assert the block list is what `optimize` would produce: sorted, valid,
    /// non-overlapping and with no mergeable neighbours.
    #[track_caller]
    pub fn assert_optimized(blocks: &[RawBlock]) {
        assert!(
            blocks.iter().all(RawBlock::is_valid),
            "Invalid block in {:?}",
            blocks
        );
        assert!(!has_overlaps(blocks), "Overlapping blocks: {:?}", blocks);
        assert_eq!(optimize(blocks), blocks, "Blocks are not optimized");
    }
}

// ============================================================================
// TESTS
// ============================================================================
