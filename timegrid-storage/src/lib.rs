//! Timegrid Storage - Persistence Contract
//!
//! Defines the async [`ScheduleStore`] trait over the four persisted tables
//! (`schedule_entries`, `instance_notes`, `calendar_config`, `labels`), the
//! row shapes exchanged with it, and an [`InMemoryStore`] used by tests.

pub mod memory;
pub mod rows;
pub mod store;

pub use memory::{InMemoryStore, WriteKind, WriteRecord};
pub use rows::{CalendarConfigRow, InstanceNoteRow, LabelRow, ScheduleEntryRow};
pub use store::ScheduleStore;
