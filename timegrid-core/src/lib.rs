//! Timegrid Core - Schedule Types and Interval Transforms
//!
//! Pure data structures and side-effect-free transforms. The storage and
//! engine crates depend on this; nothing here performs I/O.
//!
//! The schedule has two representations that must always agree:
//! - sparse [`RawBlock`]s in absolute minutes, the source of truth
//! - a dense [`MaterializedView`] keyed by `(day, slot)`, derived from the
//!   blocks, the notes and the current [`GridConfig`]

pub mod config;
pub mod entities;
pub mod error;
pub mod interval;
pub mod label;
pub mod notes;
pub mod view;

pub use config::{GridConfig, GridConfigPatch, MINUTES_PER_DAY};
pub use entities::{is_valid_day, CellRef, LabelId, RawBlock, SlotKey, SlotKeyParseError, DAYS_PER_WEEK};
pub use error::{ConfigError, LabelError, StorageError, Table, TimegridError, TimegridResult};
pub use interval::{has_overlaps, materialize_schedule, optimize, slice, MinuteRange, SliceOutcome};
pub use label::{CustomTab, Label, CUSTOM_TAB_PREFIX, GLOBAL_TAB, INSTANCE_TAB};
pub use notes::{
    remove_erased_notes, to_absolute_key, visible_notes, NoteKey, NoteKeyParseError, NoteStore,
};
pub use view::{materialize, MaterializedView};
