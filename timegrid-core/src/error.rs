//! Error types for Timegrid operations

use std::fmt;
use thiserror::Error;

/// Logical tables reached through the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    ScheduleEntries,
    InstanceNotes,
    CalendarConfig,
    Labels,
}

impl Table {
    /// Table name as seen by the persistence backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::ScheduleEntries => "schedule_entries",
            Table::InstanceNotes => "instance_notes",
            Table::CalendarConfig => "calendar_config",
            Table::Labels => "labels",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Read failed on {table}: {reason}")]
    ReadFailed { table: Table, reason: String },

    #[error("Write failed on {table}: {reason}")]
    WriteFailed { table: Table, reason: String },

    #[error("Row not found in {table}: {key}")]
    NotFound { table: Table, key: String },

    #[error("Malformed row in {table}: {reason}")]
    MalformedRow { table: Table, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Label management errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Label not found: {label_id}")]
    NotFound { label_id: String },

    #[error("Label {label_id} already holds the maximum of {max} tabs")]
    TabLimitReached { label_id: String, max: usize },

    #[error("Tab {tab_id} not found on label {label_id}")]
    TabNotFound { label_id: String, tab_id: String },

    #[error("Tab order for label {label_id} is not a permutation of its open tabs")]
    InvalidTabOrder { label_id: String },
}

/// Master error type for all Timegrid errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimegridError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Label error: {0}")]
    Label(#[from] LabelError),
}

/// Result type alias for Timegrid operations.
pub type TimegridResult<T> = Result<T, TimegridError>;

// =============================================================================
// TESTS
// =============================================================================
