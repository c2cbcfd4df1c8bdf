//! Row shapes of the four persisted tables and their conversions to core
//! types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use timegrid_core::{
    CustomTab, GridConfig, Label, LabelId, NoteKey, RawBlock, StorageError, Table,
};

/// `schedule_entries(day_index, start_minute, duration_minutes, label_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntryRow {
    pub day_index: i32,
    pub start_minute: i32,
    pub duration_minutes: i32,
    pub label_id: String,
}

impl From<&RawBlock> for ScheduleEntryRow {
    fn from(block: &RawBlock) -> Self {
        Self {
            day_index: block.day_index,
            start_minute: block.start_minute,
            duration_minutes: block.duration_minutes,
            label_id: block.label_id.to_string(),
        }
    }
}

impl From<ScheduleEntryRow> for RawBlock {
    fn from(row: ScheduleEntryRow) -> Self {
        RawBlock::new(
            row.day_index,
            row.start_minute,
            row.duration_minutes,
            LabelId::from(row.label_id),
        )
    }
}

/// `instance_notes(key, content)` with `key = "{day}-{absoluteMinute}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceNoteRow {
    pub key: String,
    pub content: String,
}

impl InstanceNoteRow {
    pub fn new(key: NoteKey, content: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            content: content.into(),
        }
    }

    /// Parse the persisted key back into absolute time.
    pub fn parse_key(&self) -> Result<NoteKey, StorageError> {
        self.key
            .parse::<NoteKey>()
            .map_err(|e| StorageError::MalformedRow {
                table: Table::InstanceNotes,
                reason: e.to_string(),
            })
    }
}

/// `calendar_config(start_hour, start_minute, end_hour, end_minute, step_minutes)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfigRow {
    pub start_hour: i32,
    pub start_minute: i32,
    pub end_hour: i32,
    pub end_minute: i32,
    pub step_minutes: i32,
}

impl From<&GridConfig> for CalendarConfigRow {
    fn from(config: &GridConfig) -> Self {
        Self {
            start_hour: config.start_hour,
            start_minute: config.start_minute,
            end_hour: config.end_hour,
            end_minute: config.end_minute,
            step_minutes: config.step_minutes,
        }
    }
}

impl From<CalendarConfigRow> for GridConfig {
    fn from(row: CalendarConfigRow) -> Self {
        GridConfig {
            start_hour: row.start_hour,
            start_minute: row.start_minute,
            end_hour: row.end_hour,
            end_minute: row.end_minute,
            step_minutes: row.step_minutes,
        }
    }
}

/// `labels(id, name, color, notes, open_tabs, trashed_tabs, custom_tabs)`
///
/// `custom_tabs` is a JSON object keyed by tab id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub notes: String,
    pub open_tabs: Vec<String>,
    pub trashed_tabs: Vec<String>,
    pub custom_tabs: Value,
}

impl TryFrom<&Label> for LabelRow {
    type Error = StorageError;

    fn try_from(label: &Label) -> Result<Self, Self::Error> {
        let custom_tabs =
            serde_json::to_value(&label.custom_tabs).map_err(|e| StorageError::MalformedRow {
                table: Table::Labels,
                reason: format!("custom_tabs of {}: {}", label.id, e),
            })?;
        Ok(Self {
            id: label.id.to_string(),
            name: label.name.clone(),
            color: label.color.clone(),
            notes: label.notes.clone(),
            open_tabs: label.open_tabs.clone(),
            trashed_tabs: label.trashed_tabs.clone(),
            custom_tabs,
        })
    }
}

impl TryFrom<LabelRow> for Label {
    type Error = StorageError;

    fn try_from(row: LabelRow) -> Result<Self, Self::Error> {
        let custom_tabs: BTreeMap<String, CustomTab> = match row.custom_tabs {
            Value::Null => BTreeMap::new(),
            value => serde_json::from_value(value).map_err(|e| StorageError::MalformedRow {
                table: Table::Labels,
                reason: format!("custom_tabs of {}: {}", row.id, e),
            })?,
        };
        Ok(Label {
            id: LabelId::from(row.id),
            name: row.name,
            color: row.color,
            notes: row.notes,
            open_tabs: row.open_tabs,
            trashed_tabs: row.trashed_tabs,
            custom_tabs,
        })
    }
}
