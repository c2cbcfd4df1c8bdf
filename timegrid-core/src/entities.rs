//! Schedule entity types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of day columns in the grid (Monday = 0).
pub const DAYS_PER_WEEK: i32 = 7;

/// Whether a day index addresses a grid column.
pub fn is_valid_day(day: i32) -> bool {
    (0..DAYS_PER_WEEK).contains(&day)
}

/// Identifier of a label. Seeded labels use readable ids, user-created ones
/// use UUIDv7 strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh timestamp-sortable id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LabelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A labeled interval in absolute time; the persisted source of truth.
///
/// Blocks are never edited in place. Every edit rebuilds the owning day's
/// block list through the interval transforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawBlock {
    pub day_index: i32,
    /// Absolute minutes from midnight, not slot-relative.
    pub start_minute: i32,
    pub duration_minutes: i32,
    pub label_id: LabelId,
}

impl RawBlock {
    pub fn new(
        day_index: i32,
        start_minute: i32,
        duration_minutes: i32,
        label_id: impl Into<LabelId>,
    ) -> Self {
        Self {
            day_index,
            start_minute,
            duration_minutes,
            label_id: label_id.into(),
        }
    }

    /// Absolute minute one past the end of the block.
    pub fn end_minute(&self) -> i32 {
        self.start_minute + self.duration_minutes
    }

    /// Blocks with a non-positive duration are dropped on every rebuild.
    pub fn is_valid(&self) -> bool {
        self.duration_minutes > 0
    }

    /// Whether the block covers an absolute minute on its day.
    pub fn covers(&self, minute: i32) -> bool {
        self.start_minute <= minute && minute < self.end_minute()
    }

    /// Whether the block intersects the half-open range `[start, end)`.
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        self.start_minute < end && self.end_minute() > start
    }
}

/// Grid coordinate of a slot, displayed and serialized as `"day-slot"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub day: i32,
    pub slot: i32,
}

impl SlotKey {
    pub fn new(day: i32, slot: i32) -> Self {
        Self { day, slot }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.slot)
    }
}

/// Error parsing a `"day-slot"` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed slot key: {0:?}")]
pub struct SlotKeyParseError(pub String);

impl FromStr for SlotKey {
    type Err = SlotKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SlotKeyParseError(s.to_string());
        let (day, slot) = s.split_once('-').ok_or_else(malformed)?;
        let day = day.parse::<i32>().map_err(|_| malformed())?;
        let slot = slot.parse::<i32>().map_err(|_| malformed())?;
        if day < 0 || slot < 0 {
            return Err(malformed());
        }
        Ok(Self { day, slot })
    }
}

// String form so slot-keyed maps serialize as JSON objects.
impl Serialize for SlotKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A cell addressed by an edit. Coordinates come from the caller unchecked.
pub type CellRef = SlotKey;
