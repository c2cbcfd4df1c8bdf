//! Note association.
//!
//! Notes are persisted against an absolute time point (`"day-minute"`), never
//! a slot index, so their keys survive reconfiguration. Whether a note shows
//! up in the grid is decided against the current blocks: a note is visible
//! only while some block on its day covers its minute.

use crate::interval::MinuteRange;
use crate::{GridConfig, RawBlock, SlotKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Absolute-time note key, displayed and persisted as `"day-minute"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteKey {
    pub day: i32,
    pub minute: i32,
}

impl NoteKey {
    pub fn new(day: i32, minute: i32) -> Self {
        Self { day, minute }
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.minute)
    }
}

/// Error parsing a persisted note key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed note key: {0:?}")]
pub struct NoteKeyParseError(pub String);

impl FromStr for NoteKey {
    type Err = NoteKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NoteKeyParseError(s.to_string());
        let (day, minute) = s.split_once('-').ok_or_else(malformed)?;
        let day = day.parse::<i32>().map_err(|_| malformed())?;
        let minute = minute.parse::<i32>().map_err(|_| malformed())?;
        if day < 0 || minute < 0 {
            return Err(malformed());
        }
        Ok(Self { day, minute })
    }
}

impl Serialize for NoteKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NoteKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Persisted notes keyed by absolute time. Content is opaque markup.
pub type NoteStore = BTreeMap<NoteKey, String>;

/// Translate a slot-relative coordinate into the absolute note key.
pub fn to_absolute_key(config: &GridConfig, day: i32, slot: i32) -> NoteKey {
    NoteKey::new(day, config.window_start() + slot * config.step_minutes)
}

/// Project notes covered by a block onto the slot containing their minute.
///
/// Uncovered notes are left out of the projection but are not removed from
/// the store; painting their time point again brings them back.
pub fn visible_notes(
    config: &GridConfig,
    blocks: &[RawBlock],
    notes: &NoteStore,
) -> BTreeMap<SlotKey, String> {
    let mut visible = BTreeMap::new();
    for (key, content) in notes {
        let covered = blocks
            .iter()
            .any(|b| b.is_valid() && b.day_index == key.day && b.covers(key.minute));
        if !covered {
            continue;
        }
        if let Some(slot) = config.slot_at_minute(key.minute) {
            visible.insert(SlotKey::new(key.day, slot), content.clone());
        }
    }
    visible
}

/// Remove notes whose time point lies in a discarded region.
///
/// Returns the removed keys. Notes outside every region stay, even if they
/// are currently uncovered.
pub fn remove_erased_notes(notes: &mut NoteStore, discarded: &[MinuteRange]) -> Vec<NoteKey> {
    let erased: Vec<NoteKey> = notes
        .keys()
        .filter(|key| discarded.iter().any(|r| r.contains(key.day, key.minute)))
        .copied()
        .collect();
    for key in &erased {
        notes.remove(key);
    }
    erased
}
