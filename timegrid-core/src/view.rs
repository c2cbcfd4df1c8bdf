//! Materialized slot view.

use crate::interval::materialize_schedule;
use crate::notes::{visible_notes, NoteStore};
use crate::{GridConfig, LabelId, RawBlock, SlotKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dense per-slot projection of the schedule, read by the rendering layer.
///
/// A pure function of `(GridConfig, blocks, notes)`. It is rebuilt after
/// every structural change and never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedView {
    pub schedule: BTreeMap<SlotKey, LabelId>,
    pub visible_notes: BTreeMap<SlotKey, String>,
}

impl MaterializedView {
    pub fn label_at(&self, day: i32, slot: i32) -> Option<&LabelId> {
        self.schedule.get(&SlotKey::new(day, slot))
    }

    pub fn note_at(&self, day: i32, slot: i32) -> Option<&str> {
        self.visible_notes
            .get(&SlotKey::new(day, slot))
            .map(String::as_str)
    }

    /// Painted slot count.
    pub fn painted_len(&self) -> usize {
        self.schedule.len()
    }
}

/// Build the view from the three sources of truth.
pub fn materialize(config: &GridConfig, blocks: &[RawBlock], notes: &NoteStore) -> MaterializedView {
    MaterializedView {
        schedule: materialize_schedule(config, blocks),
        visible_notes: visible_notes(config, blocks, notes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoteKey;

    #[test]
    fn test_materialize_combines_schedule_and_notes() {
        let config = GridConfig::default();
        let blocks = vec![RawBlock::new(0, 300, 120, "work")];
        let mut notes = NoteStore::new();
        notes.insert(NoteKey::new(0, 360), "standup".to_string());

        let view = materialize(&config, &blocks, &notes);
        assert_eq!(view.painted_len(), 4);
        assert_eq!(view.label_at(0, 3), Some(&LabelId::from("work")));
        assert_eq!(view.note_at(0, 2), Some("standup"));
        assert_eq!(view.note_at(0, 1), None);
    }

    #[test]
    fn test_materialize_is_deterministic() {
        let config = GridConfig::default();
        let blocks = vec![
            RawBlock::new(2, 600, 45, "rest"),
            RawBlock::new(0, 300, 120, "work"),
        ];
        let mut notes = NoteStore::new();
        notes.insert(NoteKey::new(2, 615), "nap".to_string());

        let a = materialize(&config, &blocks, &notes);
        let b = materialize(&config, &blocks, &notes);
        assert_eq!(a, b);
        assert_eq!(
            format!("{:?}", a),
            format!("{:?}", b),
        );
    }

    #[test]
    fn test_view_serializes_with_string_keys() {
        let config = GridConfig::default();
        let blocks = vec![RawBlock::new(0, 300, 30, "work")];
        let mut notes = NoteStore::new();
        notes.insert(NoteKey::new(0, 300), "standup".to_string());

        let view = materialize(&config, &blocks, &notes);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["schedule"], serde_json::json!({ "0-0": "work" }));
        assert_eq!(json["visible_notes"], serde_json::json!({ "0-0": "standup" }));

        let back: MaterializedView = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }
}
