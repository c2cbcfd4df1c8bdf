//! Label management.
//!
//! Labels are not part of the grid; they are edited even while the grid is
//! locked. Every change queues a snapshot of the whole label row.

use crate::engine::ScheduleEngine;
use crate::pending::PendingOpKind;
use timegrid_core::{Label, LabelError, LabelId, TimegridResult};
use timegrid_storage::LabelRow;

impl ScheduleEngine {
    /// Create a label with a generated id and the default tab set.
    pub fn add_label(&mut self, name: &str, color: &str) -> TimegridResult<LabelId> {
        let label = Label::new(name, color);
        let id = label.id.clone();
        self.pending
            .push(PendingOpKind::UpsertLabel(LabelRow::try_from(&label)?));
        self.labels.push(label);
        tracing::debug!(label_id = %id, name, "Label added");
        Ok(id)
    }

    /// Rename and/or recolor a label.
    pub fn update_label(
        &mut self,
        id: &LabelId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> TimegridResult<()> {
        self.edit_label(id, |label| {
            if let Some(name) = name {
                label.name = name.to_string();
            }
            if let Some(color) = color {
                label.color = color.to_string();
            }
            Ok(())
        })
    }

    /// Replace the label's global notes. Content is opaque markup.
    pub fn update_label_notes(&mut self, id: &LabelId, notes: &str) -> TimegridResult<()> {
        self.edit_label(id, |label| {
            label.notes = notes.to_string();
            Ok(())
        })
    }

    /// Delete a label and every block painted with it.
    ///
    /// Returns the number of blocks removed.
    pub fn delete_label(&mut self, id: &LabelId) -> TimegridResult<usize> {
        let pos = self
            .labels
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| not_found(id))?;
        self.labels.remove(pos);
        self.pending.push(PendingOpKind::DeleteLabel { id: id.to_string() });

        let removed = self.remove_blocks_for_label(id);
        tracing::info!(label_id = %id, removed_blocks = removed, "Label deleted");
        Ok(removed)
    }

    /// Open a new custom tab on the label. Returns the tab id.
    pub fn add_tab(&mut self, id: &LabelId) -> TimegridResult<String> {
        let max = self.settings.max_tabs_per_label;
        self.edit_label(id, |label| label.add_tab(max))
    }

    pub fn close_tab(&mut self, id: &LabelId, tab_id: &str) -> TimegridResult<()> {
        self.edit_label(id, |label| label.close_tab(tab_id))
    }

    pub fn restore_tab(&mut self, id: &LabelId, tab_id: &str) -> TimegridResult<()> {
        self.edit_label(id, |label| label.restore_tab(tab_id))
    }

    pub fn delete_tab_forever(&mut self, id: &LabelId, tab_id: &str) -> TimegridResult<()> {
        self.edit_label(id, |label| label.delete_tab_forever(tab_id))
    }

    pub fn update_custom_tab(&mut self, id: &LabelId, tab_id: &str, content: &str) -> TimegridResult<()> {
        self.edit_label(id, |label| label.update_custom_tab(tab_id, content))
    }

    pub fn reorder_tabs(&mut self, id: &LabelId, new_order: Vec<String>) -> TimegridResult<()> {
        self.edit_label(id, |label| label.reorder_tabs(new_order))
    }

    /// Apply `f` to a copy of the label and keep it only on success, so a
    /// failed edit leaves both the label and the queue untouched.
    fn edit_label<T>(
        &mut self,
        id: &LabelId,
        f: impl FnOnce(&mut Label) -> Result<T, LabelError>,
    ) -> TimegridResult<T> {
        let label = self
            .labels
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| not_found(id))?;

        let mut edited = label.clone();
        let out = f(&mut edited)?;
        if edited != *label {
            let row = LabelRow::try_from(&edited)?;
            *label = edited;
            self.pending.push(PendingOpKind::UpsertLabel(row));
        }
        Ok(out)
    }
}

fn not_found(id: &LabelId) -> LabelError {
    LabelError::NotFound {
        label_id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::make_test_engine;
    use crate::pending::PendingOpKind;
    use timegrid_core::{
        LabelError, LabelId, RawBlock, SlotKey, TimegridError, GLOBAL_TAB, INSTANCE_TAB,
    };

    #[test]
    fn test_add_label_queues_upsert() {
        let mut engine = make_test_engine();
        let id = engine.add_label("Gym", "#FF0000").unwrap();

        let label = engine.label(&id).unwrap();
        assert_eq!(label.name, "Gym");
        assert_eq!(label.open_tabs, vec![GLOBAL_TAB, INSTANCE_TAB]);
        assert_eq!(engine.pending().summary().label_upserts, 1);
    }

    #[test]
    fn test_update_label_partial() {
        let mut engine = make_test_engine();
        let id = engine.add_label("Gym", "#FF0000").unwrap();
        engine.update_label(&id, None, Some("#00FF00")).unwrap();

        let label = engine.label(&id).unwrap();
        assert_eq!(label.name, "Gym");
        assert_eq!(label.color, "#00FF00");
    }

    #[test]
    fn test_unchanged_edit_queues_nothing() {
        let mut engine = make_test_engine();
        let id = engine.add_label("Gym", "#FF0000").unwrap();
        engine.update_label(&id, Some("Gym"), None).unwrap();
        assert_eq!(engine.pending().len(), 1);
    }

    #[test]
    fn test_unknown_label() {
        let mut engine = make_test_engine();
        let missing = LabelId::from("missing");
        let err = engine.update_label_notes(&missing, "x").unwrap_err();
        assert!(matches!(err, TimegridError::Label(LabelError::NotFound { .. })));
        assert!(engine.delete_label(&missing).is_err());
        assert!(!engine.has_unsaved_changes());
    }

    #[test]
    fn test_delete_label_cascades_to_blocks() {
        let mut engine = make_test_engine();
        let gym = engine.add_label("Gym", "#FF0000").unwrap();
        let rest = LabelId::from("rest");
        engine.paint_cells(&[SlotKey::new(0, 0), SlotKey::new(0, 1)], Some(&gym));
        engine.paint_cells(&[SlotKey::new(1, 0)], Some(&rest));

        assert_eq!(engine.delete_label(&gym).unwrap(), 1);
        assert!(engine.label(&gym).is_none());
        assert_eq!(engine.blocks(), &[RawBlock::new(1, 300, 30, "rest")]);
        assert_eq!(engine.view().label_at(0, 0), None);

        let kinds: Vec<&str> = engine.pending().iter().map(|op| op.kind.name()).collect();
        assert_eq!(
            kinds,
            vec![
                "upsert_label",
                "replace_schedule",
                "replace_schedule",
                "delete_label",
                "replace_schedule",
            ]
        );
    }

    #[test]
    fn test_delete_label_while_locked_still_cascades() {
        let mut engine = make_test_engine();
        let gym = engine.add_label("Gym", "#FF0000").unwrap();
        engine.paint_cells(&[SlotKey::new(0, 0)], Some(&gym));
        engine.toggle_lock();

        assert_eq!(engine.delete_label(&gym).unwrap(), 1);
        assert!(engine.blocks().is_empty());
    }

    #[test]
    fn test_tab_lifecycle() {
        let mut engine = make_test_engine();
        let id = engine.add_label("Work", "#10B981").unwrap();

        let tab = engine.add_tab(&id).unwrap();
        engine.update_custom_tab(&id, &tab, "<p>agenda</p>").unwrap();
        engine.close_tab(&id, &tab).unwrap();
        assert!(engine.label(&id).unwrap().trashed_tabs.contains(&tab));

        engine.restore_tab(&id, &tab).unwrap();
        engine.close_tab(&id, &tab).unwrap();
        engine.delete_tab_forever(&id, &tab).unwrap();
        let label = engine.label(&id).unwrap();
        assert!(!label.custom_tabs.contains_key(&tab));
        assert_eq!(label.tab_count(), 2);
    }

    #[test]
    fn test_tab_limit_from_settings() {
        let mut engine = make_test_engine();
        let id = engine.add_label("Work", "#10B981").unwrap();
        for _ in 0..5 {
            engine.add_tab(&id).unwrap();
        }
        let queued = engine.pending().len();

        let err = engine.add_tab(&id).unwrap_err();
        assert!(matches!(
            err,
            TimegridError::Label(LabelError::TabLimitReached { max: 7, .. })
        ));
        assert_eq!(engine.pending().len(), queued);
    }

    #[test]
    fn test_failed_reorder_leaves_label_untouched() {
        let mut engine = make_test_engine();
        let id = engine.add_label("Work", "#10B981").unwrap();
        let before = engine.label(&id).unwrap().clone();

        assert!(engine.reorder_tabs(&id, vec!["global".to_string()]).is_err());
        assert_eq!(engine.label(&id).unwrap(), &before);

        engine
            .reorder_tabs(&id, vec![INSTANCE_TAB.to_string(), GLOBAL_TAB.to_string()])
            .unwrap();
        match &engine.pending().iter().last().unwrap().kind {
            PendingOpKind::UpsertLabel(row) => assert_eq!(row.open_tabs, vec!["instance", "global"]),
            other => panic!("unexpected op: {:?}", other),
        }
    }
}
