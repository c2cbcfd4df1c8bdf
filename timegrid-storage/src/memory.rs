//! In-memory store for tests and local development.
//!
//! Besides holding rows per principal, it records every successful write in
//! a journal (so flush ordering can be asserted) and can inject write
//! failures.

use crate::rows::{CalendarConfigRow, InstanceNoteRow, LabelRow, ScheduleEntryRow};
use crate::store::ScheduleStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};
use timegrid_core::{StorageError, Table, TimegridError, TimegridResult};
use uuid::Uuid;

/// Kind of a journaled write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteKind {
    DeleteAll,
    Insert { rows: usize },
    Upsert { key: String },
    Delete { key: String },
}

/// One successful write, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub principal: Uuid,
    pub table: Table,
    pub kind: WriteKind,
}

#[derive(Debug, Default, Clone)]
struct PrincipalTables {
    schedule_entries: Vec<ScheduleEntryRow>,
    instance_notes: BTreeMap<String, InstanceNoteRow>,
    calendar_config: Option<CalendarConfigRow>,
    labels: Vec<LabelRow>,
}

#[derive(Debug, Default)]
struct FaultPlan {
    /// Writes remaining until the next injected failure (1 = the next write).
    countdown: Option<usize>,
    failing_tables: HashSet<Table>,
}

/// In-memory [`ScheduleStore`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<Uuid, PrincipalTables>>>,
    journal: Arc<RwLock<Vec<WriteRecord>>>,
    faults: Arc<RwLock<FaultPlan>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th write from now (1 = the very next write).
    pub fn fail_nth_write(&self, n: usize) -> TimegridResult<()> {
        self.faults
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .countdown = Some(n.max(1));
        Ok(())
    }

    /// Fail every write to `table` until faults are cleared.
    pub fn fail_table(&self, table: Table) -> TimegridResult<()> {
        self.faults
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .failing_tables
            .insert(table);
        Ok(())
    }

    /// Remove all injected failures.
    pub fn clear_faults(&self) -> TimegridResult<()> {
        let mut faults = self.faults.write().map_err(|_| StorageError::LockPoisoned)?;
        faults.countdown = None;
        faults.failing_tables.clear();
        Ok(())
    }

    /// Successful writes so far, oldest first.
    pub fn journal(&self) -> TimegridResult<Vec<WriteRecord>> {
        Ok(self
            .journal
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone())
    }

    /// Forget journaled writes.
    pub fn clear_journal(&self) -> TimegridResult<()> {
        self.journal
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }

    /// Get count of stored schedule entries for a principal.
    pub fn entry_count(&self, principal: Uuid) -> TimegridResult<usize> {
        self.read(principal, |t| t.schedule_entries.len())
    }

    /// Get count of stored notes for a principal.
    pub fn note_count(&self, principal: Uuid) -> TimegridResult<usize> {
        self.read(principal, |t| t.instance_notes.len())
    }

    /// Get count of stored labels for a principal.
    pub fn label_count(&self, principal: Uuid) -> TimegridResult<usize> {
        self.read(principal, |t| t.labels.len())
    }

    fn read<T>(&self, principal: Uuid, f: impl FnOnce(&PrincipalTables) -> T) -> TimegridResult<T> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        match tables.get(&principal) {
            Some(t) => Ok(f(t)),
            None => Ok(f(&PrincipalTables::default())),
        }
    }

    /// Run a write against the principal's tables, honoring injected faults
    /// and journaling on success.
    fn write(
        &self,
        principal: Uuid,
        table: Table,
        kind: WriteKind,
        f: impl FnOnce(&mut PrincipalTables),
    ) -> TimegridResult<()> {
        self.check_fault(table)?;
        {
            let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
            f(tables.entry(principal).or_default());
        }
        self.journal
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .push(WriteRecord {
                principal,
                table,
                kind,
            });
        Ok(())
    }

    fn check_fault(&self, table: Table) -> TimegridResult<()> {
        let mut faults = self.faults.write().map_err(|_| StorageError::LockPoisoned)?;
        let mut fail = faults.failing_tables.contains(&table);
        if let Some(remaining) = faults.countdown {
            if remaining <= 1 {
                faults.countdown = None;
                fail = true;
            } else {
                faults.countdown = Some(remaining - 1);
            }
        }
        if fail {
            tracing::debug!(%table, "Injected write failure");
            return Err(TimegridError::Storage(StorageError::WriteFailed {
                table,
                reason: "injected failure".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn schedule_entries_list(&self, principal: Uuid) -> TimegridResult<Vec<ScheduleEntryRow>> {
        self.read(principal, |t| t.schedule_entries.clone())
    }

    async fn schedule_entries_delete_all(&self, principal: Uuid) -> TimegridResult<()> {
        self.write(principal, Table::ScheduleEntries, WriteKind::DeleteAll, |t| {
            t.schedule_entries.clear()
        })
    }

    async fn schedule_entries_insert(
        &self,
        principal: Uuid,
        rows: &[ScheduleEntryRow],
    ) -> TimegridResult<()> {
        self.write(
            principal,
            Table::ScheduleEntries,
            WriteKind::Insert { rows: rows.len() },
            |t| t.schedule_entries.extend_from_slice(rows),
        )
    }

    async fn instance_notes_list(&self, principal: Uuid) -> TimegridResult<Vec<InstanceNoteRow>> {
        self.read(principal, |t| t.instance_notes.values().cloned().collect())
    }

    async fn instance_notes_delete_all(&self, principal: Uuid) -> TimegridResult<()> {
        self.write(principal, Table::InstanceNotes, WriteKind::DeleteAll, |t| {
            t.instance_notes.clear()
        })
    }

    async fn instance_notes_insert(
        &self,
        principal: Uuid,
        rows: &[InstanceNoteRow],
    ) -> TimegridResult<()> {
        self.write(
            principal,
            Table::InstanceNotes,
            WriteKind::Insert { rows: rows.len() },
            |t| {
                for row in rows {
                    t.instance_notes.insert(row.key.clone(), row.clone());
                }
            },
        )
    }

    async fn instance_note_upsert(&self, principal: Uuid, row: &InstanceNoteRow) -> TimegridResult<()> {
        self.write(
            principal,
            Table::InstanceNotes,
            WriteKind::Upsert {
                key: row.key.clone(),
            },
            |t| {
                t.instance_notes.insert(row.key.clone(), row.clone());
            },
        )
    }

    async fn instance_note_delete(&self, principal: Uuid, key: &str) -> TimegridResult<()> {
        self.write(
            principal,
            Table::InstanceNotes,
            WriteKind::Delete {
                key: key.to_string(),
            },
            |t| {
                t.instance_notes.remove(key);
            },
        )
    }

    async fn calendar_config_get(&self, principal: Uuid) -> TimegridResult<Option<CalendarConfigRow>> {
        self.read(principal, |t| t.calendar_config)
    }

    async fn calendar_config_upsert(
        &self,
        principal: Uuid,
        row: &CalendarConfigRow,
    ) -> TimegridResult<()> {
        self.write(
            principal,
            Table::CalendarConfig,
            WriteKind::Upsert {
                key: principal.to_string(),
            },
            |t| t.calendar_config = Some(*row),
        )
    }

    async fn labels_list(&self, principal: Uuid) -> TimegridResult<Vec<LabelRow>> {
        self.read(principal, |t| t.labels.clone())
    }

    async fn label_upsert(&self, principal: Uuid, row: &LabelRow) -> TimegridResult<()> {
        self.write(
            principal,
            Table::Labels,
            WriteKind::Upsert { key: row.id.clone() },
            |t| match t.labels.iter().position(|l| l.id == row.id) {
                Some(pos) => t.labels[pos] = row.clone(),
                None => t.labels.push(row.clone()),
            },
        )
    }

    async fn label_delete(&self, principal: Uuid, id: &str) -> TimegridResult<()> {
        self.write(
            principal,
            Table::Labels,
            WriteKind::Delete { key: id.to_string() },
            |t| t.labels.retain(|l| l.id != id),
        )
    }

    async fn health_check(&self) -> TimegridResult<bool> {
        Ok(self.tables.read().is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn entry(day: i32, start: i32) -> ScheduleEntryRow {
        ScheduleEntryRow {
            day_index: day,
            start_minute: start,
            duration_minutes: 30,
            label_id: "work".to_string(),
        }
    }

    fn label_row(id: &str, name: &str) -> LabelRow {
        LabelRow {
            id: id.to_string(),
            name: name.to_string(),
            color: "#10B981".to_string(),
            notes: String::new(),
            open_tabs: vec!["global".to_string(), "instance".to_string()],
            trashed_tabs: vec![],
            custom_tabs: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_schedule_entries_replace() {
        let store = InMemoryStore::new();
        let principal = Uuid::now_v7();

        store
            .schedule_entries_insert(principal, &[entry(0, 300), entry(0, 360)])
            .await
            .unwrap();
        assert_eq!(store.entry_count(principal).unwrap(), 2);

        store.schedule_entries_delete_all(principal).await.unwrap();
        store
            .schedule_entries_insert(principal, &[entry(1, 300)])
            .await
            .unwrap();
        let rows = store.schedule_entries_list(principal).await.unwrap();
        assert_eq!(rows, vec![entry(1, 300)]);
    }

    #[tokio::test]
    async fn test_principals_are_isolated() {
        let store = InMemoryStore::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        store.schedule_entries_insert(a, &[entry(0, 300)]).await.unwrap();
        store.schedule_entries_delete_all(b).await.unwrap();

        assert_eq!(store.entry_count(a).unwrap(), 1);
        assert_eq!(store.entry_count(b).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_note_upsert_and_delete() {
        let store = InMemoryStore::new();
        let principal = Uuid::now_v7();
        let row = InstanceNoteRow {
            key: "0-360".to_string(),
            content: "standup".to_string(),
        };

        store.instance_note_upsert(principal, &row).await.unwrap();
        store
            .instance_note_upsert(
                principal,
                &InstanceNoteRow {
                    content: "retro".to_string(),
                    ..row.clone()
                },
            )
            .await
            .unwrap();
        let notes = store.instance_notes_list(principal).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "retro");

        store.instance_note_delete(principal, "0-360").await.unwrap();
        store.instance_note_delete(principal, "0-360").await.unwrap();
        assert_eq!(store.note_count(principal).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_label_upsert_keeps_creation_order() {
        let store = InMemoryStore::new();
        let principal = Uuid::now_v7();

        store.label_upsert(principal, &label_row("work", "Work")).await.unwrap();
        store.label_upsert(principal, &label_row("rest", "Rest")).await.unwrap();
        store
            .label_upsert(principal, &label_row("work", "Deep Work"))
            .await
            .unwrap();

        let labels = store.labels_list(principal).await.unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].name, "Deep Work");
        assert_eq!(labels[1].id, "rest");

        store.label_delete(principal, "work").await.unwrap();
        assert_eq!(store.label_count(principal).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_config_upsert_single_row() {
        let store = InMemoryStore::new();
        let principal = Uuid::now_v7();
        assert!(store.calendar_config_get(principal).await.unwrap().is_none());

        let row = CalendarConfigRow {
            start_hour: 6,
            start_minute: 0,
            end_hour: 22,
            end_minute: 0,
            step_minutes: 15,
        };
        store.calendar_config_upsert(principal, &row).await.unwrap();
        store.calendar_config_upsert(principal, &row).await.unwrap();
        assert_eq!(store.calendar_config_get(principal).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn test_fail_nth_write() {
        let store = InMemoryStore::new();
        let principal = Uuid::now_v7();
        store.fail_nth_write(2).unwrap();

        assert!(store.schedule_entries_delete_all(principal).await.is_ok());
        let err = store
            .schedule_entries_insert(principal, &[entry(0, 300)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TimegridError::Storage(StorageError::WriteFailed { table: Table::ScheduleEntries, .. })
        ));
        // the fault fires once
        assert!(store
            .schedule_entries_insert(principal, &[entry(0, 300)])
            .await
            .is_ok());
        assert_eq!(store.journal().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_table_until_cleared() {
        let store = InMemoryStore::new();
        let principal = Uuid::now_v7();
        store.fail_table(Table::Labels).unwrap();

        assert!(store.label_upsert(principal, &label_row("work", "Work")).await.is_err());
        assert!(store.label_upsert(principal, &label_row("work", "Work")).await.is_err());
        assert!(store.schedule_entries_delete_all(principal).await.is_ok());

        store.clear_faults().unwrap();
        assert!(store.label_upsert(principal, &label_row("work", "Work")).await.is_ok());
    }

    #[tokio::test]
    async fn test_journal_records_order() {
        let store = InMemoryStore::new();
        let principal = Uuid::now_v7();

        store.schedule_entries_delete_all(principal).await.unwrap();
        store.schedule_entries_insert(principal, &[entry(0, 300)]).await.unwrap();
        store.label_delete(principal, "gone").await.unwrap();

        let journal = store.journal().unwrap();
        let kinds: Vec<(Table, WriteKind)> =
            journal.into_iter().map(|r| (r.table, r.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (Table::ScheduleEntries, WriteKind::DeleteAll),
                (Table::ScheduleEntries, WriteKind::Insert { rows: 1 }),
                (Table::Labels, WriteKind::Delete { key: "gone".to_string() }),
            ]
        );
        store.clear_journal().unwrap();
        assert!(store.journal().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        assert!(InMemoryStore::new().health_check().await.unwrap());
    }
}
