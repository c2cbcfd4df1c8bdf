//! Session lifecycle: load, commit and discard.
//!
//! These are the only operations that suspend. Commit takes `&mut self`, so
//! two commits can never overlap on one engine; callers sharing an engine
//! across tasks serialize access themselves.

use crate::config::EngineConfig;
use crate::engine::ScheduleEngine;
use std::sync::Arc;
use timegrid_core::{optimize, GridConfig, Label, LabelId, NoteStore, RawBlock, TimegridResult};
use timegrid_storage::{CalendarConfigRow, LabelRow, ScheduleStore};

/// State read back from the store.
struct Snapshot {
    config: GridConfig,
    labels: Vec<Label>,
    blocks: Vec<RawBlock>,
    notes: NoteStore,
}

impl ScheduleEngine {
    /// Open a session for `settings.principal_id`.
    ///
    /// Missing config and labels are seeded from `settings` and written
    /// straight to the store; the session starts clean.
    pub async fn load(store: Arc<dyn ScheduleStore>, settings: EngineConfig) -> TimegridResult<Self> {
        let mut engine = Self::empty(store, settings);
        engine.reload().await?;
        tracing::info!(
            principal = %engine.principal(),
            blocks = engine.blocks.len(),
            notes = engine.notes.len(),
            labels = engine.labels.len(),
            "Session loaded"
        );
        Ok(engine)
    }

    /// Flush queued ops in order. Returns the number flushed.
    ///
    /// On failure the unflushed ops stay queued and in-memory state is left
    /// as is, so the caller may retry or discard.
    pub async fn commit(&mut self) -> TimegridResult<usize> {
        if !self.pending.is_dirty() {
            return Ok(0);
        }
        let summary = self.pending.summary();
        let store = Arc::clone(&self.store);
        let principal = self.principal();

        match self.pending.commit(store.as_ref(), principal).await {
            Ok(flushed) => {
                tracing::info!(flushed, %summary, "Changes committed");
                Ok(flushed)
            }
            Err(e) => {
                tracing::error!(
                    pending = self.pending.len(),
                    error = %e,
                    "Commit failed, changes kept"
                );
                Err(e)
            }
        }
    }

    /// Drop queued ops and reload everything from the store.
    ///
    /// If the reload fails nothing changes, queued ops included.
    pub async fn discard(&mut self) -> TimegridResult<()> {
        let dropped = self.pending.len();
        self.reload().await?;
        tracing::info!(dropped, "Changes discarded");
        Ok(())
    }

    /// Replace in-memory state with the store's, clearing the queue.
    pub(crate) async fn reload(&mut self) -> TimegridResult<()> {
        let snapshot = self.fetch().await?;
        self.config = snapshot.config;
        self.labels = snapshot.labels;
        self.blocks = snapshot.blocks;
        self.notes = snapshot.notes;
        self.pending.clear();
        self.rematerialize();
        Ok(())
    }

    async fn fetch(&self) -> TimegridResult<Snapshot> {
        let store = self.store.as_ref();
        let principal = self.principal();

        let config = match store.calendar_config_get(principal).await? {
            Some(row) => {
                let config = GridConfig::from(row);
                match config.validate() {
                    Ok(()) => config,
                    Err(e) => {
                        tracing::warn!(error = %e, "Stored grid config is invalid, using default");
                        self.settings.default_grid
                    }
                }
            }
            None => {
                let config = self.settings.default_grid;
                store
                    .calendar_config_upsert(principal, &CalendarConfigRow::from(&config))
                    .await?;
                tracing::debug!("Seeded default grid config");
                config
            }
        };

        let mut labels = Vec::new();
        for row in store.labels_list(principal).await? {
            match Label::try_from(row) {
                Ok(label) => labels.push(label),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed label row"),
            }
        }
        if labels.is_empty() && !self.settings.seed_labels.is_empty() {
            for seed in &self.settings.seed_labels {
                let label = match &seed.id {
                    Some(id) => Label::with_id(LabelId::new(id.as_str()), &seed.name, &seed.color),
                    None => Label::new(&seed.name, &seed.color),
                };
                store.label_upsert(principal, &LabelRow::try_from(&label)?).await?;
                labels.push(label);
            }
            tracing::debug!(labels = labels.len(), "Seeded default labels");
        }

        let rows = store.schedule_entries_list(principal).await?;
        let loaded = rows.len();
        let blocks = optimize(&rows.into_iter().map(RawBlock::from).collect::<Vec<_>>());
        if blocks.len() != loaded {
            tracing::debug!(loaded, kept = blocks.len(), "Loaded blocks optimized");
        }

        let mut notes = NoteStore::new();
        for row in store.instance_notes_list(principal).await? {
            match row.parse_key() {
                Ok(key) => {
                    notes.insert(key, row.content);
                }
                Err(e) => tracing::warn!(error = %e, "Skipping malformed note row"),
            }
        }

        Ok(Snapshot {
            config,
            labels,
            blocks,
            notes,
        })
    }
}
