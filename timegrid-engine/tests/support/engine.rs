#![allow(dead_code)]

use std::sync::Arc;

use proptest::test_runner::TestCaseError;
use timegrid_core::GridConfig;
use timegrid_engine::{EngineConfig, ScheduleEngine, SeedLabel};
use timegrid_test_utils::InMemoryStore;
use tokio::runtime::Runtime;
use uuid::Uuid;

pub fn make_test_settings() -> EngineConfig {
    EngineConfig {
        principal_id: Uuid::now_v7(),
        log_filter: "timegrid_engine=debug".to_string(),
        max_tabs_per_label: 7,
        default_grid: GridConfig::default(),
        seed_labels: vec![],
    }
}

pub fn make_seeded_settings() -> EngineConfig {
    EngineConfig {
        seed_labels: vec![
            SeedLabel {
                id: Some("work".to_string()),
                name: "Work".to_string(),
                color: "#10B981".to_string(),
            },
            SeedLabel {
                id: None,
                name: "Rest".to_string(),
                color: "#3B82F6".to_string(),
            },
        ],
        ..make_test_settings()
    }
}

/// Load a session over `store` for `settings.principal_id`.
pub async fn load_engine(store: &Arc<InMemoryStore>, settings: EngineConfig) -> ScheduleEngine {
    ScheduleEngine::load(store.clone(), settings)
        .await
        .expect("Failed to load session")
}

/// Session over a fresh store, with the store's journal cleared.
pub async fn fresh_engine() -> (Arc<InMemoryStore>, ScheduleEngine) {
    let store = Arc::new(InMemoryStore::new());
    let engine = load_engine(&store, make_test_settings()).await;
    store.clear_journal().expect("Failed to clear journal");
    (store, engine)
}

pub fn test_runtime() -> Result<Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}
