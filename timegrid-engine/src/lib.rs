//! Timegrid Engine - Schedule Editing Sessions
//!
//! A [`ScheduleEngine`] owns one principal's schedule for the length of a
//! session. Edits are synchronous over in-memory state and refresh the
//! cached [`MaterializedView`](timegrid_core::MaterializedView) immediately;
//! persistence is deferred to a [`PendingBuffer`] flushed by
//! [`ScheduleEngine::commit`] or dropped by [`ScheduleEngine::discard`].
//!
//! ```text
//! paint_cells ──► slice ──► optimize ──► notes ──► materialize ──► enqueue
//!                                                                    │
//!                               commit ◄─────────── PendingBuffer ◄──┘
//! ```

pub mod config;
pub mod engine;
pub mod labels;
pub mod pending;
pub mod reconfigure;
pub mod session;
pub mod telemetry;

pub use config::{EngineConfig, EngineConfigError, SeedLabel, CONFIG_PATH_ENV};
pub use engine::ScheduleEngine;
pub use pending::{PendingBuffer, PendingOp, PendingOpKind, PendingSummary};
pub use telemetry::{init_tracing, LOG_ENV};
