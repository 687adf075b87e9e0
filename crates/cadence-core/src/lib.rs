//! cadence-core library.
//!
//! The canonical data model for team work tracking plus the three engine
//! pieces with real invariants: the append-only status-history log, the
//! work-item state machine, and the read-time board reconciler. Everything
//! here is pure and request-scoped; the SQLite store in [`db`] and the
//! [`engine`] surface bind it to durable records.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at module seams; `anyhow::Result` only at
//!   application edges.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`,
//!   `trace!`).

pub mod clock;
pub mod db;
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod reconcile;
pub mod transition;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::Store;
pub use engine::Engine;
pub use error::{Error, ErrorCode, Result};
pub use history::{History, HistoryEvent};
pub use model::board::{BoardCard, BoardColumn};
pub use model::item::{Priority, Status, WorkItem};
pub use model::sprint::{Sprint, SprintStatus};
