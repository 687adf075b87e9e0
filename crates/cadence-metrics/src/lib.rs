#![forbid(unsafe_code)]
//! cadence-metrics library.
//!
//! Derived timing metrics over the status-history log: per-item lead time,
//! sprint-level KPI rollups, and the planning-poker estimation consensus.
//! Everything here is pure and synchronous — inputs in, values out, no
//! storage access and no wall-clock reads outside the injected clock.
//!
//! # Conventions
//!
//! - **Errors**: These functions cannot fail for well-formed input; "no
//!   data" is `None`, clock skew clamps to zero.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`,
//!   `debug!`, `trace!`).

pub mod estimate;
pub mod leadtime;
pub mod sprint;

pub use estimate::{is_numeric_vote, suggest, DECK};
pub use leadtime::{compute_lead_time, LeadTimeResult, DEFAULT_TARGET_DAYS};
pub use sprint::{compute_sprint_metrics, SprintMetrics};
