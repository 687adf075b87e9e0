//! Command handlers for the `cad` binary.
//!
//! Each handler owns its clap `Args` struct and a `run_*` entry point that
//! opens the store, builds a request-scoped engine, and renders through the
//! shared output layer.

pub mod board;
pub mod create;
pub mod estimate;
pub mod init;
pub mod lead;
pub mod move_cmd;
pub mod show;
pub mod sprint;
