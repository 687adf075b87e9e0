//! Persisted record types: work items, sprints, and board content.

pub mod board;
pub mod item;
pub mod sprint;
