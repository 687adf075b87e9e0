//! Injected time source.
//!
//! Wall-clock reads never happen inline in the state machine or the
//! calculators; callers pass a [`Clock`] so tests can pin "now" and replay
//! the same inputs deterministically.

use chrono::{DateTime, Utc};

/// A source of "now".
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
