//! Request-scoped delivery deadline

use std::time::Duration;
use tokio::time::Instant;

/// Point in time after which no delivery attempt may continue.
///
/// One deadline is created per inbound batch and copied into every
/// delivery call made for that batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(Instant);

impl Deadline {
    /// Deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }

    /// Deadline at a fixed instant
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    /// Time left, zero once expired
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    pub fn has_elapsed(&self) -> bool {
        Instant::now() >= self.0
    }
}
