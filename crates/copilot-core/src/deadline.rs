//! Deadline propagation.
//!
//! Every layer of the Validation Gateway, every Engine Client call, and
//! every catalog refresh receives an explicit deadline rather than
//! reading a fresh timeout from config — a child operation's budget is
//! always the remaining slice of its parent's, never a full timeout of
//! its own (spec §5, "deadlines propagate: a child operation never
//! gets more time than its parent has left").

use std::time::{Duration, Instant};

use crate::error::CoreError;

/// A point-in-time deadline derived from a budget set when the owning
/// operation started.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Start a new deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self { at: Instant::now() + budget }
    }

    /// How much time remains, or `Duration::ZERO` if the deadline has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Derive a child deadline capped at `at_most`, never exceeding the
    /// time this deadline has left.
    pub fn child(&self, at_most: Duration) -> Self {
        Self { at: Instant::now() + self.remaining().min(at_most) }
    }

    /// Run `future` under this deadline, mapping a timeout to
    /// [`CoreError::DeadlineExceeded`].
    pub async fn run<F, T>(&self, future: F) -> Result<T, CoreError>
    where
        F: std::future::Future<Output = T>,
    {
        let budget = self.remaining();
        tokio::time::timeout(budget, future)
            .await
            .map_err(|_| CoreError::DeadlineExceeded { elapsed: budget })
    }
}
