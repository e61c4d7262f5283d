//! Generation counter that readers can block on.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Counts completed frames and lets other threads wait for the next one.
#[derive(Debug, Default)]
pub struct FrameSignal {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a finished frame and wake every waiter. Returns the new generation.
    pub fn advance(&self) -> u64 {
        let mut generation = self.lock();
        *generation += 1;
        self.cond.notify_all();
        *generation
    }

    pub fn current(&self) -> u64 {
        *self.lock()
    }

    /// Block until the generation exceeds `after` or `timeout` elapses.
    /// Returns the generation reached, or `None` on timeout.
    pub fn wait_past(&self, after: u64, timeout: Duration) -> Option<u64> {
        let deadline = Instant::now() + timeout;
        let mut generation = self.lock();
        while *generation <= after {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            generation = self
                .cond
                .wait_timeout(generation, remaining)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
        Some(*generation)
    }
}
