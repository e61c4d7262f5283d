//! Counting semaphore with a close operation.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    count: usize,
    closed: bool,
}

/// Wakes the mesher thread once per published snapshot.
///
/// Notifications accumulate while nobody waits; closing wakes every waiter and
/// makes all further waits return immediately.
#[derive(Debug, Default)]
pub struct Semaphore {
    state: Mutex<State>,
    cond: Condvar,
}

impl Semaphore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add one permit and wake a waiter.
    pub fn notify(&self) {
        let mut state = self.lock();
        state.count += 1;
        self.cond.notify_one();
    }

    /// Block until a permit is available and take it. Returns `false` once the
    /// semaphore is closed.
    pub fn wait(&self) -> bool {
        let mut state = self.lock();
        loop {
            if state.closed {
                return false;
            }
            if state.count > 0 {
                state.count -= 1;
                return true;
            }
            state = self.cond.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Close the semaphore and release every waiter.
    pub fn close(&self) {
        self.lock().closed = true;
        self.cond.notify_all();
    }

    /// Permits not yet taken.
    pub fn available(&self) -> usize {
        self.lock().count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn permits_accumulate() {
        let sema = Semaphore::new();
        sema.notify();
        sema.notify();
        assert_eq!(sema.available(), 2);
        assert!(sema.wait());
        assert!(sema.wait());
        assert_eq!(sema.available(), 0);
    }

    #[test]
    fn close_releases_blocked_waiter() {
        let sema = Arc::new(Semaphore::new());
        let waiter = {
            let sema = Arc::clone(&sema);
            thread::spawn(move || sema.wait())
        };
        sema.close();
        assert!(!waiter.join().expect("waiter thread"));
        sema.notify();
        assert!(!sema.wait());
    }

    #[test]
    fn notify_wakes_blocked_waiter() {
        let sema = Arc::new(Semaphore::new());
        let waiter = {
            let sema = Arc::clone(&sema);
            thread::spawn(move || sema.wait())
        };
        sema.notify();
        assert!(waiter.join().expect("waiter thread"));
    }
}
