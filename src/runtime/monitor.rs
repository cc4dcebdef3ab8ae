//! Intrinsic object locks.
//!
//! A [`Monitor`] is a reentrant lock owned by at most one runtime thread plus a wait set.
//! Every object carries its own monitor; the same primitive backs `synchronized` methods,
//! `monitorenter`/`monitorexit`, `Object.wait`/`notify` and thread join signaling.

use std::{
    sync::{Condvar, Mutex},
    time::{Duration, Instant},
};

use crate::{
    runtime::{ThreadId, Watcher},
    Error, Result,
};

/// Reentrant lock with a wait set.
#[derive(Debug, Default)]
pub struct Monitor {
    state: Mutex<MonitorState>,
    /// Signalled when the monitor becomes free
    entry: Condvar,
    /// Signalled on notify / notifyAll
    waits: Condvar,
}

#[derive(Debug, Default)]
struct MonitorState {
    owner: Option<ThreadId>,
    count: usize,
    waiting: usize,
    notified: usize,
}

impl Monitor {
    /// Create an unowned monitor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the monitor for `thread`.
    ///
    /// Reentrant acquisitions by the owner only increase the hold count. A negative
    /// `timeout_ms` blocks until the monitor is free; otherwise gives up after the timeout.
    /// Returns whether the monitor was acquired.
    pub fn enter(&self, thread: ThreadId, timeout_ms: i64) -> bool {
        let mut state = lock!(self.state);
        if state.owner == Some(thread) {
            state.count += 1;
            return true;
        }

        let deadline = u64::try_from(timeout_ms)
            .ok()
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        while state.owner.is_some() {
            match deadline {
                None => state = cond_wait!(self.entry, state),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    state = cond_wait_timeout!(self.entry, state, deadline - now);
                }
            }
        }

        state.owner = Some(thread);
        state.count = 1;
        true
    }

    /// Acquire the monitor only if that does not require blocking
    pub fn try_enter(&self, thread: ThreadId) -> bool {
        self.enter(thread, 0)
    }

    /// Release one hold of `thread`.
    ///
    /// # Errors
    /// Returns [`Error::IllegalMonitorState`] if `thread` does not own the monitor.
    pub fn exit(&self, thread: ThreadId) -> Result<()> {
        let mut state = lock!(self.state);
        if state.owner != Some(thread) {
            return Err(Error::IllegalMonitorState { thread });
        }

        state.count -= 1;
        if state.count == 0 {
            state.owner = None;
            self.entry.notify_one();
        }
        Ok(())
    }

    /// Release the monitor completely and wait for a notification.
    ///
    /// Wakes on `notify`/`notify_all`, after `timeout` (if any) or when `watcher` observes an
    /// interruption, then re-acquires the monitor with the previous hold count. Returns true
    /// if the wait ended because of an interruption.
    ///
    /// The interrupting thread has to call [`Monitor::wake_waiters`], which is what a watcher
    /// registered through [`crate::runtime::Interrupts::watch_with`] is for.
    ///
    /// # Errors
    /// Returns [`Error::IllegalMonitorState`] if `thread` does not own the monitor.
    pub fn wait(
        &self,
        thread: ThreadId,
        timeout: Option<Duration>,
        watcher: Option<&Watcher>,
    ) -> Result<bool> {
        let mut state = lock!(self.state);
        if state.owner != Some(thread) {
            return Err(Error::IllegalMonitorState { thread });
        }

        let holds = state.count;
        state.owner = None;
        state.count = 0;
        state.waiting += 1;
        self.entry.notify_one();

        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut interrupted = false;
        loop {
            if state.notified > 0 {
                state.notified -= 1;
                break;
            }
            if watcher.is_some_and(Watcher::is_interrupted) {
                interrupted = true;
                break;
            }

            let slice = deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()));
            if slice == Some(Duration::ZERO) {
                break;
            }

            state = match slice {
                Some(slice) => cond_wait_timeout!(self.waits, state, slice),
                None => cond_wait!(self.waits, state),
            };
        }
        state.waiting -= 1;
        state.notified = state.notified.min(state.waiting);

        while state.owner.is_some() {
            state = cond_wait!(self.entry, state);
        }
        state.owner = Some(thread);
        state.count = holds;

        Ok(interrupted)
    }

    /// Wake one waiting thread.
    ///
    /// # Errors
    /// Returns [`Error::IllegalMonitorState`] if `thread` does not own the monitor.
    pub fn notify(&self, thread: ThreadId) -> Result<()> {
        let mut state = lock!(self.state);
        if state.owner != Some(thread) {
            return Err(Error::IllegalMonitorState { thread });
        }

        if state.notified < state.waiting {
            state.notified += 1;
            self.waits.notify_all();
        }
        Ok(())
    }

    /// Wake all waiting threads.
    ///
    /// # Errors
    /// Returns [`Error::IllegalMonitorState`] if `thread` does not own the monitor.
    pub fn notify_all(&self, thread: ThreadId) -> Result<()> {
        let mut state = lock!(self.state);
        if state.owner != Some(thread) {
            return Err(Error::IllegalMonitorState { thread });
        }

        state.notified = state.waiting;
        self.waits.notify_all();
        Ok(())
    }

    /// Make every waiting thread re-check why it waits, without notifying it
    pub fn wake_waiters(&self) {
        let _state = lock!(self.state);
        self.waits.notify_all();
    }

    /// True if `thread` currently owns the monitor
    #[must_use]
    pub fn holds(&self, thread: ThreadId) -> bool {
        lock!(self.state).owner == Some(thread)
    }

    /// Current owner, if any
    #[must_use]
    pub fn owner(&self) -> Option<ThreadId> {
        lock!(self.state).owner
    }

    /// Number of reentrant holds of the current owner
    #[must_use]
    pub fn hold_count(&self) -> usize {
        lock!(self.state).count
    }

    /// Number of threads in the wait set
    #[must_use]
    pub fn waiting(&self) -> usize {
        lock!(self.state).waiting
    }
}
