//! Cooperative thread interruption.
//!
//! Every blocking operation (sleep, `Object.wait`) registers a [`Watcher`] before it blocks
//! and unregisters it afterwards. [`Interrupts::interrupt`] disconnects every registered
//! watcher, which wakes the blocked operation; it only records an interruption when at least
//! one watcher was registered, so an interrupt that arrives while nothing blocks leaves no
//! stale state behind.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};

type Wake = Arc<dyn Fn() + Send + Sync>;

/// Per-thread registry of interruption watchers.
#[derive(Debug, Default)]
pub struct Interrupts {
    state: Mutex<InterruptState>,
}

#[derive(Default)]
struct InterruptState {
    next_id: u64,
    watchers: Vec<Registration>,
    interrupted: bool,
}

struct Registration {
    id: u64,
    _sender: Sender<()>,
    wake: Option<Wake>,
}

impl fmt::Debug for InterruptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptState")
            .field("next_id", &self.next_id)
            .field("watchers", &self.watchers.len())
            .field("interrupted", &self.interrupted)
            .finish()
    }
}

/// Token handed to a blocking operation.
///
/// The sending half lives in the [`Interrupts`] registry; dropping it there disconnects the
/// channel, which is how the blocked operation observes the interruption.
#[derive(Debug)]
pub struct Watcher {
    id: u64,
    receiver: Receiver<()>,
}

impl Watcher {
    /// True once the owning thread has been interrupted
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Block for up to `timeout`; returns true if woken by an interruption
    #[must_use]
    pub fn sleep(&self, timeout: Duration) -> bool {
        matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}

impl Interrupts {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a watcher for a blocking operation that is about to start
    pub fn watch(&self) -> Watcher {
        self.register(None)
    }

    /// Register a watcher whose blocking operation does not wait on the watcher's channel.
    ///
    /// `wake` runs on the interrupting thread after the watcher was disconnected, e.g. to
    /// signal the condition variable the operation sleeps on.
    pub fn watch_with(&self, wake: impl Fn() + Send + Sync + 'static) -> Watcher {
        self.register(Some(Arc::new(wake)))
    }

    fn register(&self, wake: Option<Wake>) -> Watcher {
        let (sender, receiver) = channel::bounded(0);
        let mut state = lock!(self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.watchers.push(Registration {
            id,
            _sender: sender,
            wake,
        });

        Watcher { id, receiver }
    }

    /// Unregister `watcher` once its blocking operation ended.
    ///
    /// Returns true if the operation was cut short by an interruption. Observing the
    /// interruption this way consumes it once no other watcher is pending.
    pub fn unwatch(&self, watcher: Watcher) -> bool {
        let mut state = lock!(self.state);
        // only an interrupt removes a registration before its watcher is unwatched
        let interrupted = !state.watchers.iter().any(|entry| entry.id == watcher.id);
        state.watchers.retain(|entry| entry.id != watcher.id);

        if interrupted && state.watchers.is_empty() {
            state.interrupted = false;
        }
        interrupted
    }

    /// Wake all blocked operations of the thread
    pub fn interrupt(&self) {
        let wakes: Vec<Wake> = {
            let mut state = lock!(self.state);
            state.interrupted = !state.watchers.is_empty();
            state.watchers.drain(..).filter_map(|entry| entry.wake).collect()
        };
        for wake in wakes {
            wake();
        }
    }

    /// True while an interruption is recorded and not yet consumed
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        lock!(self.state).interrupted
    }

    /// Read the interruption flag, optionally clearing it
    pub fn check(&self, clear: bool) -> bool {
        let mut state = lock!(self.state);
        let interrupted = state.interrupted;
        if clear {
            state.interrupted = false;
        }
        interrupted
    }

    /// Number of operations currently blocked
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        lock!(self.state).watchers.len()
    }
}
