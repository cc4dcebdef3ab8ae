//! Concurrent thread execution with daemon-aware termination.
//!
//! [`ThreadExecutor::start`] runs a runtime thread on its own OS thread. When a thread
//! finishes, its [`ThreadResult`] is delivered on the executor's result channel; once the
//! last non-daemon thread has delivered, the channel is closed, so a consumer draining it
//! observes "program finished" as the end of the iteration. Daemon threads still running at
//! that point keep running, but their results are dropped.

use std::sync::{Arc, Mutex};

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};

use crate::{
    runtime::{Frame, Thread},
    Error, Result,
};

/// Outcome of one finished thread.
#[derive(Debug)]
pub struct ThreadResult {
    /// The finished thread, with an empty call stack
    pub thread: Thread,
    /// Uncaught exception or failure that terminated the thread
    pub error: Option<Error>,
}

#[derive(Debug)]
struct ExecutorState {
    live: usize,
    daemons: usize,
    sender: Option<Sender<ThreadResult>>,
}

/// Launches runtime threads and collects their results.
#[derive(Debug)]
pub struct ThreadExecutor {
    state: Mutex<ExecutorState>,
    receiver: Receiver<ThreadResult>,
}

impl ThreadExecutor {
    /// Create an executor with an open result channel
    #[must_use]
    pub fn new() -> Arc<ThreadExecutor> {
        let (sender, receiver) = channel::unbounded();
        Arc::new(ThreadExecutor {
            state: Mutex::new(ExecutorState {
                live: 0,
                daemons: 0,
                sender: Some(sender),
            }),
            receiver,
        })
    }

    /// Execute `frame` on `thread` concurrently.
    ///
    /// # Errors
    /// Returns [`Error::ThreadSpawn`] if the operating system refuses to create the thread;
    /// the counters are left as they were.
    pub fn start(self: &Arc<Self>, mut thread: Thread, frame: Frame) -> Result<()> {
        let handle = thread.handle().clone();
        let daemon = handle.is_daemon();
        {
            let mut state = lock!(self.state);
            state.live += 1;
            if daemon {
                state.daemons += 1;
            }
        }
        handle.set_alive(true);

        let executor = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name(handle.name())
            .spawn(move || {
                debug!("Thread {} ({}) started", thread.name(), thread.id());
                let error = thread.execute(frame).err();
                executor.finish(thread, error);
            });

        if let Err(error) = spawned {
            handle.set_alive(false);
            let mut state = lock!(self.state);
            state.live -= 1;
            if daemon {
                state.daemons -= 1;
            }
            return Err(Error::ThreadSpawn(error));
        }
        Ok(())
    }

    fn finish(&self, thread: Thread, error: Option<Error>) {
        let handle = thread.handle().clone();
        handle.terminate();
        debug!("Thread {} ({}) finished", handle.name(), handle.id());

        let mut state = lock!(self.state);
        state.live -= 1;
        if handle.is_daemon() {
            state.daemons -= 1;
        }

        let result = ThreadResult { thread, error };
        match &state.sender {
            Some(sender) => {
                if sender.send(result).is_err() {
                    warn!("Result of thread {} was not received", handle.name());
                }
            }
            None => warn!(
                "Dropping result of thread {} finished after all non-daemon threads",
                handle.name()
            ),
        }

        if !handle.is_daemon() && state.live == state.daemons {
            debug!("All non-daemon threads finished ({} daemon threads left)", state.daemons);
            state.sender = None;
        }
    }

    fn close_if_idle(&self) {
        let mut state = lock!(self.state);
        if state.live == state.daemons && state.sender.is_some() {
            state.sender = None;
        }
    }

    /// Iterate over results as threads finish, until the last non-daemon thread did.
    ///
    /// Closes the channel right away if no non-daemon thread is running.
    pub fn results(&self) -> impl Iterator<Item = ThreadResult> + '_ {
        self.close_if_idle();
        self.receiver.iter()
    }

    /// Block until every non-daemon thread has finished and return all results
    pub fn await_all(&self) -> Vec<ThreadResult> {
        self.results().collect()
    }

    /// Number of running threads
    #[must_use]
    pub fn live(&self) -> usize {
        lock!(self.state).live
    }

    /// Number of running daemon threads
    #[must_use]
    pub fn daemons(&self) -> usize {
        lock!(self.state).daemons
    }

    /// True once the result channel has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        lock!(self.state).sender.is_none()
    }
}
