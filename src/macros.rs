#![allow(unused_macros)]

// A poisoned lock means another runtime thread panicked while holding it. The data behind
// it can no longer be trusted, so these helpers treat poisoning as fatal.

macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().expect("Failed to acquire lock")
    };
}

macro_rules! read_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.read().expect("Failed to acquire read lock")
    };
}

macro_rules! write_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.write().expect("Failed to acquire write lock")
    };
}

macro_rules! cond_wait {
    ($condvar:expr, $guard:expr) => {
        $condvar.wait($guard).expect("Failed to wait on condition")
    };
}

macro_rules! cond_wait_timeout {
    ($condvar:expr, $guard:expr, $timeout:expr) => {
        $condvar
            .wait_timeout($guard, $timeout)
            .expect("Failed to wait on condition")
            .0
    };
}
