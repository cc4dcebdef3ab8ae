//! Native method bindings.
//!
//! Methods declared `native` are dispatched through the [`NativeRegistry`], keyed by
//! declaring class, name and descriptor. A binding receives the calling thread and one
//! [`Value`] per parameter (receiver first) and returns the method's value, if any; the
//! interpreter pushes it onto the caller's operand stack.
//!
//! # Default bindings
//!
//! | Module | Classes |
//! |--------|---------|
//! | [`lang`] | `Object`, `System`, `Runtime`, `String`, `Class`, `Throwable` |
//! | [`thread`] | `Thread` |
//! | [`io`] | `FileOutputStream` |
//! | [`reflect`] | `NativeConstructorAccessorImpl` |
//!
//! Every class additionally gets no-op `registerNatives()V` and `initIDs()V` bindings.

pub mod io;
pub mod lang;
pub mod reflect;
pub mod thread;

use std::{fmt, sync::Arc};

use dashmap::DashMap;

use crate::{
    runtime::{InstanceRef, Thread, Value},
    Error, Result,
};

/// A native method implementation
pub type NativeMethod = Arc<dyn Fn(&mut Thread, Vec<Value>) -> Result<Option<Value>> + Send + Sync>;

type NativeKey = (String, String, String);

/// Registry of native method bindings.
pub struct NativeRegistry {
    bindings: DashMap<NativeKey, NativeMethod>,
}

impl NativeRegistry {
    /// Create a registry without bindings
    #[must_use]
    pub fn new() -> NativeRegistry {
        NativeRegistry {
            bindings: DashMap::new(),
        }
    }

    /// Create a registry holding the default bindings of the core library
    #[must_use]
    pub fn with_defaults() -> NativeRegistry {
        let registry = NativeRegistry::new();
        lang::register(&registry);
        thread::register(&registry);
        io::register(&registry);
        reflect::register(&registry);
        registry
    }

    /// Bind `class.name descriptor` to `method`, replacing an earlier binding
    pub fn register<F>(&self, class: &str, name: &str, descriptor: &str, method: F)
    where
        F: Fn(&mut Thread, Vec<Value>) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.bindings.insert(
            (class.to_string(), name.to_string(), descriptor.to_string()),
            Arc::new(method),
        );
    }

    /// Bind an already shared implementation
    pub fn register_shared(&self, class: &str, name: &str, descriptor: &str, method: NativeMethod) {
        self.bindings
            .insert((class.to_string(), name.to_string(), descriptor.to_string()), method);
    }

    /// Look up the binding of a native method.
    ///
    /// # Errors
    /// Returns [`Error::NativeMethodNotFound`] if nothing is bound.
    pub fn lookup(&self, class: &str, name: &str, descriptor: &str) -> Result<NativeMethod> {
        if descriptor == "()V" && matches!(name, "registerNatives" | "initIDs") {
            return Ok(Arc::new(|_, _| Ok(None)));
        }

        let key = (class.to_string(), name.to_string(), descriptor.to_string());
        match self.bindings.get(&key) {
            Some(binding) => Ok(binding.value().clone()),
            None => Err(Error::NativeMethodNotFound {
                class: class.to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            }),
        }
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True if nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        NativeRegistry::with_defaults()
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

/// Argument `index` as `int`
pub(crate) fn int_arg(args: &[Value], index: usize) -> Result<i32> {
    args.get(index).ok_or(Error::OutOfBounds)?.as_int()
}

/// Argument `index` as `long`
pub(crate) fn long_arg(args: &[Value], index: usize) -> Result<i64> {
    args.get(index).ok_or(Error::OutOfBounds)?.as_long()
}

/// Argument `index` as a possibly null reference
pub(crate) fn ref_arg(args: &[Value], index: usize) -> Result<Option<InstanceRef>> {
    Ok(args.get(index).ok_or(Error::OutOfBounds)?.as_reference()?.cloned())
}

/// Argument `index` as a reference, raising `NullPointerException` for `null`
pub(crate) fn non_null_arg(thread: &Thread, args: &[Value], index: usize) -> Result<InstanceRef> {
    match ref_arg(args, index)? {
        Some(instance) => Ok(instance),
        None => Err(thread.vm().raise(thread, "java/lang/NullPointerException", None)),
    }
}

/// Map a monitor ownership violation to `IllegalMonitorStateException`
pub(crate) fn monitor_result(thread: &Thread, result: Result<()>) -> Result<()> {
    match result {
        Err(Error::IllegalMonitorState { .. }) => Err(thread.vm().raise(
            thread,
            "java/lang/IllegalMonitorStateException",
            Some("current thread is not owner"),
        )),
        other => other,
    }
}
