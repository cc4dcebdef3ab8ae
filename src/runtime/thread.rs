//! Runtime threads and the execution loop.
//!
//! A runtime thread is split in two halves:
//!
//! - [`ThreadHandle`] is the shared view other threads see: id, name, flags, liveness, the
//!   interruption registry and the runtime-visible `java/lang/Thread` object.
//! - [`Thread`] owns the call stack and is moved into the OS thread that executes it.
//!
//! [`Thread::execute`] drives the fetch-execute-unwind loop. Each step is delegated to the
//! VM's [`crate::runtime::InstructionSet`]; thrown exceptions are routed through the handler
//! tables of the frames on the stack, popping frames (and releasing the monitors of
//! synchronized methods) until a handler is found or the stack is back at the depth the
//! execution started from.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, OnceLock, RwLock, Weak,
    },
    time::Duration,
};

use log::{debug, trace, warn};

use crate::{
    runtime::{
        ClassRef, Completion, Frame, Instance, InstanceRef, Interrupts, MethodRef, Monitor, Value,
        Vm, VmData,
    },
    Error, Result,
};

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique id of a runtime thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(u64);

impl ThreadId {
    /// Allocate a fresh id
    #[must_use]
    pub fn next() -> ThreadId {
        ThreadId(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of a captured stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTraceElement {
    /// Binary name of the declaring class
    pub class: String,
    /// Method name
    pub method: String,
    /// Source file of the declaring class
    pub file: Option<String>,
    /// Source line, if the method carries line numbers
    pub line: Option<u16>,
    /// True for native methods
    pub native: bool,
}

impl fmt::Display for StackTraceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}.{}(", self.class.replace('/', "."), self.method)?;
        match (&self.file, self.line) {
            _ if self.native => write!(f, "Native Method)"),
            (Some(file), Some(line)) => write!(f, "{file}:{line})"),
            (Some(file), None) => write!(f, "{file})"),
            (None, _) => write!(f, "Unknown Source)"),
        }
    }
}

/// Shared view of a runtime thread.
#[derive(Debug)]
pub struct ThreadHandle {
    id: ThreadId,
    name: RwLock<String>,
    main: bool,
    daemon: bool,
    alive: AtomicBool,
    interrupts: Interrupts,
    object: OnceLock<Weak<Instance>>,
    monitor: Monitor,
}

impl ThreadHandle {
    /// Create the handle of a thread that has not started yet
    #[must_use]
    pub fn new(name: &str, main: bool, daemon: bool) -> Arc<ThreadHandle> {
        Arc::new(ThreadHandle {
            id: ThreadId::next(),
            name: RwLock::new(name.to_string()),
            main,
            daemon,
            alive: AtomicBool::new(false),
            interrupts: Interrupts::new(),
            object: OnceLock::new(),
            monitor: Monitor::new(),
        })
    }

    /// Thread id
    #[must_use]
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Current name
    #[must_use]
    pub fn name(&self) -> String {
        read_lock!(self.name).clone()
    }

    /// Rename the thread
    pub fn set_name(&self, name: &str) {
        *write_lock!(self.name) = name.to_string();
    }

    /// True for the thread running `main`
    #[must_use]
    pub fn is_main(&self) -> bool {
        self.main
    }

    /// True for daemon threads
    #[must_use]
    pub fn is_daemon(&self) -> bool {
        self.daemon
    }

    /// True while the thread executes
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(crate) fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    /// Interruption registry of the thread
    #[must_use]
    pub fn interrupts(&self) -> &Interrupts {
        &self.interrupts
    }

    /// Wake every blocking operation of the thread
    pub fn interrupt(&self) {
        debug!("Interrupting thread {} ({})", self.name(), self.id);
        self.interrupts.interrupt();
    }

    /// The runtime-visible `java/lang/Thread` object, while it is reachable
    #[must_use]
    pub fn object(&self) -> Option<InstanceRef> {
        self.object.get().and_then(Weak::upgrade)
    }

    /// Monitor other threads wait on to observe termination: the monitor of the thread
    /// object if there is one, a private monitor otherwise
    pub fn with_monitor<R>(&self, f: impl FnOnce(&Monitor) -> R) -> R {
        match self.object() {
            Some(object) => f(object.monitor()),
            None => f(&self.monitor),
        }
    }

    /// Mark the thread terminated and wake everybody waiting on its monitor
    pub(crate) fn terminate(&self) {
        self.set_alive(false);
        self.with_monitor(|monitor| {
            monitor.enter(self.id, -1);
            let notified = monitor.notify_all(self.id);
            let released = monitor.exit(self.id);
            if let Err(error) = notified.and(released) {
                warn!("Failed to signal termination of thread {}: {}", self.id, error);
            }
        });
    }
}

/// The execution-owned half of a runtime thread.
pub struct Thread {
    handle: Arc<ThreadHandle>,
    object: Option<InstanceRef>,
    vm: Arc<Vm>,
    frames: Vec<Frame>,
    floor: usize,
    returned: Option<Value>,
}

impl Thread {
    /// Create a thread with an empty call stack
    #[must_use]
    pub fn new(vm: Arc<Vm>, handle: Arc<ThreadHandle>) -> Thread {
        Thread {
            handle,
            object: None,
            vm,
            frames: Vec::new(),
            floor: 0,
            returned: None,
        }
    }

    /// Thread id
    #[must_use]
    pub fn id(&self) -> ThreadId {
        self.handle.id
    }

    /// Current name
    #[must_use]
    pub fn name(&self) -> String {
        self.handle.name()
    }

    /// The shared half of this thread
    #[must_use]
    pub fn handle(&self) -> &Arc<ThreadHandle> {
        &self.handle
    }

    /// The virtual machine this thread runs in
    #[must_use]
    pub fn vm(&self) -> &Arc<Vm> {
        &self.vm
    }

    /// The runtime-visible `java/lang/Thread` object
    #[must_use]
    pub fn object(&self) -> Option<&InstanceRef> {
        self.object.as_ref()
    }

    /// Attach the runtime-visible `java/lang/Thread` object
    pub fn set_object(&mut self, object: InstanceRef) {
        let _ = self.handle.object.set(Arc::downgrade(&object));
        self.object = Some(object);
    }

    /// Number of frames on the call stack
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames, bottom first
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The top frame
    ///
    /// # Errors
    /// Returns an error if the call stack is empty.
    pub fn frame(&self) -> Result<&Frame> {
        self.frames
            .last()
            .ok_or_else(|| Error::Error(format!("Call stack of thread {} is empty", self.id())))
    }

    /// The top frame, mutably
    ///
    /// # Errors
    /// Returns an error if the call stack is empty.
    pub fn frame_mut(&mut self) -> Result<&mut Frame> {
        let id = self.id();
        self.frames
            .last_mut()
            .ok_or_else(|| Error::Error(format!("Call stack of thread {id} is empty")))
    }

    /// The frame below the top, i.e. the caller of the executing method
    #[must_use]
    pub fn invoker_frame(&self) -> Option<&Frame> {
        self.frames.len().checked_sub(2).and_then(|index| self.frames.get(index))
    }

    /// Push a frame, acquiring the monitor of a synchronized method.
    ///
    /// # Errors
    /// Raises `StackOverflowError` once the configured depth is exceeded, and
    /// `NullPointerException` for a synchronized instance method without receiver.
    pub fn push_frame(&mut self, mut frame: Frame) -> Result<()> {
        if self.frames.len() >= self.vm.config().max_stack_depth {
            return Err(self.vm.raise(self, "java/lang/StackOverflowError", None));
        }

        if frame.method().is_synchronized() {
            let target = self.sync_target(frame.class(), frame.method(), frame.locals().first())?;
            target.monitor().enter(self.id(), -1);
            frame.set_sync(target);
        }

        trace!(
            "[{}] push {}.{}{}",
            self.id(),
            frame.class().name(),
            frame.method().name,
            frame.method().descriptor
        );
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the top frame, releasing the monitor it acquired on push.
    ///
    /// # Errors
    /// Returns an error if the call stack is empty or the monitor is not held.
    pub fn pop_frame(&mut self) -> Result<Frame> {
        let id = self.id();
        let mut frame = self
            .frames
            .pop()
            .ok_or_else(|| Error::Error(format!("Call stack of thread {id} is empty")))?;

        trace!("[{}] pop {}.{}", id, frame.class().name(), frame.method().name);
        if let Some(target) = frame.take_sync() {
            target.monitor().exit(id)?;
        }
        Ok(frame)
    }

    fn sync_target(&self, class: &ClassRef, method: &MethodRef, receiver: Option<&Value>) -> Result<InstanceRef> {
        if method.is_static() {
            return self.vm.class_mirror(class);
        }
        match receiver.map(Value::as_reference).transpose()?.flatten() {
            Some(receiver) => Ok(receiver.clone()),
            None => Err(self.vm.raise(self, "java/lang/NullPointerException", None)),
        }
    }

    /// Run `frame` until it returns or throws past its own depth.
    ///
    /// Returns the value of the method, if it has one. A thrown exception that no frame of
    /// this execution handles comes back as [`Error::Exception`]; every frame this call
    /// pushed is gone when it returns, whatever the outcome.
    ///
    /// # Errors
    /// Returns uncaught exceptions and non-exception failures of the executed code.
    pub fn execute(&mut self, frame: Frame) -> Result<Option<Value>> {
        let base = self.frames.len();
        let floor = std::mem::replace(&mut self.floor, base + 1);
        let returned = self.returned.take();

        let result = self.push_frame(frame).and_then(|()| self.run(base));
        if result.is_err() {
            while self.frames.len() > base {
                if let Err(error) = self.pop_frame() {
                    warn!("Failed to unwind frame on thread {}: {}", self.id(), error);
                }
            }
        }

        let value = std::mem::replace(&mut self.returned, returned);
        self.floor = floor;
        result.map(|()| value)
    }

    fn run(&mut self, base: usize) -> Result<()> {
        let instructions = self.vm.instructions().clone();
        while self.frames.len() > base {
            let exception = match instructions.step(self) {
                Ok(Completion::Continue) => continue,
                Ok(Completion::Threw(exception)) | Err(Error::Exception(exception)) => exception,
                Err(error) => return Err(error),
            };
            self.dispatch_exception(base, exception)?;
        }
        Ok(())
    }

    fn dispatch_exception(&mut self, base: usize, exception: InstanceRef) -> Result<()> {
        if exception.stack_trace().is_none() {
            exception.set_vm_data(VmData::Trace(self.stack_trace()));
        }

        loop {
            if let Some(handler) = self.frame()?.find_handler(&exception)? {
                let frame = self.frame_mut()?;
                frame.pc = handler;
                frame.clear_stack();
                frame.push(Value::Reference(exception));
                return Ok(());
            }

            self.pop_frame()?;
            if self.frames.len() <= base {
                return Err(Error::Exception(exception));
            }
        }
    }

    /// Return from the top frame with `value`.
    ///
    /// The value is pushed onto the caller's operand stack, or becomes the result of
    /// [`Thread::execute`] when the returning frame is the one it started with.
    ///
    /// # Errors
    /// Returns an error if the call stack is empty.
    pub fn return_value(&mut self, value: Option<Value>) -> Result<()> {
        self.pop_frame()?;
        if self.frames.len() < self.floor {
            self.returned = value;
        } else if let Some(value) = value {
            self.frame_mut()?.push(value);
        }
        Ok(())
    }

    /// Run `method` of `class` to completion on this thread and return its value.
    ///
    /// Native methods are dispatched to their binding; `args` holds one value per
    /// parameter, receiver first.
    ///
    /// # Errors
    /// Returns uncaught exceptions and non-exception failures of the invoked code.
    pub fn invoke(&mut self, class: ClassRef, method: MethodRef, args: Vec<Value>) -> Result<Option<Value>> {
        if method.is_abstract() {
            let message = format!("{}.{}{}", class.name(), method.name, method.descriptor);
            return Err(self.vm.raise(self, "java/lang/AbstractMethodError", Some(&message)));
        }
        if !method.is_native() {
            return self.execute(Frame::with_args(class, method, args));
        }

        let natives = self.vm.natives();
        let binding = natives.lookup(class.name(), &method.name, &method.descriptor)?;
        if !method.is_synchronized() {
            return binding(self, args);
        }

        let target = self.sync_target(&class, &method, args.first())?;
        target.monitor().enter(self.id(), -1);
        let result = binding(self, args);
        target.monitor().exit(self.id())?;
        result
    }

    /// Snapshot of the call stack, innermost frame first
    #[must_use]
    pub fn stack_trace(&self) -> Vec<StackTraceElement> {
        self.frames.iter().rev().map(Frame::trace).collect()
    }

    /// Sleep for `duration`, waking early on interruption.
    ///
    /// # Errors
    /// Raises `InterruptedException` if the thread was interrupted while sleeping.
    pub fn sleep(&mut self, duration: Duration) -> Result<()> {
        let watcher = self.handle.interrupts.watch();
        let woken = watcher.sleep(duration);
        let interrupted = self.handle.interrupts.unwatch(watcher);
        if woken || interrupted {
            return Err(self.vm.raise(self, "java/lang/InterruptedException", Some("sleep interrupted")));
        }
        Ok(())
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("depth", &self.frames.len())
            .finish_non_exhaustive()
    }
}
