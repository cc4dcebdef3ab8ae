//! The virtual machine facade.
//!
//! A [`Vm`] ties together the class registry, the native bindings, the instruction set and
//! the thread executor. It is built once through [`VmBuilder`] and shared as `Arc<Vm>` by
//! every runtime thread.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jvmrt::runtime::VmBuilder;
//!
//! let vm = VmBuilder::new().class_path_dir("classes").build()?;
//! vm.exec_main("com/example/Main", &[])?;
//! for result in vm.executor().await_all() {
//!     if let Some(error) = result.error {
//!         eprintln!("thread '{}' failed: {error}", result.thread.name());
//!     }
//! }
//! # Ok::<(), jvmrt::Error>(())
//! ```

use std::{
    fmt,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use log::{debug, info};

use crate::{
    disassembler,
    runtime::{
        init_class_paths, ClassPath, ClassRef, ClassRegistry, Config, Frame, Instance, InstanceRef,
        InstructionSet, Interpreter, NativeRegistry, Thread, ThreadExecutor, ThreadHandle, Value,
        VmData,
    },
    Error, Result,
};

/// Classes loaded and initialized while the VM boots, when the class path provides them
pub const CORE_CLASSES: &[&str] = &[
    "java/lang/Object",
    "java/lang/String",
    "java/lang/Class",
    "java/lang/Thread",
    "java/lang/System",
    "java/lang/Throwable",
    "java/lang/Exception",
    "java/lang/RuntimeException",
    "java/lang/Error",
    "java/lang/Cloneable",
    "java/io/Serializable",
    "java/lang/NullPointerException",
    "java/lang/ArithmeticException",
    "java/lang/ArrayIndexOutOfBoundsException",
    "java/lang/ClassCastException",
    "java/lang/StackOverflowError",
    "java/lang/InterruptedException",
];

const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

/// A running virtual machine.
pub struct Vm {
    config: Config,
    registry: Arc<ClassRegistry>,
    natives: NativeRegistry,
    instructions: Arc<dyn InstructionSet>,
    executor: Arc<ThreadExecutor>,
    strings: DashMap<String, InstanceRef>,
    started: Instant,
}

impl Vm {
    /// Configuration the VM was built with
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The class registry
    #[must_use]
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Native method bindings
    #[must_use]
    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    /// The instruction set executing bytecode
    #[must_use]
    pub fn instructions(&self) -> &Arc<dyn InstructionSet> {
        &self.instructions
    }

    /// The executor running every thread of the program
    #[must_use]
    pub fn executor(&self) -> &Arc<ThreadExecutor> {
        &self.executor
    }

    /// Time since the VM was created
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Create the main thread, attached to a fresh `java/lang/Thread` object when the class
    /// path provides that class.
    ///
    /// # Errors
    /// Returns errors of allocating the thread object.
    pub fn main_thread(self: &Arc<Self>) -> Result<Thread> {
        let handle = ThreadHandle::new("main", true, false);
        let mut thread = Thread::new(Arc::clone(self), handle.clone());

        let class = match self.registry.resolve("java/lang/Thread") {
            Ok(class) => class,
            Err(Error::ClassNotFound(_)) => return Ok(thread),
            Err(error) => return Err(error),
        };
        let object = Instance::new(class)?;
        if object.class().resolve_field("name", "Ljava/lang/String;")?.is_some() {
            object.set_field("name", "Ljava/lang/String;", Value::Reference(self.java_string("main")?))?;
        }
        object.set_vm_data(VmData::Thread(handle));
        thread.set_object(object);
        Ok(thread)
    }

    /// Initialize `class_name` on a new main thread and start its `main(String[])` on the
    /// executor.
    ///
    /// Completion is observed through [`ThreadExecutor::results`].
    ///
    /// # Errors
    /// Returns resolution errors, an exception thrown by the static initializer of the class,
    /// and [`Error::MethodNotFound`] if there is no static `main`.
    pub fn exec_main(self: &Arc<Self>, class_name: &str, args: &[String]) -> Result<()> {
        let mut thread = self.main_thread()?;
        let class = self.initialized_class(&mut thread, class_name)?;

        let method = class
            .declared_method("main", MAIN_DESCRIPTOR)
            .filter(|method| method.is_static())
            .cloned()
            .ok_or_else(|| Error::MethodNotFound {
                class: class_name.to_string(),
                name: "main".to_string(),
                descriptor: MAIN_DESCRIPTOR.to_string(),
            })?;

        let strings = args
            .iter()
            .map(|arg| self.java_string(arg).map(Value::Reference))
            .collect::<Result<Vec<_>>>()?;
        let array = self.new_array_of("[Ljava/lang/String;", strings)?;

        info!("Executing {}.main with {} arguments", class_name, args.len());
        self.executor
            .start(thread, Frame::with_args(class, method, vec![Value::Reference(array)]))
    }

    /// Resolve `name` and make sure it is initialized, running static initializers on
    /// `thread` as needed.
    ///
    /// # Errors
    /// Returns resolution errors and failures of the static initializers.
    pub fn initialized_class(&self, thread: &mut Thread, name: &str) -> Result<ClassRef> {
        let class = self.registry.resolve(name)?;
        class.ensure_initialized(thread)?;
        Ok(class)
    }

    /// Allocate an object of class `name` without running a constructor.
    ///
    /// # Errors
    /// Returns resolution and initialization errors.
    pub fn new_object(&self, thread: &mut Thread, name: &str) -> Result<InstanceRef> {
        let class = self.initialized_class(thread, name)?;
        Instance::new(class)
    }

    /// Allocate an array of class `descriptor` (e.g. `[I`) with `length` default elements.
    ///
    /// # Errors
    /// Returns an error if `descriptor` is not an array descriptor or its component class
    /// can not be resolved.
    pub fn new_array(&self, descriptor: &str, length: usize) -> Result<InstanceRef> {
        let component = descriptor
            .strip_prefix('[')
            .ok_or_else(|| malformed_error!("'{}' is not an array descriptor", descriptor))?;
        self.new_array_of(descriptor, vec![Value::default_for_descriptor(component); length])
    }

    /// Allocate an array of class `descriptor` holding `elements`.
    ///
    /// # Errors
    /// Returns an error if the array class can not be resolved.
    pub fn new_array_of(&self, descriptor: &str, elements: Vec<Value>) -> Result<InstanceRef> {
        let class = self.registry.resolve(descriptor)?;
        Ok(Instance::new_array(class, elements))
    }

    /// Create a `java/lang/String` holding `text`.
    ///
    /// The result is not interned.
    ///
    /// # Errors
    /// Returns an error if the class path lacks `java/lang/String` or its `value` field.
    pub fn java_string(&self, text: &str) -> Result<InstanceRef> {
        let units = text.encode_utf16().map(|unit| Value::Int(i32::from(unit))).collect();
        let chars = self.new_array_of("[C", units)?;

        let string = Instance::new(self.registry.resolve("java/lang/String")?)?;
        string.set_field("value", "[C", Value::Reference(chars))?;
        Ok(string)
    }

    /// Decode a `java/lang/String` object.
    ///
    /// # Errors
    /// Returns a type mismatch for objects that are not strings.
    pub fn rust_string(&self, string: &Instance) -> Result<String> {
        string.string_value().ok_or_else(|| Error::TypeMismatch {
            expected: "java/lang/String",
            found: string.class().name().to_string(),
        })
    }

    /// The canonical `java/lang/String` for `text`
    ///
    /// # Errors
    /// Returns the errors of [`Vm::java_string`].
    pub fn intern(&self, text: &str) -> Result<InstanceRef> {
        if let Some(string) = self.strings.get(text) {
            return Ok(string.value().clone());
        }
        let string = self
            .strings
            .entry(text.to_string())
            .or_try_insert_with(|| self.java_string(text))?;
        Ok(string.value().clone())
    }

    /// The `java/lang/Class` object of `class`, created on first use
    ///
    /// # Errors
    /// Returns an error if the class path lacks `java/lang/Class`.
    pub fn class_mirror(&self, class: &ClassRef) -> Result<InstanceRef> {
        if let Some(mirror) = class.mirror() {
            return Ok(mirror.clone());
        }
        let mirror = Instance::new(self.registry.resolve("java/lang/Class")?)?;
        mirror.set_vm_data(VmData::Class(class.clone()));
        Ok(class.set_mirror(mirror))
    }

    /// Create a throwable of class `class` with `message` and the current stack of `thread`
    /// as its trace.
    ///
    /// No constructor runs; the message goes straight into `detailMessage`.
    ///
    /// # Errors
    /// Returns an error if the class can not be resolved or lacks `detailMessage`.
    pub fn throwable(&self, thread: &Thread, class: &str, message: Option<&str>) -> Result<InstanceRef> {
        let throwable = Instance::new(self.registry.resolve(class)?)?;
        if let Some(message) = message {
            throwable.set_field(
                "detailMessage",
                "Ljava/lang/String;",
                Value::Reference(self.java_string(message)?),
            )?;
        }
        throwable.set_vm_data(VmData::Trace(thread.stack_trace()));
        Ok(throwable)
    }

    /// [`Error::Exception`] carrying a new throwable, see [`Vm::throwable`].
    ///
    /// If the throwable can not be created, that failure is returned instead.
    #[must_use]
    pub fn raise(&self, thread: &Thread, class: &str, message: Option<&str>) -> Error {
        debug!(
            "Thread {} raises {}{}",
            thread.name(),
            class,
            message.map(|message| format!(": {message}")).unwrap_or_default()
        );
        match self.throwable(thread, class, message) {
            Ok(throwable) => Error::Exception(throwable),
            Err(error) => error,
        }
    }

    /// Identity hash code of `object`, stable for its lifetime
    #[must_use]
    pub fn identity_hash(&self, object: &Instance) -> i32 {
        let address = std::ptr::from_ref(object) as usize;
        #[allow(clippy::cast_possible_truncation)]
        let hash = ((address >> 3) as u32 & 0x7FFF_FFFF) as i32;
        hash
    }

    /// Listing of class `name` as found on the class path.
    ///
    /// # Errors
    /// Returns [`Error::ClassNotFound`] if no class path entry has the class.
    pub fn disassemble(&self, name: &str) -> Result<String> {
        for class_path in self.registry.class_paths() {
            if let Some(file) = class_path.search(name)? {
                return Ok(disassembler::disassemble(&file));
            }
        }
        Err(Error::ClassNotFound(name.to_string()))
    }

    /// Load the core classes and run their static initializers on a boot thread
    fn boot(self: &Arc<Self>) -> Result<()> {
        let loaded = self.registry.preload(CORE_CLASSES)?;
        debug!("Preloaded {} of {} core classes", loaded, CORE_CLASSES.len());

        let mut thread = Thread::new(Arc::clone(self), ThreadHandle::new("boot", false, true));
        for name in CORE_CLASSES {
            if let Some(class) = self.registry.get(name) {
                class.ensure_initialized(&mut thread)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("config", &self.config)
            .field("classes", &self.registry.len())
            .field("natives", &self.natives.len())
            .field("strings", &self.strings.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Vm`].
pub struct VmBuilder {
    config: Config,
    class_paths: Vec<Box<dyn ClassPath>>,
    instructions: Option<Arc<dyn InstructionSet>>,
    natives: NativeRegistry,
}

impl VmBuilder {
    /// Start with the default configuration, no class path and the default bindings
    #[must_use]
    pub fn new() -> VmBuilder {
        VmBuilder {
            config: Config::default(),
            class_paths: Vec::new(),
            instructions: None,
            natives: NativeRegistry::with_defaults(),
        }
    }

    /// Use `config`; its class path entries come before the ones added explicitly
    #[must_use]
    pub fn config(mut self, config: Config) -> VmBuilder {
        self.config = config;
        self
    }

    /// Append a class path
    #[must_use]
    pub fn class_path(mut self, class_path: impl ClassPath + 'static) -> VmBuilder {
        self.class_paths.push(Box::new(class_path));
        self
    }

    /// Append a directory class path entry to the configuration
    #[must_use]
    pub fn class_path_dir(mut self, root: impl Into<PathBuf>) -> VmBuilder {
        self.config
            .class_path
            .push(root.into().to_string_lossy().into_owned());
        self
    }

    /// Replace the bytecode interpreter
    #[must_use]
    pub fn instructions(mut self, instructions: impl InstructionSet + 'static) -> VmBuilder {
        self.instructions = Some(Arc::new(instructions));
        self
    }

    /// Bind a native method, replacing a default binding with the same key
    #[must_use]
    pub fn native<F>(self, class: &str, name: &str, descriptor: &str, method: F) -> VmBuilder
    where
        F: Fn(&mut Thread, Vec<Value>) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.natives.register(class, name, descriptor, method);
        self
    }

    /// Build and boot the VM.
    ///
    /// # Errors
    /// Returns class path errors, and failures of loading or initializing the core classes.
    pub fn build(self) -> Result<Arc<Vm>> {
        let mut class_paths = init_class_paths(&self.config.class_path)?;
        class_paths.extend(self.class_paths);
        if class_paths.is_empty() {
            return Err(Error::Error("No class path configured".to_string()));
        }

        let vm = Arc::new(Vm {
            registry: ClassRegistry::new(class_paths),
            natives: self.natives,
            instructions: self
                .instructions
                .unwrap_or_else(|| Arc::new(Interpreter::new())),
            executor: ThreadExecutor::new(),
            strings: DashMap::new(),
            started: Instant::now(),
            config: self.config,
        });

        vm.boot()?;
        info!(
            "VM initialized in {:?} with {} classes loaded",
            vm.uptime(),
            vm.registry.len()
        );
        Ok(vm)
    }
}

impl Default for VmBuilder {
    fn default() -> Self {
        VmBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classfile::{ClassWriter, MethodAccessFlags as M},
        disassembler::opcodes::*,
        runtime::{ClassState, MemoryClassPath},
        test::{add_class, body, build_vm, core_library},
    };

    #[test]
    fn boot_initializes_core_classes() {
        let vm = build_vm(|_| {});
        for name in ["java/lang/Object", "java/lang/String", "java/lang/Thread"] {
            let class = vm.registry().get(name).unwrap();
            assert_eq!(class.state(), ClassState::Initialized, "{name}");
        }
        assert!(vm.registry().len() >= CORE_CLASSES.len());
    }

    #[test]
    fn empty_class_path_is_rejected() {
        assert!(VmBuilder::new().build().is_err());
    }

    #[test]
    fn missing_core_classes_are_tolerated() {
        let path = MemoryClassPath::new();
        let mut object = ClassWriter::new("java/lang/Object", None);
        object
            .method(M::PUBLIC, "<init>", "()V", body(|code| {
                code.op(RETURN);
            }))
            .unwrap();
        add_class(&path, &object);

        let vm = VmBuilder::new().class_path(path).build().unwrap();
        assert_eq!(vm.registry().len(), 1);

        // without java/lang/Thread the main thread has no runtime-visible object
        let thread = vm.main_thread().unwrap();
        assert!(thread.object().is_none());
        assert!(vm.java_string("text").is_err());
    }

    #[test]
    fn strings() {
        let vm = build_vm(|_| {});
        let string = vm.java_string("héllo wörld").unwrap();
        assert_eq!(vm.rust_string(&string).unwrap(), "héllo wörld");

        let first = vm.intern("same").unwrap();
        let second = vm.intern("same").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &vm.java_string("same").unwrap()));

        let object = Instance::new(vm.registry().resolve("java/lang/Object").unwrap()).unwrap();
        assert!(matches!(vm.rust_string(&object), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn arrays() {
        let vm = build_vm(|_| {});
        let ints = vm.new_array("[I", 3).unwrap();
        assert_eq!(ints.len(), 3);
        assert_eq!(ints.get(2).unwrap(), Value::Int(0));

        let strings = vm.new_array("[Ljava/lang/String;", 2).unwrap();
        assert_eq!(strings.get(0).unwrap(), Value::Null);
        assert!(vm.new_array("I", 1).is_err());
    }

    #[test]
    fn mirrors_are_unique() {
        let vm = build_vm(|_| {});
        let class = vm.registry().resolve("java/lang/String").unwrap();
        let mirror = vm.class_mirror(&class).unwrap();
        assert!(Arc::ptr_eq(&mirror, &vm.class_mirror(&class).unwrap()));
        assert!(Arc::ptr_eq(mirror.as_class().unwrap(), &class));
    }

    #[test]
    fn raised_throwables_carry_message_and_trace() {
        let vm = build_vm(|_| {});
        let thread = vm.main_thread().unwrap();
        let Error::Exception(throwable) =
            vm.raise(&thread, "java/lang/ArithmeticException", Some("/ by zero"))
        else {
            panic!("expected an exception");
        };
        assert_eq!(throwable.describe(), "java.lang.ArithmeticException: / by zero");
        assert_eq!(throwable.stack_trace().map(<[_]>::len), Some(0));

        assert!(matches!(
            vm.raise(&thread, "java/lang/NoSuchThing", None),
            Error::ClassNotFound(_)
        ));
    }

    fn hello(path: &MemoryClassPath, main: bool) {
        let mut writer = ClassWriter::new("demo/Hello", Some("java/lang/Object"));
        writer
            .method(M::PUBLIC | M::STATIC, "count", "([Ljava/lang/String;)I", body(|code| {
                code.op(ALOAD_0).op(ARRAYLENGTH).op(IRETURN);
            }))
            .unwrap();
        if main {
            writer
                .method(M::PUBLIC | M::STATIC, "main", "([Ljava/lang/String;)V", body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESTATIC, "demo/Hello", "count", "([Ljava/lang/String;)I")
                        .op(POP)
                        .op(RETURN);
                }))
                .unwrap();
        }
        add_class(path, &writer);
    }

    #[test]
    fn exec_main_runs_on_the_executor() {
        let vm = build_vm(|path| hello(path, true));
        vm.exec_main("demo/Hello", &["a".to_string(), "b".to_string()])
            .unwrap();

        let results = vm.executor().await_all();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].thread.name(), "main");
        assert!(results[0].thread.handle().is_main());
        assert!(results[0].error.is_none());
    }

    #[test]
    fn exec_main_needs_main() {
        let vm = build_vm(|path| hello(path, false));
        assert!(matches!(
            vm.exec_main("demo/Hello", &[]),
            Err(Error::MethodNotFound { .. })
        ));
        assert!(matches!(
            vm.exec_main("demo/Missing", &[]),
            Err(Error::ClassNotFound(_))
        ));
        assert!(vm.executor().await_all().is_empty());
    }

    #[test]
    fn disassemble_from_the_class_path() {
        let path = core_library();
        hello(&path, true);
        let vm = VmBuilder::new().class_path(path).build().unwrap();

        let listing = vm.disassemble("demo/Hello").unwrap();
        assert!(listing.contains("arraylength"));
        assert!(matches!(vm.disassemble("demo/Missing"), Err(Error::ClassNotFound(_))));
    }
}
