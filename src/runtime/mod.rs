//! The virtual machine runtime.
//!
//! # Architecture
//!
//! - [`ClassRegistry`] loads class files from the configured [`ClassPath`]s and links them
//!   into [`Class`] descriptors. Field and method resolution, the initialization state
//!   machine and instance field slot numbering live on [`Class`].
//! - [`Thread`] owns a call stack of [`Frame`]s and drives the fetch-execute-unwind loop,
//!   delegating single instructions to an [`InstructionSet`] (the [`Interpreter`] by default).
//! - [`Monitor`] is the reentrant intrinsic lock with a wait set carried by every
//!   [`Instance`]; [`Interrupts`] wakes blocking operations cooperatively.
//! - [`ThreadExecutor`] runs threads concurrently and reports their results until the last
//!   non-daemon thread has finished.
//! - [`Vm`] wires everything together and is assembled through [`VmBuilder`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use jvmrt::runtime::{Config, VmBuilder};
//!
//! let config = Config::from_file("jvmrt.json")?;
//! let vm = VmBuilder::new().config(config).build()?;
//! println!("{} classes loaded", vm.registry().len());
//! # Ok::<(), jvmrt::Error>(())
//! ```

mod class;
mod classpath;
mod config;
mod executor;
mod frame;
mod instance;
mod interpreter;
mod interrupt;
mod monitor;
pub mod native;
mod registry;
mod thread;
mod value;
mod vm;

pub use class::{
    class_name_of, Class, ClassKind, ClassRef, ClassState, Field, FieldRef, Method, MethodRef,
    SpecialClassId,
};
pub use classpath::{init_class_paths, ClassPath, DirectoryClassPath, MemoryClassPath};
pub use config::{Config, DEFAULT_MAX_STACK_DEPTH};
pub use executor::{ThreadExecutor, ThreadResult};
pub use frame::Frame;
pub use instance::{Instance, InstanceRef, VmData};
pub use interpreter::{Completion, InstructionSet, Interpreter};
pub use interrupt::{Interrupts, Watcher};
pub use monitor::Monitor;
pub use native::{NativeMethod, NativeRegistry};
pub use registry::ClassRegistry;
pub use thread::{StackTraceElement, Thread, ThreadHandle, ThreadId};
pub use value::Value;
pub use vm::{Vm, VmBuilder, CORE_CLASSES};
