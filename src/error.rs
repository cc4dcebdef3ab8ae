use thiserror::Error;

use crate::runtime::{InstanceRef, ThreadId};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into a few groups that callers usually treat differently:
///
/// ## Decoding Errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the input
/// - [`Error::NotSupported`] - Unsupported input or class path entry
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O and Configuration Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Config`] - A configuration document could not be read
///
/// ## Linking Errors
/// - [`Error::ClassNotFound`], [`Error::FieldNotFound`], [`Error::MethodNotFound`] - resolution failed
/// - [`Error::InitializationFailed`] - the class is in its terminal failed state
///
/// ## Execution Errors
/// - [`Error::Exception`] - a thrown Java object travelling up the call stack
/// - [`Error::IllegalMonitorState`] - a monitor was released by a thread not holding it
/// - [`Error::NativeMethodNotFound`] - a native method has no registered binding
/// - [`Error::TypeMismatch`] - an operand of the wrong kind (unverified bytecode)
/// - [`Error::Unsupported`] - bytecode the interpreter does not execute
///
/// # Examples
///
/// ```rust,no_run
/// use jvmrt::{Error, runtime::VmBuilder};
///
/// let vm = VmBuilder::new().class_path_dir("classes").build()?;
/// match vm.exec_main("com/example/Main", &[]) {
///     Ok(()) => {}
///     Err(Error::ClassNotFound(name)) => eprintln!("no such class: {name}"),
///     Err(e) => eprintln!("failed to start: {e}"),
/// }
/// # Ok::<(), jvmrt::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the input.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This input is not supported.
    #[error("This input is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The runtime configuration could not be deserialized.
    #[error("Invalid configuration - {0}")]
    Config(#[from] serde_json::Error),

    /// No class path entry provides a class with this name.
    #[error("Class not found - {0}")]
    ClassNotFound(String),

    /// Field resolution walked the whole hierarchy without a match.
    #[error("Field not found - {class}.{name}:{descriptor}")]
    FieldNotFound {
        /// Class the lookup started from
        class: String,
        /// Name of the field
        name: String,
        /// Field descriptor
        descriptor: String,
    },

    /// Method resolution walked the whole hierarchy without a match.
    #[error("Method not found - {class}.{name}{descriptor}")]
    MethodNotFound {
        /// Class the lookup started from
        class: String,
        /// Name of the method
        name: String,
        /// Method descriptor
        descriptor: String,
    },

    /// The class reached `FailedInitialization` and can not be used.
    ///
    /// This state is terminal, the static initializer is never retried.
    #[error("Initialization of class {0} has failed")]
    InitializationFailed(String),

    /// A Java exception object that has not been handled yet.
    ///
    /// Raised by instruction semantics and native bindings, caught by the handler search of
    /// the thread driver. When it leaves the outermost frame it becomes the thread's
    /// uncaught exception.
    #[error("{}", .0.describe())]
    Exception(InstanceRef),

    /// A monitor was released or waited on by a thread that does not own it.
    #[error("Thread {thread} does not own the monitor")]
    IllegalMonitorState {
        /// The offending thread
        thread: ThreadId,
    },

    /// A method declared `native` has no binding.
    #[error("Native method not found - {class}.{name}{descriptor}")]
    NativeMethodNotFound {
        /// Declaring class
        class: String,
        /// Name of the method
        name: String,
        /// Method descriptor
        descriptor: String,
    },

    /// An operand or local did not hold the kind of value the instruction requires.
    ///
    /// Only reachable with bytecode that would fail verification.
    #[error("Type mismatch - expected {expected}, found {found}")]
    TypeMismatch {
        /// The expected value kind
        expected: &'static str,
        /// Rendering of the value that was found
        found: String,
    },

    /// Bytecode or a feature the runtime does not execute.
    #[error("Unsupported - {0}")]
    Unsupported(String),

    /// The operating system refused to spawn a thread.
    #[error("Failed to spawn thread - {0}")]
    ThreadSpawn(std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,
}

impl Error {
    /// Returns the thrown Java object if this error carries one.
    #[must_use]
    pub fn exception(&self) -> Option<&InstanceRef> {
        match self {
            Error::Exception(instance) => Some(instance),
            _ => None,
        }
    }
}
