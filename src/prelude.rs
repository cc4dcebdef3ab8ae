//! # jvmrt Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the jvmrt
//! library. Import this module to get quick access to the essential types for loading and
//! running class files.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jvmrt operations
pub use crate::Error;

/// The result type used throughout jvmrt
pub use crate::Result;

/// Low-level file access
pub use crate::{File, Parser};

// ================================================================================================
// Class Files
// ================================================================================================

/// Decoded class files and their parts
pub use crate::classfile::{
    ClassAccessFlags, ClassFile, Code, ConstantPool, FieldAccessFlags, FieldType, MethodAccessFlags,
    MethodDescriptor,
};

/// Class file assembly
pub use crate::classfile::{Bytecode, ClassWriter};

// ================================================================================================
// Disassembler
// ================================================================================================

/// Instruction decoding and listings
pub use crate::disassembler::{decode_instruction, decode_stream, disassemble, FlowType, Instruction, Operand};

// ================================================================================================
// Runtime
// ================================================================================================

/// Virtual machine entry points
pub use crate::runtime::{Config, Vm, VmBuilder};

/// Class model
pub use crate::runtime::{ClassRef, ClassRegistry, ClassState, FieldRef, MethodRef};

/// Class paths
pub use crate::runtime::{ClassPath, DirectoryClassPath, MemoryClassPath};

/// Objects and values
pub use crate::runtime::{Instance, InstanceRef, Value};

/// Threads and synchronization
pub use crate::runtime::{Monitor, Thread, ThreadExecutor, ThreadHandle, ThreadId, ThreadResult};

/// Native method bindings
pub use crate::runtime::{NativeMethod, NativeRegistry};
