// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a class file into memory

//! # jvmrt
//!
//! A multi-threaded runtime for JVM class files, written in pure Rust. `jvmrt` decodes class
//! files, links them into a class registry, and interprets their bytecode on real OS threads
//! with Java's monitor, interruption and daemon semantics.
//!
//! ## Features
//!
//! - **📦 Class path loading** - Directory and in-memory class paths, memory-mapped class files
//! - **🔍 Class file decoding** - Constant pool, members, code and exception tables, line numbers
//! - **⚡ Bytecode interpreter** - The complete non-`invokedynamic` instruction set
//! - **🧵 Real threads** - Reentrant monitors, `wait`/`notify`, interruption, daemon-aware shutdown
//! - **🔧 Native bindings** - The `java/lang` natives a minimal class library needs, extensible
//! - **🛡️ Memory safe** - Built in Rust with errors instead of panics for malformed input
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jvmrt::prelude::*;
//!
//! let vm = VmBuilder::new().class_path_dir("classes").build()?;
//! vm.exec_main("com/example/Main", &["hello".to_string()])?;
//!
//! for result in vm.executor().await_all() {
//!     if let Some(error) = result.error {
//!         eprintln!("thread '{}' failed: {error}", result.thread.name());
//!     }
//! }
//! # Ok::<(), jvmrt::Error>(())
//! ```
//!
//! ### Disassembly Example
//!
//! ```rust,no_run
//! use jvmrt::{classfile::ClassFile, disassembler::disassemble};
//! use std::path::Path;
//!
//! let class = ClassFile::from_file(Path::new("classes/com/example/Main.class"))?;
//! println!("{}", disassemble(&class));
//! # Ok::<(), jvmrt::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`classfile`] - Class file decoding and encoding
//! - [`disassembler`] - Bytecode instruction decoding and listings
//! - [`runtime`] - Class registry, threads, monitors, interpreter and the [`runtime::Vm`]
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). A Java exception that escapes the
//! executed code is reported as [`Error::Exception`] carrying the thrown object:
//!
//! ```rust,no_run
//! use jvmrt::{runtime::VmBuilder, Error};
//!
//! let vm = VmBuilder::new().class_path_dir("classes").build()?;
//! match vm.exec_main("com/example/Main", &[]) {
//!     Ok(()) => println!("started"),
//!     Err(Error::ClassNotFound(name)) => println!("class not found: {name}"),
//!     Err(Error::Exception(throwable)) => println!("initializer threw {}", throwable.describe()),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! # Ok::<(), jvmrt::Error>(())
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use jvmrt::prelude::*;
///
/// let vm = VmBuilder::new().class_path_dir("classes").build()?;
/// println!("{} classes loaded", vm.registry().len());
/// # Ok::<(), jvmrt::Error>(())
/// ```
pub mod prelude;

/// Class file structures, decoding and encoding
///
/// - [`classfile::ClassFile`] - A decoded class file
/// - [`classfile::ConstantPool`] - Typed access to the constant pool
/// - [`classfile::ClassWriter`] - Assemble class files, e.g. for tests and code generation
pub mod classfile;

/// Bytecode instructions and disassembler
///
/// # Key Types
///
/// - [`disassembler::Instruction`] - A decoded instruction
/// - [`disassembler::Operand`] - Instruction operands (immediates, pool indices, targets)
/// - [`disassembler::FlowType`] - How instructions affect control flow
///
/// # Examples
///
/// ```rust,no_run
/// use jvmrt::{disassembler::decode_instruction, Parser};
///
/// let bytecode = &[0x04, 0xAC]; // iconst_1, ireturn
/// let mut parser = Parser::new(bytecode);
/// let instruction = decode_instruction(&mut parser)?;
///
/// println!("Mnemonic: {}", instruction.mnemonic);
/// println!("Flow type: {:?}", instruction.flow_type);
/// # Ok::<(), jvmrt::Error>(())
/// ```
pub mod disassembler;

/// The virtual machine runtime
pub mod runtime;

/// `jvmrt` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `jvmrt` Error type
///
/// The main error type for all operations in this crate, covering class file decoding,
/// resolution, execution failures and Java exceptions escaping the executed code.
pub use error::Error;

pub use file::{parser::Parser, File};
