//! JVM bytecode disassembler and instruction decoding engine.
//!
//! The decoder is table driven: [`INSTRUCTIONS`] describes the operand layout and control flow
//! effect of every opcode, [`decode_instruction`] turns raw bytes into [`Instruction`]s. The
//! interpreter decodes each instruction it executes through the same path, and
//! [`disassemble`] renders whole classes for inspection.
//!
//! # Key Types
//! - [`Instruction`] - A decoded instruction with resolved branch targets
//! - [`Operand`] - Instruction operands (immediates, locals, pool indices, switch tables)
//! - [`FlowType`] - How instructions affect control flow
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a whole method body
//! - [`disassemble`] - Render a class file listing
//!
//! # Example
//! ```rust
//! use jvmrt::disassembler::{decode_instruction, opcodes};
//! use jvmrt::Parser;
//! let bytecode = &[opcodes::ICONST_1, opcodes::IRETURN];
//! let mut parser = Parser::new(bytecode);
//! let instruction = decode_instruction(&mut parser)?;
//! assert_eq!(instruction.mnemonic, "iconst_1");
//! # Ok::<(), jvmrt::Error>(())
//! ```

mod decoder;
mod instruction;
mod instructions;
mod listing;

pub use decoder::{decode_instruction, decode_stream};
pub use instruction::{ArrayType, FlowType, Instruction, Operand, OperandType};
pub use instructions::{opcodes, OpcodeInfo, INSTRUCTIONS};
pub use listing::disassemble;
