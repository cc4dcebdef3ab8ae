//! Bytecode decoding.
//!
//! Offsets are relative to the start of the parser's data, which must be the start of the
//! method body: `tableswitch` and `lookupswitch` pad their operands to a four byte boundary
//! measured from there.
//!
//! # Example: Decoding a Single Instruction
//!
//! ```rust
//! use jvmrt::{Parser, disassembler::decode_instruction};
//! let code = [0x10, 0x2A, 0xAC]; // bipush 42, ireturn
//! let mut parser = Parser::new(&code);
//! let instr = decode_instruction(&mut parser)?;
//! assert_eq!(instr.mnemonic, "bipush");
//! assert_eq!(instr.size, 2);
//! # Ok::<(), jvmrt::Error>(())
//! ```
//!
//! # Example: Decoding a Stream of Instructions
//!
//! ```rust
//! use jvmrt::{Parser, disassembler::decode_stream};
//! let code = [0x00, 0xB1]; // nop, return
//! let mut parser = Parser::new(&code);
//! let instrs = decode_stream(&mut parser)?;
//! assert_eq!(instrs.len(), 2);
//! # Ok::<(), jvmrt::Error>(())
//! ```

use crate::{
    disassembler::{instructions::opcodes, ArrayType, Instruction, Operand, OperandType, INSTRUCTIONS},
    file::parser::Parser,
    Result,
};

/// Decodes instructions from the current parser position until the data is exhausted.
///
/// # Errors
///
/// Returns an error if the stream contains an unassigned opcode, a truncated operand or a
/// branch target outside of the data.
pub fn decode_stream(parser: &mut Parser) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(parser)?);
    }

    Ok(instructions)
}

/// Decodes the instruction at the current parser position and advances past it.
///
/// Branch operands are returned as found in the bytecode, relative to the instruction start;
/// [`Instruction::branch_targets`] carries them resolved to absolute offsets, with the
/// default target first for switches.
///
/// # Errors
///
/// Returns an error if:
/// - The opcode is unassigned, or `wide` prefixes an opcode it cannot modify
/// - Operand data is truncated
/// - A switch has `high < low` or a branch target lies outside of the data
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let offset = parser.pos();
    let mut opcode = parser.read_be::<u8>()?;
    let mut wide = false;

    if opcode == opcodes::WIDE {
        opcode = parser.read_be::<u8>()?;
        wide = true;
        if !is_widenable(opcode) {
            return Err(malformed_error!(
                "Opcode {:#04x} at {} cannot follow wide",
                opcode,
                offset
            ));
        }
    }

    let info = &INSTRUCTIONS[opcode as usize];
    if info.instr.is_empty() {
        return Err(malformed_error!("Invalid opcode {:#04x} at {}", opcode, offset));
    }

    let operand = match info.op_type {
        OperandType::None => Operand::None,
        OperandType::Int8 => Operand::Immediate(i32::from(parser.read_be::<i8>()?)),
        OperandType::Int16 => Operand::Immediate(i32::from(parser.read_be::<i16>()?)),
        OperandType::Local if wide => Operand::Local(parser.read_be::<u16>()?),
        OperandType::Local => Operand::Local(u16::from(parser.read_be::<u8>()?)),
        OperandType::ConstantPool8 => Operand::ConstantPool(u16::from(parser.read_be::<u8>()?)),
        OperandType::ConstantPool => Operand::ConstantPool(parser.read_be::<u16>()?),
        OperandType::Iinc if wide => Operand::Iinc {
            index: parser.read_be::<u16>()?,
            delta: parser.read_be::<i16>()?,
        },
        OperandType::Iinc => Operand::Iinc {
            index: u16::from(parser.read_be::<u8>()?),
            delta: i16::from(parser.read_be::<i8>()?),
        },
        OperandType::Branch16 => Operand::Branch(i32::from(parser.read_be::<i16>()?)),
        OperandType::Branch32 => Operand::Branch(parser.read_be::<i32>()?),
        OperandType::ArrayType => {
            let code = parser.read_be::<u8>()?;
            match ArrayType::from_repr(code) {
                Some(kind) => Operand::ArrayType(kind),
                None => return Err(malformed_error!("Invalid newarray type {} at {}", code, offset)),
            }
        }
        OperandType::InvokeInterface => {
            let index = parser.read_be::<u16>()?;
            let count = parser.read_be::<u8>()?;
            parser.advance_by(1)?;
            Operand::InvokeInterface { index, count }
        }
        OperandType::InvokeDynamic => {
            let index = parser.read_be::<u16>()?;
            parser.advance_by(2)?;
            Operand::ConstantPool(index)
        }
        OperandType::MultiANewArray => Operand::MultiANewArray {
            index: parser.read_be::<u16>()?,
            dimensions: parser.read_be::<u8>()?,
        },
        OperandType::TableSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let low = parser.read_be::<i32>()?;
            let high = parser.read_be::<i32>()?;
            if high < low {
                return Err(malformed_error!(
                    "tableswitch at {} has high {} below low {}",
                    offset,
                    high,
                    low
                ));
            }

            let count = (i64::from(high) - i64::from(low) + 1) as usize;
            if count > parser.remaining() / 4 {
                return Err(crate::Error::OutOfBounds);
            }

            let mut offsets = Vec::with_capacity(count);
            for _ in 0..count {
                offsets.push(parser.read_be::<i32>()?);
            }
            Operand::TableSwitch {
                default,
                low,
                high,
                offsets,
            }
        }
        OperandType::LookupSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let count = parser.read_be::<i32>()?;
            let count = usize::try_from(count)
                .map_err(|_| malformed_error!("lookupswitch at {} has {} pairs", offset, count))?;
            if count > parser.remaining() / 8 {
                return Err(crate::Error::OutOfBounds);
            }

            let mut pairs = Vec::with_capacity(count);
            for _ in 0..count {
                pairs.push((parser.read_be::<i32>()?, parser.read_be::<i32>()?));
            }
            Operand::LookupSwitch { default, pairs }
        }
        OperandType::Wide => return Err(malformed_error!("Nested wide prefix at {}", offset)),
    };

    let mut instruction = Instruction {
        offset,
        opcode,
        wide,
        size: parser.pos() - offset,
        mnemonic: info.instr,
        flow_type: info.flow,
        operand,
        branch_targets: Vec::new(),
    };

    let relative: Vec<i32> = match &instruction.operand {
        Operand::Branch(delta) => vec![*delta],
        Operand::TableSwitch {
            default, offsets, ..
        } => std::iter::once(*default).chain(offsets.iter().copied()).collect(),
        Operand::LookupSwitch { default, pairs } => std::iter::once(*default)
            .chain(pairs.iter().map(|(_, delta)| *delta))
            .collect(),
        _ => Vec::new(),
    };
    for delta in relative {
        instruction
            .branch_targets
            .push(branch_target(offset, delta, parser.len())?);
    }

    Ok(instruction)
}

fn is_widenable(opcode: u8) -> bool {
    matches!(
        opcode,
        opcodes::ILOAD..=opcodes::ALOAD | opcodes::ISTORE..=opcodes::ASTORE | opcodes::RET | opcodes::IINC
    )
}

fn branch_target(offset: usize, delta: i32, len: usize) -> Result<usize> {
    let target = offset as i64 + i64::from(delta);
    match usize::try_from(target) {
        Ok(target) if target < len => Ok(target),
        _ => Err(malformed_error!(
            "Branch at {} targets {} outside of the method body",
            offset,
            target
        )),
    }
}
