//! Bytecode interpreter.
//!
//! The [`Interpreter`] executes exactly one instruction of the top frame per
//! [`InstructionSet::step`]. Calls push a new frame and returns pop one, so a step never
//! recurses into the execution loop; the thread driver keeps looping until the stack shrinks
//! back to where it started. Exceptions are reported as [`Completion::Threw`] (for `athrow`)
//! or as [`Error::Exception`] from any helper raising a VM exception; handler lookup and
//! unwinding are the driver's business.

mod handlers;

use crate::{
    disassembler::{decode_instruction, Instruction, Operand},
    file::parser::Parser,
    runtime::{native::monitor_result, InstanceRef, Thread, Value},
    Error, Result,
};

/// Outcome of a single step.
#[derive(Debug)]
pub enum Completion {
    /// Keep going with whatever frame is on top now
    Continue,
    /// The instruction threw this object
    Threw(InstanceRef),
}

/// Executes instructions on behalf of a thread.
pub trait InstructionSet: Send + Sync {
    /// Execute one instruction of the top frame of `thread`.
    ///
    /// # Errors
    /// [`Error::Exception`] carries a thrown Java object; every other error is a failure the
    /// thread can not recover from.
    fn step(&self, thread: &mut Thread) -> Result<Completion>;
}

/// The bytecode interpreter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Interpreter {
    /// Create an interpreter
    #[must_use]
    pub fn new() -> Self {
        Interpreter
    }
}

impl InstructionSet for Interpreter {
    fn step(&self, thread: &mut Thread) -> Result<Completion> {
        let (method, pc) = {
            let frame = thread.frame()?;
            (frame.method().clone(), frame.pc)
        };

        let code = method.code()?;
        let mut parser = Parser::new(&code.code);
        parser.seek(pc)?;
        let instruction = decode_instruction(&mut parser)?;

        let frame = thread.frame_mut()?;
        frame.instr_pc = pc;
        frame.pc = instruction.next_offset();

        Self::execute(thread, &instruction)
    }
}

impl Interpreter {
    /// Execute one decoded instruction; `pc` already points past it.
    #[allow(clippy::too_many_lines)]
    fn execute(thread: &mut Thread, instruction: &Instruction) -> Result<Completion> {
        match instruction.opcode {
            // ================================================================
            // Constants (0x00 - 0x14)
            // ================================================================
            0x00 => Ok(Completion::Continue), // nop
            0x01 => Self::push(thread, Value::Null), // aconst_null
            0x02..=0x08 => Self::push(thread, Value::Int(i32::from(instruction.opcode) - 0x03)), // iconst_<i>
            0x09 | 0x0A => Self::push(thread, Value::Long(i64::from(instruction.opcode - 0x09))), // lconst_<l>
            0x0B..=0x0D => Self::push(thread, Value::Float(f32::from(instruction.opcode - 0x0B))), // fconst_<f>
            0x0E | 0x0F => Self::push(thread, Value::Double(f64::from(instruction.opcode - 0x0E))), // dconst_<d>
            0x10 | 0x11 => {
                // bipush, sipush
                match instruction.operand {
                    Operand::Immediate(value) => Self::push(thread, Value::Int(value)),
                    _ => Err(Self::invalid_operand(instruction, "immediate")),
                }
            }
            0x12..=0x14 => Self::load_constant(thread, Self::pool_index(instruction)?), // ldc, ldc_w, ldc2_w

            // ================================================================
            // Loads (0x15 - 0x35)
            // ================================================================
            0x15..=0x19 => Self::load_local(thread, Self::local_index(instruction)?), // <t>load
            0x1A..=0x2D => Self::load_local(thread, usize::from((instruction.opcode - 0x1A) % 4)), // <t>load_<n>
            0x2E..=0x35 => Self::load_element(thread, instruction.opcode), // <t>aload

            // ================================================================
            // Stores (0x36 - 0x56)
            // ================================================================
            0x36..=0x3A => Self::store_local(thread, Self::local_index(instruction)?), // <t>store
            0x3B..=0x4E => Self::store_local(thread, usize::from((instruction.opcode - 0x3B) % 4)), // <t>store_<n>
            0x4F..=0x56 => Self::store_element(thread, instruction.opcode), // <t>astore

            // ================================================================
            // Operand stack (0x57 - 0x5F)
            // ================================================================
            0x57 => {
                // pop
                thread.frame_mut()?.pop()?;
                Ok(Completion::Continue)
            }
            0x58..=0x5F => Self::stack_op(thread, instruction.opcode), // pop2, dup*, swap

            // ================================================================
            // Arithmetic (0x60 - 0x84)
            // ================================================================
            0x60 => Self::int_op(thread, |a, b| Some(a.wrapping_add(b))), // iadd
            0x61 => Self::long_op(thread, |a, b| Some(a.wrapping_add(b))), // ladd
            0x62 => Self::float_op(thread, |a, b| a + b), // fadd
            0x63 => Self::double_op(thread, |a, b| a + b), // dadd
            0x64 => Self::int_op(thread, |a, b| Some(a.wrapping_sub(b))), // isub
            0x65 => Self::long_op(thread, |a, b| Some(a.wrapping_sub(b))), // lsub
            0x66 => Self::float_op(thread, |a, b| a - b), // fsub
            0x67 => Self::double_op(thread, |a, b| a - b), // dsub
            0x68 => Self::int_op(thread, |a, b| Some(a.wrapping_mul(b))), // imul
            0x69 => Self::long_op(thread, |a, b| Some(a.wrapping_mul(b))), // lmul
            0x6A => Self::float_op(thread, |a, b| a * b), // fmul
            0x6B => Self::double_op(thread, |a, b| a * b), // dmul
            0x6C => Self::int_op(thread, |a, b| (b != 0).then(|| a.wrapping_div(b))), // idiv
            0x6D => Self::long_op(thread, |a, b| (b != 0).then(|| a.wrapping_div(b))), // ldiv
            0x6E => Self::float_op(thread, |a, b| a / b), // fdiv
            0x6F => Self::double_op(thread, |a, b| a / b), // ddiv
            0x70 => Self::int_op(thread, |a, b| (b != 0).then(|| a.wrapping_rem(b))), // irem
            0x71 => Self::long_op(thread, |a, b| (b != 0).then(|| a.wrapping_rem(b))), // lrem
            0x72 => Self::float_op(thread, |a, b| a % b), // frem
            0x73 => Self::double_op(thread, |a, b| a % b), // drem
            0x74 => {
                // ineg
                let frame = thread.frame_mut()?;
                let value = frame.pop_int()?;
                frame.push(Value::Int(value.wrapping_neg()));
                Ok(Completion::Continue)
            }
            0x75 => {
                // lneg
                let frame = thread.frame_mut()?;
                let value = frame.pop_long()?;
                frame.push(Value::Long(value.wrapping_neg()));
                Ok(Completion::Continue)
            }
            0x76 => {
                // fneg
                let frame = thread.frame_mut()?;
                let value = frame.pop_float()?;
                frame.push(Value::Float(-value));
                Ok(Completion::Continue)
            }
            0x77 => {
                // dneg
                let frame = thread.frame_mut()?;
                let value = frame.pop_double()?;
                frame.push(Value::Double(-value));
                Ok(Completion::Continue)
            }
            0x78 => Self::int_op(thread, |a, b| Some(a.wrapping_shl(b as u32))), // ishl
            0x79 => Self::long_shift(thread, |a, b| a.wrapping_shl(b)), // lshl
            0x7A => Self::int_op(thread, |a, b| Some(a.wrapping_shr(b as u32))), // ishr
            0x7B => Self::long_shift(thread, |a, b| a.wrapping_shr(b)), // lshr
            0x7C => Self::int_op(thread, |a, b| Some((a as u32).wrapping_shr(b as u32) as i32)), // iushr
            0x7D => Self::long_shift(thread, |a, b| (a as u64).wrapping_shr(b) as i64), // lushr
            0x7E => Self::int_op(thread, |a, b| Some(a & b)), // iand
            0x7F => Self::long_op(thread, |a, b| Some(a & b)), // land
            0x80 => Self::int_op(thread, |a, b| Some(a | b)), // ior
            0x81 => Self::long_op(thread, |a, b| Some(a | b)), // lor
            0x82 => Self::int_op(thread, |a, b| Some(a ^ b)), // ixor
            0x83 => Self::long_op(thread, |a, b| Some(a ^ b)), // lxor
            0x84 => {
                // iinc
                let Operand::Iinc { index, delta } = instruction.operand else {
                    return Err(Self::invalid_operand(instruction, "iinc"));
                };
                let frame = thread.frame_mut()?;
                let value = frame.local(usize::from(index))?.as_int()?;
                frame.set_local(usize::from(index), Value::Int(value.wrapping_add(i32::from(delta))))?;
                Ok(Completion::Continue)
            }

            // ================================================================
            // Conversions (0x85 - 0x93)
            // ================================================================
            0x85..=0x93 => Self::convert(thread, instruction.opcode),

            // ================================================================
            // Comparisons and branches (0x94 - 0xA9, 0xC6 - 0xC9)
            // ================================================================
            0x94..=0x98 => Self::compare(thread, instruction.opcode), // lcmp, fcmp<op>, dcmp<op>
            0x99..=0x9E => {
                // if<cond>
                let value = thread.frame_mut()?.pop_int()?;
                Self::branch_if(thread, instruction, Self::condition(instruction.opcode - 0x99, value.cmp(&0)))
            }
            0x9F..=0xA4 => {
                // if_icmp<cond>
                let frame = thread.frame_mut()?;
                let right = frame.pop_int()?;
                let left = frame.pop_int()?;
                Self::branch_if(thread, instruction, Self::condition(instruction.opcode - 0x9F, left.cmp(&right)))
            }
            0xA5 | 0xA6 => {
                // if_acmpeq, if_acmpne
                let frame = thread.frame_mut()?;
                let right = frame.pop()?;
                let left = frame.pop()?;
                let same = left == right;
                Self::branch_if(thread, instruction, same == (instruction.opcode == 0xA5))
            }
            0xA7 | 0xC8 => Self::branch_if(thread, instruction, true), // goto, goto_w
            0xA8 | 0xC9 => {
                // jsr, jsr_w
                let frame = thread.frame_mut()?;
                let next = frame.pc;
                frame.push(Value::ReturnAddress(next));
                Self::branch_if(thread, instruction, true)
            }
            0xA9 => {
                // ret
                let frame = thread.frame_mut()?;
                frame.pc = frame.local(Self::local_index(instruction)?)?.as_return_address()?;
                Ok(Completion::Continue)
            }
            0xAA | 0xAB => Self::switch(thread, instruction), // tableswitch, lookupswitch
            0xC6 | 0xC7 => {
                // ifnull, ifnonnull
                let null = thread.frame_mut()?.pop()?.is_null();
                Self::branch_if(thread, instruction, null == (instruction.opcode == 0xC6))
            }

            // ================================================================
            // Returns (0xAC - 0xB1)
            // ================================================================
            0xAC..=0xB0 => {
                // <t>return
                let value = thread.frame_mut()?.pop()?;
                thread.return_value(Some(value))?;
                Ok(Completion::Continue)
            }
            0xB1 => {
                // return
                thread.return_value(None)?;
                Ok(Completion::Continue)
            }

            // ================================================================
            // Fields (0xB2 - 0xB5)
            // ================================================================
            0xB2 => Self::get_static(thread, Self::pool_index(instruction)?), // getstatic
            0xB3 => Self::put_static(thread, Self::pool_index(instruction)?), // putstatic
            0xB4 => Self::get_field(thread, Self::pool_index(instruction)?), // getfield
            0xB5 => Self::put_field(thread, Self::pool_index(instruction)?), // putfield

            // ================================================================
            // Invocations (0xB6 - 0xBA)
            // ================================================================
            0xB6 | 0xB9 => Self::invoke_virtual(thread, Self::pool_index(instruction)?), // invokevirtual, invokeinterface
            0xB7 => Self::invoke_special(thread, Self::pool_index(instruction)?), // invokespecial
            0xB8 => Self::invoke_static(thread, Self::pool_index(instruction)?), // invokestatic
            0xBA => Err(Error::Unsupported("invokedynamic".to_string())), // invokedynamic

            // ================================================================
            // Objects and arrays (0xBB - 0xC5)
            // ================================================================
            0xBB => Self::new_object(thread, Self::pool_index(instruction)?), // new
            0xBC => {
                // newarray
                let Operand::ArrayType(kind) = instruction.operand else {
                    return Err(Self::invalid_operand(instruction, "array type"));
                };
                Self::new_array(thread, kind.descriptor())
            }
            0xBD => {
                // anewarray
                let index = Self::pool_index(instruction)?;
                let component = thread.frame()?.class().constant_pool().class_name(index)?.to_string();
                let descriptor = if component.starts_with('[') {
                    format!("[{component}")
                } else {
                    format!("[L{component};")
                };
                Self::new_array(thread, &descriptor)
            }
            0xBE => {
                // arraylength
                let array = Self::pop_non_null(thread)?;
                let length = Self::array_length(&array)?;
                Self::push(thread, Value::Int(length))
            }
            0xBF => {
                // athrow
                let exception = Self::pop_non_null(thread)?;
                Ok(Completion::Threw(exception))
            }
            0xC0 => Self::check_cast(thread, Self::pool_index(instruction)?), // checkcast
            0xC1 => Self::instance_of(thread, Self::pool_index(instruction)?), // instanceof
            0xC2 => {
                // monitorenter
                let target = Self::pop_non_null(thread)?;
                target.monitor().enter(thread.id(), -1);
                Ok(Completion::Continue)
            }
            0xC3 => {
                // monitorexit
                let target = Self::pop_non_null(thread)?;
                let released = target.monitor().exit(thread.id());
                monitor_result(thread, released)?;
                Ok(Completion::Continue)
            }
            0xC5 => {
                // multianewarray
                let Operand::MultiANewArray { index, dimensions } = instruction.operand else {
                    return Err(Self::invalid_operand(instruction, "multianewarray"));
                };
                Self::new_multi_array(thread, index, dimensions)
            }

            opcode => Err(Error::Unsupported(format!(
                "opcode 0x{opcode:02X} ({}) at {}",
                instruction.mnemonic, instruction.offset
            ))),
        }
    }
}
