//! Handler methods for the bytecode interpreter.
//!
//! These are the helpers the dispatch in [`Interpreter::execute`] delegates to, grouped as:
//!
//! - **Operands**: `invalid_operand`, `pool_index`, `local_index`
//! - **Locals and constants**: `load_local`, `store_local`, `load_constant`
//! - **Stack**: `push`, `stack_op`
//! - **Arithmetic**: `int_op`, `long_op`, `float_op`, `double_op`, `long_shift`, `convert`,
//!   `compare`
//! - **Branches**: `condition`, `branch_if`, `switch`
//! - **Arrays**: `new_array`, `new_multi_array`, `load_element`, `store_element`,
//!   `array_length`
//! - **Fields**: `get_static`, `put_static`, `get_field`, `put_field`
//! - **Calls**: `invoke_virtual`, `invoke_special`, `invoke_static`
//! - **Objects**: `new_object`, `check_cast`, `instance_of`
//!
//! Conditions the bytecode can observe (null dereference, bad indices, division by zero,
//! failed casts) raise the matching `java/lang` exception through the VM.

use std::cmp::Ordering;

use crate::{
    classfile::{ClassAccessFlags, Constant},
    disassembler::{Instruction, Operand},
    runtime::{
        interpreter::{Completion, Interpreter},
        ClassRef, FieldRef, Frame, Instance, InstanceRef, MethodRef, Thread, Value, Vm,
    },
    Error, Result,
};

const CONSTRUCTOR: &str = "<init>";

impl Interpreter {
    /// Creates an error for an instruction whose operand does not have the expected shape.
    ///
    /// Only reachable with a decoder bug, the decoder derives operands from the opcode.
    pub(super) fn invalid_operand(instruction: &Instruction, expected: &'static str) -> Error {
        malformed_error!(
            "{} at {} expects a {} operand, found {:?}",
            instruction.mnemonic,
            instruction.offset,
            expected,
            instruction.operand
        )
    }

    /// Constant pool index carried by the instruction.
    ///
    /// # Errors
    /// Returns a malformed error if the operand is not a pool reference.
    pub(super) fn pool_index(instruction: &Instruction) -> Result<u16> {
        match instruction.operand {
            Operand::ConstantPool(index) | Operand::InvokeInterface { index, .. } => Ok(index),
            _ => Err(Self::invalid_operand(instruction, "constant pool")),
        }
    }

    /// Local variable index carried by the instruction.
    ///
    /// # Errors
    /// Returns a malformed error if the operand is not a local index.
    pub(super) fn local_index(instruction: &Instruction) -> Result<usize> {
        match instruction.operand {
            Operand::Local(index) => Ok(usize::from(index)),
            _ => Err(Self::invalid_operand(instruction, "local")),
        }
    }

    /// Build a VM exception of `class` for the current position of `thread`
    fn raise(thread: &Thread, class: &str, message: Option<&str>) -> Error {
        thread.vm().raise(thread, class, message)
    }

    /// Push `value` onto the operand stack of the top frame.
    ///
    /// # Errors
    /// Returns an error if the call stack is empty.
    pub(super) fn push(thread: &mut Thread, value: Value) -> Result<Completion> {
        thread.frame_mut()?.push(value);
        Ok(Completion::Continue)
    }

    /// Pop a reference, raising `NullPointerException` for `null`.
    ///
    /// # Errors
    /// Returns [`Error::Exception`] for `null`, or an error if the operand is not a reference.
    pub(super) fn pop_non_null(thread: &mut Thread) -> Result<InstanceRef> {
        match thread.frame_mut()?.pop_ref()? {
            Some(instance) => Ok(instance),
            None => Err(Self::raise(thread, "java/lang/NullPointerException", None)),
        }
    }

    /// Loads a local variable onto the operand stack.
    ///
    /// # Arguments
    ///
    /// * `thread` - The executing thread.
    /// * `index` - The local variable index.
    ///
    /// # Errors
    ///
    /// Returns an error if the local index is out of bounds.
    pub(super) fn load_local(thread: &mut Thread, index: usize) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let value = frame.local(index)?;
        frame.push(value);
        Ok(Completion::Continue)
    }

    /// Stores the top of the operand stack into a local variable.
    ///
    /// # Arguments
    ///
    /// * `thread` - The executing thread.
    /// * `index` - The local variable index.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack is empty or the local index is out of bounds.
    pub(super) fn store_local(thread: &mut Thread, index: usize) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let value = frame.pop()?;
        frame.set_local(index, value)?;
        Ok(Completion::Continue)
    }

    /// Pushes the loadable constant at `index` (`ldc`, `ldc_w`, `ldc2_w`).
    ///
    /// String literals are interned; class literals push the `java/lang/Class` mirror of the
    /// resolved class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for method handles, method types and dynamic constants.
    pub(super) fn load_constant(thread: &mut Thread, index: u16) -> Result<Completion> {
        let class = thread.frame()?.class().clone();
        let pool = class.constant_pool();

        let value = match pool.get(index)? {
            Constant::Integer(value) => Value::Int(*value),
            Constant::Float(value) => Value::Float(*value),
            Constant::Long(value) => Value::Long(*value),
            Constant::Double(value) => Value::Double(*value),
            Constant::String { .. } => Value::Reference(thread.vm().intern(pool.string(index)?)?),
            Constant::Class { .. } => {
                let target = thread.vm().registry().resolve(pool.class_name(index)?)?;
                Value::Reference(thread.vm().class_mirror(&target)?)
            }
            _ => {
                return Err(Error::Unsupported(format!(
                    "ldc of {} in {}",
                    pool.describe(index),
                    class.name()
                )))
            }
        };
        Self::push(thread, value)
    }

    /// Executes `pop2`, the `dup` family and `swap`.
    ///
    /// Category 2 values (`long`, `double`) count as two words, so `pop2` and the `dup2`
    /// forms move either one wide value or two narrow ones.
    ///
    /// # Errors
    ///
    /// Returns an error on operand stack underflow.
    pub(super) fn stack_op(thread: &mut Thread, opcode: u8) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        match opcode {
            0x58 => {
                // pop2
                if !frame.pop()?.is_wide() {
                    frame.pop()?;
                }
            }
            0x59 => {
                // dup
                let value = frame.peek(0)?.clone();
                frame.push(value);
            }
            0x5A => {
                // dup_x1
                let first = frame.pop()?;
                let second = frame.pop()?;
                push_all(frame, [first.clone(), second, first]);
            }
            0x5B => {
                // dup_x2
                let first = frame.pop()?;
                let second = frame.pop()?;
                if second.is_wide() {
                    push_all(frame, [first.clone(), second, first]);
                } else {
                    let third = frame.pop()?;
                    push_all(frame, [first.clone(), third, second, first]);
                }
            }
            0x5C => {
                // dup2
                let first = frame.peek(0)?.clone();
                if first.is_wide() {
                    frame.push(first);
                } else {
                    let second = frame.peek(1)?.clone();
                    push_all(frame, [second, first]);
                }
            }
            0x5D => {
                // dup2_x1
                let first = frame.pop()?;
                let second = frame.pop()?;
                if first.is_wide() {
                    push_all(frame, [first.clone(), second, first]);
                } else {
                    let third = frame.pop()?;
                    push_all(frame, [second.clone(), first.clone(), third, second, first]);
                }
            }
            0x5E => {
                // dup2_x2
                let first = frame.pop()?;
                let second = frame.pop()?;
                match (first.is_wide(), second.is_wide()) {
                    (true, true) => push_all(frame, [first.clone(), second, first]),
                    (true, false) => {
                        let third = frame.pop()?;
                        push_all(frame, [first.clone(), third, second, first]);
                    }
                    (false, _) => {
                        let third = frame.pop()?;
                        if third.is_wide() {
                            push_all(frame, [second.clone(), first.clone(), third, second, first]);
                        } else {
                            let fourth = frame.pop()?;
                            push_all(frame, [second.clone(), first.clone(), fourth, third, second, first]);
                        }
                    }
                }
            }
            _ => {
                // swap
                let first = frame.pop()?;
                let second = frame.pop()?;
                push_all(frame, [first, second]);
            }
        }
        Ok(Completion::Continue)
    }

    /// Binary `int` operation; `None` from `op` raises `ArithmeticException`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exception`] for a division by zero.
    pub(super) fn int_op(thread: &mut Thread, op: impl FnOnce(i32, i32) -> Option<i32>) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let right = frame.pop_int()?;
        let left = frame.pop_int()?;
        match op(left, right) {
            Some(value) => {
                frame.push(Value::Int(value));
                Ok(Completion::Continue)
            }
            None => Err(Self::raise(thread, "java/lang/ArithmeticException", Some("/ by zero"))),
        }
    }

    /// Binary `long` operation; `None` from `op` raises `ArithmeticException`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exception`] for a division by zero.
    pub(super) fn long_op(thread: &mut Thread, op: impl FnOnce(i64, i64) -> Option<i64>) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let right = frame.pop_long()?;
        let left = frame.pop_long()?;
        match op(left, right) {
            Some(value) => {
                frame.push(Value::Long(value));
                Ok(Completion::Continue)
            }
            None => Err(Self::raise(thread, "java/lang/ArithmeticException", Some("/ by zero"))),
        }
    }

    /// Binary `float` operation with IEEE 754 semantics
    pub(super) fn float_op(thread: &mut Thread, op: impl FnOnce(f32, f32) -> f32) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let right = frame.pop_float()?;
        let left = frame.pop_float()?;
        frame.push(Value::Float(op(left, right)));
        Ok(Completion::Continue)
    }

    /// Binary `double` operation with IEEE 754 semantics
    pub(super) fn double_op(thread: &mut Thread, op: impl FnOnce(f64, f64) -> f64) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let right = frame.pop_double()?;
        let left = frame.pop_double()?;
        frame.push(Value::Double(op(left, right)));
        Ok(Completion::Continue)
    }

    /// `long` shift by an `int` distance, masked to the low six bits
    pub(super) fn long_shift(thread: &mut Thread, op: impl FnOnce(i64, u32) -> i64) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let distance = frame.pop_int()?;
        let value = frame.pop_long()?;
        frame.push(Value::Long(op(value, (distance & 0x3F) as u32)));
        Ok(Completion::Continue)
    }

    /// Executes the primitive conversions `i2l` through `i2s`.
    ///
    /// Float to integer conversions saturate and map NaN to zero, which is what `as` does.
    ///
    /// # Errors
    ///
    /// Returns an error if the operand has the wrong kind.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub(super) fn convert(thread: &mut Thread, opcode: u8) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let value = match opcode {
            0x85 => Value::Long(i64::from(frame.pop_int()?)),
            0x86 => Value::Float(frame.pop_int()? as f32),
            0x87 => Value::Double(f64::from(frame.pop_int()?)),
            0x88 => Value::Int(frame.pop_long()? as i32),
            0x89 => Value::Float(frame.pop_long()? as f32),
            0x8A => Value::Double(frame.pop_long()? as f64),
            0x8B => Value::Int(frame.pop_float()? as i32),
            0x8C => Value::Long(frame.pop_float()? as i64),
            0x8D => Value::Double(f64::from(frame.pop_float()?)),
            0x8E => Value::Int(frame.pop_double()? as i32),
            0x8F => Value::Long(frame.pop_double()? as i64),
            0x90 => Value::Float(frame.pop_double()? as f32),
            0x91 => Value::Int(i32::from(frame.pop_int()? as i8)),
            0x92 => Value::Int(i32::from(frame.pop_int()? as u16)),
            _ => Value::Int(i32::from(frame.pop_int()? as i16)),
        };
        frame.push(value);
        Ok(Completion::Continue)
    }

    /// Executes `lcmp`, `fcmpl`, `fcmpg`, `dcmpl` and `dcmpg`.
    ///
    /// An unordered comparison (a NaN operand) yields -1 for the `l` forms and 1 for the
    /// `g` forms.
    ///
    /// # Errors
    ///
    /// Returns an error if the operands have the wrong kind.
    pub(super) fn compare(thread: &mut Thread, opcode: u8) -> Result<Completion> {
        let frame = thread.frame_mut()?;
        let ordering = match opcode {
            0x94 => {
                let right = frame.pop_long()?;
                let left = frame.pop_long()?;
                Some(left.cmp(&right))
            }
            0x95 | 0x96 => {
                let right = frame.pop_float()?;
                let left = frame.pop_float()?;
                left.partial_cmp(&right)
            }
            _ => {
                let right = frame.pop_double()?;
                let left = frame.pop_double()?;
                left.partial_cmp(&right)
            }
        };

        let unordered = if matches!(opcode, 0x95 | 0x97) { -1 } else { 1 };
        frame.push(Value::Int(ordering.map_or(unordered, |ordering| ordering as i32)));
        Ok(Completion::Continue)
    }

    /// Evaluate the condition of an `if` opcode; `index` counts from `eq` (0) to `le` (5)
    pub(super) fn condition(index: u8, ordering: Ordering) -> bool {
        match index {
            0 => ordering == Ordering::Equal,
            1 => ordering != Ordering::Equal,
            2 => ordering == Ordering::Less,
            3 => ordering != Ordering::Less,
            4 => ordering == Ordering::Greater,
            _ => ordering != Ordering::Greater,
        }
    }

    /// Jump to the branch target of `instruction` if `taken`.
    ///
    /// # Errors
    ///
    /// Returns a malformed error if the instruction has no branch target.
    pub(super) fn branch_if(thread: &mut Thread, instruction: &Instruction, taken: bool) -> Result<Completion> {
        if taken {
            let target = instruction
                .branch_targets
                .first()
                .copied()
                .ok_or_else(|| Self::invalid_operand(instruction, "branch"))?;
            thread.frame_mut()?.pc = target;
        }
        Ok(Completion::Continue)
    }

    /// Executes `tableswitch` and `lookupswitch`.
    ///
    /// The decoder lists the default target first, followed by one target per case.
    ///
    /// # Errors
    ///
    /// Returns a malformed error if the decoded targets do not match the operand.
    pub(super) fn switch(thread: &mut Thread, instruction: &Instruction) -> Result<Completion> {
        let key = thread.frame_mut()?.pop_int()?;
        let position = match &instruction.operand {
            Operand::TableSwitch { low, high, .. } => {
                if (*low..=*high).contains(&key) {
                    usize::try_from(i64::from(key) - i64::from(*low)).map_or(0, |case| case + 1)
                } else {
                    0
                }
            }
            Operand::LookupSwitch { pairs, .. } => pairs
                .iter()
                .position(|(case, _)| *case == key)
                .map_or(0, |case| case + 1),
            _ => return Err(Self::invalid_operand(instruction, "switch")),
        };

        let target = instruction
            .branch_targets
            .get(position)
            .copied()
            .ok_or_else(|| Self::invalid_operand(instruction, "switch"))?;
        thread.frame_mut()?.pc = target;
        Ok(Completion::Continue)
    }

    /// Length of an array object
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if `array` is not an array.
    pub(super) fn array_length(array: &Instance) -> Result<i32> {
        if !array.is_array() {
            return Err(Error::TypeMismatch {
                expected: "array",
                found: array.class().name().to_string(),
            });
        }
        i32::try_from(array.len()).map_err(|_| Error::OutOfBounds)
    }

    /// Pop an index and an array, check the index and return both
    fn array_access(thread: &mut Thread) -> Result<(InstanceRef, usize)> {
        let index = thread.frame_mut()?.pop_int()?;
        let array = Self::pop_non_null(thread)?;
        let length = Self::array_length(&array)?;

        match usize::try_from(index) {
            Ok(slot) if index < length => Ok((array, slot)),
            _ => {
                let message = format!("Index {index} out of bounds for length {length}");
                Err(Self::raise(
                    thread,
                    "java/lang/ArrayIndexOutOfBoundsException",
                    Some(&message),
                ))
            }
        }
    }

    /// Executes the `<t>aload` family.
    ///
    /// # Errors
    ///
    /// Raises `NullPointerException` and `ArrayIndexOutOfBoundsException`.
    pub(super) fn load_element(thread: &mut Thread, opcode: u8) -> Result<Completion> {
        let (array, slot) = Self::array_access(thread)?;
        let value = array.get(slot)?;
        if opcode == 0x32 && value.as_reference().is_err() {
            return Err(Error::TypeMismatch {
                expected: "reference",
                found: value.kind().to_string(),
            });
        }
        Self::push(thread, value)
    }

    /// Executes the `<t>astore` family.
    ///
    /// `bastore` truncates to a byte, or to a single bit for `boolean[]`; `castore` and
    /// `sastore` truncate to 16 bits. `aastore` checks the stored object against the
    /// component type.
    ///
    /// # Errors
    ///
    /// Raises `NullPointerException`, `ArrayIndexOutOfBoundsException` and
    /// `ArrayStoreException`.
    pub(super) fn store_element(thread: &mut Thread, opcode: u8) -> Result<Completion> {
        let value = thread.frame_mut()?.pop()?;
        let (array, slot) = Self::array_access(thread)?;

        let value = match (opcode, value) {
            (0x53, Value::Reference(object)) => {
                let component = array.class().component_descriptor().unwrap_or("Ljava/lang/Object;");
                let target = crate::runtime::class_name_of(component).unwrap_or(component);
                if !object.class().is_assignable_to(target)? {
                    let message = object.class().name().replace('/', ".");
                    return Err(Self::raise(thread, "java/lang/ArrayStoreException", Some(&message)));
                }
                Value::Reference(object)
            }
            (0x54, Value::Int(value)) if array.class().name() == "[Z" => Value::Int(value & 1),
            (0x54, Value::Int(value)) => Value::Int(i32::from(value as i8)),
            (0x55, Value::Int(value)) => Value::Int(i32::from(value as u16)),
            (0x56, Value::Int(value)) => Value::Int(i32::from(value as i16)),
            (_, value) => value,
        };

        array.set(slot, value)?;
        Ok(Completion::Continue)
    }

    /// Pop a count and allocate a one-dimensional array of class `descriptor`.
    ///
    /// # Errors
    ///
    /// Raises `NegativeArraySizeException` for a negative count.
    pub(super) fn new_array(thread: &mut Thread, descriptor: &str) -> Result<Completion> {
        let count = thread.frame_mut()?.pop_int()?;
        let Ok(length) = usize::try_from(count) else {
            return Err(Self::raise(
                thread,
                "java/lang/NegativeArraySizeException",
                Some(&count.to_string()),
            ));
        };

        let array = thread.vm().new_array(descriptor, length)?;
        Self::push(thread, Value::Reference(array))
    }

    /// Executes `multianewarray`: pops one count per dimension and allocates nested arrays.
    ///
    /// Dimensions beyond `dimensions` are left `null`.
    ///
    /// # Errors
    ///
    /// Raises `NegativeArraySizeException` if any count is negative.
    pub(super) fn new_multi_array(thread: &mut Thread, index: u16, dimensions: u8) -> Result<Completion> {
        let descriptor = thread.frame()?.class().constant_pool().class_name(index)?.to_string();
        let counts = thread
            .frame_mut()?
            .pop_n(usize::from(dimensions))?
            .iter()
            .map(Value::as_int)
            .collect::<Result<Vec<i32>>>()?;

        if let Some(negative) = counts.iter().find(|count| **count < 0) {
            return Err(Self::raise(
                thread,
                "java/lang/NegativeArraySizeException",
                Some(&negative.to_string()),
            ));
        }

        let array = Self::build_array(thread.vm(), &descriptor, &counts)?;
        Self::push(thread, Value::Reference(array))
    }

    fn build_array(vm: &Vm, descriptor: &str, counts: &[i32]) -> Result<InstanceRef> {
        let Some((count, rest)) = counts.split_first() else {
            return Err(malformed_error!("multianewarray of {} without dimensions", descriptor));
        };
        let length = usize::try_from(*count).map_err(|_| Error::OutOfBounds)?;
        if rest.is_empty() {
            return vm.new_array(descriptor, length);
        }

        let component = descriptor
            .strip_prefix('[')
            .ok_or_else(|| malformed_error!("multianewarray of non-array class {}", descriptor))?;
        let elements = (0..length)
            .map(|_| Self::build_array(vm, component, rest).map(Value::Reference))
            .collect::<Result<Vec<_>>>()?;
        vm.new_array_of(descriptor, elements)
    }

    fn resolve_field_ref(thread: &Thread, index: u16) -> Result<(ClassRef, FieldRef)> {
        let class = thread.frame()?.class().clone();
        let member = class.constant_pool().member_ref(index)?;
        thread
            .vm()
            .registry()
            .resolve_field(member.class, member.name, member.descriptor)
    }

    fn resolve_method_ref(thread: &Thread, index: u16) -> Result<(ClassRef, MethodRef)> {
        let class = thread.frame()?.class().clone();
        let member = class.constant_pool().member_ref(index)?;
        thread
            .vm()
            .registry()
            .resolve_method(member.class, member.name, member.descriptor)
    }

    fn expect_static(thread: &Thread, owner: &ClassRef, field: &FieldRef, expected: bool) -> Result<()> {
        if field.is_static() == expected {
            return Ok(());
        }
        let message = format!(
            "Expected {} field {}.{}",
            if expected { "static" } else { "non-static" },
            owner.name().replace('/', "."),
            field.name
        );
        Err(Self::raise(thread, "java/lang/IncompatibleClassChangeError", Some(&message)))
    }

    /// Executes `getstatic`, initializing the declaring class first.
    ///
    /// # Errors
    ///
    /// Returns resolution errors and failures of the class initializer.
    pub(super) fn get_static(thread: &mut Thread, index: u16) -> Result<Completion> {
        let (owner, field) = Self::resolve_field_ref(thread, index)?;
        Self::expect_static(thread, &owner, &field, true)?;
        owner.ensure_initialized(thread)?;

        let value = owner.get_static(&field)?;
        Self::push(thread, value)
    }

    /// Executes `putstatic`, initializing the declaring class first.
    ///
    /// # Errors
    ///
    /// Returns resolution errors and failures of the class initializer.
    pub(super) fn put_static(thread: &mut Thread, index: u16) -> Result<Completion> {
        let (owner, field) = Self::resolve_field_ref(thread, index)?;
        Self::expect_static(thread, &owner, &field, true)?;
        owner.ensure_initialized(thread)?;

        let value = thread.frame_mut()?.pop()?;
        owner.set_static(&field, value)?;
        Ok(Completion::Continue)
    }

    /// Executes `getfield`.
    ///
    /// # Errors
    ///
    /// Raises `NullPointerException` for a `null` receiver.
    pub(super) fn get_field(thread: &mut Thread, index: u16) -> Result<Completion> {
        let (owner, field) = Self::resolve_field_ref(thread, index)?;
        Self::expect_static(thread, &owner, &field, false)?;
        owner.assign_instance_slots()?;

        let object = Self::pop_non_null(thread)?;
        let value = object.get(field.slot()?)?;
        Self::push(thread, value)
    }

    /// Executes `putfield`.
    ///
    /// # Errors
    ///
    /// Raises `NullPointerException` for a `null` receiver.
    pub(super) fn put_field(thread: &mut Thread, index: u16) -> Result<Completion> {
        let (owner, field) = Self::resolve_field_ref(thread, index)?;
        Self::expect_static(thread, &owner, &field, false)?;
        owner.assign_instance_slots()?;

        let value = thread.frame_mut()?.pop()?;
        let object = Self::pop_non_null(thread)?;
        object.set(field.slot()?, value)?;
        Ok(Completion::Continue)
    }

    /// Executes `invokestatic`, initializing the declaring class first.
    ///
    /// # Errors
    ///
    /// Returns resolution errors and failures of the class initializer or a native binding.
    pub(super) fn invoke_static(thread: &mut Thread, index: u16) -> Result<Completion> {
        let (class, method) = Self::resolve_method_ref(thread, index)?;
        if !method.is_static() {
            let message = format!("Expected static method {}.{}", class.name().replace('/', "."), method.name);
            return Err(Self::raise(thread, "java/lang/IncompatibleClassChangeError", Some(&message)));
        }
        class.ensure_initialized(thread)?;

        let args = thread.frame_mut()?.pop_n(method.arg_count())?;
        Self::invoke_method(thread, class, method, args)
    }

    /// Executes `invokespecial`: constructors, private methods and `super` calls.
    ///
    /// A non-constructor call into a super class of the current class (which carries
    /// `ACC_SUPER`) is looked up again starting from the direct super class of the current
    /// class, so overriding in between is honored.
    ///
    /// # Errors
    ///
    /// Raises `NullPointerException` for a `null` receiver.
    pub(super) fn invoke_special(thread: &mut Thread, index: u16) -> Result<Completion> {
        let current = thread.frame()?.class().clone();
        let member = current.constant_pool().member_ref(index)?;
        let (mut class, mut method) =
            thread
                .vm()
                .registry()
                .resolve_method(member.class, member.name, member.descriptor)?;

        if member.name != CONSTRUCTOR
            && member.class != current.name()
            && !current.is_interface()
            && current.access_flags().contains(ClassAccessFlags::SUPER)
            && current.is_subclass_of(member.class)?
        {
            if let Some(super_class) = current.super_class()? {
                if let Some(found) = super_class.resolve_method(member.name, member.descriptor)? {
                    (class, method) = found;
                }
            }
        }

        let args = thread.frame_mut()?.pop_n(method.arg_count())?;
        if matches!(args.first(), Some(Value::Null) | None) {
            return Err(Self::raise(thread, "java/lang/NullPointerException", None));
        }
        Self::invoke_method(thread, class, method, args)
    }

    /// Executes `invokevirtual` and `invokeinterface`.
    ///
    /// The method is selected on the runtime class of the receiver; the symbolically
    /// resolved method is the fallback when the receiver class has no match.
    ///
    /// # Errors
    ///
    /// Raises `NullPointerException` for a `null` receiver and `AbstractMethodError` if the
    /// selected method has no body.
    pub(super) fn invoke_virtual(thread: &mut Thread, index: u16) -> Result<Completion> {
        let (class, method) = Self::resolve_method_ref(thread, index)?;
        let args = thread.frame_mut()?.pop_n(method.arg_count())?;

        let receiver = match args.first() {
            Some(Value::Reference(receiver)) => receiver.clone(),
            _ => return Err(Self::raise(thread, "java/lang/NullPointerException", None)),
        };

        let (class, method) = match receiver.class().resolve_method(&method.name, &method.descriptor)? {
            Some((selected_class, selected)) if !selected.is_abstract() || method.is_abstract() => {
                (selected_class, selected)
            }
            _ => (class, method),
        };
        Self::invoke_method(thread, class, method, args)
    }

    /// Call a resolved method: push a frame for bytecode, run natives to completion
    fn invoke_method(thread: &mut Thread, class: ClassRef, method: MethodRef, args: Vec<Value>) -> Result<Completion> {
        if method.is_native() || method.is_abstract() {
            if let Some(value) = thread.invoke(class, method, args)? {
                thread.frame_mut()?.push(value);
            }
            return Ok(Completion::Continue);
        }

        thread.push_frame(Frame::with_args(class, method, args))?;
        Ok(Completion::Continue)
    }

    /// Executes `new`, initializing the class first.
    ///
    /// # Errors
    ///
    /// Raises `InstantiationError` for interfaces and abstract classes.
    pub(super) fn new_object(thread: &mut Thread, index: u16) -> Result<Completion> {
        let name = thread.frame()?.class().constant_pool().class_name(index)?.to_string();
        let class = thread.vm().registry().resolve(&name)?;

        if class.is_interface() || class.access_flags().contains(ClassAccessFlags::ABSTRACT) {
            let message = name.replace('/', ".");
            return Err(Self::raise(thread, "java/lang/InstantiationError", Some(&message)));
        }
        class.ensure_initialized(thread)?;

        let object = Instance::new(class)?;
        Self::push(thread, Value::Reference(object))
    }

    /// Executes `checkcast`; `null` passes every cast.
    ///
    /// # Errors
    ///
    /// Raises `ClassCastException` if the object is not assignable to the named class.
    pub(super) fn check_cast(thread: &mut Thread, index: u16) -> Result<Completion> {
        let target = thread.frame()?.class().constant_pool().class_name(index)?.to_string();
        let Value::Reference(object) = thread.frame()?.peek(0)?.clone() else {
            return Ok(Completion::Continue);
        };

        if !object.class().is_assignable_to(&target)? {
            let message = format!(
                "class {} cannot be cast to class {}",
                object.class().name().replace('/', "."),
                target.replace('/', ".")
            );
            return Err(Self::raise(thread, "java/lang/ClassCastException", Some(&message)));
        }
        Ok(Completion::Continue)
    }

    /// Executes `instanceof`; `null` is an instance of nothing.
    ///
    /// # Errors
    ///
    /// Returns resolution errors of the class hierarchy.
    pub(super) fn instance_of(thread: &mut Thread, index: u16) -> Result<Completion> {
        let target = thread.frame()?.class().constant_pool().class_name(index)?.to_string();
        let result = match thread.frame_mut()?.pop_ref()? {
            Some(object) => object.class().is_assignable_to(&target)?,
            None => false,
        };
        Self::push(thread, Value::from_bool(result))
    }
}

fn push_all<const N: usize>(frame: &mut Frame, values: [Value; N]) {
    for value in values {
        frame.push(value);
    }
}
