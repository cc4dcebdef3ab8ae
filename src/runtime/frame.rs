//! Method activation records.

use crate::{
    classfile::Code,
    runtime::{ClassRef, Instance, InstanceRef, MethodRef, StackTraceElement, Value},
    Error, Result,
};

/// One activation of a method on a thread's call stack.
///
/// `long` and `double` values take a single operand stack entry and two local variable
/// slots; the upper local holds [`Value::Top`].
#[derive(Debug)]
pub struct Frame {
    class: ClassRef,
    method: MethodRef,
    locals: Vec<Value>,
    stack: Vec<Value>,
    /// Offset of the next instruction to execute
    pub pc: usize,
    /// Offset of the instruction currently executing, used for handler lookup and line numbers
    pub instr_pc: usize,
    sync: Option<InstanceRef>,
}

impl Frame {
    /// Create a frame for `method` of `class` with empty locals
    #[must_use]
    pub fn new(class: ClassRef, method: MethodRef) -> Frame {
        let (max_locals, max_stack) = method.code.as_ref().map_or((0, 0), |code| {
            (usize::from(code.max_locals), usize::from(code.max_stack))
        });
        let max_locals = max_locals.max(method.arg_slots());

        Frame {
            class,
            method,
            locals: vec![Value::Top; max_locals],
            stack: Vec::with_capacity(max_stack),
            pc: 0,
            instr_pc: 0,
            sync: None,
        }
    }

    /// Create a frame and spread `args` (receiver first) over the leading locals
    #[must_use]
    pub fn with_args(class: ClassRef, method: MethodRef, args: Vec<Value>) -> Frame {
        let mut frame = Frame::new(class, method);
        let mut index = 0;
        for arg in args {
            let wide = arg.is_wide();
            if index < frame.locals.len() {
                frame.locals[index] = arg;
            } else {
                frame.locals.push(arg);
            }
            index += 1;
            if wide {
                if index < frame.locals.len() {
                    frame.locals[index] = Value::Top;
                } else {
                    frame.locals.push(Value::Top);
                }
                index += 1;
            }
        }
        frame
    }

    /// Declaring class of the executing method
    #[must_use]
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// The executing method
    #[must_use]
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// Body of the executing method
    ///
    /// # Errors
    /// Returns an error for frames of native or abstract methods.
    pub fn code(&self) -> Result<&Code> {
        self.method.code()
    }

    /// Push an operand
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop an operand
    ///
    /// # Errors
    /// Returns an error if the operand stack is empty.
    pub fn pop(&mut self) -> Result<Value> {
        self.stack
            .pop()
            .ok_or_else(|| Error::Error(format!("Operand stack underflow in {}", self.location())))
    }

    /// Pop `count` operands, returned in push order
    ///
    /// # Errors
    /// Returns an error if the operand stack holds fewer than `count` values.
    pub fn pop_n(&mut self, count: usize) -> Result<Vec<Value>> {
        if count > self.stack.len() {
            return Err(Error::Error(format!("Operand stack underflow in {}", self.location())));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    /// Pop an `int`
    ///
    /// # Errors
    /// Returns an error on underflow or if the operand is not an `int`.
    pub fn pop_int(&mut self) -> Result<i32> {
        self.pop()?.as_int()
    }

    /// Pop a `long`
    ///
    /// # Errors
    /// Returns an error on underflow or if the operand is not a `long`.
    pub fn pop_long(&mut self) -> Result<i64> {
        self.pop()?.as_long()
    }

    /// Pop a `float`
    ///
    /// # Errors
    /// Returns an error on underflow or if the operand is not a `float`.
    pub fn pop_float(&mut self) -> Result<f32> {
        self.pop()?.as_float()
    }

    /// Pop a `double`
    ///
    /// # Errors
    /// Returns an error on underflow or if the operand is not a `double`.
    pub fn pop_double(&mut self) -> Result<f64> {
        self.pop()?.as_double()
    }

    /// Pop a reference, `None` for `null`
    ///
    /// # Errors
    /// Returns an error on underflow or if the operand is a primitive value.
    pub fn pop_ref(&mut self) -> Result<Option<InstanceRef>> {
        Ok(self.pop()?.as_reference()?.cloned())
    }

    /// The operand `depth` entries below the top
    ///
    /// # Errors
    /// Returns an error if the operand stack is not that deep.
    pub fn peek(&self, depth: usize) -> Result<&Value> {
        self.stack
            .len()
            .checked_sub(depth + 1)
            .and_then(|index| self.stack.get(index))
            .ok_or_else(|| Error::Error(format!("Operand stack underflow in {}", self.location())))
    }

    /// Current operand stack depth
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Drop every operand
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Read local `index`
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for an index past `max_locals`.
    pub fn local(&self, index: usize) -> Result<Value> {
        self.locals.get(index).cloned().ok_or(Error::OutOfBounds)
    }

    /// Write local `index`; wide values also claim `index + 1`
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for an index past `max_locals`.
    pub fn set_local(&mut self, index: usize, value: Value) -> Result<()> {
        let wide = value.is_wide();
        if index >= self.locals.len() || (wide && index + 1 >= self.locals.len()) {
            return Err(Error::OutOfBounds);
        }

        self.locals[index] = value;
        if wide {
            self.locals[index + 1] = Value::Top;
        }
        Ok(())
    }

    /// All locals
    #[must_use]
    pub fn locals(&self) -> &[Value] {
        &self.locals
    }

    /// Object whose monitor this frame holds for a synchronized method
    #[must_use]
    pub fn sync(&self) -> Option<&InstanceRef> {
        self.sync.as_ref()
    }

    pub(crate) fn set_sync(&mut self, target: InstanceRef) {
        self.sync = Some(target);
    }

    pub(crate) fn take_sync(&mut self) -> Option<InstanceRef> {
        self.sync.take()
    }

    /// Offset of the handler that catches `exception` thrown at the current instruction.
    ///
    /// Entries are consulted in table order; a catch type of zero catches everything.
    ///
    /// # Errors
    /// Returns an error if the catch type of a covering entry can not be read.
    pub fn find_handler(&self, exception: &Instance) -> Result<Option<usize>> {
        let Some(code) = self.method.code.as_ref() else {
            return Ok(None);
        };

        for entry in code.exception_table.iter().filter(|e| e.covers(self.instr_pc)) {
            if entry.catch_type == 0 {
                return Ok(Some(usize::from(entry.handler_pc)));
            }
            let catch_type = self.class.constant_pool().class_name(entry.catch_type)?;
            if exception.class().is_assignable_to(catch_type)? {
                return Ok(Some(usize::from(entry.handler_pc)));
            }
        }
        Ok(None)
    }

    /// Source line of the current instruction
    #[must_use]
    pub fn line_number(&self) -> Option<u16> {
        self.method.code.as_ref().and_then(|code| code.line_at(self.instr_pc))
    }

    /// Stack trace element describing this frame
    #[must_use]
    pub fn trace(&self) -> StackTraceElement {
        StackTraceElement {
            class: self.class.name().to_string(),
            method: self.method.name.clone(),
            file: self.class.source_file().map(str::to_string),
            line: self.line_number(),
            native: self.method.is_native(),
        }
    }

    fn location(&self) -> String {
        format!("{}.{}{}@{}", self.class.name(), self.method.name, self.method.descriptor, self.instr_pc)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        classfile::{ClassWriter, MethodAccessFlags},
        disassembler::opcodes::*,
        runtime::ClassRegistry,
        test::{add_class, body, core_library},
    };

    fn demo_class() -> (Arc<ClassRegistry>, ClassRef) {
        let path = core_library();
        let mut writer = ClassWriter::new("demo/Frames", Some("java/lang/Object"));
        writer
            .source_file("Frames.java")
            .method(
                MethodAccessFlags::STATIC,
                "wide",
                "(JID)V",
                body(|code| {
                    code.op(RETURN);
                }),
            )
            .unwrap()
            .method(
                MethodAccessFlags::STATIC,
                "guarded",
                "()V",
                body(|code| {
                    let (start, end, arithmetic, any) = (code.label(), code.label(), code.label(), code.label());
                    code.line(3)
                        .bind(start)
                        .op(NOP)
                        .line(4)
                        .op(NOP)
                        .bind(end)
                        .op(RETURN)
                        .bind(arithmetic)
                        .op(RETURN)
                        .bind(any)
                        .op(RETURN)
                        .handler(start, end, arithmetic, Some("java/lang/ArithmeticException"))
                        .handler(start, end, any, None);
                }),
            )
            .unwrap();
        add_class(&path, &writer);

        let registry = ClassRegistry::new(vec![Box::new(path)]);
        let class = registry.resolve("demo/Frames").unwrap();
        (registry, class)
    }

    #[test]
    fn wide_arguments_take_two_locals() {
        let (_registry, class) = demo_class();
        let method = class.declared_method("wide", "(JID)V").unwrap().clone();
        let frame = Frame::with_args(
            class.clone(),
            method,
            vec![Value::Long(7), Value::Int(3), Value::Double(1.5)],
        );

        let locals = frame.locals();
        assert_eq!(locals.len(), 5);
        assert_eq!(locals[0], Value::Long(7));
        assert!(matches!(locals[1], Value::Top));
        assert_eq!(locals[2], Value::Int(3));
        assert_eq!(locals[3], Value::Double(1.5));
        assert!(matches!(locals[4], Value::Top));
    }

    #[test]
    fn operand_stack() {
        let (_registry, class) = demo_class();
        let method = class.declared_method("wide", "(JID)V").unwrap().clone();
        let mut frame = Frame::new(class.clone(), method);

        frame.push(Value::Int(1));
        frame.push(Value::Long(2));
        frame.push(Value::Int(3));
        assert_eq!(frame.stack_len(), 3);
        assert_eq!(frame.peek(1).unwrap(), &Value::Long(2));
        assert_eq!(frame.pop_n(2).unwrap(), vec![Value::Long(2), Value::Int(3)]);
        assert!(frame.pop_long().is_err());
        assert!(frame.pop().is_err());
        assert!(frame.peek(0).is_err());
    }

    #[test]
    fn wide_local_writes() {
        let (_registry, class) = demo_class();
        let method = class.declared_method("wide", "(JID)V").unwrap().clone();
        let mut frame = Frame::new(class.clone(), method);

        frame.set_local(2, Value::Int(9)).unwrap();
        frame.set_local(1, Value::Double(2.0)).unwrap();
        assert!(matches!(frame.local(2).unwrap(), Value::Top));
        assert!(matches!(frame.set_local(4, Value::Long(1)), Err(Error::OutOfBounds)));
        assert!(matches!(frame.local(5), Err(Error::OutOfBounds)));
    }

    #[test]
    fn handlers_in_table_order() {
        let (registry, class) = demo_class();
        let method = class.declared_method("guarded", "()V").unwrap().clone();
        let mut frame = Frame::new(class.clone(), method);

        let arithmetic = Instance::new(registry.resolve("java/lang/ArithmeticException").unwrap()).unwrap();
        let other = Instance::new(registry.resolve("java/lang/NullPointerException").unwrap()).unwrap();

        assert_eq!(frame.find_handler(&arithmetic).unwrap(), Some(3));
        assert_eq!(frame.find_handler(&other).unwrap(), Some(4));

        frame.instr_pc = 2;
        assert_eq!(frame.find_handler(&arithmetic).unwrap(), None);
    }

    #[test]
    fn trace_uses_line_numbers() {
        let (_registry, class) = demo_class();
        let method = class.declared_method("guarded", "()V").unwrap().clone();
        let mut frame = Frame::new(class.clone(), method);

        assert_eq!(frame.line_number(), Some(3));
        frame.instr_pc = 1;
        let trace = frame.trace();
        assert_eq!(trace.line, Some(4));
        assert_eq!(trace.to_string(), "at demo.Frames.guarded(Frames.java:4)");
    }
}
