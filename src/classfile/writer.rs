//! Class file encoder.
//!
//! [`ClassWriter`] assembles a class file from declarations; [`Bytecode`] assembles method
//! bodies with symbolic constant pool references, forward labels and exception handlers. Pool
//! entries are deduplicated and indices are patched in when a body is added to the writer.

use crate::{
    classfile::{
        constant::{encode_modified_utf8, Constant},
        descriptor::MethodDescriptor,
        flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
        MAGIC,
    },
    disassembler::opcodes,
    file::io::write_be_at,
    Result,
};

/// A position in a [`Bytecode`] body, bound once with [`Bytecode::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

#[derive(Debug, Clone, PartialEq)]
enum PoolRef {
    Class(String),
    String(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Field(String, String, String),
    Method(String, String, String),
    InterfaceMethod(String, String, String),
}

#[derive(Debug, Clone, Copy)]
struct BranchFixup {
    instruction: usize,
    patch: usize,
    label: Label,
    wide: bool,
}

#[derive(Debug, Clone)]
struct HandlerDecl {
    start: Label,
    end: Label,
    handler: Label,
    catch_type: Option<String>,
}

/// Builder for a method body.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    code: Vec<u8>,
    labels: Vec<Option<usize>>,
    branches: Vec<BranchFixup>,
    pool_refs: Vec<(usize, PoolRef)>,
    handlers: Vec<HandlerDecl>,
    lines: Vec<(u16, u16)>,
    max_stack: Option<u16>,
    max_locals: Option<u16>,
}

impl Bytecode {
    /// Create an empty body
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the next emitted byte
    #[must_use]
    pub fn pc(&self) -> usize {
        self.code.len()
    }

    /// Emit an opcode
    pub fn op(&mut self, opcode: u8) -> &mut Self {
        self.code.push(opcode);
        self
    }

    /// Emit a raw byte operand
    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.code.push(value);
        self
    }

    /// Emit a big-endian `u16` operand
    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.code.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Emit a big-endian `i32` operand
    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.code.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Push an `int` constant with the shortest encoding
    pub fn iconst(&mut self, value: i32) -> &mut Self {
        match value {
            -1..=5 => self.op((i32::from(opcodes::ICONST_0) + value) as u8),
            -128..=127 => self.op(opcodes::BIPUSH).u8(value as i8 as u8),
            -32768..=32767 => self.op(opcodes::SIPUSH).u16(value as i16 as u16),
            _ => self.pool_op(opcodes::LDC_W, PoolRef::Integer(value)),
        }
    }

    /// Load a `long` constant
    pub fn lconst(&mut self, value: i64) -> &mut Self {
        match value {
            0 => self.op(opcodes::LCONST_0),
            1 => self.op(opcodes::LCONST_1),
            _ => self.pool_op(opcodes::LDC2_W, PoolRef::Long(value)),
        }
    }

    /// Load a `float` constant
    pub fn fconst(&mut self, value: f32) -> &mut Self {
        self.pool_op(opcodes::LDC_W, PoolRef::Float(value))
    }

    /// Load a `double` constant
    pub fn dconst(&mut self, value: f64) -> &mut Self {
        self.pool_op(opcodes::LDC2_W, PoolRef::Double(value))
    }

    /// Load a string literal
    pub fn ldc_string(&mut self, value: &str) -> &mut Self {
        self.pool_op(opcodes::LDC_W, PoolRef::String(value.to_string()))
    }

    /// Load a class literal
    pub fn ldc_class(&mut self, name: &str) -> &mut Self {
        self.pool_op(opcodes::LDC_W, PoolRef::Class(name.to_string()))
    }

    /// Emit an instruction taking a class operand (`new`, `anewarray`, `checkcast`, `instanceof`)
    pub fn class_op(&mut self, opcode: u8, class: &str) -> &mut Self {
        self.pool_op(opcode, PoolRef::Class(class.to_string()))
    }

    /// Emit a field access instruction
    pub fn field_op(&mut self, opcode: u8, class: &str, name: &str, descriptor: &str) -> &mut Self {
        self.pool_op(
            opcode,
            PoolRef::Field(class.to_string(), name.to_string(), descriptor.to_string()),
        )
    }

    /// Emit one of the invoke instructions.
    ///
    /// `invokeinterface` gets its argument count and padding byte appended.
    pub fn invoke(&mut self, opcode: u8, class: &str, name: &str, descriptor: &str) -> &mut Self {
        let (class, name, descriptor) = (class.to_string(), name.to_string(), descriptor.to_string());
        if opcode == opcodes::INVOKEINTERFACE {
            let count = MethodDescriptor::parse(&descriptor)
                .map(|d| d.parameter_slots() + 1)
                .unwrap_or(1);
            self.pool_op(opcode, PoolRef::InterfaceMethod(class, name, descriptor));
            self.u8(count as u8).u8(0)
        } else {
            self.pool_op(opcode, PoolRef::Method(class, name, descriptor))
        }
    }

    fn pool_op(&mut self, opcode: u8, reference: PoolRef) -> &mut Self {
        self.code.push(opcode);
        self.pool_refs.push((self.code.len(), reference));
        self.u16(0)
    }

    /// Allocate a new, unbound label
    pub fn label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind `label` to the current offset
    pub fn bind(&mut self, label: Label) -> &mut Self {
        if let Some(slot) = self.labels.get_mut(label.0) {
            *slot = Some(self.code.len());
        }
        self
    }

    /// Emit a branch instruction to `label`. `goto_w` and `jsr_w` use 4-byte offsets.
    pub fn jump(&mut self, opcode: u8, label: Label) -> &mut Self {
        let instruction = self.code.len();
        let wide = opcode == opcodes::GOTO_W || opcode == opcodes::JSR_W;
        self.code.push(opcode);
        self.branches.push(BranchFixup {
            instruction,
            patch: self.code.len(),
            label,
            wide,
        });
        if wide {
            self.i32(0)
        } else {
            self.u16(0)
        }
    }

    /// Emit a `tableswitch` over `low..low + targets.len()`
    pub fn tableswitch(&mut self, default: Label, low: i32, targets: &[Label]) -> &mut Self {
        let instruction = self.code.len();
        self.code.push(opcodes::TABLESWITCH);
        self.pad_switch();
        self.switch_target(instruction, default);
        self.i32(low).i32(low + targets.len() as i32 - 1);
        for &target in targets {
            self.switch_target(instruction, target);
        }
        self
    }

    /// Emit a `lookupswitch`; `pairs` must be sorted by key
    pub fn lookupswitch(&mut self, default: Label, pairs: &[(i32, Label)]) -> &mut Self {
        let instruction = self.code.len();
        self.code.push(opcodes::LOOKUPSWITCH);
        self.pad_switch();
        self.switch_target(instruction, default);
        self.i32(pairs.len() as i32);
        for &(key, target) in pairs {
            self.i32(key);
            self.switch_target(instruction, target);
        }
        self
    }

    fn pad_switch(&mut self) {
        while self.code.len() % 4 != 0 {
            self.code.push(0);
        }
    }

    fn switch_target(&mut self, instruction: usize, label: Label) {
        self.branches.push(BranchFixup {
            instruction,
            patch: self.code.len(),
            label,
            wide: true,
        });
        self.i32(0);
    }

    /// Register an exception handler for `[start, end)`; `None` catches everything
    pub fn handler(&mut self, start: Label, end: Label, handler: Label, catch_type: Option<&str>) -> &mut Self {
        self.handlers.push(HandlerDecl {
            start,
            end,
            handler,
            catch_type: catch_type.map(str::to_string),
        });
        self
    }

    /// Attribute the following instructions to source `line`
    pub fn line(&mut self, line: u16) -> &mut Self {
        self.lines.push((self.code.len() as u16, line));
        self
    }

    /// Override the operand stack size (default 16)
    pub fn max_stack(&mut self, max_stack: u16) -> &mut Self {
        self.max_stack = Some(max_stack);
        self
    }

    /// Override the local variable count (default: parameters only)
    pub fn max_locals(&mut self, max_locals: u16) -> &mut Self {
        self.max_locals = Some(max_locals);
        self
    }

    fn resolve(&self, label: Label) -> Result<usize> {
        self.labels
            .get(label.0)
            .copied()
            .flatten()
            .ok_or_else(|| malformed_error!("Label {} was never bound", label.0))
    }
}

/// Builder producing class file bytes.
#[derive(Debug)]
pub struct ClassWriter {
    access_flags: ClassAccessFlags,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    pool: Vec<Constant>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    source_file: Option<(u16, u16)>,
}

impl ClassWriter {
    /// Start a public class `name` extending `super_class`
    #[must_use]
    pub fn new(name: &str, super_class: Option<&str>) -> Self {
        let mut writer = ClassWriter {
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            pool: vec![Constant::Unusable],
            fields: Vec::new(),
            methods: Vec::new(),
            source_file: None,
        };
        writer.this_class = writer.class(name);
        if let Some(super_class) = super_class {
            writer.super_class = writer.class(super_class);
        }
        writer
    }

    /// Replace the class access flags
    pub fn access_flags(&mut self, flags: ClassAccessFlags) -> &mut Self {
        self.access_flags = flags;
        self
    }

    /// Add a directly implemented interface
    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    /// Record the `SourceFile` attribute
    pub fn source_file(&mut self, name: &str) -> &mut Self {
        let attribute_name = self.utf8("SourceFile");
        self.source_file = Some((attribute_name, self.utf8(name)));
        self
    }

    /// Declare a field without constant value
    pub fn field(&mut self, flags: FieldAccessFlags, name: &str, descriptor: &str) -> &mut Self {
        let bytes = self.member_header(flags.bits(), name, descriptor, 0);
        self.fields.push(bytes);
        self
    }

    /// Declare a static field initialized from a `ConstantValue` attribute.
    ///
    /// `value` must be `Integer`, `Long`, `Float`, `Double`, or `Utf8` for string constants.
    ///
    /// # Errors
    /// Returns a malformed error for other constant kinds.
    pub fn constant_field(
        &mut self,
        flags: FieldAccessFlags,
        name: &str,
        descriptor: &str,
        value: Constant,
    ) -> Result<&mut Self> {
        let value_index = match value {
            Constant::Utf8(text) => {
                let string_index = self.utf8(&text);
                self.intern(Constant::String { string_index })
            }
            Constant::Integer(_) | Constant::Long(_) | Constant::Float(_) | Constant::Double(_) => {
                self.intern(value)
            }
            other => return Err(malformed_error!("{:?} can not be a ConstantValue", other.tag())),
        };

        let mut bytes = self.member_header(flags.bits(), name, descriptor, 1);
        let attribute_name = self.utf8("ConstantValue");
        bytes.extend_from_slice(&attribute_name.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&value_index.to_be_bytes());
        self.fields.push(bytes);
        Ok(self)
    }

    /// Declare a native method
    pub fn native_method(&mut self, flags: MethodAccessFlags, name: &str, descriptor: &str) -> &mut Self {
        let bytes = self.member_header((flags | MethodAccessFlags::NATIVE).bits(), name, descriptor, 0);
        self.methods.push(bytes);
        self
    }

    /// Declare an abstract method
    pub fn abstract_method(&mut self, flags: MethodAccessFlags, name: &str, descriptor: &str) -> &mut Self {
        let bytes = self.member_header((flags | MethodAccessFlags::ABSTRACT).bits(), name, descriptor, 0);
        self.methods.push(bytes);
        self
    }

    /// Declare a method with a body.
    ///
    /// # Errors
    /// Returns a malformed error for unbound labels, an invalid descriptor, out-of-range
    /// branches or oversized code.
    pub fn method(
        &mut self,
        flags: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        body: Bytecode,
    ) -> Result<&mut Self> {
        let signature = MethodDescriptor::parse(descriptor)?;
        let mut code = body.code.clone();
        if code.is_empty() || code.len() > usize::from(u16::MAX) {
            return Err(malformed_error!("Invalid code length {} for {}", code.len(), name));
        }

        for (patch, reference) in &body.pool_refs {
            let index = self.pool_ref(reference);
            let mut offset = *patch;
            write_be_at(&mut code, &mut offset, index)?;
        }

        for fixup in &body.branches {
            let target = body.resolve(fixup.label)? as i64;
            let delta = target - fixup.instruction as i64;
            let mut offset = fixup.patch;
            if fixup.wide {
                write_be_at(&mut code, &mut offset, delta as i32)?;
            } else {
                let Ok(delta) = i16::try_from(delta) else {
                    return Err(malformed_error!("Branch offset {} out of range", delta));
                };
                write_be_at(&mut code, &mut offset, delta)?;
            }
        }

        let mut handlers = Vec::with_capacity(body.handlers.len());
        for handler in &body.handlers {
            let catch_type = match &handler.catch_type {
                Some(name) => self.class(name),
                None => 0,
            };
            handlers.push([
                body.resolve(handler.start)? as u16,
                body.resolve(handler.end)? as u16,
                body.resolve(handler.handler)? as u16,
                catch_type,
            ]);
        }

        let this_slots = usize::from(!flags.contains(MethodAccessFlags::STATIC));
        let parameter_slots = (signature.parameter_slots() + this_slots) as u16;
        let max_locals = body.max_locals.unwrap_or(0).max(parameter_slots);
        let max_stack = body.max_stack.unwrap_or(16);

        let mut attribute = Vec::new();
        attribute.extend_from_slice(&max_stack.to_be_bytes());
        attribute.extend_from_slice(&max_locals.to_be_bytes());
        attribute.extend_from_slice(&(code.len() as u32).to_be_bytes());
        attribute.extend_from_slice(&code);
        attribute.extend_from_slice(&(handlers.len() as u16).to_be_bytes());
        for row in handlers {
            for value in row {
                attribute.extend_from_slice(&value.to_be_bytes());
            }
        }

        if body.lines.is_empty() {
            attribute.extend_from_slice(&0u16.to_be_bytes());
        } else {
            let table_name = self.utf8("LineNumberTable");
            attribute.extend_from_slice(&1u16.to_be_bytes());
            attribute.extend_from_slice(&table_name.to_be_bytes());
            attribute.extend_from_slice(&((2 + body.lines.len() * 4) as u32).to_be_bytes());
            attribute.extend_from_slice(&(body.lines.len() as u16).to_be_bytes());
            for (pc, line) in &body.lines {
                attribute.extend_from_slice(&pc.to_be_bytes());
                attribute.extend_from_slice(&line.to_be_bytes());
            }
        }

        let mut bytes = self.member_header(flags.bits(), name, descriptor, 1);
        let code_name = self.utf8("Code");
        bytes.extend_from_slice(&code_name.to_be_bytes());
        bytes.extend_from_slice(&(attribute.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&attribute);
        self.methods.push(bytes);
        Ok(self)
    }

    /// Serialize the class file.
    ///
    /// # Errors
    /// Returns a malformed error if the constant pool exceeds 65535 slots.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.pool.len() > usize::from(u16::MAX) {
            return Err(malformed_error!("Constant pool too large: {}", self.pool.len()));
        }

        let mut out = Vec::with_capacity(1024);
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());

        out.extend_from_slice(&(self.pool.len() as u16).to_be_bytes());
        for constant in &self.pool {
            write_constant(&mut out, constant);
        }

        out.extend_from_slice(&self.access_flags.bits().to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }

        for table in [&self.fields, &self.methods] {
            out.extend_from_slice(&(table.len() as u16).to_be_bytes());
            for member in table {
                out.extend_from_slice(member);
            }
        }

        match self.source_file {
            Some((attribute_name, file_index)) => {
                out.extend_from_slice(&1u16.to_be_bytes());
                out.extend_from_slice(&attribute_name.to_be_bytes());
                out.extend_from_slice(&2u32.to_be_bytes());
                out.extend_from_slice(&file_index.to_be_bytes());
            }
            None => out.extend_from_slice(&0u16.to_be_bytes()),
        }

        Ok(out)
    }

    fn member_header(&mut self, flags: u16, name: &str, descriptor: &str, attributes: u16) -> Vec<u8> {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let mut bytes = Vec::with_capacity(8);
        bytes.extend_from_slice(&flags.to_be_bytes());
        bytes.extend_from_slice(&name.to_be_bytes());
        bytes.extend_from_slice(&descriptor.to_be_bytes());
        bytes.extend_from_slice(&attributes.to_be_bytes());
        bytes
    }

    fn intern(&mut self, constant: Constant) -> u16 {
        if let Some(index) = self.pool.iter().position(|c| c == &constant) {
            return index as u16;
        }
        let wide = constant.is_wide();
        self.pool.push(constant);
        let index = self.pool.len() - 1;
        if wide {
            self.pool.push(Constant::Unusable);
        }
        index as u16
    }

    fn utf8(&mut self, text: &str) -> u16 {
        self.intern(Constant::Utf8(text.to_string()))
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.intern(Constant::Class { name_index })
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.intern(Constant::NameAndType {
            name_index,
            descriptor_index,
        })
    }

    fn pool_ref(&mut self, reference: &PoolRef) -> u16 {
        match reference {
            PoolRef::Class(name) => self.class(name),
            PoolRef::String(text) => {
                let string_index = self.utf8(text);
                self.intern(Constant::String { string_index })
            }
            PoolRef::Integer(value) => self.intern(Constant::Integer(*value)),
            PoolRef::Float(value) => self.intern(Constant::Float(*value)),
            PoolRef::Long(value) => self.intern(Constant::Long(*value)),
            PoolRef::Double(value) => self.intern(Constant::Double(*value)),
            PoolRef::Field(class, name, descriptor) => {
                let class_index = self.class(class);
                let name_and_type_index = self.name_and_type(name, descriptor);
                self.intern(Constant::Fieldref {
                    class_index,
                    name_and_type_index,
                })
            }
            PoolRef::Method(class, name, descriptor) => {
                let class_index = self.class(class);
                let name_and_type_index = self.name_and_type(name, descriptor);
                self.intern(Constant::Methodref {
                    class_index,
                    name_and_type_index,
                })
            }
            PoolRef::InterfaceMethod(class, name, descriptor) => {
                let class_index = self.class(class);
                let name_and_type_index = self.name_and_type(name, descriptor);
                self.intern(Constant::InterfaceMethodref {
                    class_index,
                    name_and_type_index,
                })
            }
        }
    }
}

fn write_constant(out: &mut Vec<u8>, constant: &Constant) {
    let Some(tag) = constant.tag() else {
        return;
    };
    out.push(tag as u8);

    match constant {
        Constant::Unusable => {}
        Constant::Utf8(text) => {
            let bytes = encode_modified_utf8(text);
            out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            out.extend_from_slice(&bytes);
        }
        Constant::Integer(value) => out.extend_from_slice(&value.to_be_bytes()),
        Constant::Float(value) => out.extend_from_slice(&value.to_be_bytes()),
        Constant::Long(value) => out.extend_from_slice(&value.to_be_bytes()),
        Constant::Double(value) => out.extend_from_slice(&value.to_be_bytes()),
        Constant::Class { name_index: index }
        | Constant::String {
            string_index: index,
        }
        | Constant::MethodType {
            descriptor_index: index,
        }
        | Constant::Module { name_index: index }
        | Constant::Package { name_index: index } => out.extend_from_slice(&index.to_be_bytes()),
        Constant::Fieldref {
            class_index: a,
            name_and_type_index: b,
        }
        | Constant::Methodref {
            class_index: a,
            name_and_type_index: b,
        }
        | Constant::InterfaceMethodref {
            class_index: a,
            name_and_type_index: b,
        }
        | Constant::NameAndType {
            name_index: a,
            descriptor_index: b,
        }
        | Constant::Dynamic {
            bootstrap_method_attr_index: a,
            name_and_type_index: b,
        }
        | Constant::InvokeDynamic {
            bootstrap_method_attr_index: a,
            name_and_type_index: b,
        } => {
            out.extend_from_slice(&a.to_be_bytes());
            out.extend_from_slice(&b.to_be_bytes());
        }
        Constant::MethodHandle {
            reference_kind,
            reference_index,
        } => {
            out.push(*reference_kind);
            out.extend_from_slice(&reference_index.to_be_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::ClassFile;

    #[test]
    fn labels_and_handlers() {
        let mut code = Bytecode::new();
        let start = code.label();
        let end = code.label();
        let handler = code.label();
        let done = code.label();

        code.bind(start)
            .iconst(1)
            .iconst(0)
            .op(opcodes::IDIV)
            .op(opcodes::POP)
            .bind(end)
            .jump(opcodes::GOTO, done)
            .bind(handler)
            .op(opcodes::POP)
            .bind(done)
            .op(opcodes::RETURN)
            .handler(start, end, handler, Some("java/lang/ArithmeticException"));

        let mut writer = ClassWriter::new("demo/Handlers", Some("java/lang/Object"));
        writer
            .method(MethodAccessFlags::STATIC, "run", "()V", code)
            .unwrap();
        let class = ClassFile::parse(&writer.to_bytes().unwrap()).unwrap();

        let body = class.find_method("run", "()V").unwrap().code.as_ref().unwrap();
        assert_eq!(body.code[4], opcodes::GOTO);
        assert_eq!(i16::from_be_bytes([body.code[5], body.code[6]]), 4);
        assert_eq!(body.exception_table.len(), 1);
        let entry = body.exception_table[0];
        assert_eq!((entry.start_pc, entry.end_pc, entry.handler_pc), (0, 4, 7));
        assert_eq!(
            class.constant_pool().class_name(entry.catch_type).unwrap(),
            "java/lang/ArithmeticException"
        );
    }

    #[test]
    fn unbound_label_is_an_error() {
        let mut code = Bytecode::new();
        let nowhere = code.label();
        code.jump(opcodes::GOTO, nowhere);

        let mut writer = ClassWriter::new("demo/Broken", Some("java/lang/Object"));
        assert!(writer.method(MethodAccessFlags::STATIC, "run", "()V", code).is_err());
    }

    #[test]
    fn pool_is_deduplicated() {
        let mut code = Bytecode::new();
        code.ldc_string("hi")
            .ldc_string("hi")
            .lconst(1_000_000_000_000)
            .op(opcodes::POP2)
            .op(opcodes::POP)
            .op(opcodes::POP)
            .op(opcodes::RETURN);

        let mut writer = ClassWriter::new("demo/Pool", Some("java/lang/Object"));
        writer.method(MethodAccessFlags::STATIC, "run", "()V", code).unwrap();
        let class = ClassFile::parse(&writer.to_bytes().unwrap()).unwrap();

        let body = &class.find_method("run", "()V").unwrap().code.as_ref().unwrap().code;
        assert_eq!(&body[1..3], &body[4..6]);
        let strings = class
            .constant_pool()
            .iter()
            .filter(|(_, c)| matches!(c, Constant::String { .. }))
            .count();
        assert_eq!(strings, 1);
        assert_eq!(body[6], opcodes::LDC2_W);
    }

    #[test]
    fn tableswitch_padding() {
        let mut code = Bytecode::new();
        let default = code.label();
        let one = code.label();
        code.iconst(1)
            .tableswitch(default, 1, &[one])
            .bind(one)
            .bind(default)
            .op(opcodes::RETURN);

        let mut writer = ClassWriter::new("demo/Switch", Some("java/lang/Object"));
        writer.method(MethodAccessFlags::STATIC, "run", "()V", code).unwrap();
        let class = ClassFile::parse(&writer.to_bytes().unwrap()).unwrap();

        let body = &class.find_method("run", "()V").unwrap().code.as_ref().unwrap().code;
        // iconst_1, tableswitch at 1, two bytes padding, default/low/high/1 target
        assert_eq!(body.len(), 1 + 1 + 2 + 16 + 1);
        assert_eq!(i32::from_be_bytes([body[4], body[5], body[6], body[7]]), 19);
    }
}
