//! Binary class file decoding and encoding.
//!
//! [`ClassFile::parse`] turns the bytes of a `.class` file into an immutable, fully decoded
//! description: constant pool, access flags, super class and interface names, fields and
//! methods with their `Code` attributes. The runtime links these descriptions into
//! [`crate::runtime::Class`] objects; the disassembler renders them.
//!
//! [`ClassWriter`] goes the other way and produces valid class file bytes from a small builder
//! API, which is how embedders and the test suite create classes without a Java compiler.
//!
//! # Examples
//!
//! ```rust
//! use jvmrt::classfile::{Bytecode, ClassFile, ClassWriter, MethodAccessFlags};
//! use jvmrt::disassembler::opcodes;
//!
//! let mut writer = ClassWriter::new("demo/Answer", Some("java/lang/Object"));
//! let mut code = Bytecode::new();
//! code.op(opcodes::BIPUSH).u8(42).op(opcodes::IRETURN);
//! writer.method(MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC, "get", "()I", code)?;
//!
//! let class = ClassFile::parse(&writer.to_bytes()?)?;
//! assert_eq!(class.this_class(), "demo/Answer");
//! assert!(class.find_method("get", "()I").is_some());
//! # Ok::<(), jvmrt::Error>(())
//! ```

mod attribute;
mod constant;
mod descriptor;
mod flags;
mod member;
mod writer;

pub use attribute::{Attribute, Code, ExceptionTableEntry, LineNumber};
pub use constant::{
    decode_modified_utf8, encode_modified_utf8, Constant, ConstantPool, ConstantTag, MemberRef,
};
pub use descriptor::{FieldType, MethodDescriptor};
pub use flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use member::{FieldInfo, MethodInfo};
pub use writer::{Bytecode, ClassWriter, Label};

use std::path::Path;

use crate::{
    classfile::attribute::read_attributes,
    file::{parser::Parser, File},
    Result,
};

/// Magic number opening every class file
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Name of the static initializer method
pub const CLASS_INITIALIZER: &str = "<clinit>";
/// Name of instance constructors
pub const CONSTRUCTOR: &str = "<init>";

/// A decoded class file.
#[derive(Debug, Clone)]
pub struct ClassFile {
    minor_version: u16,
    major_version: u16,
    constant_pool: ConstantPool,
    access_flags: ClassAccessFlags,
    this_class: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    source_file: Option<String>,
    attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Decode a class file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] for anything that is
    /// not a well-formed class file, [`crate::Error::Empty`] for empty input.
    pub fn parse(data: &[u8]) -> Result<ClassFile> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        let mut parser = Parser::new(data);
        let magic = parser.read_be::<u32>()?;
        if magic != MAGIC {
            return Err(malformed_error!("Invalid magic {:#010x}", magic));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        let constant_pool = ConstantPool::parse(&mut parser)?;
        let access_flags = ClassAccessFlags::from_bits_truncate(parser.read_be()?);
        let this_class = constant_pool.class_name(parser.read_be()?)?.to_string();

        let super_index = parser.read_be::<u16>()?;
        let super_class = if super_index == 0 {
            None
        } else {
            Some(constant_pool.class_name(super_index)?.to_string())
        };
        if super_class.is_none() && this_class != "java/lang/Object" {
            return Err(malformed_error!("Class {} has no super class", this_class));
        }

        let interface_count = parser.read_be::<u16>()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(constant_pool.class_name(parser.read_be()?)?.to_string());
        }

        let field_count = parser.read_be::<u16>()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for index in 0..field_count {
            fields.push(FieldInfo::parse(&mut parser, &constant_pool, index)?);
        }

        let method_count = parser.read_be::<u16>()? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for index in 0..method_count {
            methods.push(MethodInfo::parse(&mut parser, &constant_pool, index)?);
        }

        let mut source_file = None;
        let mut attributes = Vec::new();
        for (name, data) in read_attributes(&mut parser, &constant_pool)? {
            if name == "SourceFile" {
                let mut payload = Parser::new(data);
                source_file = Some(constant_pool.utf8(payload.read_be()?)?.to_string());
            } else {
                attributes.push(Attribute {
                    name: name.to_string(),
                    data: data.to_vec(),
                });
            }
        }

        if parser.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes after class {}",
                parser.remaining(),
                this_class
            ));
        }

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            source_file,
            attributes,
        })
    }

    /// Load and decode the class file at `path`.
    ///
    /// # Errors
    /// Returns I/O errors from opening the file and all errors of [`ClassFile::parse`].
    pub fn from_file(path: &Path) -> Result<ClassFile> {
        let file = File::from_file(path)?;
        Self::parse(file.data())
    }

    /// `(major, minor)` version
    #[must_use]
    pub fn version(&self) -> (u16, u16) {
        (self.major_version, self.minor_version)
    }

    /// The constant pool
    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    /// Class access flags
    #[must_use]
    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    /// Binary name of this class, e.g. `java/lang/String`
    #[must_use]
    pub fn this_class(&self) -> &str {
        &self.this_class
    }

    /// Binary name of the super class, `None` only for `java/lang/Object`
    #[must_use]
    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_deref()
    }

    /// Directly implemented interfaces, in declaration order
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// All declared fields, in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// All declared methods, in declaration order
    #[must_use]
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// Name of the source file, if recorded
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Class level attributes the decoder does not interpret
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// True if this class file declares an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }

    /// Find a declared field by name and descriptor
    #[must_use]
    pub fn find_field(&self, name: &str, descriptor: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.descriptor == descriptor)
    }

    /// Find a declared method by name and descriptor
    #[must_use]
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// Declared static fields, in declaration order
    pub fn static_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.is_static())
    }

    /// Declared instance fields, in declaration order
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| !f.is_static())
    }

    /// The static initializer, if declared
    #[must_use]
    pub fn class_initializer(&self) -> Option<&MethodInfo> {
        self.find_method(CLASS_INITIALIZER, "()V")
    }
}
