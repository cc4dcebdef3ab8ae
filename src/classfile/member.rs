use crate::{
    classfile::{
        attribute::{Attribute, Code, MemberAttributes},
        constant::ConstantPool,
        descriptor::{FieldType, MethodDescriptor},
        flags::{FieldAccessFlags, MethodAccessFlags},
    },
    file::parser::Parser,
    Result,
};

/// A field declared by a class file.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Position in the class file's field table
    pub index: usize,
    /// Access flags
    pub access_flags: FieldAccessFlags,
    /// Field name
    pub name: String,
    /// Field descriptor
    pub descriptor: String,
    /// Parsed descriptor
    pub field_type: FieldType,
    /// Constant pool index of the `ConstantValue` attribute
    pub constant_value: Option<u16>,
    /// Attributes the runtime does not interpret
    pub attributes: Vec<Attribute>,
}

impl FieldInfo {
    pub(crate) fn parse(parser: &mut Parser, pool: &ConstantPool, index: usize) -> Result<FieldInfo> {
        let access_flags = FieldAccessFlags::from_bits_truncate(parser.read_be()?);
        let name = pool.utf8(parser.read_be()?)?.to_string();
        let descriptor = pool.utf8(parser.read_be()?)?.to_string();
        let field_type = FieldType::parse(&descriptor)?;
        let attributes = MemberAttributes::parse(parser, pool)?;

        Ok(FieldInfo {
            index,
            access_flags,
            name,
            descriptor,
            field_type,
            constant_value: attributes.constant_value,
            attributes: attributes.other,
        })
    }

    /// True for class (static) fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::STATIC)
    }
}

/// A method declared by a class file.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Position in the class file's method table
    pub index: usize,
    /// Access flags
    pub access_flags: MethodAccessFlags,
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Parsed descriptor
    pub signature: MethodDescriptor,
    /// Method body, absent for native and abstract methods
    pub code: Option<Code>,
    /// Declared checked exceptions
    pub exceptions: Vec<String>,
    /// Attributes the runtime does not interpret
    pub attributes: Vec<Attribute>,
}

impl MethodInfo {
    pub(crate) fn parse(parser: &mut Parser, pool: &ConstantPool, index: usize) -> Result<MethodInfo> {
        let access_flags = MethodAccessFlags::from_bits_truncate(parser.read_be()?);
        let name = pool.utf8(parser.read_be()?)?.to_string();
        let descriptor = pool.utf8(parser.read_be()?)?.to_string();
        let signature = MethodDescriptor::parse(&descriptor)?;
        let attributes = MemberAttributes::parse(parser, pool)?;

        let bodyless = access_flags.intersects(MethodAccessFlags::NATIVE | MethodAccessFlags::ABSTRACT);
        if !bodyless && attributes.code.is_none() {
            return Err(malformed_error!("Method {}{} has no Code attribute", name, descriptor));
        }

        Ok(MethodInfo {
            index,
            access_flags,
            name,
            descriptor,
            signature,
            code: attributes.code,
            exceptions: attributes.exceptions,
            attributes: attributes.other,
        })
    }

    /// True for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    /// True for native methods
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::NATIVE)
    }

    /// True for abstract methods
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::ABSTRACT)
    }

    /// True for synchronized methods
    #[must_use]
    pub fn is_synchronized(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::SYNCHRONIZED)
    }
}
