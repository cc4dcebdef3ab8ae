//! Runtime values held in locals, operand stacks, fields and array elements.

use std::{fmt, sync::Arc};

use crate::{classfile::FieldType, runtime::InstanceRef, Error, Result};

/// A single JVM value.
///
/// `Long` and `Double` occupy one operand stack entry but two local variable slots; the
/// second slot holds [`Value::Top`].
#[derive(Clone, Default)]
pub enum Value {
    /// `int`, and the widened form of `boolean`, `byte`, `char` and `short`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// A non-null object or array reference
    Reference(InstanceRef),
    /// The null reference
    #[default]
    Null,
    /// Bytecode offset pushed by `jsr`
    ReturnAddress(usize),
    /// Unusable upper half of a long or double local
    Top,
}

impl Value {
    /// Default (zero) value of a field or array element of type `field_type`
    #[must_use]
    pub fn default_for(field_type: &FieldType) -> Value {
        match field_type {
            FieldType::Long => Value::Long(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Double => Value::Double(0.0),
            FieldType::Object(_) | FieldType::Array(_) => Value::Null,
            _ => Value::Int(0),
        }
    }

    /// Default value for a field with the raw descriptor `descriptor`
    #[must_use]
    pub fn default_for_descriptor(descriptor: &str) -> Value {
        match descriptor.as_bytes().first() {
            Some(b'J') => Value::Long(0),
            Some(b'F') => Value::Float(0.0),
            Some(b'D') => Value::Double(0.0),
            Some(b'L' | b'[') => Value::Null,
            _ => Value::Int(0),
        }
    }

    /// Build an `int` holding a Java boolean
    #[must_use]
    pub fn from_bool(value: bool) -> Value {
        Value::Int(i32::from(value))
    }

    /// Wrap an optional reference
    #[must_use]
    pub fn from_ref(value: Option<InstanceRef>) -> Value {
        value.map_or(Value::Null, Value::Reference)
    }

    /// True for computational category 2 values (`long`, `double`)
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, Value::Long(_) | Value::Double(_))
    }

    /// True for `null`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind of the value, as used in diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Reference(_) => "reference",
            Value::Null => "null",
            Value::ReturnAddress(_) => "returnAddress",
            Value::Top => "top",
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind().to_string(),
        }
    }

    /// The `int` payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] for any other kind of value.
    pub fn as_int(&self) -> Result<i32> {
        match self {
            Value::Int(value) => Ok(*value),
            other => Err(other.mismatch("int")),
        }
    }

    /// The `long` payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] for any other kind of value.
    pub fn as_long(&self) -> Result<i64> {
        match self {
            Value::Long(value) => Ok(*value),
            other => Err(other.mismatch("long")),
        }
    }

    /// The `float` payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] for any other kind of value.
    pub fn as_float(&self) -> Result<f32> {
        match self {
            Value::Float(value) => Ok(*value),
            other => Err(other.mismatch("float")),
        }
    }

    /// The `double` payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] for any other kind of value.
    pub fn as_double(&self) -> Result<f64> {
        match self {
            Value::Double(value) => Ok(*value),
            other => Err(other.mismatch("double")),
        }
    }

    /// The reference payload, `None` for `null`
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] for primitive values.
    pub fn as_reference(&self) -> Result<Option<&InstanceRef>> {
        match self {
            Value::Reference(instance) => Ok(Some(instance)),
            Value::Null => Ok(None),
            other => Err(other.mismatch("reference")),
        }
    }

    /// The `jsr` return address
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] for any other kind of value.
    pub fn as_return_address(&self) -> Result<usize> {
        match self {
            Value::ReturnAddress(pc) => Ok(*pc),
            other => Err(other.mismatch("returnAddress")),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Reference(a), Value::Reference(b)) => Arc::ptr_eq(a, b),
            (Value::ReturnAddress(a), Value::ReturnAddress(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Top, Value::Top) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "Int({value})"),
            Value::Long(value) => write!(f, "Long({value})"),
            Value::Float(value) => write!(f, "Float({value})"),
            Value::Double(value) => write!(f, "Double({value})"),
            Value::Reference(instance) => write!(f, "Reference({})", instance.class().name()),
            Value::Null => write!(f, "Null"),
            Value::ReturnAddress(pc) => write!(f, "ReturnAddress({pc})"),
            Value::Top => write!(f, "Top"),
        }
    }
}
