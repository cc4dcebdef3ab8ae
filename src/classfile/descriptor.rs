//! Field and method descriptors.
//!
//! ```text
//! FieldType   := B | C | D | F | I | J | S | Z | L<binary name>; | [FieldType
//! Method      := ( FieldType* ) ( FieldType | V )
//! ```

use std::fmt;

use crate::Result;

/// A parsed field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `D`
    Double,
    /// `F`
    Float,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `S`
    Short,
    /// `Z`
    Boolean,
    /// `L<name>;`
    Object(String),
    /// `[<component>`
    Array(Box<FieldType>),
}

impl FieldType {
    /// Parse a complete field descriptor.
    ///
    /// # Errors
    /// Returns a malformed error if `descriptor` is not exactly one field type.
    pub fn parse(descriptor: &str) -> Result<FieldType> {
        let (field, rest) = Self::parse_prefix(descriptor)?;
        if !rest.is_empty() {
            return Err(malformed_error!("Trailing data in field descriptor '{}'", descriptor));
        }
        Ok(field)
    }

    fn parse_prefix(input: &str) -> Result<(FieldType, &str)> {
        let Some(first) = input.chars().next() else {
            return Err(malformed_error!("Empty field descriptor"));
        };
        let rest = &input[first.len_utf8()..];

        let field = match first {
            'B' => FieldType::Byte,
            'C' => FieldType::Char,
            'D' => FieldType::Double,
            'F' => FieldType::Float,
            'I' => FieldType::Int,
            'J' => FieldType::Long,
            'S' => FieldType::Short,
            'Z' => FieldType::Boolean,
            'L' => {
                let Some(end) = rest.find(';') else {
                    return Err(malformed_error!("Unterminated class type in '{}'", input));
                };
                if end == 0 {
                    return Err(malformed_error!("Empty class name in '{}'", input));
                }
                return Ok((FieldType::Object(rest[..end].to_string()), &rest[end + 1..]));
            }
            '[' => {
                let (component, rest) = Self::parse_prefix(rest)?;
                return Ok((FieldType::Array(Box::new(component)), rest));
            }
            other => return Err(malformed_error!("Invalid descriptor character '{}'", other)),
        };

        Ok((field, rest))
    }

    /// True for `long` and `double`, the two category 2 types
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, FieldType::Long | FieldType::Double)
    }

    /// True for object and array types
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::Object(_) | FieldType::Array(_))
    }

    /// Number of local variable slots a value of this type occupies
    #[must_use]
    pub fn slots(&self) -> usize {
        if self.is_wide() {
            2
        } else {
            1
        }
    }

    /// The Java source name of a primitive type (`int`, `boolean`, ...)
    #[must_use]
    pub fn primitive_name(&self) -> Option<&'static str> {
        Some(match self {
            FieldType::Byte => "byte",
            FieldType::Char => "char",
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Short => "short",
            FieldType::Boolean => "boolean",
            FieldType::Object(_) | FieldType::Array(_) => return None,
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Byte => write!(f, "B"),
            FieldType::Char => write!(f, "C"),
            FieldType::Double => write!(f, "D"),
            FieldType::Float => write!(f, "F"),
            FieldType::Int => write!(f, "I"),
            FieldType::Long => write!(f, "J"),
            FieldType::Short => write!(f, "S"),
            FieldType::Boolean => write!(f, "Z"),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(component) => write!(f, "[{component}"),
        }
    }
}

/// A parsed method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Parameter types in declaration order
    pub parameters: Vec<FieldType>,
    /// Return type, `None` for `void`
    pub returns: Option<FieldType>,
}

impl MethodDescriptor {
    /// Parse a method descriptor such as `(ILjava/lang/String;)V`.
    ///
    /// # Errors
    /// Returns a malformed error for anything that is not a valid method descriptor.
    pub fn parse(descriptor: &str) -> Result<MethodDescriptor> {
        let Some(mut rest) = descriptor.strip_prefix('(') else {
            return Err(malformed_error!("Method descriptor '{}' must start with '('", descriptor));
        };

        let mut parameters = Vec::new();
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            let (parameter, after) = FieldType::parse_prefix(rest)?;
            parameters.push(parameter);
            rest = after;
        }

        let returns = if rest == "V" {
            None
        } else {
            Some(FieldType::parse(rest)?)
        };

        Ok(MethodDescriptor {
            parameters,
            returns,
        })
    }

    /// Number of local variable slots taken by the parameters (without `this`)
    #[must_use]
    pub fn parameter_slots(&self) -> usize {
        self.parameters.iter().map(FieldType::slots).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_types() {
        assert_eq!(FieldType::parse("I").unwrap(), FieldType::Int);
        assert_eq!(
            FieldType::parse("Ljava/lang/String;").unwrap(),
            FieldType::Object("java/lang/String".into())
        );
        assert_eq!(
            FieldType::parse("[[J").unwrap(),
            FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Long))))
        );
        assert_eq!(FieldType::parse("[Ljava/lang/Object;").unwrap().to_string(), "[Ljava/lang/Object;");

        assert!(FieldType::parse("").is_err());
        assert!(FieldType::parse("Ljava/lang/String").is_err());
        assert!(FieldType::parse("L;").is_err());
        assert!(FieldType::parse("II").is_err());
        assert!(FieldType::parse("V").is_err());
    }

    #[test]
    fn method_descriptors() {
        let descriptor = MethodDescriptor::parse("(IJLjava/lang/String;[D)V").unwrap();
        assert_eq!(descriptor.parameters.len(), 4);
        assert_eq!(descriptor.parameter_slots(), 5);
        assert_eq!(descriptor.returns, None);

        let descriptor = MethodDescriptor::parse("()Ljava/lang/Object;").unwrap();
        assert!(descriptor.parameters.is_empty());
        assert_eq!(descriptor.returns, Some(FieldType::Object("java/lang/Object".into())));

        assert!(MethodDescriptor::parse("I)V").is_err());
        assert!(MethodDescriptor::parse("(I").is_err());
        assert!(MethodDescriptor::parse("(I)VV").is_err());
    }
}
