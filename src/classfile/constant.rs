//! The constant pool of a class file.
//!
//! Entries are stored at their class-file index. Index 0 and the slot following every `Long` or
//! `Double` entry hold [`Constant::Unusable`], so indices taken from bytecode operands can be
//! used directly.

use std::fmt::Write as _;

use strum::{Display, FromRepr};

use crate::{file::parser::Parser, Result};

/// Tag byte identifying the kind of a constant pool entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

/// A single constant pool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Placeholder for index 0 and the upper half of 8-byte constants
    Unusable,
    /// Decoded modified UTF-8 text
    Utf8(String),
    /// `int` literal
    Integer(i32),
    /// `float` literal
    Float(f32),
    /// `long` literal
    Long(i64),
    /// `double` literal
    Double(f64),
    /// Symbolic class reference
    Class {
        /// Index of the `Utf8` binary name
        name_index: u16,
    },
    /// `java/lang/String` literal
    String {
        /// Index of the `Utf8` contents
        string_index: u16,
    },
    /// Symbolic field reference
    Fieldref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Symbolic class method reference
    Methodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Symbolic interface method reference
    InterfaceMethodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Name and descriptor pair
    NameAndType {
        /// Index of the `Utf8` name
        name_index: u16,
        /// Index of the `Utf8` descriptor
        descriptor_index: u16,
    },
    /// Method handle
    MethodHandle {
        /// Kind of the handle (1..=9)
        reference_kind: u8,
        /// Index of the referenced member
        reference_index: u16,
    },
    /// Method type
    MethodType {
        /// Index of the `Utf8` descriptor
        descriptor_index: u16,
    },
    /// Dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Call site for `invokedynamic`
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// Module reference
    Module {
        /// Index of the `Utf8` module name
        name_index: u16,
    },
    /// Package reference
    Package {
        /// Index of the `Utf8` package name
        name_index: u16,
    },
}

impl Constant {
    /// The tag of this entry, `None` for [`Constant::Unusable`]
    #[must_use]
    pub fn tag(&self) -> Option<ConstantTag> {
        Some(match self {
            Constant::Unusable => return None,
            Constant::Utf8(_) => ConstantTag::Utf8,
            Constant::Integer(_) => ConstantTag::Integer,
            Constant::Float(_) => ConstantTag::Float,
            Constant::Long(_) => ConstantTag::Long,
            Constant::Double(_) => ConstantTag::Double,
            Constant::Class { .. } => ConstantTag::Class,
            Constant::String { .. } => ConstantTag::String,
            Constant::Fieldref { .. } => ConstantTag::Fieldref,
            Constant::Methodref { .. } => ConstantTag::Methodref,
            Constant::InterfaceMethodref { .. } => ConstantTag::InterfaceMethodref,
            Constant::NameAndType { .. } => ConstantTag::NameAndType,
            Constant::MethodHandle { .. } => ConstantTag::MethodHandle,
            Constant::MethodType { .. } => ConstantTag::MethodType,
            Constant::Dynamic { .. } => ConstantTag::Dynamic,
            Constant::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
            Constant::Module { .. } => ConstantTag::Module,
            Constant::Package { .. } => ConstantTag::Package,
        })
    }

    /// True for `Long` and `Double`, which occupy two pool slots
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }
}

/// A resolved symbolic member reference (`Fieldref`, `Methodref` or `InterfaceMethodref`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'a> {
    /// Binary name of the class named by the reference
    pub class: &'a str,
    /// Member name
    pub name: &'a str,
    /// Member descriptor
    pub descriptor: &'a str,
    /// Reference was an `InterfaceMethodref`
    pub interface: bool,
}

/// The constant pool of one class file.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    /// Read `constant_pool_count` and all entries from `parser`.
    ///
    /// # Errors
    /// Returns an error on an unknown tag, truncated data or invalid modified UTF-8.
    pub fn parse(parser: &mut Parser) -> Result<ConstantPool> {
        let count = parser.read_be::<u16>()? as usize;
        if count == 0 {
            return Err(malformed_error!("Constant pool count must be at least 1"));
        }

        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let tag = parser.read_be::<u8>()?;
            let constant = match ConstantTag::from_repr(tag) {
                Some(ConstantTag::Utf8) => {
                    let length = parser.read_be::<u16>()? as usize;
                    Constant::Utf8(decode_modified_utf8(parser.read_bytes(length)?)?)
                }
                Some(ConstantTag::Integer) => Constant::Integer(parser.read_be()?),
                Some(ConstantTag::Float) => Constant::Float(parser.read_be()?),
                Some(ConstantTag::Long) => Constant::Long(parser.read_be()?),
                Some(ConstantTag::Double) => Constant::Double(parser.read_be()?),
                Some(ConstantTag::Class) => Constant::Class {
                    name_index: parser.read_be()?,
                },
                Some(ConstantTag::String) => Constant::String {
                    string_index: parser.read_be()?,
                },
                Some(ConstantTag::Fieldref) => Constant::Fieldref {
                    class_index: parser.read_be()?,
                    name_and_type_index: parser.read_be()?,
                },
                Some(ConstantTag::Methodref) => Constant::Methodref {
                    class_index: parser.read_be()?,
                    name_and_type_index: parser.read_be()?,
                },
                Some(ConstantTag::InterfaceMethodref) => Constant::InterfaceMethodref {
                    class_index: parser.read_be()?,
                    name_and_type_index: parser.read_be()?,
                },
                Some(ConstantTag::NameAndType) => Constant::NameAndType {
                    name_index: parser.read_be()?,
                    descriptor_index: parser.read_be()?,
                },
                Some(ConstantTag::MethodHandle) => Constant::MethodHandle {
                    reference_kind: parser.read_be()?,
                    reference_index: parser.read_be()?,
                },
                Some(ConstantTag::MethodType) => Constant::MethodType {
                    descriptor_index: parser.read_be()?,
                },
                Some(ConstantTag::Dynamic) => Constant::Dynamic {
                    bootstrap_method_attr_index: parser.read_be()?,
                    name_and_type_index: parser.read_be()?,
                },
                Some(ConstantTag::InvokeDynamic) => Constant::InvokeDynamic {
                    bootstrap_method_attr_index: parser.read_be()?,
                    name_and_type_index: parser.read_be()?,
                },
                Some(ConstantTag::Module) => Constant::Module {
                    name_index: parser.read_be()?,
                },
                Some(ConstantTag::Package) => Constant::Package {
                    name_index: parser.read_be()?,
                },
                None => {
                    return Err(malformed_error!(
                        "Invalid constant pool tag {} at index {}",
                        tag,
                        entries.len()
                    ))
                }
            };

            let wide = constant.is_wide();
            entries.push(constant);
            if wide {
                if entries.len() >= count {
                    return Err(malformed_error!("8-byte constant occupies the last pool slot"));
                }
                entries.push(Constant::Unusable);
            }
        }

        Ok(ConstantPool { entries })
    }

    pub(crate) fn from_entries(entries: Vec<Constant>) -> ConstantPool {
        ConstantPool { entries }
    }

    /// Number of slots, including the unusable index 0
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the pool has no usable entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Iterate over `(index, entry)` pairs, skipping unusable slots
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, c)| !matches!(c, Constant::Unusable))
            .map(|(i, c)| (i as u16, c))
    }

    /// The entry at `index`.
    ///
    /// # Errors
    /// Returns a malformed error for out-of-range or unusable indices.
    pub fn get(&self, index: u16) -> Result<&Constant> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(malformed_error!(
                "Invalid constant pool index {} (pool size {})",
                index,
                self.entries.len()
            )),
            Some(constant) => Ok(constant),
        }
    }

    /// The text of the `Utf8` entry at `index`.
    ///
    /// # Errors
    /// Returns a malformed error if the entry is missing or not `Utf8`.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(text) => Ok(text),
            other => Err(malformed_error!("Expected Utf8 at {}, found {:?}", index, other.tag())),
        }
    }

    /// The binary name of the `Class` entry at `index`.
    ///
    /// # Errors
    /// Returns a malformed error if the entry is missing or not `Class`.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            other => Err(malformed_error!("Expected Class at {}, found {:?}", index, other.tag())),
        }
    }

    /// The contents of the `String` entry at `index`.
    ///
    /// # Errors
    /// Returns a malformed error if the entry is missing or not `String`.
    pub fn string(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::String { string_index } => self.utf8(*string_index),
            other => Err(malformed_error!("Expected String at {}, found {:?}", index, other.tag())),
        }
    }

    /// Name and descriptor of the `NameAndType` entry at `index`.
    ///
    /// # Errors
    /// Returns a malformed error if the entry is missing or not `NameAndType`.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(malformed_error!(
                "Expected NameAndType at {}, found {:?}",
                index,
                other.tag()
            )),
        }
    }

    /// The member reference at `index`.
    ///
    /// # Errors
    /// Returns a malformed error if the entry is not a field, method or interface method
    /// reference.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>> {
        let (class_index, nat_index, interface) = match self.get(index)? {
            Constant::Fieldref {
                class_index,
                name_and_type_index,
            }
            | Constant::Methodref {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index, false),
            Constant::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index, true),
            other => {
                return Err(malformed_error!(
                    "Expected member reference at {}, found {:?}",
                    index,
                    other.tag()
                ))
            }
        };

        let (name, descriptor) = self.name_and_type(nat_index)?;
        Ok(MemberRef {
            class: self.class_name(class_index)?,
            name,
            descriptor,
            interface,
        })
    }

    /// Human readable form of the entry at `index`, used to annotate disassembly.
    ///
    /// Invalid references render as `<invalid #n>` instead of failing.
    #[must_use]
    pub fn describe(&self, index: u16) -> String {
        let Ok(constant) = self.get(index) else {
            return format!("<invalid #{index}>");
        };

        let rendered = match constant {
            Constant::Unusable => None,
            Constant::Utf8(text) => Some(text.clone()),
            Constant::Integer(value) => Some(value.to_string()),
            Constant::Float(value) => Some(format!("{value}f")),
            Constant::Long(value) => Some(format!("{value}l")),
            Constant::Double(value) => Some(format!("{value}d")),
            Constant::Class { .. } => self.class_name(index).ok().map(str::to_string),
            Constant::String { .. } => self.string(index).ok().map(|s| format!("{s:?}")),
            Constant::Fieldref { .. } => self
                .member_ref(index)
                .ok()
                .map(|m| format!("{}.{}:{}", m.class, m.name, m.descriptor)),
            Constant::Methodref { .. } | Constant::InterfaceMethodref { .. } => self
                .member_ref(index)
                .ok()
                .map(|m| format!("{}.{}{}", m.class, m.name, m.descriptor)),
            Constant::NameAndType { .. } => self
                .name_and_type(index)
                .ok()
                .map(|(n, d)| format!("{n}:{d}")),
            Constant::MethodHandle {
                reference_kind,
                reference_index,
            } => Some(format!(
                "kind {} {}",
                reference_kind,
                self.describe(*reference_index)
            )),
            Constant::MethodType { descriptor_index } => {
                self.utf8(*descriptor_index).ok().map(str::to_string)
            }
            Constant::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            }
            | Constant::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => self
                .name_and_type(*name_and_type_index)
                .ok()
                .map(|(n, d)| format!("#{bootstrap_method_attr_index}:{n}{d}")),
            Constant::Module { name_index } | Constant::Package { name_index } => {
                self.utf8(*name_index).ok().map(str::to_string)
            }
        };

        rendered.unwrap_or_else(|| format!("<invalid #{index}>"))
    }

    /// Render the whole pool, one entry per line, javap style.
    #[must_use]
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (index, constant) in self.iter() {
            let tag = constant.tag().map(|t| t.to_string()).unwrap_or_default();
            let _ = writeln!(out, "{:>6} = {:<18} {}", format!("#{index}"), tag, self.describe(index));
        }
        out
    }
}

/// Decode the modified UTF-8 used by class files.
///
/// Differs from standard UTF-8 in two ways: NUL is encoded as `C0 80`, and supplementary
/// characters are stored as two separately encoded UTF-16 surrogates.
///
/// # Errors
/// Returns a malformed error for truncated or invalid byte sequences.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if bytes.is_ascii() && !bytes.contains(&0) {
        return String::from_utf8(bytes.to_vec()).map_err(|e| malformed_error!("{}", e));
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        if b0 & 0x80 == 0 && b0 != 0 {
            units.push(u16::from(b0));
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = continuation(bytes, i + 1)?;
            units.push((u16::from(b0 & 0x1F) << 6) | u16::from(b1));
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = continuation(bytes, i + 1)?;
            let b2 = continuation(bytes, i + 2)?;
            units.push((u16::from(b0 & 0x0F) << 12) | (u16::from(b1) << 6) | u16::from(b2));
            i += 3;
        } else {
            return Err(malformed_error!("Invalid modified UTF-8 byte {:#04x} at {}", b0, i));
        }
    }

    String::from_utf16(&units).map_err(|e| malformed_error!("Invalid UTF-16 in Utf8 constant: {}", e))
}

fn continuation(bytes: &[u8], index: usize) -> Result<u8> {
    match bytes.get(index) {
        Some(byte) if byte & 0xC0 == 0x80 => Ok(byte & 0x3F),
        _ => Err(malformed_error!("Truncated modified UTF-8 sequence at {}", index)),
    }
}

/// Encode `text` as modified UTF-8.
#[must_use]
pub fn encode_modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}
