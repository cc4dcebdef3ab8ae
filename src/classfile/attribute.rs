//! Attributes the runtime understands: `Code`, `ConstantValue`, `Exceptions`, `SourceFile`
//! and `LineNumberTable`. Everything else is kept as raw bytes.

use crate::{classfile::constant::ConstantPool, file::parser::Parser, Result};

/// An attribute the decoder does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Raw attribute payload
    pub data: Vec<u8>,
}

/// One row of a method's exception table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    /// First covered bytecode offset (inclusive)
    pub start_pc: u16,
    /// End of the covered range (exclusive)
    pub end_pc: u16,
    /// Offset of the handler code
    pub handler_pc: u16,
    /// Constant pool index of the caught class, 0 catches everything
    pub catch_type: u16,
}

impl ExceptionTableEntry {
    /// True if the entry covers the instruction at `pc`
    #[must_use]
    pub fn covers(&self, pc: usize) -> bool {
        usize::from(self.start_pc) <= pc && pc < usize::from(self.end_pc)
    }
}

/// Maps a bytecode offset to a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber {
    /// First bytecode offset of the line
    pub start_pc: u16,
    /// Source line
    pub line: u16,
}

/// The `Code` attribute of a method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Code {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots, including parameters
    pub max_locals: u16,
    /// The bytecode
    pub code: Vec<u8>,
    /// Exception handlers, searched in order
    pub exception_table: Vec<ExceptionTableEntry>,
    /// Merged `LineNumberTable` rows, sorted by `start_pc`
    pub line_numbers: Vec<LineNumber>,
    /// Other nested attributes
    pub attributes: Vec<Attribute>,
}

impl Code {
    fn parse(parser: &mut Parser, pool: &ConstantPool) -> Result<Code> {
        let max_stack = parser.read_be::<u16>()?;
        let max_locals = parser.read_be::<u16>()?;
        let code_length = parser.read_be::<u32>()? as usize;
        if code_length == 0 {
            return Err(malformed_error!("Code attribute with empty bytecode"));
        }
        let code = parser.read_bytes(code_length)?.to_vec();

        let handler_count = parser.read_be::<u16>()?;
        let mut exception_table = Vec::with_capacity(handler_count as usize);
        for _ in 0..handler_count {
            exception_table.push(ExceptionTableEntry {
                start_pc: parser.read_be()?,
                end_pc: parser.read_be()?,
                handler_pc: parser.read_be()?,
                catch_type: parser.read_be()?,
            });
        }

        let mut line_numbers = Vec::new();
        let mut attributes = Vec::new();
        for (name, data) in read_attributes(parser, pool)? {
            if name == "LineNumberTable" {
                let mut table = Parser::new(data);
                let count = table.read_be::<u16>()?;
                for _ in 0..count {
                    line_numbers.push(LineNumber {
                        start_pc: table.read_be()?,
                        line: table.read_be()?,
                    });
                }
            } else {
                attributes.push(Attribute {
                    name: name.to_string(),
                    data: data.to_vec(),
                });
            }
        }
        line_numbers.sort_by_key(|entry| entry.start_pc);

        Ok(Code {
            max_stack,
            max_locals,
            code,
            exception_table,
            line_numbers,
            attributes,
        })
    }

    /// Source line of the instruction at `pc`, if line numbers were emitted
    #[must_use]
    pub fn line_at(&self, pc: usize) -> Option<u16> {
        self.line_numbers
            .iter()
            .take_while(|entry| usize::from(entry.start_pc) <= pc)
            .last()
            .map(|entry| entry.line)
    }
}

/// Attributes attached to a field or method, split into the parts the runtime uses.
#[derive(Debug, Default)]
pub(crate) struct MemberAttributes {
    pub code: Option<Code>,
    pub constant_value: Option<u16>,
    pub exceptions: Vec<String>,
    pub other: Vec<Attribute>,
}

impl MemberAttributes {
    pub(crate) fn parse(parser: &mut Parser, pool: &ConstantPool) -> Result<MemberAttributes> {
        let mut attributes = MemberAttributes::default();

        for (name, data) in read_attributes(parser, pool)? {
            let mut payload = Parser::new(data);
            match name {
                "Code" => attributes.code = Some(Code::parse(&mut payload, pool)?),
                "ConstantValue" => attributes.constant_value = Some(payload.read_be()?),
                "Exceptions" => {
                    let count = payload.read_be::<u16>()?;
                    for _ in 0..count {
                        let index = payload.read_be::<u16>()?;
                        attributes.exceptions.push(pool.class_name(index)?.to_string());
                    }
                }
                _ => attributes.other.push(Attribute {
                    name: name.to_string(),
                    data: data.to_vec(),
                }),
            }
        }

        Ok(attributes)
    }
}

/// Read an `attributes_count` prefixed attribute table as `(name, payload)` pairs.
pub(crate) fn read_attributes<'a, 'p>(
    parser: &mut Parser<'a>,
    pool: &'p ConstantPool,
) -> Result<Vec<(&'p str, &'a [u8])>> {
    let count = parser.read_be::<u16>()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = pool.utf8(parser.read_be()?)?;
        let length = parser.read_be::<u32>()? as usize;
        attributes.push((name, parser.read_bytes(length)?));
    }
    Ok(attributes)
}
