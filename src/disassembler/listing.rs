//! Human readable class listing in the spirit of `javap -c -v`.

use std::fmt::Write;

use crate::{
    classfile::{ClassFile, Code, ConstantPool},
    disassembler::{decode_stream, Operand},
    file::parser::Parser,
};

/// Render `class` as a listing: header, constant pool, fields and methods with decoded code.
///
/// Method bodies that fail to decode are reported inline instead of aborting the listing.
///
/// # Examples
///
/// ```rust
/// use jvmrt::classfile::{Bytecode, ClassFile, ClassWriter, MethodAccessFlags};
/// use jvmrt::disassembler::{disassemble, opcodes};
///
/// let mut writer = ClassWriter::new("demo/Hello", Some("java/lang/Object"));
/// let mut code = Bytecode::new();
/// code.op(opcodes::RETURN);
/// writer.method(MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC, "run", "()V", code)?;
///
/// let listing = disassemble(&ClassFile::parse(&writer.to_bytes()?)?);
/// assert!(listing.contains("0: return"));
/// # Ok::<(), jvmrt::Error>(())
/// ```
#[must_use]
pub fn disassemble(class: &ClassFile) -> String {
    let mut out = String::new();
    let pool = class.constant_pool();

    let keywords = class.access_flags().keywords();
    let kind = if class.is_interface() { "" } else { "class " };
    let _ = write!(out, "{}{}{}", keywords, if keywords.is_empty() { "" } else { " " }, kind);
    let _ = write!(out, "{}", class.this_class());
    if let Some(super_class) = class.super_class() {
        let _ = write!(out, " extends {super_class}");
    }
    if !class.interfaces().is_empty() {
        let _ = write!(out, " implements {}", class.interfaces().join(", "));
    }
    out.push('\n');

    let (major, minor) = class.version();
    let _ = writeln!(out, "  minor version: {minor}");
    let _ = writeln!(out, "  major version: {major}");
    let _ = writeln!(out, "  flags: {:#06x}", class.access_flags().bits());
    if let Some(source) = class.source_file() {
        let _ = writeln!(out, "  source: {source}");
    }

    out.push_str("Constant pool:\n");
    out.push_str(&pool.listing());
    out.push_str("{\n");

    for field in class.fields() {
        let _ = writeln!(out, "  {};", member_header(&field.access_flags.keywords(), &field.name, ""));
        let _ = writeln!(out, "    descriptor: {}", field.descriptor);
        if let Some(index) = field.constant_value {
            let _ = writeln!(out, "    ConstantValue: {}", pool.describe(index));
        }
        out.push('\n');
    }

    for method in class.methods() {
        let _ = writeln!(out, "  {};", member_header(&method.access_flags.keywords(), &method.name, &method.descriptor));
        let _ = writeln!(out, "    descriptor: {}", method.descriptor);
        if !method.exceptions.is_empty() {
            let _ = writeln!(out, "    throws: {}", method.exceptions.join(", "));
        }
        if let Some(code) = &method.code {
            write_code(&mut out, pool, code);
        }
        out.push('\n');
    }

    out.push_str("}\n");
    out
}

fn member_header(keywords: &str, name: &str, descriptor: &str) -> String {
    if keywords.is_empty() {
        format!("{name}{descriptor}")
    } else {
        format!("{keywords} {name}{descriptor}")
    }
}

fn write_code(out: &mut String, pool: &ConstantPool, code: &Code) {
    let _ = writeln!(out, "    Code:");
    let _ = writeln!(out, "      stack={}, locals={}", code.max_stack, code.max_locals);

    let mut parser = Parser::new(&code.code);
    match decode_stream(&mut parser) {
        Ok(instructions) => {
            for instruction in instructions {
                let _ = write!(out, "      {:>5}: {}", instruction.offset, instruction);
                let symbol = match instruction.operand {
                    Operand::ConstantPool(index)
                    | Operand::InvokeInterface { index, .. }
                    | Operand::MultiANewArray { index, .. } => Some(pool.describe(index)),
                    _ => None,
                };
                if let Some(symbol) = symbol {
                    let _ = write!(out, "  // {symbol}");
                }
                out.push('\n');
            }
        }
        Err(error) => {
            let _ = writeln!(out, "      <undecodable: {error}>");
        }
    }

    if !code.exception_table.is_empty() {
        let _ = writeln!(out, "      Exception table:");
        let _ = writeln!(out, "         from    to  target type");
        for entry in &code.exception_table {
            let kind = if entry.catch_type == 0 {
                "any".to_string()
            } else {
                pool.describe(entry.catch_type)
            };
            let _ = writeln!(
                out,
                "        {:>5} {:>5} {:>7}   {}",
                entry.start_pc, entry.end_pc, entry.handler_pc, kind
            );
        }
    }

    if !code.line_numbers.is_empty() {
        let _ = writeln!(out, "      LineNumberTable:");
        for entry in &code.line_numbers {
            let _ = writeln!(out, "        line {}: {}", entry.line, entry.start_pc);
        }
    }
}
