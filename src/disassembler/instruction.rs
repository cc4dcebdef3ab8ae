use std::fmt;

use strum::{Display, FromRepr};

/// How an instruction affects control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Falls through to the next instruction
    Sequential,
    /// Either branches or falls through
    ConditionalBranch,
    /// Always branches
    UnconditionalBranch,
    /// Multi-way branch (`tableswitch`, `lookupswitch`)
    Switch,
    /// Invokes a method and continues after it returns
    Call,
    /// Leaves the method
    Return,
    /// Throws the object on top of the stack
    Throw,
    /// Jumps to a subroutine, pushing a return address (`jsr`)
    Subroutine,
    /// Returns from a subroutine (`ret`)
    SubroutineReturn,
}

/// Layout of the operand bytes of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operand
    None,
    /// Signed byte immediate
    Int8,
    /// Signed short immediate
    Int16,
    /// Unsigned byte local variable index (u16 after `wide`)
    Local,
    /// Unsigned byte constant pool index (`ldc`)
    ConstantPool8,
    /// Unsigned short constant pool index
    ConstantPool,
    /// Local index and signed increment
    Iinc,
    /// Signed 16-bit branch offset
    Branch16,
    /// Signed 32-bit branch offset
    Branch32,
    /// Primitive array type code (`newarray`)
    ArrayType,
    /// Pool index, argument count and a zero byte
    InvokeInterface,
    /// Pool index and two zero bytes
    InvokeDynamic,
    /// Pool index and dimension count
    MultiANewArray,
    /// Padded jump table
    TableSwitch,
    /// Padded key/offset pairs
    LookupSwitch,
    /// Prefix widening the following instruction
    Wide,
}

/// Element type of a primitive array created by `newarray`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum ArrayType {
    /// `boolean[]`
    #[strum(serialize = "boolean")]
    Boolean = 4,
    /// `char[]`
    #[strum(serialize = "char")]
    Char = 5,
    /// `float[]`
    #[strum(serialize = "float")]
    Float = 6,
    /// `double[]`
    #[strum(serialize = "double")]
    Double = 7,
    /// `byte[]`
    #[strum(serialize = "byte")]
    Byte = 8,
    /// `short[]`
    #[strum(serialize = "short")]
    Short = 9,
    /// `int[]`
    #[strum(serialize = "int")]
    Int = 10,
    /// `long[]`
    #[strum(serialize = "long")]
    Long = 11,
}

impl ArrayType {
    /// Descriptor of the array class, e.g. `[I`
    #[must_use]
    pub fn descriptor(self) -> &'static str {
        match self {
            ArrayType::Boolean => "[Z",
            ArrayType::Char => "[C",
            ArrayType::Float => "[F",
            ArrayType::Double => "[D",
            ArrayType::Byte => "[B",
            ArrayType::Short => "[S",
            ArrayType::Int => "[I",
            ArrayType::Long => "[J",
        }
    }
}

/// A decoded operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    None,
    /// Immediate value (`bipush`, `sipush`)
    Immediate(i32),
    /// Local variable index
    Local(u16),
    /// Constant pool index
    ConstantPool(u16),
    /// `iinc` operands
    Iinc {
        /// Local variable index
        index: u16,
        /// Signed increment
        delta: i16,
    },
    /// Branch offset relative to the instruction start
    Branch(i32),
    /// `newarray` element type
    ArrayType(ArrayType),
    /// `invokeinterface` operands
    InvokeInterface {
        /// Constant pool index of the method reference
        index: u16,
        /// Argument slot count including the receiver
        count: u8,
    },
    /// `multianewarray` operands
    MultiANewArray {
        /// Constant pool index of the array class
        index: u16,
        /// Number of dimensions to create
        dimensions: u8,
    },
    /// `tableswitch` operands, offsets relative to the instruction start
    TableSwitch {
        /// Default offset
        default: i32,
        /// Lowest key
        low: i32,
        /// Highest key
        high: i32,
        /// One offset per key in `low..=high`
        offsets: Vec<i32>,
    },
    /// `lookupswitch` operands, offsets relative to the instruction start
    LookupSwitch {
        /// Default offset
        default: i32,
        /// `(key, offset)` pairs sorted by key
        pairs: Vec<(i32, i32)>,
    },
}

/// A single decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the first byte (the `wide` prefix, if any) within the method body
    pub offset: usize,
    /// The opcode; for widened instructions, the opcode following `wide`
    pub opcode: u8,
    /// Preceded by the `wide` prefix
    pub wide: bool,
    /// Encoded size in bytes, including prefix and padding
    pub size: usize,
    /// Mnemonic
    pub mnemonic: &'static str,
    /// Effect on control flow
    pub flow_type: FlowType,
    /// Decoded operand
    pub operand: Operand,
    /// Absolute offsets of all possible branch targets
    pub branch_targets: Vec<usize>,
}

impl Instruction {
    /// Offset of the instruction that follows in the byte stream
    #[must_use]
    pub fn next_offset(&self) -> usize {
        self.offset + self.size
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wide {
            write!(f, "wide ")?;
        }
        write!(f, "{}", self.mnemonic)?;

        match &self.operand {
            Operand::None => Ok(()),
            Operand::Immediate(value) => write!(f, " {value}"),
            Operand::Local(index) => write!(f, " {index}"),
            Operand::ConstantPool(index) => write!(f, " #{index}"),
            Operand::Iinc { index, delta } => write!(f, " {index}, {delta}"),
            Operand::Branch(_) => match self.branch_targets.first() {
                Some(target) => write!(f, " {target}"),
                None => Ok(()),
            },
            Operand::ArrayType(kind) => write!(f, " {kind}"),
            Operand::InvokeInterface { index, count } => write!(f, " #{index}, {count}"),
            Operand::MultiANewArray { index, dimensions } => write!(f, " #{index}, {dimensions}"),
            Operand::TableSwitch { low, high, .. } => {
                write!(f, " {{ // {low} to {high}")?;
                let (default, cases) = self.branch_targets.split_first().map_or((0, &[][..]), |(d, c)| (*d, c));
                for (key, target) in (*low..=*high).zip(cases) {
                    write!(f, "\n        {key}: {target}")?;
                }
                write!(f, "\n        default: {default}\n    }}")
            }
            Operand::LookupSwitch { pairs, .. } => {
                write!(f, " {{ // {}", pairs.len())?;
                let (default, cases) = self.branch_targets.split_first().map_or((0, &[][..]), |(d, c)| (*d, c));
                for ((key, _), target) in pairs.iter().zip(cases) {
                    write!(f, "\n        {key}: {target}")?;
                }
                write!(f, "\n        default: {default}\n    }}")
            }
        }
    }
}
