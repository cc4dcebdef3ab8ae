//! Opcode metadata for the JVM instruction set.
//!
//! [`INSTRUCTIONS`] is indexed by the opcode byte. Reserved and unassigned opcodes carry an
//! empty mnemonic and are rejected by the decoder.

use crate::disassembler::{FlowType, OperandType};

/// Static description of one opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Mnemonic, empty for unassigned opcodes
    pub instr: &'static str,
    /// Layout of the operand bytes following the opcode
    pub op_type: OperandType,
    /// Effect on control flow
    pub flow: FlowType,
}

impl OpcodeInfo {
    /// Placeholder for unassigned opcodes
    pub const RESERVED: OpcodeInfo = OpcodeInfo::new("", OperandType::None, FlowType::Sequential);

    const fn new(instr: &'static str, op_type: OperandType, flow: FlowType) -> Self {
        OpcodeInfo {
            instr,
            op_type,
            flow,
        }
    }
}

/// Opcode byte values
pub mod opcodes {
    /// `nop`
    pub const NOP: u8 = 0x00;
    /// `aconst_null`
    pub const ACONST_NULL: u8 = 0x01;
    /// `iconst_m1`
    pub const ICONST_M1: u8 = 0x02;
    /// `iconst_0`
    pub const ICONST_0: u8 = 0x03;
    /// `iconst_1`
    pub const ICONST_1: u8 = 0x04;
    /// `iconst_2`
    pub const ICONST_2: u8 = 0x05;
    /// `iconst_3`
    pub const ICONST_3: u8 = 0x06;
    /// `iconst_4`
    pub const ICONST_4: u8 = 0x07;
    /// `iconst_5`
    pub const ICONST_5: u8 = 0x08;
    /// `lconst_0`
    pub const LCONST_0: u8 = 0x09;
    /// `lconst_1`
    pub const LCONST_1: u8 = 0x0A;
    /// `fconst_0`
    pub const FCONST_0: u8 = 0x0B;
    /// `fconst_1`
    pub const FCONST_1: u8 = 0x0C;
    /// `fconst_2`
    pub const FCONST_2: u8 = 0x0D;
    /// `dconst_0`
    pub const DCONST_0: u8 = 0x0E;
    /// `dconst_1`
    pub const DCONST_1: u8 = 0x0F;
    /// `bipush`
    pub const BIPUSH: u8 = 0x10;
    /// `sipush`
    pub const SIPUSH: u8 = 0x11;
    /// `ldc`
    pub const LDC: u8 = 0x12;
    /// `ldc_w`
    pub const LDC_W: u8 = 0x13;
    /// `ldc2_w`
    pub const LDC2_W: u8 = 0x14;
    /// `iload`
    pub const ILOAD: u8 = 0x15;
    /// `lload`
    pub const LLOAD: u8 = 0x16;
    /// `fload`
    pub const FLOAD: u8 = 0x17;
    /// `dload`
    pub const DLOAD: u8 = 0x18;
    /// `aload`
    pub const ALOAD: u8 = 0x19;
    /// `iload_0`
    pub const ILOAD_0: u8 = 0x1A;
    /// `iload_1`
    pub const ILOAD_1: u8 = 0x1B;
    /// `iload_2`
    pub const ILOAD_2: u8 = 0x1C;
    /// `iload_3`
    pub const ILOAD_3: u8 = 0x1D;
    /// `lload_0`
    pub const LLOAD_0: u8 = 0x1E;
    /// `lload_1`
    pub const LLOAD_1: u8 = 0x1F;
    /// `lload_2`
    pub const LLOAD_2: u8 = 0x20;
    /// `lload_3`
    pub const LLOAD_3: u8 = 0x21;
    /// `fload_0`
    pub const FLOAD_0: u8 = 0x22;
    /// `fload_1`
    pub const FLOAD_1: u8 = 0x23;
    /// `fload_2`
    pub const FLOAD_2: u8 = 0x24;
    /// `fload_3`
    pub const FLOAD_3: u8 = 0x25;
    /// `dload_0`
    pub const DLOAD_0: u8 = 0x26;
    /// `dload_1`
    pub const DLOAD_1: u8 = 0x27;
    /// `dload_2`
    pub const DLOAD_2: u8 = 0x28;
    /// `dload_3`
    pub const DLOAD_3: u8 = 0x29;
    /// `aload_0`
    pub const ALOAD_0: u8 = 0x2A;
    /// `aload_1`
    pub const ALOAD_1: u8 = 0x2B;
    /// `aload_2`
    pub const ALOAD_2: u8 = 0x2C;
    /// `aload_3`
    pub const ALOAD_3: u8 = 0x2D;
    /// `iaload`
    pub const IALOAD: u8 = 0x2E;
    /// `laload`
    pub const LALOAD: u8 = 0x2F;
    /// `faload`
    pub const FALOAD: u8 = 0x30;
    /// `daload`
    pub const DALOAD: u8 = 0x31;
    /// `aaload`
    pub const AALOAD: u8 = 0x32;
    /// `baload`
    pub const BALOAD: u8 = 0x33;
    /// `caload`
    pub const CALOAD: u8 = 0x34;
    /// `saload`
    pub const SALOAD: u8 = 0x35;
    /// `istore`
    pub const ISTORE: u8 = 0x36;
    /// `lstore`
    pub const LSTORE: u8 = 0x37;
    /// `fstore`
    pub const FSTORE: u8 = 0x38;
    /// `dstore`
    pub const DSTORE: u8 = 0x39;
    /// `astore`
    pub const ASTORE: u8 = 0x3A;
    /// `istore_0`
    pub const ISTORE_0: u8 = 0x3B;
    /// `istore_1`
    pub const ISTORE_1: u8 = 0x3C;
    /// `istore_2`
    pub const ISTORE_2: u8 = 0x3D;
    /// `istore_3`
    pub const ISTORE_3: u8 = 0x3E;
    /// `lstore_0`
    pub const LSTORE_0: u8 = 0x3F;
    /// `lstore_1`
    pub const LSTORE_1: u8 = 0x40;
    /// `lstore_2`
    pub const LSTORE_2: u8 = 0x41;
    /// `lstore_3`
    pub const LSTORE_3: u8 = 0x42;
    /// `fstore_0`
    pub const FSTORE_0: u8 = 0x43;
    /// `fstore_1`
    pub const FSTORE_1: u8 = 0x44;
    /// `fstore_2`
    pub const FSTORE_2: u8 = 0x45;
    /// `fstore_3`
    pub const FSTORE_3: u8 = 0x46;
    /// `dstore_0`
    pub const DSTORE_0: u8 = 0x47;
    /// `dstore_1`
    pub const DSTORE_1: u8 = 0x48;
    /// `dstore_2`
    pub const DSTORE_2: u8 = 0x49;
    /// `dstore_3`
    pub const DSTORE_3: u8 = 0x4A;
    /// `astore_0`
    pub const ASTORE_0: u8 = 0x4B;
    /// `astore_1`
    pub const ASTORE_1: u8 = 0x4C;
    /// `astore_2`
    pub const ASTORE_2: u8 = 0x4D;
    /// `astore_3`
    pub const ASTORE_3: u8 = 0x4E;
    /// `iastore`
    pub const IASTORE: u8 = 0x4F;
    /// `lastore`
    pub const LASTORE: u8 = 0x50;
    /// `fastore`
    pub const FASTORE: u8 = 0x51;
    /// `dastore`
    pub const DASTORE: u8 = 0x52;
    /// `aastore`
    pub const AASTORE: u8 = 0x53;
    /// `bastore`
    pub const BASTORE: u8 = 0x54;
    /// `castore`
    pub const CASTORE: u8 = 0x55;
    /// `sastore`
    pub const SASTORE: u8 = 0x56;
    /// `pop`
    pub const POP: u8 = 0x57;
    /// `pop2`
    pub const POP2: u8 = 0x58;
    /// `dup`
    pub const DUP: u8 = 0x59;
    /// `dup_x1`
    pub const DUP_X1: u8 = 0x5A;
    /// `dup_x2`
    pub const DUP_X2: u8 = 0x5B;
    /// `dup2`
    pub const DUP2: u8 = 0x5C;
    /// `dup2_x1`
    pub const DUP2_X1: u8 = 0x5D;
    /// `dup2_x2`
    pub const DUP2_X2: u8 = 0x5E;
    /// `swap`
    pub const SWAP: u8 = 0x5F;
    /// `iadd`
    pub const IADD: u8 = 0x60;
    /// `ladd`
    pub const LADD: u8 = 0x61;
    /// `fadd`
    pub const FADD: u8 = 0x62;
    /// `dadd`
    pub const DADD: u8 = 0x63;
    /// `isub`
    pub const ISUB: u8 = 0x64;
    /// `lsub`
    pub const LSUB: u8 = 0x65;
    /// `fsub`
    pub const FSUB: u8 = 0x66;
    /// `dsub`
    pub const DSUB: u8 = 0x67;
    /// `imul`
    pub const IMUL: u8 = 0x68;
    /// `lmul`
    pub const LMUL: u8 = 0x69;
    /// `fmul`
    pub const FMUL: u8 = 0x6A;
    /// `dmul`
    pub const DMUL: u8 = 0x6B;
    /// `idiv`
    pub const IDIV: u8 = 0x6C;
    /// `ldiv`
    pub const LDIV: u8 = 0x6D;
    /// `fdiv`
    pub const FDIV: u8 = 0x6E;
    /// `ddiv`
    pub const DDIV: u8 = 0x6F;
    /// `irem`
    pub const IREM: u8 = 0x70;
    /// `lrem`
    pub const LREM: u8 = 0x71;
    /// `frem`
    pub const FREM: u8 = 0x72;
    /// `drem`
    pub const DREM: u8 = 0x73;
    /// `ineg`
    pub const INEG: u8 = 0x74;
    /// `lneg`
    pub const LNEG: u8 = 0x75;
    /// `fneg`
    pub const FNEG: u8 = 0x76;
    /// `dneg`
    pub const DNEG: u8 = 0x77;
    /// `ishl`
    pub const ISHL: u8 = 0x78;
    /// `lshl`
    pub const LSHL: u8 = 0x79;
    /// `ishr`
    pub const ISHR: u8 = 0x7A;
    /// `lshr`
    pub const LSHR: u8 = 0x7B;
    /// `iushr`
    pub const IUSHR: u8 = 0x7C;
    /// `lushr`
    pub const LUSHR: u8 = 0x7D;
    /// `iand`
    pub const IAND: u8 = 0x7E;
    /// `land`
    pub const LAND: u8 = 0x7F;
    /// `ior`
    pub const IOR: u8 = 0x80;
    /// `lor`
    pub const LOR: u8 = 0x81;
    /// `ixor`
    pub const IXOR: u8 = 0x82;
    /// `lxor`
    pub const LXOR: u8 = 0x83;
    /// `iinc`
    pub const IINC: u8 = 0x84;
    /// `i2l`
    pub const I2L: u8 = 0x85;
    /// `i2f`
    pub const I2F: u8 = 0x86;
    /// `i2d`
    pub const I2D: u8 = 0x87;
    /// `l2i`
    pub const L2I: u8 = 0x88;
    /// `l2f`
    pub const L2F: u8 = 0x89;
    /// `l2d`
    pub const L2D: u8 = 0x8A;
    /// `f2i`
    pub const F2I: u8 = 0x8B;
    /// `f2l`
    pub const F2L: u8 = 0x8C;
    /// `f2d`
    pub const F2D: u8 = 0x8D;
    /// `d2i`
    pub const D2I: u8 = 0x8E;
    /// `d2l`
    pub const D2L: u8 = 0x8F;
    /// `d2f`
    pub const D2F: u8 = 0x90;
    /// `i2b`
    pub const I2B: u8 = 0x91;
    /// `i2c`
    pub const I2C: u8 = 0x92;
    /// `i2s`
    pub const I2S: u8 = 0x93;
    /// `lcmp`
    pub const LCMP: u8 = 0x94;
    /// `fcmpl`
    pub const FCMPL: u8 = 0x95;
    /// `fcmpg`
    pub const FCMPG: u8 = 0x96;
    /// `dcmpl`
    pub const DCMPL: u8 = 0x97;
    /// `dcmpg`
    pub const DCMPG: u8 = 0x98;
    /// `ifeq`
    pub const IFEQ: u8 = 0x99;
    /// `ifne`
    pub const IFNE: u8 = 0x9A;
    /// `iflt`
    pub const IFLT: u8 = 0x9B;
    /// `ifge`
    pub const IFGE: u8 = 0x9C;
    /// `ifgt`
    pub const IFGT: u8 = 0x9D;
    /// `ifle`
    pub const IFLE: u8 = 0x9E;
    /// `if_icmpeq`
    pub const IF_ICMPEQ: u8 = 0x9F;
    /// `if_icmpne`
    pub const IF_ICMPNE: u8 = 0xA0;
    /// `if_icmplt`
    pub const IF_ICMPLT: u8 = 0xA1;
    /// `if_icmpge`
    pub const IF_ICMPGE: u8 = 0xA2;
    /// `if_icmpgt`
    pub const IF_ICMPGT: u8 = 0xA3;
    /// `if_icmple`
    pub const IF_ICMPLE: u8 = 0xA4;
    /// `if_acmpeq`
    pub const IF_ACMPEQ: u8 = 0xA5;
    /// `if_acmpne`
    pub const IF_ACMPNE: u8 = 0xA6;
    /// `goto`
    pub const GOTO: u8 = 0xA7;
    /// `jsr`
    pub const JSR: u8 = 0xA8;
    /// `ret`
    pub const RET: u8 = 0xA9;
    /// `tableswitch`
    pub const TABLESWITCH: u8 = 0xAA;
    /// `lookupswitch`
    pub const LOOKUPSWITCH: u8 = 0xAB;
    /// `ireturn`
    pub const IRETURN: u8 = 0xAC;
    /// `lreturn`
    pub const LRETURN: u8 = 0xAD;
    /// `freturn`
    pub const FRETURN: u8 = 0xAE;
    /// `dreturn`
    pub const DRETURN: u8 = 0xAF;
    /// `areturn`
    pub const ARETURN: u8 = 0xB0;
    /// `return`
    pub const RETURN: u8 = 0xB1;
    /// `getstatic`
    pub const GETSTATIC: u8 = 0xB2;
    /// `putstatic`
    pub const PUTSTATIC: u8 = 0xB3;
    /// `getfield`
    pub const GETFIELD: u8 = 0xB4;
    /// `putfield`
    pub const PUTFIELD: u8 = 0xB5;
    /// `invokevirtual`
    pub const INVOKEVIRTUAL: u8 = 0xB6;
    /// `invokespecial`
    pub const INVOKESPECIAL: u8 = 0xB7;
    /// `invokestatic`
    pub const INVOKESTATIC: u8 = 0xB8;
    /// `invokeinterface`
    pub const INVOKEINTERFACE: u8 = 0xB9;
    /// `invokedynamic`
    pub const INVOKEDYNAMIC: u8 = 0xBA;
    /// `new`
    pub const NEW: u8 = 0xBB;
    /// `newarray`
    pub const NEWARRAY: u8 = 0xBC;
    /// `anewarray`
    pub const ANEWARRAY: u8 = 0xBD;
    /// `arraylength`
    pub const ARRAYLENGTH: u8 = 0xBE;
    /// `athrow`
    pub const ATHROW: u8 = 0xBF;
    /// `checkcast`
    pub const CHECKCAST: u8 = 0xC0;
    /// `instanceof`
    pub const INSTANCEOF: u8 = 0xC1;
    /// `monitorenter`
    pub const MONITORENTER: u8 = 0xC2;
    /// `monitorexit`
    pub const MONITOREXIT: u8 = 0xC3;
    /// `wide`
    pub const WIDE: u8 = 0xC4;
    /// `multianewarray`
    pub const MULTIANEWARRAY: u8 = 0xC5;
    /// `ifnull`
    pub const IFNULL: u8 = 0xC6;
    /// `ifnonnull`
    pub const IFNONNULL: u8 = 0xC7;
    /// `goto_w`
    pub const GOTO_W: u8 = 0xC8;
    /// `jsr_w`
    pub const JSR_W: u8 = 0xC9;
    /// `breakpoint`
    pub const BREAKPOINT: u8 = 0xCA;
    /// `impdep1`
    pub const IMPDEP1: u8 = 0xFE;
    /// `impdep2`
    pub const IMPDEP2: u8 = 0xFF;
}

/// Opcode table, indexed by opcode byte
pub static INSTRUCTIONS: [OpcodeInfo; 256] = [
    /* 0x00 */ OpcodeInfo::new("nop", OperandType::None, FlowType::Sequential),
    /* 0x01 */ OpcodeInfo::new("aconst_null", OperandType::None, FlowType::Sequential),
    /* 0x02 */ OpcodeInfo::new("iconst_m1", OperandType::None, FlowType::Sequential),
    /* 0x03 */ OpcodeInfo::new("iconst_0", OperandType::None, FlowType::Sequential),
    /* 0x04 */ OpcodeInfo::new("iconst_1", OperandType::None, FlowType::Sequential),
    /* 0x05 */ OpcodeInfo::new("iconst_2", OperandType::None, FlowType::Sequential),
    /* 0x06 */ OpcodeInfo::new("iconst_3", OperandType::None, FlowType::Sequential),
    /* 0x07 */ OpcodeInfo::new("iconst_4", OperandType::None, FlowType::Sequential),
    /* 0x08 */ OpcodeInfo::new("iconst_5", OperandType::None, FlowType::Sequential),
    /* 0x09 */ OpcodeInfo::new("lconst_0", OperandType::None, FlowType::Sequential),
    /* 0x0A */ OpcodeInfo::new("lconst_1", OperandType::None, FlowType::Sequential),
    /* 0x0B */ OpcodeInfo::new("fconst_0", OperandType::None, FlowType::Sequential),
    /* 0x0C */ OpcodeInfo::new("fconst_1", OperandType::None, FlowType::Sequential),
    /* 0x0D */ OpcodeInfo::new("fconst_2", OperandType::None, FlowType::Sequential),
    /* 0x0E */ OpcodeInfo::new("dconst_0", OperandType::None, FlowType::Sequential),
    /* 0x0F */ OpcodeInfo::new("dconst_1", OperandType::None, FlowType::Sequential),
    /* 0x10 */ OpcodeInfo::new("bipush", OperandType::Int8, FlowType::Sequential),
    /* 0x11 */ OpcodeInfo::new("sipush", OperandType::Int16, FlowType::Sequential),
    /* 0x12 */ OpcodeInfo::new("ldc", OperandType::ConstantPool8, FlowType::Sequential),
    /* 0x13 */ OpcodeInfo::new("ldc_w", OperandType::ConstantPool, FlowType::Sequential),
    /* 0x14 */ OpcodeInfo::new("ldc2_w", OperandType::ConstantPool, FlowType::Sequential),
    /* 0x15 */ OpcodeInfo::new("iload", OperandType::Local, FlowType::Sequential),
    /* 0x16 */ OpcodeInfo::new("lload", OperandType::Local, FlowType::Sequential),
    /* 0x17 */ OpcodeInfo::new("fload", OperandType::Local, FlowType::Sequential),
    /* 0x18 */ OpcodeInfo::new("dload", OperandType::Local, FlowType::Sequential),
    /* 0x19 */ OpcodeInfo::new("aload", OperandType::Local, FlowType::Sequential),
    /* 0x1A */ OpcodeInfo::new("iload_0", OperandType::None, FlowType::Sequential),
    /* 0x1B */ OpcodeInfo::new("iload_1", OperandType::None, FlowType::Sequential),
    /* 0x1C */ OpcodeInfo::new("iload_2", OperandType::None, FlowType::Sequential),
    /* 0x1D */ OpcodeInfo::new("iload_3", OperandType::None, FlowType::Sequential),
    /* 0x1E */ OpcodeInfo::new("lload_0", OperandType::None, FlowType::Sequential),
    /* 0x1F */ OpcodeInfo::new("lload_1", OperandType::None, FlowType::Sequential),
    /* 0x20 */ OpcodeInfo::new("lload_2", OperandType::None, FlowType::Sequential),
    /* 0x21 */ OpcodeInfo::new("lload_3", OperandType::None, FlowType::Sequential),
    /* 0x22 */ OpcodeInfo::new("fload_0", OperandType::None, FlowType::Sequential),
    /* 0x23 */ OpcodeInfo::new("fload_1", OperandType::None, FlowType::Sequential),
    /* 0x24 */ OpcodeInfo::new("fload_2", OperandType::None, FlowType::Sequential),
    /* 0x25 */ OpcodeInfo::new("fload_3", OperandType::None, FlowType::Sequential),
    /* 0x26 */ OpcodeInfo::new("dload_0", OperandType::None, FlowType::Sequential),
    /* 0x27 */ OpcodeInfo::new("dload_1", OperandType::None, FlowType::Sequential),
    /* 0x28 */ OpcodeInfo::new("dload_2", OperandType::None, FlowType::Sequential),
    /* 0x29 */ OpcodeInfo::new("dload_3", OperandType::None, FlowType::Sequential),
    /* 0x2A */ OpcodeInfo::new("aload_0", OperandType::None, FlowType::Sequential),
    /* 0x2B */ OpcodeInfo::new("aload_1", OperandType::None, FlowType::Sequential),
    /* 0x2C */ OpcodeInfo::new("aload_2", OperandType::None, FlowType::Sequential),
    /* 0x2D */ OpcodeInfo::new("aload_3", OperandType::None, FlowType::Sequential),
    /* 0x2E */ OpcodeInfo::new("iaload", OperandType::None, FlowType::Sequential),
    /* 0x2F */ OpcodeInfo::new("laload", OperandType::None, FlowType::Sequential),
    /* 0x30 */ OpcodeInfo::new("faload", OperandType::None, FlowType::Sequential),
    /* 0x31 */ OpcodeInfo::new("daload", OperandType::None, FlowType::Sequential),
    /* 0x32 */ OpcodeInfo::new("aaload", OperandType::None, FlowType::Sequential),
    /* 0x33 */ OpcodeInfo::new("baload", OperandType::None, FlowType::Sequential),
    /* 0x34 */ OpcodeInfo::new("caload", OperandType::None, FlowType::Sequential),
    /* 0x35 */ OpcodeInfo::new("saload", OperandType::None, FlowType::Sequential),
    /* 0x36 */ OpcodeInfo::new("istore", OperandType::Local, FlowType::Sequential),
    /* 0x37 */ OpcodeInfo::new("lstore", OperandType::Local, FlowType::Sequential),
    /* 0x38 */ OpcodeInfo::new("fstore", OperandType::Local, FlowType::Sequential),
    /* 0x39 */ OpcodeInfo::new("dstore", OperandType::Local, FlowType::Sequential),
    /* 0x3A */ OpcodeInfo::new("astore", OperandType::Local, FlowType::Sequential),
    /* 0x3B */ OpcodeInfo::new("istore_0", OperandType::None, FlowType::Sequential),
    /* 0x3C */ OpcodeInfo::new("istore_1", OperandType::None, FlowType::Sequential),
    /* 0x3D */ OpcodeInfo::new("istore_2", OperandType::None, FlowType::Sequential),
    /* 0x3E */ OpcodeInfo::new("istore_3", OperandType::None, FlowType::Sequential),
    /* 0x3F */ OpcodeInfo::new("lstore_0", OperandType::None, FlowType::Sequential),
    /* 0x40 */ OpcodeInfo::new("lstore_1", OperandType::None, FlowType::Sequential),
    /* 0x41 */ OpcodeInfo::new("lstore_2", OperandType::None, FlowType::Sequential),
    /* 0x42 */ OpcodeInfo::new("lstore_3", OperandType::None, FlowType::Sequential),
    /* 0x43 */ OpcodeInfo::new("fstore_0", OperandType::None, FlowType::Sequential),
    /* 0x44 */ OpcodeInfo::new("fstore_1", OperandType::None, FlowType::Sequential),
    /* 0x45 */ OpcodeInfo::new("fstore_2", OperandType::None, FlowType::Sequential),
    /* 0x46 */ OpcodeInfo::new("fstore_3", OperandType::None, FlowType::Sequential),
    /* 0x47 */ OpcodeInfo::new("dstore_0", OperandType::None, FlowType::Sequential),
    /* 0x48 */ OpcodeInfo::new("dstore_1", OperandType::None, FlowType::Sequential),
    /* 0x49 */ OpcodeInfo::new("dstore_2", OperandType::None, FlowType::Sequential),
    /* 0x4A */ OpcodeInfo::new("dstore_3", OperandType::None, FlowType::Sequential),
    /* 0x4B */ OpcodeInfo::new("astore_0", OperandType::None, FlowType::Sequential),
    /* 0x4C */ OpcodeInfo::new("astore_1", OperandType::None, FlowType::Sequential),
    /* 0x4D */ OpcodeInfo::new("astore_2", OperandType::None, FlowType::Sequential),
    /* 0x4E */ OpcodeInfo::new("astore_3", OperandType::None, FlowType::Sequential),
    /* 0x4F */ OpcodeInfo::new("iastore", OperandType::None, FlowType::Sequential),
    /* 0x50 */ OpcodeInfo::new("lastore", OperandType::None, FlowType::Sequential),
    /* 0x51 */ OpcodeInfo::new("fastore", OperandType::None, FlowType::Sequential),
    /* 0x52 */ OpcodeInfo::new("dastore", OperandType::None, FlowType::Sequential),
    /* 0x53 */ OpcodeInfo::new("aastore", OperandType::None, FlowType::Sequential),
    /* 0x54 */ OpcodeInfo::new("bastore", OperandType::None, FlowType::Sequential),
    /* 0x55 */ OpcodeInfo::new("castore", OperandType::None, FlowType::Sequential),
    /* 0x56 */ OpcodeInfo::new("sastore", OperandType::None, FlowType::Sequential),
    /* 0x57 */ OpcodeInfo::new("pop", OperandType::None, FlowType::Sequential),
    /* 0x58 */ OpcodeInfo::new("pop2", OperandType::None, FlowType::Sequential),
    /* 0x59 */ OpcodeInfo::new("dup", OperandType::None, FlowType::Sequential),
    /* 0x5A */ OpcodeInfo::new("dup_x1", OperandType::None, FlowType::Sequential),
    /* 0x5B */ OpcodeInfo::new("dup_x2", OperandType::None, FlowType::Sequential),
    /* 0x5C */ OpcodeInfo::new("dup2", OperandType::None, FlowType::Sequential),
    /* 0x5D */ OpcodeInfo::new("dup2_x1", OperandType::None, FlowType::Sequential),
    /* 0x5E */ OpcodeInfo::new("dup2_x2", OperandType::None, FlowType::Sequential),
    /* 0x5F */ OpcodeInfo::new("swap", OperandType::None, FlowType::Sequential),
    /* 0x60 */ OpcodeInfo::new("iadd", OperandType::None, FlowType::Sequential),
    /* 0x61 */ OpcodeInfo::new("ladd", OperandType::None, FlowType::Sequential),
    /* 0x62 */ OpcodeInfo::new("fadd", OperandType::None, FlowType::Sequential),
    /* 0x63 */ OpcodeInfo::new("dadd", OperandType::None, FlowType::Sequential),
    /* 0x64 */ OpcodeInfo::new("isub", OperandType::None, FlowType::Sequential),
    /* 0x65 */ OpcodeInfo::new("lsub", OperandType::None, FlowType::Sequential),
    /* 0x66 */ OpcodeInfo::new("fsub", OperandType::None, FlowType::Sequential),
    /* 0x67 */ OpcodeInfo::new("dsub", OperandType::None, FlowType::Sequential),
    /* 0x68 */ OpcodeInfo::new("imul", OperandType::None, FlowType::Sequential),
    /* 0x69 */ OpcodeInfo::new("lmul", OperandType::None, FlowType::Sequential),
    /* 0x6A */ OpcodeInfo::new("fmul", OperandType::None, FlowType::Sequential),
    /* 0x6B */ OpcodeInfo::new("dmul", OperandType::None, FlowType::Sequential),
    /* 0x6C */ OpcodeInfo::new("idiv", OperandType::None, FlowType::Sequential),
    /* 0x6D */ OpcodeInfo::new("ldiv", OperandType::None, FlowType::Sequential),
    /* 0x6E */ OpcodeInfo::new("fdiv", OperandType::None, FlowType::Sequential),
    /* 0x6F */ OpcodeInfo::new("ddiv", OperandType::None, FlowType::Sequential),
    /* 0x70 */ OpcodeInfo::new("irem", OperandType::None, FlowType::Sequential),
    /* 0x71 */ OpcodeInfo::new("lrem", OperandType::None, FlowType::Sequential),
    /* 0x72 */ OpcodeInfo::new("frem", OperandType::None, FlowType::Sequential),
    /* 0x73 */ OpcodeInfo::new("drem", OperandType::None, FlowType::Sequential),
    /* 0x74 */ OpcodeInfo::new("ineg", OperandType::None, FlowType::Sequential),
    /* 0x75 */ OpcodeInfo::new("lneg", OperandType::None, FlowType::Sequential),
    /* 0x76 */ OpcodeInfo::new("fneg", OperandType::None, FlowType::Sequential),
    /* 0x77 */ OpcodeInfo::new("dneg", OperandType::None, FlowType::Sequential),
    /* 0x78 */ OpcodeInfo::new("ishl", OperandType::None, FlowType::Sequential),
    /* 0x79 */ OpcodeInfo::new("lshl", OperandType::None, FlowType::Sequential),
    /* 0x7A */ OpcodeInfo::new("ishr", OperandType::None, FlowType::Sequential),
    /* 0x7B */ OpcodeInfo::new("lshr", OperandType::None, FlowType::Sequential),
    /* 0x7C */ OpcodeInfo::new("iushr", OperandType::None, FlowType::Sequential),
    /* 0x7D */ OpcodeInfo::new("lushr", OperandType::None, FlowType::Sequential),
    /* 0x7E */ OpcodeInfo::new("iand", OperandType::None, FlowType::Sequential),
    /* 0x7F */ OpcodeInfo::new("land", OperandType::None, FlowType::Sequential),
    /* 0x80 */ OpcodeInfo::new("ior", OperandType::None, FlowType::Sequential),
    /* 0x81 */ OpcodeInfo::new("lor", OperandType::None, FlowType::Sequential),
    /* 0x82 */ OpcodeInfo::new("ixor", OperandType::None, FlowType::Sequential),
    /* 0x83 */ OpcodeInfo::new("lxor", OperandType::None, FlowType::Sequential),
    /* 0x84 */ OpcodeInfo::new("iinc", OperandType::Iinc, FlowType::Sequential),
    /* 0x85 */ OpcodeInfo::new("i2l", OperandType::None, FlowType::Sequential),
    /* 0x86 */ OpcodeInfo::new("i2f", OperandType::None, FlowType::Sequential),
    /* 0x87 */ OpcodeInfo::new("i2d", OperandType::None, FlowType::Sequential),
    /* 0x88 */ OpcodeInfo::new("l2i", OperandType::None, FlowType::Sequential),
    /* 0x89 */ OpcodeInfo::new("l2f", OperandType::None, FlowType::Sequential),
    /* 0x8A */ OpcodeInfo::new("l2d", OperandType::None, FlowType::Sequential),
    /* 0x8B */ OpcodeInfo::new("f2i", OperandType::None, FlowType::Sequential),
    /* 0x8C */ OpcodeInfo::new("f2l", OperandType::None, FlowType::Sequential),
    /* 0x8D */ OpcodeInfo::new("f2d", OperandType::None, FlowType::Sequential),
    /* 0x8E */ OpcodeInfo::new("d2i", OperandType::None, FlowType::Sequential),
    /* 0x8F */ OpcodeInfo::new("d2l", OperandType::None, FlowType::Sequential),
    /* 0x90 */ OpcodeInfo::new("d2f", OperandType::None, FlowType::Sequential),
    /* 0x91 */ OpcodeInfo::new("i2b", OperandType::None, FlowType::Sequential),
    /* 0x92 */ OpcodeInfo::new("i2c", OperandType::None, FlowType::Sequential),
    /* 0x93 */ OpcodeInfo::new("i2s", OperandType::None, FlowType::Sequential),
    /* 0x94 */ OpcodeInfo::new("lcmp", OperandType::None, FlowType::Sequential),
    /* 0x95 */ OpcodeInfo::new("fcmpl", OperandType::None, FlowType::Sequential),
    /* 0x96 */ OpcodeInfo::new("fcmpg", OperandType::None, FlowType::Sequential),
    /* 0x97 */ OpcodeInfo::new("dcmpl", OperandType::None, FlowType::Sequential),
    /* 0x98 */ OpcodeInfo::new("dcmpg", OperandType::None, FlowType::Sequential),
    /* 0x99 */ OpcodeInfo::new("ifeq", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0x9A */ OpcodeInfo::new("ifne", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0x9B */ OpcodeInfo::new("iflt", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0x9C */ OpcodeInfo::new("ifge", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0x9D */ OpcodeInfo::new("ifgt", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0x9E */ OpcodeInfo::new("ifle", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0x9F */ OpcodeInfo::new("if_icmpeq", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA0 */ OpcodeInfo::new("if_icmpne", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA1 */ OpcodeInfo::new("if_icmplt", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA2 */ OpcodeInfo::new("if_icmpge", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA3 */ OpcodeInfo::new("if_icmpgt", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA4 */ OpcodeInfo::new("if_icmple", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA5 */ OpcodeInfo::new("if_acmpeq", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA6 */ OpcodeInfo::new("if_acmpne", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xA7 */ OpcodeInfo::new("goto", OperandType::Branch16, FlowType::UnconditionalBranch),
    /* 0xA8 */ OpcodeInfo::new("jsr", OperandType::Branch16, FlowType::Subroutine),
    /* 0xA9 */ OpcodeInfo::new("ret", OperandType::Local, FlowType::SubroutineReturn),
    /* 0xAA */ OpcodeInfo::new("tableswitch", OperandType::TableSwitch, FlowType::Switch),
    /* 0xAB */ OpcodeInfo::new("lookupswitch", OperandType::LookupSwitch, FlowType::Switch),
    /* 0xAC */ OpcodeInfo::new("ireturn", OperandType::None, FlowType::Return),
    /* 0xAD */ OpcodeInfo::new("lreturn", OperandType::None, FlowType::Return),
    /* 0xAE */ OpcodeInfo::new("freturn", OperandType::None, FlowType::Return),
    /* 0xAF */ OpcodeInfo::new("dreturn", OperandType::None, FlowType::Return),
    /* 0xB0 */ OpcodeInfo::new("areturn", OperandType::None, FlowType::Return),
    /* 0xB1 */ OpcodeInfo::new("return", OperandType::None, FlowType::Return),
    /* 0xB2 */ OpcodeInfo::new("getstatic", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xB3 */ OpcodeInfo::new("putstatic", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xB4 */ OpcodeInfo::new("getfield", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xB5 */ OpcodeInfo::new("putfield", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xB6 */ OpcodeInfo::new("invokevirtual", OperandType::ConstantPool, FlowType::Call),
    /* 0xB7 */ OpcodeInfo::new("invokespecial", OperandType::ConstantPool, FlowType::Call),
    /* 0xB8 */ OpcodeInfo::new("invokestatic", OperandType::ConstantPool, FlowType::Call),
    /* 0xB9 */ OpcodeInfo::new("invokeinterface", OperandType::InvokeInterface, FlowType::Call),
    /* 0xBA */ OpcodeInfo::new("invokedynamic", OperandType::InvokeDynamic, FlowType::Call),
    /* 0xBB */ OpcodeInfo::new("new", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xBC */ OpcodeInfo::new("newarray", OperandType::ArrayType, FlowType::Sequential),
    /* 0xBD */ OpcodeInfo::new("anewarray", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xBE */ OpcodeInfo::new("arraylength", OperandType::None, FlowType::Sequential),
    /* 0xBF */ OpcodeInfo::new("athrow", OperandType::None, FlowType::Throw),
    /* 0xC0 */ OpcodeInfo::new("checkcast", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xC1 */ OpcodeInfo::new("instanceof", OperandType::ConstantPool, FlowType::Sequential),
    /* 0xC2 */ OpcodeInfo::new("monitorenter", OperandType::None, FlowType::Sequential),
    /* 0xC3 */ OpcodeInfo::new("monitorexit", OperandType::None, FlowType::Sequential),
    /* 0xC4 */ OpcodeInfo::new("wide", OperandType::Wide, FlowType::Sequential),
    /* 0xC5 */ OpcodeInfo::new("multianewarray", OperandType::MultiANewArray, FlowType::Sequential),
    /* 0xC6 */ OpcodeInfo::new("ifnull", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xC7 */ OpcodeInfo::new("ifnonnull", OperandType::Branch16, FlowType::ConditionalBranch),
    /* 0xC8 */ OpcodeInfo::new("goto_w", OperandType::Branch32, FlowType::UnconditionalBranch),
    /* 0xC9 */ OpcodeInfo::new("jsr_w", OperandType::Branch32, FlowType::Subroutine),
    /* 0xCA */ OpcodeInfo::new("breakpoint", OperandType::None, FlowType::Sequential),
    /* 0xCB */ OpcodeInfo::RESERVED,
    /* 0xCC */ OpcodeInfo::RESERVED,
    /* 0xCD */ OpcodeInfo::RESERVED,
    /* 0xCE */ OpcodeInfo::RESERVED,
    /* 0xCF */ OpcodeInfo::RESERVED,
    /* 0xD0 */ OpcodeInfo::RESERVED,
    /* 0xD1 */ OpcodeInfo::RESERVED,
    /* 0xD2 */ OpcodeInfo::RESERVED,
    /* 0xD3 */ OpcodeInfo::RESERVED,
    /* 0xD4 */ OpcodeInfo::RESERVED,
    /* 0xD5 */ OpcodeInfo::RESERVED,
    /* 0xD6 */ OpcodeInfo::RESERVED,
    /* 0xD7 */ OpcodeInfo::RESERVED,
    /* 0xD8 */ OpcodeInfo::RESERVED,
    /* 0xD9 */ OpcodeInfo::RESERVED,
    /* 0xDA */ OpcodeInfo::RESERVED,
    /* 0xDB */ OpcodeInfo::RESERVED,
    /* 0xDC */ OpcodeInfo::RESERVED,
    /* 0xDD */ OpcodeInfo::RESERVED,
    /* 0xDE */ OpcodeInfo::RESERVED,
    /* 0xDF */ OpcodeInfo::RESERVED,
    /* 0xE0 */ OpcodeInfo::RESERVED,
    /* 0xE1 */ OpcodeInfo::RESERVED,
    /* 0xE2 */ OpcodeInfo::RESERVED,
    /* 0xE3 */ OpcodeInfo::RESERVED,
    /* 0xE4 */ OpcodeInfo::RESERVED,
    /* 0xE5 */ OpcodeInfo::RESERVED,
    /* 0xE6 */ OpcodeInfo::RESERVED,
    /* 0xE7 */ OpcodeInfo::RESERVED,
    /* 0xE8 */ OpcodeInfo::RESERVED,
    /* 0xE9 */ OpcodeInfo::RESERVED,
    /* 0xEA */ OpcodeInfo::RESERVED,
    /* 0xEB */ OpcodeInfo::RESERVED,
    /* 0xEC */ OpcodeInfo::RESERVED,
    /* 0xED */ OpcodeInfo::RESERVED,
    /* 0xEE */ OpcodeInfo::RESERVED,
    /* 0xEF */ OpcodeInfo::RESERVED,
    /* 0xF0 */ OpcodeInfo::RESERVED,
    /* 0xF1 */ OpcodeInfo::RESERVED,
    /* 0xF2 */ OpcodeInfo::RESERVED,
    /* 0xF3 */ OpcodeInfo::RESERVED,
    /* 0xF4 */ OpcodeInfo::RESERVED,
    /* 0xF5 */ OpcodeInfo::RESERVED,
    /* 0xF6 */ OpcodeInfo::RESERVED,
    /* 0xF7 */ OpcodeInfo::RESERVED,
    /* 0xF8 */ OpcodeInfo::RESERVED,
    /* 0xF9 */ OpcodeInfo::RESERVED,
    /* 0xFA */ OpcodeInfo::RESERVED,
    /* 0xFB */ OpcodeInfo::RESERVED,
    /* 0xFC */ OpcodeInfo::RESERVED,
    /* 0xFD */ OpcodeInfo::RESERVED,
    /* 0xFE */ OpcodeInfo::new("impdep1", OperandType::None, FlowType::Sequential),
    /* 0xFF */ OpcodeInfo::new("impdep2", OperandType::None, FlowType::Sequential),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_opcode_constants() {
        assert_eq!(INSTRUCTIONS[opcodes::NOP as usize].instr, "nop");
        assert_eq!(INSTRUCTIONS[opcodes::ILOAD_3 as usize].instr, "iload_3");
        assert_eq!(INSTRUCTIONS[opcodes::ASTORE_0 as usize].instr, "astore_0");
        assert_eq!(INSTRUCTIONS[opcodes::DREM as usize].instr, "drem");
        assert_eq!(INSTRUCTIONS[opcodes::LXOR as usize].instr, "lxor");
        assert_eq!(INSTRUCTIONS[opcodes::IINC as usize].op_type, OperandType::Iinc);
        assert_eq!(INSTRUCTIONS[opcodes::DCMPG as usize].instr, "dcmpg");
        assert_eq!(INSTRUCTIONS[opcodes::IF_ACMPNE as usize].flow, FlowType::ConditionalBranch);
        assert_eq!(INSTRUCTIONS[opcodes::RETURN as usize].flow, FlowType::Return);
        assert_eq!(INSTRUCTIONS[opcodes::JSR_W as usize].op_type, OperandType::Branch32);
        assert_eq!(INSTRUCTIONS[0xCB].instr, "");
    }

    #[test]
    fn assigned_opcode_count() {
        let assigned = INSTRUCTIONS.iter().filter(|info| !info.instr.is_empty()).count();
        assert_eq!(assigned, 205);
    }
}
