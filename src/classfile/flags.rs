//! Access flags of classes, fields and methods.
//!
//! The raw `u16` masks come straight from the class file; unknown bits are dropped on decode.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Flags of a class or interface declaration
    pub struct ClassAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared final, no subclasses allowed
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by invokespecial
        const SUPER = 0x0020;
        /// Is an interface, not a class
        const INTERFACE = 0x0200;
        /// Declared abstract
        const ABSTRACT = 0x0400;
        /// Not present in the source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation type
        const ANNOTATION = 0x2000;
        /// Declared as an enum type
        const ENUM = 0x4000;
        /// Is a module, not a class
        const MODULE = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Flags of a field declaration
    pub struct FieldAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared private
        const PRIVATE = 0x0002;
        /// Declared protected
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final
        const FINAL = 0x0010;
        /// Declared volatile
        const VOLATILE = 0x0040;
        /// Declared transient
        const TRANSIENT = 0x0080;
        /// Not present in the source code
        const SYNTHETIC = 0x1000;
        /// Element of an enum
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Flags of a method declaration
    pub struct MethodAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared private
        const PRIVATE = 0x0002;
        /// Declared protected
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final
        const FINAL = 0x0010;
        /// Declared synchronized, invocation is wrapped by a monitor
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler
        const BRIDGE = 0x0040;
        /// Declared with variable number of arguments
        const VARARGS = 0x0080;
        /// Implemented outside of bytecode
        const NATIVE = 0x0100;
        /// Declared abstract, no implementation
        const ABSTRACT = 0x0400;
        /// Declared strictfp
        const STRICT = 0x0800;
        /// Not present in the source code
        const SYNTHETIC = 0x1000;
    }
}

macro_rules! flag_keywords {
    ($flags:expr, $($flag:expr => $keyword:literal),* $(,)?) => {{
        let mut keywords: Vec<&'static str> = Vec::new();
        $(
            if $flags.contains($flag) {
                keywords.push($keyword);
            }
        )*
        keywords.join(" ")
    }};
}

impl ClassAccessFlags {
    /// Source-level modifiers, as printed in a disassembly listing
    #[must_use]
    pub fn keywords(self) -> String {
        flag_keywords!(self,
            Self::PUBLIC => "public",
            Self::FINAL => "final",
            Self::ABSTRACT => "abstract",
            Self::INTERFACE => "interface",
            Self::ENUM => "enum",
        )
    }
}

impl FieldAccessFlags {
    /// Source-level modifiers, as printed in a disassembly listing
    #[must_use]
    pub fn keywords(self) -> String {
        flag_keywords!(self,
            Self::PUBLIC => "public",
            Self::PRIVATE => "private",
            Self::PROTECTED => "protected",
            Self::STATIC => "static",
            Self::FINAL => "final",
            Self::VOLATILE => "volatile",
            Self::TRANSIENT => "transient",
        )
    }
}

impl MethodAccessFlags {
    /// Source-level modifiers, as printed in a disassembly listing
    #[must_use]
    pub fn keywords(self) -> String {
        flag_keywords!(self,
            Self::PUBLIC => "public",
            Self::PRIVATE => "private",
            Self::PROTECTED => "protected",
            Self::STATIC => "static",
            Self::FINAL => "final",
            Self::SYNCHRONIZED => "synchronized",
            Self::NATIVE => "native",
            Self::ABSTRACT => "abstract",
        )
    }
}
