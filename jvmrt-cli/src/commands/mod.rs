pub mod classes;
pub mod common;
pub mod disasm;
pub mod run;
