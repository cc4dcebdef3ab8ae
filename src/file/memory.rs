//! In-memory file backend.
//!
//! Used for class bytes that never touched the disk: classes produced by
//! [`crate::classfile::ClassWriter`], classes served by a
//! [`crate::runtime::MemoryClassPath`], or test fixtures.

use super::{checked_range, Backend};
use crate::Result;

/// A [`Backend`] owning its bytes in a `Vec<u8>`.
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Take ownership of `data`.
    pub fn new(data: Vec<u8>) -> Memory {
        Memory { data }
    }
}

impl Backend for Memory {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        Ok(&self.data[checked_range(self.data.len(), offset, len)?])
    }

    fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
