//! Input backends for class file data.
//!
//! A [`crate::file::File`] owns the raw bytes of one class file, either memory-mapped from disk
//! ([`crate::file::physical::Physical`]) or held in memory ([`crate::file::memory::Memory`]).
//! Both sit behind the [`crate::file::Backend`] trait so the decoder never needs to know where
//! the bytes came from.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jvmrt::{classfile::ClassFile, File};
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("classes/com/example/Main.class"))?;
//! let class = ClassFile::parse(file.data())?;
//! println!("{} ({} bytes)", class.this_class(), file.len());
//! # Ok::<(), jvmrt::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::OutOfBounds, Result};
use memory::Memory;
use physical::Physical;

/// Backend for the raw data of a [`File`].
///
/// All implementations must be thread-safe, class path lookups run on every runtime thread.
pub trait Backend: Send + Sync {
    /// Returns a slice of `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range is not fully inside the data.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// The complete data.
    fn data(&self) -> &[u8];

    /// Length of the data in bytes.
    fn len(&self) -> usize;
}

/// The raw bytes of a single class file.
pub struct File {
    data: Box<dyn Backend>,
}

impl File {
    /// Memory-map the file at `file`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file can not be opened or mapped, and
    /// [`crate::Error::Empty`] for an empty file.
    pub fn from_file(file: &Path) -> Result<File> {
        Self::load(Physical::new(file)?)
    }

    /// Wrap bytes that are already in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Memory::new(data))
    }

    fn load<T: Backend + 'static>(backend: T) -> Result<File> {
        if backend.len() == 0 {
            return Err(crate::Error::Empty);
        }

        Ok(File {
            data: Box::new(backend),
        })
    }

    /// Length of the file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the file holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// The complete file contents.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// A bounds-checked slice of the file contents.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }
}

pub(crate) fn checked_range(total: usize, offset: usize, len: usize) -> Result<std::ops::Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= total => Ok(offset..end),
        _ => Err(OutOfBounds),
    }
}
