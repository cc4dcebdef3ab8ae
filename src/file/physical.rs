//! Memory-mapped file backend.
//!
//! Class files on a directory class path are mapped rather than read, the decoder only touches
//! the pages it parses and the mapping is dropped as soon as the class is decoded.

use super::{checked_range, Backend};
use crate::{
    Error::{Error, FileError},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A [`Backend`] over a read-only memory mapping of a file on disk.
#[derive(Debug)]
pub struct Physical {
    data: Mmap,
}

impl Physical {
    /// Open and map the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file can not be opened, or
    /// [`crate::Error::Error`] if mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path).map_err(FileError)?;

        // Mapping a zero-length file fails on several platforms, File::load reports it as Empty.
        if file.metadata().map_err(FileError)?.len() == 0 {
            return Err(crate::Error::Empty);
        }

        let mmap = unsafe { Mmap::map(&file) }.map_err(|error| Error(error.to_string()))?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        Ok(&self.data[checked_range(self.data.len(), offset, len)?])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
