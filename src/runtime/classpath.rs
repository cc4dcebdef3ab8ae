//! Class path entries.
//!
//! A [`ClassPath`] maps binary class names (`java/lang/String`) to decoded class files. The
//! registry queries its entries in order and takes the first hit.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::RwLock,
};

use log::debug;

use crate::{classfile::ClassFile, Error, Result};

/// A source of class files.
pub trait ClassPath: Send + Sync + fmt::Debug {
    /// Look up the class `name`.
    ///
    /// Returns `Ok(None)` if this entry does not provide the class.
    ///
    /// # Errors
    /// Returns an error if the class exists but can not be read or decoded.
    fn search(&self, name: &str) -> Result<Option<ClassFile>>;

    /// Human readable description of the entry
    fn describe(&self) -> String;
}

/// Class path entry backed by a directory tree (`<root>/java/lang/Object.class`).
#[derive(Debug)]
pub struct DirectoryClassPath {
    root: PathBuf,
}

impl DirectoryClassPath {
    /// Create an entry rooted at `root`.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if `root` is not an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<DirectoryClassPath> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::FileError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", root.display()),
            )));
        }

        Ok(DirectoryClassPath {
            root: root.to_path_buf(),
        })
    }

    /// The root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClassPath for DirectoryClassPath {
    fn search(&self, name: &str) -> Result<Option<ClassFile>> {
        let path = self.root.join(format!("{name}.class"));
        if !path.is_file() {
            return Ok(None);
        }

        debug!("Loading {} from {}", name, path.display());
        ClassFile::from_file(&path).map(Some)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Class path entry holding class file bytes in memory.
///
/// Used by embedders that generate classes at runtime and by the test suite.
#[derive(Debug, Default)]
pub struct MemoryClassPath {
    classes: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryClassPath {
    /// Create an empty entry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the class `name` with its class file bytes, replacing a previous definition
    pub fn add(&self, name: &str, data: Vec<u8>) {
        write_lock!(self.classes).insert(name.to_string(), data);
    }

    /// Number of classes held
    #[must_use]
    pub fn len(&self) -> usize {
        read_lock!(self.classes).len()
    }

    /// True if no class has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClassPath for MemoryClassPath {
    fn search(&self, name: &str) -> Result<Option<ClassFile>> {
        match read_lock!(self.classes).get(name) {
            Some(data) => ClassFile::parse(data).map(Some),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("<memory: {} classes>", self.len())
    }
}

/// Build class path entries from their textual form.
///
/// Every entry must name a directory; archives are rejected.
///
/// # Errors
/// Returns [`Error::NotSupported`] for `.jar` and `.zip` entries and [`Error::FileError`] for
/// entries that are not directories.
pub fn init_class_paths(entries: &[String]) -> Result<Vec<Box<dyn ClassPath>>> {
    let mut paths: Vec<Box<dyn ClassPath>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let lower = entry.to_ascii_lowercase();
        if lower.ends_with(".jar") || lower.ends_with(".zip") {
            return Err(Error::NotSupported);
        }
        paths.push(Box::new(DirectoryClassPath::new(entry)?));
    }
    Ok(paths)
}
