//! Runtime configuration.

use std::{collections::BTreeMap, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default limit of frames on one call stack
pub const DEFAULT_MAX_STACK_DEPTH: usize = 1024;

fn default_max_stack_depth() -> usize {
    DEFAULT_MAX_STACK_DEPTH
}

/// Settings of one virtual machine instance.
///
/// Usually read from a JSON document:
///
/// ```json
/// {
///   "class_path": ["rt", "build/classes"],
///   "max_stack_depth": 2048,
///   "properties": { "line.separator": "\n" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories holding exploded class trees, searched in order
    pub class_path: Vec<String>,
    /// Frames allowed on one call stack before `StackOverflowError` is raised
    #[serde(default = "default_max_stack_depth")]
    pub max_stack_depth: usize,
    /// System properties
    pub properties: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            class_path: Vec::new(),
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            properties: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Read a configuration document from `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file can not be opened and
    /// [`crate::Error::Config`] if its contents are not a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Read a configuration document from `reader`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Config`] if the document is not a valid configuration.
    pub fn from_reader(reader: impl Read) -> Result<Config> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Replace the class path
    #[must_use]
    pub fn with_class_path<I, S>(mut self, entries: I) -> Config
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_path = entries.into_iter().map(Into::into).collect();
        self
    }

    /// Look up a system property
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
