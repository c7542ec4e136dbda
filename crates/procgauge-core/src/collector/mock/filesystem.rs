//! In-memory mock filesystem for testing readers without a real `/proc`.
//!
//! Clones of a `MockFs` share the same file table, so a test can keep a handle
//! and rewrite counter files between ticks of a sampler that owns another clone.

use crate::collector::traits::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content, replacing any previous content.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file, simulating a source that disappeared.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_ref());
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("file not found: {:?}", path),
                )
            })
    }
}
