//! Abstractions for reading counter sources, so the reader works against both
//! the real `/proc` mount and an in-memory tree in tests.

use std::io;
use std::path::Path;

/// Read-only access to kernel counter files.
///
/// Implementations must be shareable with the sampling thread.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// Counter files under `/proc` are generated on read, so every call sees
    /// the kernel's current values.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
