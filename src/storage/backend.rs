//! Storage backend trait and implementations.
//!
//! This module provides different storage backends for roster data:
//! - `FileBackend` - One JSON document per key inside a data directory (default)
//! - `MemoryBackend` - Process-local map, nothing touches disk

use super::{FileBackend, MemoryBackend};
use crate::Result;
use std::path::Path;

/// Trait for key-value backends that hold serialized collections.
///
/// Values are whole documents: `write` replaces whatever was stored under the
/// key, there is no append or partial update.
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`, or `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> &'static str;
}

/// Available storage backend types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendType {
    /// JSON files under the data directory
    #[default]
    File,
    /// In-memory only, discarded when the process exits
    Memory,
}

impl BackendType {
    /// Parse a backend type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" | "default" => Some(Self::File),
            "memory" | "mem" | "ephemeral" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }

    /// Open a backend of this type rooted at `data_dir`.
    ///
    /// The memory backend ignores the directory.
    pub fn open(&self, data_dir: &Path) -> Box<dyn StorageBackend> {
        match self {
            Self::File => Box::new(FileBackend::new(data_dir)),
            Self::Memory => Box::new(MemoryBackend::new()),
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
