//! In-memory backend.

use super::StorageBackend;
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    writes: HashMap<String, usize>,
}

/// Keeps values in a shared map.
///
/// Clones share the same map, so one handle can be given to a store while
/// another is kept to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `value` under `key`.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::new();
        backend.lock().entries.insert(key.to_string(), value.to_string());
        backend
    }

    /// Current raw value under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Number of writes made to `key` through any handle.
    pub fn write_count(&self, key: &str) -> usize {
        self.lock().writes.get(key).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned map is still consistent: every write is a single insert.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.entries.insert(key.to_string(), value.to_string());
        *inner.writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let observer = MemoryBackend::new();
        let mut handle = observer.clone();

        handle.write("k", "[]").unwrap();

        assert_eq!(observer.get("k").as_deref(), Some("[]"));
        assert_eq!(observer.write_count("k"), 1);
    }

    #[test]
    fn test_write_count_counts_identical_writes() {
        let mut backend = MemoryBackend::new();
        backend.write("k", "[]").unwrap();
        backend.write("k", "[]").unwrap();
        assert_eq!(backend.write_count("k"), 2);
        assert_eq!(backend.write_count("other"), 0);
    }
}
