//! In-memory snapshot backend.
//!
//! Nothing survives the process. Used in tests and for dry runs.

use crate::Result;
use crate::storage::traits::SnapshotBackend;
use std::collections::HashMap;

/// In-memory snapshot backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with one payload.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, payload: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), payload.into());
        Self { entries }
    }
}

impl SnapshotBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<()> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}
