//! Storage layer abstraction.
//!
//! Records are persisted as one serialized snapshot under a single named
//! key. Backends implement [`SnapshotBackend`]:
//! - [`FilesystemBackend`]: one JSON file per key under a data directory
//! - [`MemoryBackend`]: process-local map, for tests

pub mod persistence;
pub mod traits;

pub use persistence::{FilesystemBackend, MemoryBackend};
pub use traits::SnapshotBackend;

/// Default storage key for the student collection.
pub const DEFAULT_STORAGE_KEY: &str = "student_records";
