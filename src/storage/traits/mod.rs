//! Storage backend traits.

mod snapshot;

pub use snapshot::SnapshotBackend;
