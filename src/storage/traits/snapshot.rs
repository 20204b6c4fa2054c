//! Snapshot backend trait.

use crate::Result;

/// Durable key-value storage for whole-collection snapshots.
///
/// A backend holds opaque text payloads under named keys. The record store
/// writes the complete serialized collection on every mutation, so backends
/// only need whole-value reads and writes.
pub trait SnapshotBackend: Send + Sync {
    /// The backend name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Reads the payload stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload exists but cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be written.
    fn write(&mut self, key: &str, payload: &str) -> Result<()>;

    /// Removes the payload stored under `key`.
    ///
    /// Returns `true` if something was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload exists but cannot be removed.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// Checks whether a payload is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read(key)?.is_some())
    }
}
