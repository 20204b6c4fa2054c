//! # RecordPro
//!
//! A local student-records manager.
//!
//! RecordPro keeps a list of student records in a single JSON snapshot,
//! derives filtered and sorted views and summary statistics from it, and can
//! ask a generative-AI endpoint for a narrative report or a handful of
//! synthetic sample records.
//!
//! ## Layout
//!
//! - [`storage`]: durable key-value snapshot backends
//! - [`services`]: record store, query and aggregation engines, form
//!   controller, AI gateway and application state
//! - [`llm`]: HTTP clients for the generative-AI providers
//! - [`config`]: TOML configuration with environment overrides
//! - [`observability`]: `tracing` subscriber setup
//!
//! ## Example
//!
//! ```rust,ignore
//! use recordpro::services::{RecordStore, query};
//! use recordpro::storage::FilesystemBackend;
//! use recordpro::{SortField, SortOrder};
//!
//! let backend = FilesystemBackend::with_create("/tmp/recordpro")?;
//! let store = RecordStore::open(backend, "student_records");
//! let rows = query::view(store.records(), "ann", SortField::Gpa, SortOrder::Desc);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::RecordProConfig;
pub use llm::LlmProvider;
pub use models::{
    SortField, SortOrder, SortState, Student, StudentFields, StudentId, StudentStatus, View,
};
pub use services::{AiGateway, AppState, FormController, InsightOutcome, RecordStore};
pub use storage::{FilesystemBackend, MemoryBackend, SnapshotBackend};

/// Error type for recordpro operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unknown form field key, submit without an active form, bad CLI value |
/// | `NotFound` | Updating a student id that is not in the store |
/// | `OperationFailed` | Snapshot writes, config file reads, HTTP and parse failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced student does not exist.
    #[error("student not found: {0}")]
    NotFound(StudentId),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The snapshot file cannot be written or removed
    /// - A configuration file cannot be read or parsed
    /// - An AI endpoint request fails or returns an unusable body
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for recordpro operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns today's date in the local timezone.
///
/// New records and freshly opened create forms default their enrollment
/// date to this value.
#[must_use]
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
