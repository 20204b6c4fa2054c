//! Data models for recordpro.
//!
//! This module contains the student entity and the small value types used to
//! describe views over it.

mod sort;
mod student;
mod view;

pub use sort::{SortField, SortOrder, SortState};
pub use student::{
    DEFAULT_DEPARTMENT, SUGGESTED_DEPARTMENTS, Student, StudentFields, StudentId, StudentStatus,
};
pub use view::View;
