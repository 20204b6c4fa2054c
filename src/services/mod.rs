//! Business logic services.
//!
//! The record store owns the data; everything else either reads a slice of
//! it ([`query`], [`aggregation`], [`AiGateway`]) or writes back through it
//! ([`FormController`]).

pub mod aggregation;
mod app;
mod form;
pub mod gateway;
pub mod query;
mod record_store;

pub use aggregation::{GpaBucket, Summary};
pub use app::AppState;
pub use form::{FieldUpdate, FormController, FormIssue, FormMode};
pub use gateway::{AiGateway, InsightOutcome, SampleRecord};
pub use record_store::RecordStore;
