//! AI gateway.
//!
//! Adapts the record list to prompts for an [`LlmProvider`] and maps every
//! failure to an inert default, so nothing past this boundary ever sees a
//! transport or parse error.

use crate::llm::{LlmProvider, ResponseSchema, extract_json_from_response};
use crate::models::{DEFAULT_DEPARTMENT, Student, StudentFields, StudentStatus};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shown when an insight is requested for an empty store.
pub const NO_DATA_MESSAGE: &str = "Add some student records to generate insights.";

/// Shown when the endpoint answered with no text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "Failed to generate AI insights.";

/// Shown when the endpoint could not be reached or failed.
pub const OFFLINE_MESSAGE: &str =
    "The academic advisor is currently offline. Please try again later.";

/// Number of records requested from the sample generator.
pub const SAMPLE_COUNT: usize = 5;

/// Outcome of an insight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    /// The store was empty; no request was made.
    NoData,
    /// The endpoint produced a narrative.
    Generated(String),
    /// The endpoint answered with empty text.
    Empty,
    /// The endpoint failed or no provider is configured.
    Unavailable,
}

impl InsightOutcome {
    /// Text to show the user.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NoData => NO_DATA_MESSAGE,
            Self::Generated(text) => text.as_str(),
            Self::Empty => EMPTY_RESPONSE_MESSAGE,
            Self::Unavailable => OFFLINE_MESSAGE,
        }
    }

    /// Returns true if the endpoint produced a narrative.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    /// Consumes the outcome, returning the text to show the user.
    #[must_use]
    pub fn into_message(self) -> String {
        match self {
            Self::Generated(text) => text,
            other => other.message().to_string(),
        }
    }
}

/// A generated student, possibly missing fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SampleRecord {
    /// Full name.
    pub name: Option<String>,
    /// Roll number.
    pub roll_number: Option<String>,
    /// Grade point average.
    pub gpa: Option<f64>,
    /// Department.
    pub department: Option<String>,
    /// Status as free text.
    pub status: Option<String>,
}

impl SampleRecord {
    /// Fills missing fields with defaults, ready for the record store.
    ///
    /// `roll_suffix` numbers the fallback `CS-<n>` roll number. The email is
    /// always derived from the name. A zero or non-finite GPA counts as
    /// missing.
    #[must_use]
    pub fn into_fields(self, today: NaiveDate, roll_suffix: u32) -> StudentFields {
        let name = non_blank(self.name).unwrap_or_else(|| "John Doe".to_string());
        let email = derive_email(&name);
        StudentFields {
            roll_number: non_blank(self.roll_number)
                .unwrap_or_else(|| format!("CS-{roll_suffix}")),
            gpa: self
                .gpa
                .filter(|g| g.is_finite() && *g != 0.0)
                .unwrap_or(3.0),
            department: non_blank(self.department)
                .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
            status: self
                .status
                .as_deref()
                .and_then(StudentStatus::parse)
                .unwrap_or_default(),
            email,
            name,
            enrollment_date: today,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds `first.last@university.edu` from a display name.
#[must_use]
pub fn derive_email(name: &str) -> String {
    let local = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    format!("{local}@university.edu")
}

/// Picks a pseudo-random fallback roll suffix in `0..1000`.
#[must_use]
pub fn random_roll_suffix() -> u32 {
    let value = uuid::Uuid::new_v4().as_u128() % 1000;
    u32::try_from(value).unwrap_or(0)
}

/// Builds the narrative-report prompt for a record list.
#[must_use]
pub fn build_insights_prompt(records: &[Student]) -> String {
    let mut data = String::new();
    for s in records {
        let _ = writeln!(
            data,
            "{} (Roll: {}, GPA: {}, Dept: {})",
            s.name(),
            s.roll_number(),
            s.gpa(),
            s.department()
        );
    }

    format!(
        "Analyze the following student records and provide a professional, concise academic report.\n\
         Highlight the overall performance trends, identify potential outliers, and suggest strategies for academic improvement.\n\
         \n\
         Student Data:\n\
         {data}\n\
         Format the response with bullet points and clear headings. Keep it focused on actionable insights."
    )
}

/// Instruction sent to the sample generator.
#[must_use]
pub fn sample_instruction() -> String {
    format!(
        "Generate {SAMPLE_COUNT} realistic sample student records for a university system. \
         Return ONLY as a JSON array of objects with properties: name, rollNumber (e.g. CS2024-001), \
         gpa (between 2.0 and 4.0), department (CS, EE, ME, or Math), and status (Enrolled)."
    )
}

/// Declared response shape for the sample generator.
#[must_use]
pub fn sample_schema() -> ResponseSchema {
    ResponseSchema::array(ResponseSchema::object_all_required(&[
        ("name", ResponseSchema::String),
        ("rollNumber", ResponseSchema::String),
        ("gpa", ResponseSchema::Number),
        ("department", ResponseSchema::String),
        ("status", ResponseSchema::String),
    ]))
}

/// Parses the generator's JSON text into sample records.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of objects.
pub fn parse_sample_records(text: &str) -> Result<Vec<SampleRecord>> {
    let json = extract_json_from_response(text);
    serde_json::from_str(json).map_err(|e| Error::OperationFailed {
        operation: "parse_sample_records".to_string(),
        cause: format!("Invalid JSON: {e}"),
    })
}

/// Marks an AI call as in flight for its lifetime.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Gateway to the generative-AI endpoint.
pub struct AiGateway {
    provider: Option<Arc<dyn LlmProvider>>,
    in_flight: AtomicUsize,
}

impl AiGateway {
    /// Creates a gateway over a provider.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Creates a gateway with no provider; every request degrades.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            provider: None,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Name of the configured provider, if any.
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Returns true while at least one request is in flight.
    ///
    /// This only informs the caller; concurrent requests are not blocked.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Asks for a narrative report on `records`.
    ///
    /// Never fails: an empty list short-circuits to [`InsightOutcome::NoData`]
    /// and any endpoint problem becomes [`InsightOutcome::Unavailable`].
    pub fn request_insights(&self, records: &[Student]) -> InsightOutcome {
        if records.is_empty() {
            return InsightOutcome::NoData;
        }

        match self.try_insights(records) {
            Ok(text) if text.trim().is_empty() => {
                tracing::warn!("AI endpoint returned an empty narrative");
                InsightOutcome::Empty
            },
            Ok(text) => InsightOutcome::Generated(text),
            Err(e) => {
                tracing::error!(error = %e, "AI insight request failed");
                InsightOutcome::Unavailable
            },
        }
    }

    /// Asks for synthetic sample records.
    ///
    /// Never fails: any endpoint or parse problem yields an empty list.
    pub fn request_sample_records(&self) -> Vec<SampleRecord> {
        match self.try_sample_records() {
            Ok(samples) => samples,
            Err(e) => {
                tracing::error!(error = %e, "Failed to generate sample data");
                Vec::new()
            },
        }
    }

    /// Fallible form of [`Self::request_insights`] for non-empty lists.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured or the request fails.
    pub fn try_insights(&self, records: &[Student]) -> Result<String> {
        let provider = self.provider()?;
        let _busy = BusyGuard::enter(&self.in_flight);

        tracing::debug!(count = records.len(), "Requesting AI insights");
        provider.complete(&build_insights_prompt(records))
    }

    /// Fallible form of [`Self::request_sample_records`].
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured, the request fails or
    /// the response does not parse.
    pub fn try_sample_records(&self) -> Result<Vec<SampleRecord>> {
        let provider = self.provider()?;
        let _busy = BusyGuard::enter(&self.in_flight);

        let text = provider.complete_structured(&sample_instruction(), &sample_schema())?;
        let samples = parse_sample_records(&text)?;
        tracing::debug!(count = samples.len(), "Parsed generated samples");
        Ok(samples)
    }

    fn provider(&self) -> Result<&dyn LlmProvider> {
        self.provider
            .as_deref()
            .ok_or_else(|| Error::OperationFailed {
                operation: "ai_gateway".to_string(),
                cause: "no AI provider configured".to_string(),
            })
    }
}
