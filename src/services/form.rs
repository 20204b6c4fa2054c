//! Form controller for creating and editing a single student.
//!
//! The controller stages field values in one of two active modes and hands
//! them to the [`RecordStore`] on submit. Validation here is advisory: the
//! store only refuses a non-finite GPA, which staged text never produces.

use crate::models::{Student, StudentFields, StudentId, StudentStatus};
use crate::services::RecordStore;
use crate::storage::SnapshotBackend;
use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Display range for GPA values.
const GPA_RANGE: std::ops::RangeInclusive<f64> = 0.0..=4.0;

/// Whole-string email shape: local part, `@`, dotted domain with a
/// letters-only top-level label.
// The pattern is static and always compiles.
#[allow(clippy::expect_used)]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$")
        .expect("static regex: email pattern")
});

/// What the form is currently doing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormMode {
    /// No form is open.
    #[default]
    Idle,
    /// Staging a new record.
    Create,
    /// Staging changes to an existing record.
    Edit {
        /// Record being edited.
        id: StudentId,
    },
}

/// A single staged-field replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Full name.
    Name(String),
    /// Roll number.
    RollNumber(String),
    /// Grade point average.
    Gpa(f64),
    /// Department.
    Department(String),
    /// Contact email.
    Email(String),
    /// Enrollment status.
    Status(StudentStatus),
    /// Enrollment date.
    EnrollmentDate(NaiveDate),
}

impl FieldUpdate {
    /// Builds a GPA update from text, using 0.0 when the text is not a number.
    #[must_use]
    pub fn gpa_from_text(text: &str) -> Self {
        let gpa = text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        Self::Gpa(gpa)
    }

    /// Builds an update from a field key and its textual value.
    ///
    /// Keys follow the stored record names (`rollNumber`, `enrollmentDate`);
    /// snake-case spellings are accepted too.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown key, an unknown status or a
    /// date that is not `YYYY-MM-DD`. A non-numeric GPA is not an error.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        match key {
            "name" => Ok(Self::Name(value.to_string())),
            "rollNumber" | "roll_number" => Ok(Self::RollNumber(value.to_string())),
            "gpa" => Ok(Self::gpa_from_text(value)),
            "department" => Ok(Self::Department(value.to_string())),
            "email" => Ok(Self::Email(value.to_string())),
            "status" => value.parse().map(Self::Status),
            "enrollmentDate" | "enrollment_date" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Self::EnrollmentDate)
                .map_err(|e| Error::InvalidInput(format!("invalid enrollment date '{value}': {e}"))),
            other => Err(Error::InvalidInput(format!("unknown form field '{other}'"))),
        }
    }

    /// Writes this update into a set of fields.
    fn apply_to(self, fields: &mut StudentFields) {
        match self {
            Self::Name(v) => fields.name = v,
            Self::RollNumber(v) => fields.roll_number = v,
            Self::Gpa(v) => fields.gpa = v,
            Self::Department(v) => fields.department = v,
            Self::Email(v) => fields.email = v,
            Self::Status(v) => fields.status = v,
            Self::EnrollmentDate(v) => fields.enrollment_date = v,
        }
    }
}

/// An advisory problem with the staged values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIssue {
    /// Name is blank.
    MissingName,
    /// Roll number is blank.
    MissingRollNumber,
    /// Email is blank.
    MissingEmail,
    /// Email does not look like `local@domain.tld`.
    MalformedEmail,
    /// GPA is outside 0.0 to 4.0.
    GpaOutOfRange,
}

impl FormIssue {
    /// Human-readable description.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingName => "name is required",
            Self::MissingRollNumber => "roll number is required",
            Self::MissingEmail => "email is required",
            Self::MalformedEmail => "email does not look valid",
            Self::GpaOutOfRange => "GPA should be between 0.0 and 4.0",
        }
    }
}

/// Stages one student's fields for create or edit.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    mode: FormMode,
    staged: Option<StudentFields>,
}

impl FormController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Returns true while a create or edit is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.mode, FormMode::Idle)
    }

    /// Staged values, if a form is open.
    #[must_use]
    pub const fn staged(&self) -> Option<&StudentFields> {
        self.staged.as_ref()
    }

    /// Opens a blank create form dated `today`.
    pub fn begin_create(&mut self, today: NaiveDate) {
        self.mode = FormMode::Create;
        self.staged = Some(StudentFields::blank(today));
    }

    /// Opens an edit form seeded from `student`.
    pub fn begin_edit(&mut self, student: &Student) {
        self.mode = FormMode::Edit {
            id: student.id.clone(),
        };
        self.staged = Some(student.fields.clone());
    }

    /// Replaces one staged field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no form is open.
    pub fn apply(&mut self, update: FieldUpdate) -> Result<()> {
        let staged = self
            .staged
            .as_mut()
            .ok_or_else(|| Error::InvalidInput("no form is open".to_string()))?;
        update.apply_to(staged);
        Ok(())
    }

    /// Lists advisory problems with the staged values.
    ///
    /// An idle controller has nothing to validate and returns no issues.
    #[must_use]
    pub fn validate(&self) -> Vec<FormIssue> {
        let Some(fields) = &self.staged else {
            return Vec::new();
        };

        let mut issues = Vec::new();
        if fields.name.trim().is_empty() {
            issues.push(FormIssue::MissingName);
        }
        if fields.roll_number.trim().is_empty() {
            issues.push(FormIssue::MissingRollNumber);
        }
        if fields.email.trim().is_empty() {
            issues.push(FormIssue::MissingEmail);
        } else if !looks_like_email(&fields.email) {
            issues.push(FormIssue::MalformedEmail);
        }
        if !GPA_RANGE.contains(&fields.gpa) {
            issues.push(FormIssue::GpaOutOfRange);
        }
        issues
    }

    /// Commits the staged values and closes the form.
    ///
    /// Create mode calls [`RecordStore::create`]; edit mode calls
    /// [`RecordStore::update`] with the id fixed when the form opened.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no form is open, otherwise whatever the store
    /// returns. The form is closed even when the store fails.
    pub fn submit<B: SnapshotBackend>(&mut self, store: &mut RecordStore<B>) -> Result<Student> {
        let mode = std::mem::take(&mut self.mode);
        let staged = self.staged.take();

        match (mode, staged) {
            (FormMode::Create, Some(fields)) => store.create(fields),
            (FormMode::Edit { id }, Some(fields)) => store.update(&id, fields),
            _ => Err(Error::InvalidInput("no form is open".to_string())),
        }
    }

    /// Discards staged values and closes the form.
    pub fn cancel(&mut self) {
        self.mode = FormMode::Idle;
        self.staged = None;
    }
}

/// Loose `local@domain.tld` shape check.
fn looks_like_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}
