//! Student types and identifiers.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Departments offered by the entry form, in display order.
///
/// The store accepts any department text; this list only seeds form
/// defaults and CLI hints.
pub const SUGGESTED_DEPARTMENTS: &[&str] = &[
    "Computer Science",
    "Electrical Engineering",
    "Mechanical Engineering",
    "Mathematics",
    "Physics",
];

/// Department used when nothing else is known.
pub const DEFAULT_DEPARTMENT: &str = "Computer Science";

/// Unique identifier for a student.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Creates a student ID from existing text.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random (UUID v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<String> for StudentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Enrollment status of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StudentStatus {
    /// Currently enrolled.
    #[default]
    Enrolled,
    /// Completed their program.
    Graduated,
    /// Temporarily away.
    #[serde(rename = "On Leave", alias = "OnLeave")]
    OnLeave,
}

impl StudentStatus {
    /// Returns all status variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Enrolled, Self::Graduated, Self::OnLeave]
    }

    /// Returns the status as it is displayed and persisted.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enrolled => "Enrolled",
            Self::Graduated => "Graduated",
            Self::OnLeave => "On Leave",
        }
    }

    /// Parses a status, ignoring case, spaces, dashes and underscores.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "enrolled" => Some(Self::Enrolled),
            "graduated" => Some(Self::Graduated),
            "onleave" => Some(Self::OnLeave),
            _ => None,
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for StudentStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s).ok_or_else(|| {
            crate::Error::InvalidInput(format!(
                "unknown status '{s}' (expected Enrolled, Graduated or On Leave)"
            ))
        })
    }
}

/// Every student field except the identifier.
///
/// This is what the form stages and what the store receives on create and
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFields {
    /// Full name.
    pub name: String,
    /// Roll number. Not required to be unique.
    pub roll_number: String,
    /// Grade point average, conventionally 0.0 to 4.0. A stored `null`
    /// reads back as 0.0.
    #[serde(deserialize_with = "gpa_or_zero")]
    pub gpa: f64,
    /// Department name.
    pub department: String,
    /// Contact email.
    pub email: String,
    /// Enrollment status.
    pub status: StudentStatus,
    /// Date of enrollment.
    pub enrollment_date: NaiveDate,
}

impl StudentFields {
    /// Returns the values a blank create form starts with.
    #[must_use]
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            roll_number: String::new(),
            gpa: 0.0,
            department: DEFAULT_DEPARTMENT.to_string(),
            email: String::new(),
            status: StudentStatus::Enrolled,
            enrollment_date: today,
        }
    }
}

/// Reads a GPA, mapping `null` to 0.0.
///
/// JSON has no NaN or infinity, so writers emit `null` for them. One such
/// value must not make the whole snapshot unreadable.
fn gpa_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// A stored student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier, fixed at creation.
    pub id: StudentId,
    /// All other fields.
    #[serde(flatten)]
    pub fields: StudentFields,
}

impl Student {
    /// Builds a student from an id and its fields.
    #[must_use]
    pub const fn new(id: StudentId, fields: StudentFields) -> Self {
        Self { id, fields }
    }

    /// Full name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    /// Roll number.
    #[must_use]
    pub fn roll_number(&self) -> &str {
        &self.fields.roll_number
    }

    /// Grade point average.
    #[must_use]
    pub const fn gpa(&self) -> f64 {
        self.fields.gpa
    }

    /// Department name.
    #[must_use]
    pub fn department(&self) -> &str {
        &self.fields.department
    }
}
