//! Sort keys and sort state for the records view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field a records view can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Full name, lexicographic.
    #[default]
    Name,
    /// Roll number, lexicographic.
    RollNumber,
    /// Grade point average, numeric.
    Gpa,
    /// Enrollment date, chronological.
    EnrollmentDate,
}

impl SortField {
    /// Returns all sortable fields.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Name, Self::RollNumber, Self::Gpa, Self::EnrollmentDate]
    }

    /// Returns the field name as used in stored records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::RollNumber => "rollNumber",
            Self::Gpa => "gpa",
            Self::EnrollmentDate => "enrollmentDate",
        }
    }

    /// Parses a sort field, accepting camelCase, snake-case and kebab-case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "name" => Some(Self::Name),
            "rollnumber" | "roll" => Some(Self::RollNumber),
            "gpa" => Some(Self::Gpa),
            "enrollmentdate" | "enrolled" | "date" => Some(Self::EnrollmentDate),
            _ => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortField {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s).ok_or_else(|| {
            crate::Error::InvalidInput(format!(
                "unknown sort field '{s}' (expected name, rollNumber, gpa or enrollmentDate)"
            ))
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Returns the direction as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Active sort field and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    /// Field being sorted on.
    pub field: SortField,
    /// Direction of the sort.
    pub order: SortOrder,
}

impl SortState {
    /// Creates a sort state.
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Applies a column selection.
    ///
    /// Selecting the active field flips the direction; selecting any other
    /// field switches to it in ascending order.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.flipped();
        } else {
            self.field = field;
            self.order = SortOrder::Asc;
        }
    }
}
