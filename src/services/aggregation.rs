//! Summary statistics over the full record list.
//!
//! All functions recompute from scratch and are total: any slice of
//! students, including an empty one, produces a value.

use crate::models::Student;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// GPA at or above which a student counts as a distinction.
pub const DISTINCTION_GPA: f64 = 3.8;

/// GPA below which a student is flagged as at risk.
pub const AT_RISK_GPA: f64 = 2.0;

/// Total number of records.
#[must_use]
pub const fn count(records: &[Student]) -> usize {
    records.len()
}

/// Arithmetic mean GPA, or 0.0 for an empty list.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_gpa(records: &[Student]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records.iter().map(Student::gpa).sum();
    total / records.len() as f64
}

/// Number of records with GPA of at least [`DISTINCTION_GPA`].
#[must_use]
pub fn distinction_count(records: &[Student]) -> usize {
    records.iter().filter(|s| s.gpa() >= DISTINCTION_GPA).count()
}

/// Number of distinct department values.
#[must_use]
pub fn department_count(records: &[Student]) -> usize {
    records
        .iter()
        .map(Student::department)
        .collect::<HashSet<_>>()
        .len()
}

/// One bar of the GPA histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpaBucket {
    /// Display label, e.g. `"2-3.0"`.
    pub label: &'static str,
    /// Number of records in range.
    pub count: usize,
}

/// Counts records in four GPA buckets: `[0,1)`, `[1,2)`, `[2,3)` and `[3,∞)`.
///
/// The top bucket is open-ended, so a 4.0 (or an out-of-range 4.5) lands in
/// it alongside 3.0. Values below zero count towards the first bucket.
#[must_use]
pub fn gpa_histogram(records: &[Student]) -> [GpaBucket; 4] {
    let mut counts = [0usize; 4];
    for gpa in records.iter().map(Student::gpa) {
        let index = if gpa < 1.0 {
            0
        } else if gpa < 2.0 {
            1
        } else if gpa < 3.0 {
            2
        } else {
            3
        };
        counts[index] += 1;
    }

    [
        GpaBucket {
            label: "0-1.0",
            count: counts[0],
        },
        GpaBucket {
            label: "1-2.0",
            count: counts[1],
        },
        GpaBucket {
            label: "2-3.0",
            count: counts[2],
        },
        GpaBucket {
            label: "3-4.0",
            count: counts[3],
        },
    ]
}

/// Number of records per department.
#[must_use]
pub fn department_breakdown(records: &[Student]) -> BTreeMap<String, usize> {
    let mut breakdown = BTreeMap::new();
    for student in records {
        *breakdown
            .entry(student.department().to_string())
            .or_insert(0) += 1;
    }
    breakdown
}

/// Short chart label for a department: its first word.
///
/// Only for space-constrained chart legends; distinct departments can share
/// a label, so tables print the full name.
#[must_use]
pub fn department_chart_label(department: &str) -> &str {
    department.split(' ').next().unwrap_or(department)
}

/// Distinction students, best GPA first.
#[must_use]
pub fn top_performers(records: &[Student]) -> Vec<&Student> {
    let mut top: Vec<&Student> = records
        .iter()
        .filter(|s| s.gpa() >= DISTINCTION_GPA)
        .collect();
    top.sort_by(|a, b| b.gpa().total_cmp(&a.gpa()));
    top
}

/// Students below [`AT_RISK_GPA`], lowest GPA first.
#[must_use]
pub fn at_risk(records: &[Student]) -> Vec<&Student> {
    let mut risk: Vec<&Student> = records.iter().filter(|s| s.gpa() < AT_RISK_GPA).collect();
    risk.sort_by(|a, b| a.gpa().total_cmp(&b.gpa()));
    risk
}

/// Headline figures shown on the overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Total records.
    pub total: usize,
    /// Mean GPA (0.0 when empty).
    pub average_gpa: f64,
    /// Records with a distinction GPA.
    pub distinctions: usize,
    /// Distinct departments.
    pub departments: usize,
}

impl Summary {
    /// Computes the summary for a record list.
    #[must_use]
    pub fn from_records(records: &[Student]) -> Self {
        Self {
            total: count(records),
            average_gpa: average_gpa(records),
            distinctions: distinction_count(records),
            departments: department_count(records),
        }
    }

    /// Mean GPA rounded to two decimals for display.
    #[must_use]
    pub fn average_gpa_display(&self) -> String {
        format!("{:.2}", self.average_gpa)
    }
}
