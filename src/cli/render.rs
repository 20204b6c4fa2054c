//! Plain-text rendering for CLI output.
//!
//! Every function returns a `String` so the binary decides where it goes.

use std::fmt::Write as _;

use crate::models::Student;
use crate::services::aggregation::{self, GpaBucket, Summary, department_breakdown};

const BAR_WIDTH: usize = 30;

/// Renders the records table.
#[must_use]
pub fn student_table(rows: &[&Student]) -> String {
    if rows.is_empty() {
        return "No students found.\n".to_string();
    }

    let name_width = column_width(rows.iter().map(|s| s.name()), "Name");
    let roll_width = column_width(rows.iter().map(|s| s.roll_number()), "Roll");
    let dept_width = column_width(rows.iter().map(|s| s.department()), "Department");

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<name_width$}  {:<roll_width$}  {:>4}  {:<dept_width$}  {:<9}  Enrolled",
        "ID", "Name", "Roll", "GPA", "Department", "Status"
    );
    for s in rows {
        let _ = writeln!(
            out,
            "{:<36}  {:<name_width$}  {:<roll_width$}  {:>4.2}  {:<dept_width$}  {:<9}  {}",
            s.id,
            s.name(),
            s.roll_number(),
            s.gpa(),
            s.department(),
            s.fields.status,
            s.fields.enrollment_date
        );
    }
    let _ = writeln!(out, "\n{} student(s)", rows.len());
    out
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

/// Renders one student in full.
#[must_use]
pub fn student_detail(student: &Student) -> String {
    let f = &student.fields;
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", student.id);
    let _ = writeln!(out, "Name:        {}", f.name);
    let _ = writeln!(out, "Roll Number: {}", f.roll_number);
    let _ = writeln!(out, "GPA:         {:.2}", f.gpa);
    let _ = writeln!(out, "Department:  {}", f.department);
    let _ = writeln!(out, "Email:       {}", f.email);
    let _ = writeln!(out, "Status:      {}", f.status);
    let _ = writeln!(out, "Enrolled:    {}", f.enrollment_date);
    out
}

/// Renders the overview: headline figures, GPA distribution and
/// department breakdown.
#[must_use]
pub fn overview(records: &[Student]) -> String {
    let summary = Summary::from_records(records);
    let mut out = String::new();

    let _ = writeln!(out, "Total Students:  {}", summary.total);
    let _ = writeln!(out, "Average GPA:     {}", summary.average_gpa_display());
    let _ = writeln!(out, "Distinctions:    {}", summary.distinctions);
    let _ = writeln!(out, "Faculties:       {}", summary.departments);

    let _ = writeln!(out, "\nGPA Distribution");
    out.push_str(&histogram(&aggregation::gpa_histogram(records)));

    let breakdown = department_breakdown(records);
    if !breakdown.is_empty() {
        let _ = writeln!(out, "\nDepartments");
        let label_width = breakdown
            .keys()
            .map(|d| d.chars().count())
            .max()
            .unwrap_or(0);
        for (department, count) in &breakdown {
            let _ = writeln!(out, "  {department:<label_width$}  {count}");
        }
    }

    out
}

/// Renders histogram buckets as horizontal bars scaled to the largest.
#[must_use]
pub fn histogram(buckets: &[GpaBucket]) -> String {
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
    let mut out = String::new();
    for bucket in buckets {
        let width = if max == 0 {
            0
        } else {
            bucket.count * BAR_WIDTH / max
        };
        let _ = writeln!(
            out,
            "  {:<6} {:<bar$} {}",
            bucket.label,
            "#".repeat(width),
            bucket.count,
            bar = BAR_WIDTH
        );
    }
    out
}

/// Renders a short list of names with their GPA.
#[must_use]
pub fn ranked(title: &str, rows: &[&Student]) -> String {
    let mut out = format!("{title}\n");
    if rows.is_empty() {
        out.push_str("  (none)\n");
    }
    for s in rows {
        let _ = writeln!(out, "  {:.2}  {} ({})", s.gpa(), s.name(), s.roll_number());
    }
    out
}
