//! Filtered, sorted views over the record list.
//!
//! Everything here is a pure function of its inputs, so callers can
//! recompute eagerly on every change or memoize on the four parameters.

use crate::models::{SortField, SortOrder, SortState, Student};
use std::cmp::Ordering;

/// Returns the records matching `search_term`, ordered by `sort_field`.
///
/// Matching is a case-insensitive substring test against the name or the
/// roll number; an empty term matches everything. The sort is stable, and
/// `Desc` reverses the comparator, so records that compare equal keep their
/// input order in both directions.
#[must_use]
pub fn view<'a>(
    records: &'a [Student],
    search_term: &str,
    sort_field: SortField,
    sort_order: SortOrder,
) -> Vec<&'a Student> {
    let needle = search_term.to_lowercase();
    let mut rows: Vec<&Student> = records
        .iter()
        .filter(|s| matches_search(s, &needle))
        .collect();

    rows.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort_field);
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    rows
}

/// Convenience wrapper over [`view`] taking a [`SortState`].
#[must_use]
pub fn view_sorted<'a>(records: &'a [Student], search_term: &str, sort: SortState) -> Vec<&'a Student> {
    view(records, search_term, sort.field, sort.order)
}

/// Checks a record against an already lower-cased search needle.
fn matches_search(student: &Student, needle: &str) -> bool {
    needle.is_empty()
        || student.name().to_lowercase().contains(needle)
        || student.roll_number().to_lowercase().contains(needle)
}

/// Compares two records on a single field.
fn compare_by(a: &Student, b: &Student, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name().cmp(b.name()),
        SortField::RollNumber => a.roll_number().cmp(b.roll_number()),
        SortField::Gpa => a.gpa().total_cmp(&b.gpa()),
        SortField::EnrollmentDate => a.fields.enrollment_date.cmp(&b.fields.enrollment_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StudentFields, StudentId, StudentStatus};
    use chrono::NaiveDate;

    fn student(id: &str, name: &str, roll: &str, gpa: f64, day: u32) -> Student {
        Student::new(
            StudentId::new(id),
            StudentFields {
                name: name.to_string(),
                roll_number: roll.to_string(),
                gpa,
                department: "Physics".to_string(),
                email: String::new(),
                status: StudentStatus::Enrolled,
                enrollment_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            },
        )
    }

    fn ids(rows: &[&Student]) -> Vec<String> {
        rows.iter().map(|s| s.id.to_string()).collect()
    }

    fn sample() -> Vec<Student> {
        vec![
            student("1", "Ann", "CS-010", 3.9, 5),
            student("2", "Bo", "EE-002", 2.1, 3),
            student("3", "Dana", "ME-001", 2.1, 9),
        ]
    }

    #[test]
    fn test_empty_term_returns_all_sorted() {
        let records = sample();
        let rows = view(&records, "", SortField::Gpa, SortOrder::Asc);
        assert_eq!(ids(&rows), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_case_insensitive_name_match() {
        let records = sample();
        let rows = view(&records, "AN", SortField::Name, SortOrder::Asc);
        assert_eq!(ids(&rows), vec!["1", "3"]);
    }

    #[test]
    fn test_roll_number_match() {
        let records = sample();
        let rows = view(&records, "ee-", SortField::Name, SortOrder::Asc);
        assert_eq!(ids(&rows), vec!["2"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let records = sample();
        assert!(view(&records, "zzz", SortField::Name, SortOrder::Asc).is_empty());
    }

    #[test]
    fn test_desc_keeps_tie_order() {
        let records = sample();
        let rows = view(&records, "", SortField::Gpa, SortOrder::Desc);
        // Bo and Dana tie on 2.1 and keep their input order.
        assert_eq!(ids(&rows), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_sort_by_roll_and_date() {
        let records = sample();
        let by_roll = view(&records, "", SortField::RollNumber, SortOrder::Asc);
        assert_eq!(ids(&by_roll), vec!["1", "2", "3"]);

        let by_date = view(&records, "", SortField::EnrollmentDate, SortOrder::Desc);
        assert_eq!(ids(&by_date), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_view_sorted_matches_view() {
        let records = sample();
        let state = SortState::new(SortField::Name, SortOrder::Desc);
        assert_eq!(
            ids(&view_sorted(&records, "", state)),
            ids(&view(&records, "", SortField::Name, SortOrder::Desc))
        );
    }
}
