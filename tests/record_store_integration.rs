//! Record store integration tests.
//!
//! Exercises the store over the filesystem backend:
//! - Every mutation is visible after reopening
//! - Missing or malformed snapshots load as empty
//! - The form controller writes through to disk
//! - Reset removes the snapshot file

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::NaiveDate;
use recordpro::services::FieldUpdate;
use recordpro::storage::DEFAULT_STORAGE_KEY;
use recordpro::{
    FilesystemBackend, FormController, RecordStore, SnapshotBackend, StudentFields, StudentId,
    StudentStatus,
};
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn open(dir: &TempDir) -> RecordStore<FilesystemBackend> {
    RecordStore::open(FilesystemBackend::new(dir.path()), DEFAULT_STORAGE_KEY)
}

fn fields(name: &str, roll: &str, gpa: f64) -> StudentFields {
    StudentFields {
        name: name.to_string(),
        roll_number: roll.to_string(),
        gpa,
        department: "Computer Science".to_string(),
        email: format!("{}@university.edu", name.to_lowercase()),
        status: StudentStatus::Enrolled,
        enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
    }
}

fn snapshot_file(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join(format!("{DEFAULT_STORAGE_KEY}.json"))
}

// ============================================================================
// Persistence
// ============================================================================

mod persistence {
    use super::*;

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let ann = {
            let mut store = open(&dir);
            let ann = store.create(fields("Ann", "CS-1", 3.9)).unwrap();
            store.create(fields("Bo", "CS-2", 2.1)).unwrap();
            ann
        };

        let store = open(&dir);
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0], ann);
        assert_eq!(store.records()[1].name(), "Bo");
    }

    #[test]
    fn test_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        assert!(store.is_empty());
        assert!(!snapshot_file(&dir).exists());
    }

    #[test]
    fn test_malformed_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(snapshot_file(&dir), "{not json").unwrap();

        let mut store = open(&dir);
        assert!(store.is_empty());

        // The next mutation replaces the bad payload.
        store.create(fields("Ann", "CS-1", 3.0)).unwrap();
        assert_eq!(open(&dir).len(), 1);
    }

    #[test]
    fn test_snapshot_uses_record_key_names() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        store.create(fields("Ann", "CS-1", 3.5)).unwrap();

        let raw = std::fs::read_to_string(snapshot_file(&dir)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = &value[0];
        assert!(record["id"].is_string());
        assert_eq!(record["rollNumber"], "CS-1");
        assert_eq!(record["enrollmentDate"], "2024-09-01");
        assert_eq!(record["status"], "Enrolled");
    }

    #[test]
    fn test_reads_hand_written_snapshot() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            snapshot_file(&dir),
            r#"[{"id":"a1","name":"Ann","rollNumber":"CS-1","gpa":3.9,
                "department":"Physics","email":"ann@u.edu","status":"On Leave",
                "enrollmentDate":"2023-02-01"}]"#,
        )
        .unwrap();

        let store = open(&dir);
        let ann = store.get(&StudentId::new("a1")).unwrap();
        assert_eq!(ann.fields.status, StudentStatus::OnLeave);
        assert_eq!(ann.department(), "Physics");
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        store.create(fields("Ann", "CS-1", 3.5)).unwrap();
        assert!(snapshot_file(&dir).exists());

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!snapshot_file(&dir).exists());
        assert!(open(&dir).is_empty());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        store.create(fields("Ann", "CS-1", 3.5)).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

// ============================================================================
// Mutations
// ============================================================================

mod mutations {
    use super::*;

    #[test]
    fn test_update_keeps_id_and_position() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        store.create(fields("Ann", "CS-1", 3.0)).unwrap();
        let bo = store.create(fields("Bo", "CS-2", 2.0)).unwrap();
        store.create(fields("Cy", "CS-3", 1.0)).unwrap();

        let updated = store.update(&bo.id, fields("Bob", "CS-2", 2.8)).unwrap();
        assert_eq!(updated.id, bo.id);

        let reopened = open(&dir);
        let names: Vec<&str> = reopened.records().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Ann", "Bob", "Cy"]);
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        store.create(fields("Ann", "CS-1", 3.0)).unwrap();

        let err = store
            .update(&StudentId::new("missing"), fields("X", "X", 0.0))
            .unwrap_err();
        assert!(matches!(err, recordpro::Error::NotFound(_)));
        assert_eq!(open(&dir).records()[0].name(), "Ann");
    }

    #[test]
    fn test_non_finite_gpa_never_reaches_disk() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        store.create(fields("Ann", "CS-1", 3.9)).unwrap();
        store.create(fields("Bo", "CS-2", 2.1)).unwrap();

        let err = store.create(fields("Cy", "CS-3", f64::NAN)).unwrap_err();
        assert!(matches!(err, recordpro::Error::InvalidInput(_)));
        assert_eq!(store.len(), 2);

        let reopened = open(&dir);
        assert_eq!(reopened.len(), 2);
        assert!(!std::fs::read_to_string(snapshot_file(&dir))
            .unwrap()
            .contains("null"));
    }

    #[test]
    fn test_delete_then_delete_again() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let ann = store.create(fields("Ann", "CS-1", 3.0)).unwrap();

        assert!(store.delete(&ann.id).unwrap());
        assert!(!store.delete(&ann.id).unwrap());
        assert!(open(&dir).is_empty());
    }

    #[test]
    fn test_duplicate_roll_numbers_allowed() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let a = store.create(fields("Ann", "CS-1", 3.0)).unwrap();
        let b = store.create(fields("Bo", "CS-1", 3.0)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_create_batch_persists_all() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let created = store
            .create_batch(vec![fields("Ann", "CS-1", 3.0), fields("Bo", "CS-2", 2.0)])
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(open(&dir).len(), 2);
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let dir = TempDir::new().unwrap();
        let mut first = open(&dir);
        let mut second = open(&dir);

        second.create(fields("Ann", "CS-1", 3.0)).unwrap();
        assert!(first.is_empty());
        first.reload();
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_invalid_key_fails_writes() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(FilesystemBackend::new(dir.path()), "../escape");
        assert!(store.is_empty());
        assert!(store.create(fields("Ann", "CS-1", 3.0)).is_err());
        assert!(!store.backend().contains("../escape").unwrap_or(false));
    }
}

// ============================================================================
// Form Controller
// ============================================================================

mod form {
    use super::*;

    #[test]
    fn test_create_through_form() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let mut form = FormController::new();

        form.begin_create(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        form.apply(FieldUpdate::parse("name", "Dee").unwrap()).unwrap();
        form.apply(FieldUpdate::parse("rollNumber", "ME-9").unwrap())
            .unwrap();
        form.apply(FieldUpdate::parse("gpa", "abc").unwrap()).unwrap();
        let created = form.submit(&mut store).unwrap();

        assert!(!form.is_active());
        let stored = open(&dir);
        let dee = stored.get(&created.id).unwrap();
        assert_eq!(dee.roll_number(), "ME-9");
        assert!(dee.gpa().abs() < f64::EPSILON);
        assert_eq!(
            dee.fields.enrollment_date,
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
        );
    }

    #[test]
    fn test_edit_through_form() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let ann = store.create(fields("Ann", "CS-1", 3.0)).unwrap();

        let mut form = FormController::new();
        form.begin_edit(&ann);
        form.apply(FieldUpdate::Gpa(3.6)).unwrap();
        form.submit(&mut store).unwrap();

        let stored = open(&dir);
        assert_eq!(stored.len(), 1);
        assert!((stored.records()[0].gpa() - 3.6).abs() < f64::EPSILON);
        assert_eq!(stored.records()[0].id, ann.id);
    }
}
