//! Student record store.
//!
//! Holds the canonical, ordered list of students in memory and rewrites the
//! full snapshot through a [`SnapshotBackend`] after every mutation.

use crate::models::{Student, StudentFields, StudentId};
use crate::storage::SnapshotBackend;
use crate::{Error, Result};

/// The single source of truth for student records.
pub struct RecordStore<B: SnapshotBackend> {
    /// Durable storage for the snapshot.
    backend: B,
    /// Key the snapshot is stored under.
    key: String,
    /// Records in insertion order.
    records: Vec<Student>,
}

impl<B: SnapshotBackend> RecordStore<B> {
    /// Opens a store, loading whatever the backend holds under `key`.
    ///
    /// A missing or unreadable snapshot yields an empty store.
    pub fn open(backend: B, key: impl Into<String>) -> Self {
        let key = key.into();
        let records = load(&backend, &key);
        tracing::debug!(
            backend = backend.name(),
            key = %key,
            count = records.len(),
            "Opened record store"
        );
        Self {
            backend,
            key,
            records,
        }
    }

    /// Returns all records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Student] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: &StudentId) -> Option<&Student> {
        self.records.iter().find(|s| &s.id == id)
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a record with a fresh id and appends it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-finite GPA (nothing changes), or an
    /// error if the snapshot cannot be persisted. The in-memory list keeps
    /// the new record in that case.
    pub fn create(&mut self, fields: StudentFields) -> Result<Student> {
        check_fields(&fields)?;
        let student = Student::new(self.fresh_id(), fields);
        self.records.push(student.clone());
        self.persist()?;

        tracing::debug!(id = %student.id, "Created student");
        Ok(student)
    }

    /// Creates several records and persists once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any entry has a non-finite GPA (nothing is
    /// created), or an error if the snapshot cannot be persisted.
    pub fn create_batch(
        &mut self,
        batch: impl IntoIterator<Item = StudentFields>,
    ) -> Result<Vec<Student>> {
        let batch: Vec<StudentFields> = batch.into_iter().collect();
        batch.iter().try_for_each(check_fields)?;

        let mut created = Vec::with_capacity(batch.len());
        for fields in batch {
            let student = Student::new(self.fresh_id(), fields);
            self.records.push(student.clone());
            created.push(student);
        }

        if !created.is_empty() {
            self.persist()?;
        }

        tracing::debug!(count = created.len(), "Created student batch");
        Ok(created)
    }

    /// Replaces every field of the record matching `id` except the id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this id, `InvalidInput` for a
    /// non-finite GPA (nothing changes in either case), or an error if the
    /// snapshot cannot be persisted.
    pub fn update(&mut self, id: &StudentId, fields: StudentFields) -> Result<Student> {
        check_fields(&fields)?;
        let student = self
            .records
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        student.fields = fields;
        let updated = student.clone();
        self.persist()?;

        tracing::debug!(id = %id, "Updated student");
        Ok(updated)
    }

    /// Removes the record matching `id`.
    ///
    /// Returns `false` without touching storage if no record matches.
    /// Confirming the deletion with the user is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted.
    pub fn delete(&mut self, id: &StudentId) -> Result<bool> {
        let Some(index) = self.records.iter().position(|s| &s.id == id) else {
            return Ok(false);
        };
        self.records.remove(index);
        self.persist()?;

        tracing::debug!(id = %id, "Deleted student");
        Ok(true)
    }

    /// Empties the store and removes the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    pub fn clear(&mut self) -> Result<()> {
        let count = self.records.len();
        self.records.clear();
        self.backend.remove(&self.key)?;

        tracing::info!(count, "Cleared all student records");
        Ok(())
    }

    /// Reloads the records from the backend, discarding in-memory state.
    pub fn reload(&mut self) {
        self.records = load(&self.backend, &self.key);
    }

    /// Generates an id not used by any current record.
    fn fresh_id(&self) -> StudentId {
        loop {
            let id = StudentId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Writes the full record list to the backend.
    fn persist(&mut self) -> Result<()> {
        let payload = serde_json::to_string(&self.records).map_err(|e| Error::OperationFailed {
            operation: "serialize_records".to_string(),
            cause: e.to_string(),
        })?;
        self.backend.write(&self.key, &payload)
    }
}

/// Rejects values the JSON snapshot cannot hold.
fn check_fields(fields: &StudentFields) -> Result<()> {
    if fields.gpa.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "gpa must be a finite number, got {}",
            fields.gpa
        )))
    }
}

/// Reads and parses the snapshot, treating any failure as "no data".
fn load<B: SnapshotBackend>(backend: &B, key: &str) -> Vec<Student> {
    let payload = match backend.read(key) {
        Ok(Some(payload)) => payload,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read record snapshot, starting empty");
            return Vec::new();
        },
    };

    serde_json::from_str(&payload).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Record snapshot is malformed, starting empty");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentStatus;
    use crate::storage::MemoryBackend;
    use chrono::NaiveDate;

    const KEY: &str = "student_records";

    fn fields(name: &str, gpa: f64) -> StudentFields {
        StudentFields {
            name: name.to_string(),
            roll_number: format!("CS-{name}"),
            gpa,
            department: "Computer Science".to_string(),
            email: format!("{}@university.edu", name.to_lowercase()),
            status: StudentStatus::Enrolled,
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        }
    }

    #[test]
    fn test_open_empty_backend() {
        let store = RecordStore::open(MemoryBackend::new(), KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_malformed_payload_is_empty() {
        let backend = MemoryBackend::with_entry(KEY, r#"[{"id":"a","name":"#);
        let store = RecordStore::open(backend, KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_assigns_unique_ids_and_persists() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        let ann = store.create(fields("Ann", 3.9)).unwrap();
        let bo = store.create(fields("Bo", 2.1)).unwrap();

        assert_ne!(ann.id, bo.id);
        assert_eq!(store.len(), 2);
        assert!(store.backend().contains(KEY).unwrap());
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        store.create(fields("Ann", 3.9)).unwrap();
        let before = store.records().to_vec();

        let err = store
            .update(&StudentId::new("missing"), fields("X", 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(store.records(), before.as_slice());
    }

    #[test]
    fn test_update_keeps_id() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        let ann = store.create(fields("Ann", 3.9)).unwrap();

        let updated = store.update(&ann.id, fields("Annie", 3.5)).unwrap();
        assert_eq!(updated.id, ann.id);
        assert_eq!(store.get(&ann.id).unwrap().name(), "Annie");
    }

    #[test]
    fn test_delete() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        let ann = store.create(fields("Ann", 3.9)).unwrap();

        assert!(!store.delete(&StudentId::new("missing")).unwrap());
        assert!(store.delete(&ann.id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        store.create(fields("Ann", 3.9)).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!store.backend().contains(KEY).unwrap());
    }

    #[test]
    fn test_create_batch_persists_all() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        let created = store
            .create_batch(vec![fields("Ann", 3.9), fields("Bo", 2.1)])
            .unwrap();
        assert_eq!(created.len(), 2);

        store.reload();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_non_finite_gpa_is_rejected() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        let ann = store.create(fields("Ann", 3.9)).unwrap();
        store.create(fields("Bo", 2.1)).unwrap();

        for gpa in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store.create(fields("Cy", gpa)).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
            let err = store.update(&ann.id, fields("Ann", gpa)).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
        let err = store
            .create_batch(vec![fields("Di", 3.0), fields("Ed", f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        store.reload();
        assert_eq!(store.len(), 2);
        assert!((store.get(&ann.id).unwrap().gpa() - 3.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_null_gpa_in_snapshot_keeps_other_records() {
        let payload = r#"[
            {"id":"a","name":"Ann","rollNumber":"CS-1","gpa":3.9,"department":"Physics",
             "email":"ann@university.edu","status":"Enrolled","enrollmentDate":"2024-09-01"},
            {"id":"b","name":"Bo","rollNumber":"CS-2","gpa":null,"department":"Physics",
             "email":"bo@university.edu","status":"Enrolled","enrollmentDate":"2024-09-01"}
        ]"#;
        let store = RecordStore::open(MemoryBackend::with_entry(KEY, payload), KEY);

        assert_eq!(store.len(), 2);
        assert!(store.records()[1].gpa().abs() < f64::EPSILON);
    }

    #[test]
    fn test_create_batch_empty_does_not_write() {
        let mut store = RecordStore::open(MemoryBackend::new(), KEY);
        let created = store.create_batch(Vec::new()).unwrap();
        assert!(created.is_empty());
        assert!(!store.backend().contains(KEY).unwrap());
    }
}
