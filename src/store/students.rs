//! Student store.

use super::listeners::{Listeners, SubscriptionId};
use crate::Result;
use crate::models::{Student, seed};
use crate::storage::{STUDENTS_KEY, StorageBackend, load_collection, save_collection};
use tracing::debug;

/// What changed in the student collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentEvent {
    Added { id: String },
    Updated { id: String },
    /// Emitted even when nothing matched (`count == 0`), since the write still happens.
    Removed { id: String, count: usize },
}

/// Owns the ordered student collection and mirrors it to `hogwartsStudents`.
///
/// The store does not validate records; it trusts callers to supply fresh ids
/// and well-formed fields.
pub struct StudentStore {
    students: Vec<Student>,
    backend: Box<dyn StorageBackend>,
    listeners: Listeners<StudentEvent>,
}

impl StudentStore {
    /// Load the stored collection, or the default students if none is usable.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let students = load_collection(backend.as_ref(), STUDENTS_KEY, seed::default_students);
        Self::with_students(backend, students)
    }

    /// Start from an explicit collection without touching storage.
    pub fn with_students(backend: Box<dyn StorageBackend>, students: Vec<Student>) -> Self {
        Self {
            students,
            backend,
            listeners: Listeners::default(),
        }
    }

    /// Current snapshot, in insertion order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Where the collection is persisted.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    pub fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }

    /// Append a fully-formed record and persist.
    pub fn add_student(&mut self, student: Student) -> Result<()> {
        let id = student.id.clone();
        self.students.push(student);
        self.persist()?;
        self.listeners.notify(&StudentEvent::Added { id });
        Ok(())
    }

    /// Replace the record with the same id.
    ///
    /// Unknown ids are ignored and nothing is written. Returns whether a record
    /// was replaced.
    pub fn update_student(&mut self, student: Student) -> Result<bool> {
        let Some(slot) = self.students.iter_mut().find(|s| s.id == student.id) else {
            debug!(id = %student.id, "update for unknown student ignored");
            return Ok(false);
        };
        let id = student.id.clone();
        *slot = student;
        self.persist()?;
        self.listeners.notify(&StudentEvent::Updated { id });
        Ok(true)
    }

    /// Remove every record with `id` and persist, whether or not one matched.
    ///
    /// Returns how many records were removed.
    pub fn remove_student(&mut self, id: &str) -> Result<usize> {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        let count = before - self.students.len();
        self.persist()?;
        self.listeners.notify(&StudentEvent::Removed {
            id: id.to_string(),
            count,
        });
        Ok(count)
    }

    /// Register a callback run after every persisted mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&StudentEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn persist(&mut self) -> Result<()> {
        save_collection(self.backend.as_mut(), STUDENTS_KEY, &self.students)
    }
}
