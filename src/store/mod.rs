//! In-memory domain state with write-through persistence.
//!
//! Two stores each own one collection and its storage key:
//! - [`StudentStore`] - `hogwartsStudents`
//! - [`GroupStore`] - `hogwartsGroups`
//!
//! [`Roster`] owns both. It is constructed once and handed down by reference;
//! there is no process-wide instance.

mod listeners;
pub mod groups;
pub mod students;

pub use groups::{GroupEvent, GroupStore, Membership};
pub use listeners::SubscriptionId;
pub use students::{StudentEvent, StudentStore};

use crate::Result;
use crate::storage::BackendType;
use crate::views::{self, DanglingMembership};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// What happens to group memberships when a student is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadePolicy {
    /// Leave the id in every group's `studentIds`
    #[default]
    Keep,
    /// Remove the id from every group that lists it
    Prune,
}

impl CascadePolicy {
    pub fn from_flag(prune: bool) -> Self {
        if prune { Self::Prune } else { Self::Keep }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Prune => "prune",
        }
    }
}

impl fmt::Display for CascadePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of [`Roster::remove_student`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentRemoval {
    /// Records removed from the student collection
    pub removed: usize,
    /// Groups the id was pruned from (empty under `CascadePolicy::Keep`)
    pub pruned_from: Vec<String>,
}

/// Owner of both stores.
pub struct Roster {
    students: StudentStore,
    groups: GroupStore,
    cascade: CascadePolicy,
}

impl Roster {
    pub fn new(students: StudentStore, groups: GroupStore, cascade: CascadePolicy) -> Self {
        Self {
            students,
            groups,
            cascade,
        }
    }

    /// Open both stores on `backend` under `data_dir`, loading stored data or defaults.
    pub fn open(backend: BackendType, data_dir: &Path, cascade: CascadePolicy) -> Self {
        debug!(backend = %backend, data_dir = %data_dir.display(), cascade = %cascade, "opening roster");
        Self::new(
            StudentStore::open(backend.open(data_dir)),
            GroupStore::open(backend.open(data_dir)),
            cascade,
        )
    }

    pub fn students(&self) -> &StudentStore {
        &self.students
    }

    pub fn students_mut(&mut self) -> &mut StudentStore {
        &mut self.students
    }

    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupStore {
        &mut self.groups
    }

    pub fn cascade(&self) -> CascadePolicy {
        self.cascade
    }

    /// Remove a student, applying the cascade policy to group memberships.
    pub fn remove_student(&mut self, id: &str) -> Result<StudentRemoval> {
        let removed = self.students.remove_student(id)?;
        let mut pruned_from = Vec::new();

        if self.cascade == CascadePolicy::Prune {
            let containing: Vec<String> = views::student_groups(id, self.groups.groups())
                .into_iter()
                .map(|g| g.id.clone())
                .collect();
            for group_id in containing {
                self.groups.remove_student_from_group(&group_id, id)?;
                pruned_from.push(group_id);
            }
        }

        Ok(StudentRemoval {
            removed,
            pruned_from,
        })
    }

    /// Memberships that reference students which no longer exist.
    pub fn dangling_memberships(&self) -> Vec<DanglingMembership> {
        views::dangling_memberships(self.groups.groups(), self.students.students())
    }

    /// Remove every dangling membership. Returns what was removed.
    pub fn prune_dangling(&mut self) -> Result<Vec<DanglingMembership>> {
        let dangling = self.dangling_memberships();
        for entry in &dangling {
            self.groups
                .remove_student_from_group(&entry.group_id, &entry.student_id)?;
        }
        Ok(dangling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, Student};
    use crate::storage::{GROUPS_KEY, MemoryBackend};

    fn roster(cascade: CascadePolicy) -> (MemoryBackend, Roster) {
        let backend = MemoryBackend::new();
        let roster = Roster::new(
            StudentStore::open(Box::new(backend.clone())),
            GroupStore::open(Box::new(backend.clone())),
            cascade,
        );
        (backend, roster)
    }

    fn stored_groups(backend: &MemoryBackend) -> Vec<Group> {
        serde_json::from_str(&backend.get(GROUPS_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_keep_policy_leaves_dangling_reference() {
        let (backend, mut roster) = roster(CascadePolicy::Keep);

        let outcome = roster.remove_student("1").unwrap();

        assert_eq!(outcome.removed, 1);
        assert!(outcome.pruned_from.is_empty());
        assert!(roster.groups().get("1").unwrap().has_member("1"));
        assert_eq!(backend.write_count(GROUPS_KEY), 0);
        assert_eq!(
            roster.dangling_memberships(),
            vec![DanglingMembership {
                group_id: "1".to_string(),
                student_id: "1".to_string()
            }]
        );
    }

    #[test]
    fn test_prune_policy_removes_memberships() {
        let (backend, mut roster) = roster(CascadePolicy::Prune);
        roster.groups_mut().add_student_to_group("3", "1").unwrap();

        let outcome = roster.remove_student("1").unwrap();

        assert_eq!(outcome.pruned_from, vec!["1".to_string(), "3".to_string()]);
        assert!(roster.dangling_memberships().is_empty());
        let stored = stored_groups(&backend);
        assert!(stored.iter().all(|g| !g.has_member("1")));
    }

    #[test]
    fn test_prune_dangling() {
        let (_backend, mut roster) = roster(CascadePolicy::Keep);
        roster.remove_student("4").unwrap();
        roster.remove_student("5").unwrap();

        let pruned = roster.prune_dangling().unwrap();

        assert_eq!(pruned.len(), 2);
        assert!(roster.groups().get("2").unwrap().student_ids.is_empty());
        assert!(roster.dangling_memberships().is_empty());
    }

    #[test]
    fn test_open_file_backend_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let mut roster = Roster::open(BackendType::File, dir.path(), CascadePolicy::Keep);
            let student = Student::new("s1".to_string(), "Cho".to_string(), "Chang".to_string(), "7".to_string());
            roster.students_mut().add_student(student).unwrap();
        }

        let roster = Roster::open(BackendType::File, dir.path(), CascadePolicy::Keep);
        assert_eq!(roster.students().len(), 6);
        assert!(roster.students().contains("s1"));
        // Groups were never written, so they still come from the defaults
        assert_eq!(roster.groups().len(), 3);
    }

    #[test]
    fn test_cascade_policy_display() {
        assert_eq!(CascadePolicy::from_flag(true).to_string(), "prune");
        assert_eq!(CascadePolicy::default().to_string(), "keep");
    }
}
