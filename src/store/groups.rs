//! Group store.

use super::listeners::{Listeners, SubscriptionId};
use crate::Result;
use crate::models::{Group, NewGroup, seed};
use crate::storage::{GROUPS_KEY, StorageBackend, generate_id, load_collection, save_collection};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// What changed in the group collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent {
    Added { id: String },
    Updated { id: String },
    Removed { id: String, count: usize },
    /// `changed` is false when the student was already a member.
    MemberAdded { group_id: String, student_id: String, changed: bool },
    MemberRemoved { group_id: String, student_id: String },
    PointsUpdated { group_id: String, points: u32 },
}

/// Result of a membership operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// No group with that id; nothing was written
    GroupNotFound,
    Added,
    AlreadyMember,
    Removed,
    NotMember,
}

/// Owns the ordered group collection and mirrors it to `hogwartsGroups`.
pub struct GroupStore {
    groups: Vec<Group>,
    backend: Box<dyn StorageBackend>,
    listeners: Listeners<GroupEvent>,
}

impl GroupStore {
    /// Load the stored collection, or the default groups if none is usable.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let groups = load_collection(backend.as_ref(), GROUPS_KEY, seed::default_groups);
        Self::with_groups(backend, groups)
    }

    /// Start from an explicit collection without touching storage.
    pub fn with_groups(backend: Box<dyn StorageBackend>, groups: Vec<Group>) -> Self {
        Self {
            groups,
            backend,
            listeners: Listeners::default(),
        }
    }

    /// Current snapshot, in insertion order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Create a group from caller-supplied fields.
    ///
    /// The store assigns the id (creation instant in epoch milliseconds, bumped
    /// past any id already taken), the creation time, and zero points. Repeated
    /// member ids are dropped, keeping the first occurrence.
    pub fn add_group(&mut self, new: NewGroup) -> Result<Group> {
        let now = Utc::now();
        let group = Group {
            id: generate_id(now, |id| self.get(id).is_some()),
            name: new.name,
            description: new.description,
            student_ids: unique_ids(new.student_ids),
            created_at: now,
            color: new.color,
            points: 0,
            tasks: None,
        };
        self.groups.push(group.clone());
        self.persist()?;
        self.listeners.notify(&GroupEvent::Added { id: group.id.clone() });
        Ok(group)
    }

    /// Replace the group with the same id. Unknown ids are ignored without a write.
    ///
    /// Member ids are deduplicated the same way as in `add_group`.
    pub fn update_group(&mut self, mut group: Group) -> Result<bool> {
        let Some(slot) = self.groups.iter_mut().find(|g| g.id == group.id) else {
            debug!(id = %group.id, "update for unknown group ignored");
            return Ok(false);
        };
        let id = group.id.clone();
        group.student_ids = unique_ids(group.student_ids);
        *slot = group;
        self.persist()?;
        self.listeners.notify(&GroupEvent::Updated { id });
        Ok(true)
    }

    /// Remove every group with `id` and persist, whether or not one matched.
    pub fn remove_group(&mut self, id: &str) -> Result<usize> {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        let count = before - self.groups.len();
        self.persist()?;
        self.listeners.notify(&GroupEvent::Removed {
            id: id.to_string(),
            count,
        });
        Ok(count)
    }

    /// Append `student_id` to the group's members unless already present.
    ///
    /// Persists whenever the group exists, including when the student was
    /// already a member and the collection is unchanged.
    pub fn add_student_to_group(&mut self, group_id: &str, student_id: &str) -> Result<Membership> {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) else {
            return Ok(Membership::GroupNotFound);
        };
        let changed = !group.has_member(student_id);
        if changed {
            group.student_ids.push(student_id.to_string());
        }
        self.persist()?;
        self.listeners.notify(&GroupEvent::MemberAdded {
            group_id: group_id.to_string(),
            student_id: student_id.to_string(),
            changed,
        });
        Ok(if changed {
            Membership::Added
        } else {
            Membership::AlreadyMember
        })
    }

    /// Remove `student_id` from the group's members. Persists if the group exists.
    pub fn remove_student_from_group(&mut self, group_id: &str, student_id: &str) -> Result<Membership> {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) else {
            return Ok(Membership::GroupNotFound);
        };
        let before = group.student_ids.len();
        group.student_ids.retain(|id| id != student_id);
        let removed = group.student_ids.len() != before;
        self.persist()?;
        self.listeners.notify(&GroupEvent::MemberRemoved {
            group_id: group_id.to_string(),
            student_id: student_id.to_string(),
        });
        Ok(if removed {
            Membership::Removed
        } else {
            Membership::NotMember
        })
    }

    /// Set the group's points (replace, not increment). Persists if the group exists.
    pub fn update_group_points(&mut self, group_id: &str, points: u32) -> Result<bool> {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) else {
            return Ok(false);
        };
        group.points = points;
        self.persist()?;
        self.listeners.notify(&GroupEvent::PointsUpdated {
            group_id: group_id.to_string(),
            points,
        });
        Ok(true)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GroupEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn persist(&mut self) -> Result<()> {
        save_collection(self.backend.as_mut(), GROUPS_KEY, &self.groups)
    }
}

fn unique_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
