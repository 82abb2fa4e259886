//! Command implementations for the roster CLI.
//!
//! Each command takes the open [`Roster`] (or the config file location),
//! validates its input, and returns a result type implementing [`Output`].
//! Commands are organized by entity:
//! - `student` - student CRUD and lookup
//! - `group` - group CRUD, membership, points and ranking
//! - `doctor` - dangling membership checks
//! - `config` - reading and writing config.kdl

mod config;
mod doctor;
mod group;
mod student;

pub use config::{ConfigEntry, ConfigSet, ConfigShow, config_set, config_show};
pub use doctor::{DoctorReport, doctor};
pub use group::{
    AvailableStudents, GroupCreated, GroupDetail, GroupList, GroupRanking, GroupRemoved, GroupSummary, GroupUpdate,
    GroupUpdated, MembershipChange, MembershipResult, PointsUpdated, RankedGroup, RosterEntry, group_add_students,
    group_available, group_create, group_list, group_ranking, group_remove, group_remove_student, group_set_points,
    group_show, group_update,
};
pub use student::{
    GroupRef, StudentAdded, StudentDetail, StudentFields, StudentList, StudentRemoved, StudentUpdated, student_add,
    student_list, student_remove, student_show, student_update,
};

use crate::store::Roster;
use crate::{Error, Result};
use serde::Serialize;

/// Longest accepted group name, in characters.
pub const GROUP_NAME_MAX: usize = 100;

/// Longest accepted group description, in characters.
pub const GROUP_DESCRIPTION_MAX: usize = 500;

/// Phone stored when a student is added without one.
pub const DEFAULT_PHONE: &str = "+7 900 000-00-00";

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Trim a required text field, rejecting it if nothing is left.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Reject values longer than `max` characters.
pub(crate) fn max_chars(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::InvalidInput(format!(
            "{} must be at most {} characters (got {})",
            field, max, len
        )));
    }
    Ok(())
}

/// Trim an optional text field; blank values become `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Summary printed when no subcommand is given.
#[derive(Serialize)]
pub struct StatusSummary {
    pub students: usize,
    pub groups: usize,
    pub backend: String,
    pub location: String,
    pub cascade: String,
    pub dangling_memberships: usize,
}

impl Output for StatusSummary {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("{} students, {} groups", self.students, self.groups),
            format!("Storage: {} ({})", self.location, self.backend),
            format!("Cascade on student removal: {}", self.cascade),
        ];
        if self.dangling_memberships > 0 {
            lines.push(format!(
                "{} dangling membership(s); run `roster doctor` for details",
                self.dangling_memberships
            ));
        }
        lines.join("\n")
    }
}

/// Counts and storage details for the open roster.
pub fn status(roster: &Roster) -> Result<StatusSummary> {
    Ok(StatusSummary {
        students: roster.students().len(),
        groups: roster.groups().len(),
        backend: roster.students().backend_type().to_string(),
        location: roster.students().location(),
        cascade: roster.cascade().to_string(),
        dangling_memberships: roster.dangling_memberships().len(),
    })
}
