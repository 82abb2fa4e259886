//! Data models for roster entities.
//!
//! This module defines the core data structures:
//! - `Student` - A registered student with contact details and personal points
//! - `Group` - A named house holding weak references to students by id
//! - `Task` - Read-only activity entries attached to a group
//! - `NewGroup` - The caller-supplied part of a group before the store assigns identity
//!
//! Field names are serialized in camelCase so the persisted documents keep the
//! layout of the `hogwartsStudents` / `hogwartsGroups` keys.

pub mod seed;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Student gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read a stored gender where an empty string means none was picked.
fn blank_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Gender::parse(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::unknown_variant(s, &["male", "female"])),
    }
}

/// House color of a group. Used only for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    #[default]
    Gryffindor,
    Slytherin,
    Ravenclaw,
    Hufflepuff,
}

impl GroupColor {
    /// Every house label, in display order.
    pub const ALL: [GroupColor; 4] = [
        GroupColor::Gryffindor,
        GroupColor::Slytherin,
        GroupColor::Ravenclaw,
        GroupColor::Hufflepuff,
    ];

    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gryffindor => "gryffindor",
            Self::Slytherin => "slytherin",
            Self::Ravenclaw => "ravenclaw",
            Self::Hufflepuff => "hufflepuff",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of a group task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Completed,
    InProgress,
    #[default]
    NotStarted,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in-progress",
            Self::NotStarted => "not-started",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Anything ranked by points.
///
/// This is the single place where an absent point value becomes zero; views
/// and output code call `effective_points` instead of unwrapping on their own.
pub trait Ranked {
    fn effective_points(&self) -> u32;
}

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Unique identifier, assigned by the caller at creation
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Creation timestamp, never changed after creation
    pub created_at: DateTime<Utc>,

    #[serde(default, deserialize_with = "blank_gender", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<DateTime<Utc>>,

    /// Class label (e.g., "10.2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,

    /// Personal points; absent counts as zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

impl Student {
    /// Create a new student with the given identity and required fields.
    pub fn new(id: String, first_name: String, last_name: String, phone: String) -> Self {
        Self {
            id,
            first_name,
            last_name,
            phone,
            email: None,
            created_at: Utc::now(),
            gender: None,
            birth_date: None,
            grade: None,
            points: None,
        }
    }

    /// "First Last", the string name searches match against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Ranked for Student {
    fn effective_points(&self) -> u32 {
        self.points.unwrap_or(0)
    }
}

/// A dated activity shown on a group page. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Display string such as "12.04 - 26.04"
    pub date_range: String,
    pub difficulty: String,
    #[serde(default)]
    pub status: TaskStatus,
}

/// A named group of students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Unique identifier, assigned by the group store
    pub id: String,

    pub name: String,

    pub description: String,

    /// Member student ids in insertion order. Never contains duplicates.
    #[serde(default)]
    pub student_ids: Vec<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub color: GroupColor,

    #[serde(default)]
    pub points: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

impl Group {
    /// Check whether the student id is a member of this group.
    pub fn has_member(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|id| id == student_id)
    }
}

impl Ranked for Group {
    fn effective_points(&self) -> u32 {
        self.points
    }
}

/// Caller-supplied fields of a group; the store fills in id, creation time and points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub student_ids: Vec<String>,
    pub color: GroupColor,
}

impl NewGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>, color: GroupColor) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            student_ids: Vec::new(),
            color,
        }
    }
}
