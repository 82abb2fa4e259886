//! Student commands.

use super::{DEFAULT_PHONE, Output, optional, required};
use crate::models::{Gender, Ranked, Student};
use crate::storage::generate_id;
use crate::store::Roster;
use crate::views;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Field values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct StudentFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub points: Option<u32>,
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn points_label(student: &Student) -> String {
    format!("{} pts", student.effective_points())
}

#[derive(Serialize)]
pub struct StudentAdded {
    pub id: String,
    pub name: String,
}

impl Output for StudentAdded {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("Added student {} [{}]", self.name, self.id)
    }
}

/// Add a new student. First and last name are required; phone falls back to a
/// placeholder and points start at zero.
pub fn student_add(roster: &mut Roster, fields: StudentFields) -> Result<StudentAdded> {
    let first_name = required("First name", fields.first_name.as_deref().unwrap_or_default())?;
    let last_name = required("Last name", fields.last_name.as_deref().unwrap_or_default())?;
    let phone = match fields.phone {
        Some(phone) => required("Phone", &phone)?,
        None => DEFAULT_PHONE.to_string(),
    };

    let id = generate_id(Utc::now(), |id| roster.students().contains(id));
    let mut student = Student::new(id.clone(), first_name, last_name, phone);
    student.email = optional(fields.email);
    student.gender = fields.gender;
    student.birth_date = fields.birth_date.map(midnight_utc);
    student.grade = optional(fields.grade);
    student.points = Some(fields.points.unwrap_or(0));

    let name = student.full_name();
    roster.students_mut().add_student(student)?;

    Ok(StudentAdded { id, name })
}

#[derive(Serialize)]
pub struct StudentList {
    pub count: usize,
    pub students: Vec<Student>,
}

impl Output for StudentList {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.students.is_empty() {
            return "No students found.".to_string();
        }
        let mut lines = vec![format!("{} student(s):", self.count)];
        for s in &self.students {
            let grade = s.grade.as_deref().map(|g| format!(" ({})", g)).unwrap_or_default();
            lines.push(format!("  [{}] {}{} - {}", s.id, s.full_name(), grade, points_label(s)));
        }
        lines.join("\n")
    }
}

/// List students in stored order, optionally filtered by a name query.
pub fn student_list(roster: &Roster, search: Option<&str>) -> Result<StudentList> {
    let students: Vec<Student> = match search {
        Some(query) => views::search_by_name(roster.students().students(), query)
            .into_iter()
            .cloned()
            .collect(),
        None => roster.students().students().to_vec(),
    };
    Ok(StudentList {
        count: students.len(),
        students,
    })
}

/// Group reference shown alongside a student.
#[derive(Serialize)]
pub struct GroupRef {
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: Student,
    pub groups: Vec<GroupRef>,
}

impl Output for StudentDetail {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let s = &self.student;
        let mut lines = vec![format!("{} [{}]", s.full_name(), s.id)];
        lines.push(format!("  Phone: {}", s.phone));
        if let Some(ref email) = s.email {
            lines.push(format!("  Email: {}", email));
        }
        if let Some(gender) = s.gender {
            lines.push(format!("  Gender: {}", gender));
        }
        if let Some(birth_date) = s.birth_date {
            lines.push(format!("  Born: {}", birth_date.format("%Y-%m-%d")));
        }
        if let Some(ref grade) = s.grade {
            lines.push(format!("  Grade: {}", grade));
        }
        lines.push(format!("  Points: {}", s.effective_points()));
        if self.groups.is_empty() {
            lines.push("  Groups: none".to_string());
        } else {
            let names: Vec<String> = self
                .groups
                .iter()
                .map(|g| format!("{} [{}]", g.name, g.id))
                .collect();
            lines.push(format!("  Groups: {}", names.join(", ")));
        }
        lines.join("\n")
    }
}

/// Show one student with the groups listing them.
pub fn student_show(roster: &Roster, id: &str) -> Result<StudentDetail> {
    let student = roster
        .students()
        .get(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Student {} not found", id)))?;
    let groups = views::student_groups(id, roster.groups().groups())
        .into_iter()
        .map(|g| GroupRef {
            id: g.id.clone(),
            name: g.name.clone(),
        })
        .collect();
    Ok(StudentDetail { student, groups })
}

#[derive(Serialize)]
pub struct StudentUpdated {
    #[serde(flatten)]
    pub student: Student,
}

impl Output for StudentUpdated {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("Updated student {} [{}]", self.student.full_name(), self.student.id)
    }
}

/// Fetch a student, apply the given fields, and replace the stored record.
///
/// An empty `email` or `grade` clears that field.
pub fn student_update(roster: &mut Roster, id: &str, fields: StudentFields) -> Result<StudentUpdated> {
    let mut student = roster
        .students()
        .get(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Student {} not found", id)))?;

    if let Some(first_name) = fields.first_name {
        student.first_name = required("First name", &first_name)?;
    }
    if let Some(last_name) = fields.last_name {
        student.last_name = required("Last name", &last_name)?;
    }
    if let Some(phone) = fields.phone {
        student.phone = required("Phone", &phone)?;
    }
    if fields.email.is_some() {
        student.email = optional(fields.email);
    }
    if let Some(gender) = fields.gender {
        student.gender = Some(gender);
    }
    if let Some(birth_date) = fields.birth_date {
        student.birth_date = Some(midnight_utc(birth_date));
    }
    if fields.grade.is_some() {
        student.grade = optional(fields.grade);
    }
    if let Some(points) = fields.points {
        student.points = Some(points);
    }

    roster.students_mut().update_student(student.clone())?;
    Ok(StudentUpdated { student })
}

#[derive(Serialize)]
pub struct StudentRemoved {
    pub id: String,
    pub removed: usize,
    pub pruned_from: Vec<String>,
}

impl Output for StudentRemoved {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.removed == 0 {
            return format!("No student with id {}", self.id);
        }
        let mut line = format!("Removed student {}", self.id);
        if !self.pruned_from.is_empty() {
            line.push_str(&format!(" (and from groups: {})", self.pruned_from.join(", ")));
        }
        line
    }
}

/// Remove a student. Removing an unknown id succeeds and removes nothing.
pub fn student_remove(roster: &mut Roster, id: &str) -> Result<StudentRemoved> {
    let removal = roster.remove_student(id)?;
    Ok(StudentRemoved {
        id: id.to_string(),
        removed: removal.removed,
        pruned_from: removal.pruned_from,
    })
}
