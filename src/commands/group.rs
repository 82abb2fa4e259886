//! Group commands.

use super::{GROUP_DESCRIPTION_MAX, GROUP_NAME_MAX, Output, max_chars, required};
use crate::models::{Group, GroupColor, NewGroup, Ranked, Student};
use crate::store::{Membership, Roster};
use crate::views;
use crate::{Error, Result};
use serde::Serialize;

fn group_not_found(id: &str) -> Error {
    Error::NotFound(format!("Group {} not found", id))
}

fn existing_group(roster: &Roster, id: &str) -> Result<Group> {
    roster.groups().get(id).cloned().ok_or_else(|| group_not_found(id))
}

fn validate_name(name: &str) -> Result<String> {
    let name = required("Group name", name)?;
    max_chars("Group name", &name, GROUP_NAME_MAX)?;
    Ok(name)
}

fn validate_description(description: &str) -> Result<String> {
    let description = required("Description", description)?;
    max_chars("Description", &description, GROUP_DESCRIPTION_MAX)?;
    Ok(description)
}

/// Every id must name an existing student.
fn require_students(roster: &Roster, student_ids: &[String]) -> Result<()> {
    for id in student_ids {
        if !roster.students().contains(id) {
            return Err(Error::NotFound(format!("Student {} not found", id)));
        }
    }
    Ok(())
}

#[derive(Serialize)]
pub struct GroupCreated {
    pub id: String,
    pub name: String,
    pub color: GroupColor,
    pub student_ids: Vec<String>,
}

impl Output for GroupCreated {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut line = format!("Created group {} [{}] ({})", self.name, self.id, self.color);
        if !self.student_ids.is_empty() {
            line.push_str(&format!(" with {} member(s)", self.student_ids.len()));
        }
        line
    }
}

/// Create a group, then add each initial member through the membership operation.
pub fn group_create(
    roster: &mut Roster,
    name: &str,
    description: &str,
    color: GroupColor,
    student_ids: Vec<String>,
) -> Result<GroupCreated> {
    let name = validate_name(name)?;
    let description = validate_description(description)?;
    require_students(roster, &student_ids)?;

    let group = roster
        .groups_mut()
        .add_group(NewGroup::new(name, description, color))?;
    for student_id in &student_ids {
        roster.groups_mut().add_student_to_group(&group.id, student_id)?;
    }

    let members = roster
        .groups()
        .get(&group.id)
        .map(|g| g.student_ids.clone())
        .unwrap_or_default();
    Ok(GroupCreated {
        id: group.id,
        name: group.name,
        color: group.color,
        student_ids: members,
    })
}

#[derive(Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: GroupColor,
    pub points: u32,
    pub member_count: usize,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            description: group.description.clone(),
            color: group.color,
            points: group.effective_points(),
            member_count: group.student_ids.len(),
        }
    }
}

#[derive(Serialize)]
pub struct GroupList {
    pub count: usize,
    pub groups: Vec<GroupSummary>,
}

impl Output for GroupList {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.groups.is_empty() {
            return "No groups found.".to_string();
        }
        let mut lines = vec![format!("{} group(s):", self.count)];
        for g in &self.groups {
            lines.push(format!(
                "  [{}] {} ({}) - {} pts, {} member(s)",
                g.id, g.name, g.color, g.points, g.member_count
            ));
            lines.push(format!("      {}", g.description));
        }
        lines.join("\n")
    }
}

/// All groups in stored order.
pub fn group_list(roster: &Roster) -> Result<GroupList> {
    let groups: Vec<GroupSummary> = roster.groups().groups().iter().map(GroupSummary::from).collect();
    Ok(GroupList {
        count: groups.len(),
        groups,
    })
}

#[derive(Serialize)]
pub struct RankedGroup {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub color: GroupColor,
    pub points: u32,
    pub member_count: usize,
}

#[derive(Serialize)]
pub struct GroupRanking {
    pub groups: Vec<RankedGroup>,
}

impl Output for GroupRanking {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.groups.is_empty() {
            return "No groups found.".to_string();
        }
        self.groups
            .iter()
            .map(|g| {
                format!(
                    "{:>2}. {} [{}] ({}) - {} pts, {} member(s)",
                    g.rank, g.name, g.id, g.color, g.points, g.member_count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Groups ordered by points, highest first; ties keep stored order.
pub fn group_ranking(roster: &Roster) -> Result<GroupRanking> {
    let groups = views::group_ranking(roster.groups().groups())
        .into_iter()
        .enumerate()
        .map(|(i, g)| RankedGroup {
            rank: i + 1,
            id: g.id.clone(),
            name: g.name.clone(),
            color: g.color,
            points: g.effective_points(),
            member_count: g.student_ids.len(),
        })
        .collect();
    Ok(GroupRanking { groups })
}

/// A member line in a group's roster.
#[derive(Serialize)]
pub struct RosterEntry {
    pub rank: usize,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub points: u32,
}

#[derive(Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub roster: Vec<RosterEntry>,
}

impl Output for GroupDetail {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let g = &self.group;
        let mut lines = vec![
            format!("{} [{}] ({})", g.name, g.id, g.color),
            format!("  {}", g.description),
            format!("  Points: {}", g.effective_points()),
            format!("  Created: {}", g.created_at.format("%Y-%m-%d")),
        ];

        if self.roster.is_empty() {
            lines.push("  Members: none".to_string());
        } else {
            lines.push(format!("  Members ({}):", self.roster.len()));
            for entry in &self.roster {
                let grade = entry.grade.as_deref().map(|g| format!(" ({})", g)).unwrap_or_default();
                lines.push(format!(
                    "    {:>2}. {}{} [{}] - {} pts",
                    entry.rank, entry.name, grade, entry.id, entry.points
                ));
            }
        }

        if let Some(ref tasks) = g.tasks {
            lines.push(format!("  Tasks ({}):", tasks.len()));
            for task in tasks {
                lines.push(format!(
                    "    [{}] {} ({}, {}) {}",
                    task.id, task.title, task.date_range, task.difficulty, task.status
                ));
            }
        }
        lines.join("\n")
    }
}

fn roster_entries(students: Vec<&Student>) -> Vec<RosterEntry> {
    students
        .into_iter()
        .enumerate()
        .map(|(i, s)| RosterEntry {
            rank: i + 1,
            id: s.id.clone(),
            name: s.full_name(),
            grade: s.grade.clone(),
            points: s.effective_points(),
        })
        .collect()
}

/// A group with its members ranked by points.
pub fn group_show(roster: &Roster, id: &str) -> Result<GroupDetail> {
    let group = existing_group(roster, id)?;
    let members = roster_entries(views::group_roster(&group, roster.students().students()));
    Ok(GroupDetail {
        group,
        roster: members,
    })
}

/// Field changes for `group update`. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<GroupColor>,
}

#[derive(Serialize)]
pub struct GroupUpdated {
    #[serde(flatten)]
    pub group: Group,
}

impl Output for GroupUpdated {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("Updated group {} [{}]", self.group.name, self.group.id)
    }
}

/// Fetch a group, apply the changes, and replace the stored record.
pub fn group_update(roster: &mut Roster, id: &str, update: GroupUpdate) -> Result<GroupUpdated> {
    let mut group = existing_group(roster, id)?;
    if let Some(name) = update.name {
        group.name = validate_name(&name)?;
    }
    if let Some(description) = update.description {
        group.description = validate_description(&description)?;
    }
    if let Some(color) = update.color {
        group.color = color;
    }
    roster.groups_mut().update_group(group.clone())?;
    Ok(GroupUpdated { group })
}

#[derive(Serialize)]
pub struct GroupRemoved {
    pub id: String,
    pub removed: usize,
}

impl Output for GroupRemoved {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.removed == 0 {
            format!("No group with id {}", self.id)
        } else {
            format!("Removed group {}", self.id)
        }
    }
}

/// Remove a group. Removing an unknown id succeeds and removes nothing.
pub fn group_remove(roster: &mut Roster, id: &str) -> Result<GroupRemoved> {
    let removed = roster.groups_mut().remove_group(id)?;
    Ok(GroupRemoved {
        id: id.to_string(),
        removed,
    })
}

#[derive(Serialize)]
pub struct MembershipChange {
    pub student_id: String,
    pub outcome: Membership,
}

#[derive(Serialize)]
pub struct MembershipResult {
    pub group_id: String,
    pub changes: Vec<MembershipChange>,
    pub student_ids: Vec<String>,
}

impl Output for MembershipResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .changes
            .iter()
            .map(|c| match c.outcome {
                Membership::Added => format!("Added {} to group {}", c.student_id, self.group_id),
                Membership::AlreadyMember => {
                    format!("{} is already in group {}", c.student_id, self.group_id)
                }
                Membership::Removed => format!("Removed {} from group {}", c.student_id, self.group_id),
                Membership::NotMember => format!("{} is not in group {}", c.student_id, self.group_id),
                Membership::GroupNotFound => format!("Group {} not found", self.group_id),
            })
            .collect();
        lines.push(format!("Group {} now has {} member(s)", self.group_id, self.student_ids.len()));
        lines.join("\n")
    }
}

fn membership_result(roster: &Roster, group_id: &str, changes: Vec<MembershipChange>) -> MembershipResult {
    let student_ids = roster
        .groups()
        .get(group_id)
        .map(|g| g.student_ids.clone())
        .unwrap_or_default();
    MembershipResult {
        group_id: group_id.to_string(),
        changes,
        student_ids,
    }
}

/// Add existing students to an existing group.
///
/// All ids are checked before anything changes. Adding a current member is
/// reported as `already_member` and leaves the member list unchanged.
pub fn group_add_students(roster: &mut Roster, group_id: &str, student_ids: &[String]) -> Result<MembershipResult> {
    existing_group(roster, group_id)?;
    require_students(roster, student_ids)?;

    let mut changes = Vec::with_capacity(student_ids.len());
    for student_id in student_ids {
        let outcome = roster.groups_mut().add_student_to_group(group_id, student_id)?;
        changes.push(MembershipChange {
            student_id: student_id.clone(),
            outcome,
        });
    }
    Ok(membership_result(roster, group_id, changes))
}

/// Remove one id from a group's members.
///
/// The student need not exist, so dangling entries can be removed by hand.
pub fn group_remove_student(roster: &mut Roster, group_id: &str, student_id: &str) -> Result<MembershipResult> {
    existing_group(roster, group_id)?;
    let outcome = roster
        .groups_mut()
        .remove_student_from_group(group_id, student_id)?;
    let changes = vec![MembershipChange {
        student_id: student_id.to_string(),
        outcome,
    }];
    Ok(membership_result(roster, group_id, changes))
}

#[derive(Serialize)]
pub struct PointsUpdated {
    pub group_id: String,
    pub previous: u32,
    pub points: u32,
}

impl Output for PointsUpdated {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Group {} points: {} -> {}",
            self.group_id, self.previous, self.points
        )
    }
}

/// Replace a group's points.
pub fn group_set_points(roster: &mut Roster, group_id: &str, points: u32) -> Result<PointsUpdated> {
    let previous = existing_group(roster, group_id)?.points;
    roster.groups_mut().update_group_points(group_id, points)?;
    Ok(PointsUpdated {
        group_id: group_id.to_string(),
        previous,
        points,
    })
}

#[derive(Serialize)]
pub struct AvailableStudents {
    pub group_id: String,
    pub count: usize,
    pub students: Vec<Student>,
}

impl Output for AvailableStudents {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.students.is_empty() {
            return format!("No students available for group {}.", self.group_id);
        }
        let mut lines = vec![format!(
            "{} student(s) available for group {}:",
            self.count, self.group_id
        )];
        for s in &self.students {
            lines.push(format!("  [{}] {} - {} pts", s.id, s.full_name(), s.effective_points()));
        }
        lines.join("\n")
    }
}

/// Students not in the group, optionally narrowed by a name query.
pub fn group_available(roster: &Roster, group_id: &str, search: Option<&str>) -> Result<AvailableStudents> {
    let group = existing_group(roster, group_id)?;
    let available = views::available_students(&group, roster.students().students());
    let students: Vec<Student> = match search {
        Some(query) => views::search_by_name(available, query).into_iter().cloned().collect(),
        None => available.into_iter().cloned().collect(),
    };
    Ok(AvailableStudents {
        group_id: group_id.to_string(),
        count: students.len(),
        students,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn ids(students: &[Student]) -> Vec<&str> {
        students.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_create_with_members() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();

        let created = group_create(
            &mut roster,
            "  Dueling Club ",
            "Practice",
            GroupColor::Hufflepuff,
            vec!["2".to_string(), "4".to_string(), "2".to_string()],
        )
        .unwrap();

        assert_eq!(created.name, "Dueling Club");
        assert_eq!(created.student_ids, vec!["2".to_string(), "4".to_string()]);
        let stored = roster.groups().get(&created.id).unwrap();
        assert_eq!(stored.points, 0);
        assert_eq!(roster.groups().len(), 4);
    }

    #[test]
    fn test_create_validates_before_writing() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();

        let blank = group_create(&mut roster, " ", "D", GroupColor::Gryffindor, vec![]);
        let too_long = group_create(&mut roster, &"x".repeat(101), "D", GroupColor::Gryffindor, vec![]);
        let long_desc = group_create(&mut roster, "N", &"x".repeat(501), GroupColor::Gryffindor, vec![]);
        let ghost = group_create(&mut roster, "N", "D", GroupColor::Gryffindor, vec!["404".to_string()]);

        assert!(matches!(blank, Err(Error::InvalidInput(_))));
        assert!(matches!(too_long, Err(Error::InvalidInput(_))));
        assert!(matches!(long_desc, Err(Error::InvalidInput(_))));
        assert!(matches!(ghost, Err(Error::NotFound(_))));
        assert_eq!(roster.groups().len(), 3);
    }

    #[test]
    fn test_ranking_orders_seed_groups() {
        let env = TestEnv::new();
        let roster = env.open_roster();

        let ranking = group_ranking(&roster).unwrap();

        let order: Vec<&str> = ranking.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
        assert_eq!(ranking.groups[0].rank, 1);
        assert_eq!(ranking.groups[0].points, 1280);
    }

    #[test]
    fn test_ranking_after_points_change() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();
        group_set_points(&mut roster, "3", 2000).unwrap();

        let ranking = group_ranking(&roster).unwrap();

        assert_eq!(ranking.groups[0].id, "3");
    }

    #[test]
    fn test_show_ranks_members_and_includes_tasks() {
        let env = TestEnv::new();
        let roster = env.open_roster();

        let detail = group_show(&roster, "1").unwrap();

        let order: Vec<&str> = detail.roster.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
        let json: serde_json::Value = serde_json::from_str(&detail.to_json()).unwrap();
        assert_eq!(json["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(json["studentIds"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_show_skips_dangling_members() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();
        roster.remove_student("2").unwrap();

        let detail = group_show(&roster, "1").unwrap();

        assert_eq!(detail.roster.len(), 2);
        assert_eq!(detail.group.student_ids.len(), 3);
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();
        let update = GroupUpdate {
            color: Some(GroupColor::Hufflepuff),
            ..Default::default()
        };

        let updated = group_update(&mut roster, "3", update).unwrap();

        assert_eq!(updated.group.color, GroupColor::Hufflepuff);
        assert_eq!(updated.group.points, 963);
        assert!(matches!(
            group_update(&mut roster, "404", GroupUpdate::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_add_students_reports_outcomes() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();

        let result = group_add_students(&mut roster, "2", &["1".to_string(), "4".to_string()]).unwrap();

        assert_eq!(result.changes[0].outcome, Membership::Added);
        assert_eq!(result.changes[1].outcome, Membership::AlreadyMember);
        assert_eq!(
            result.student_ids,
            vec!["4".to_string(), "5".to_string(), "1".to_string()]
        );
    }

    #[test]
    fn test_add_students_checks_every_id_first() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();

        let result = group_add_students(&mut roster, "3", &["1".to_string(), "404".to_string()]);

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(roster.groups().get("3").unwrap().student_ids.is_empty());
        assert!(matches!(
            group_add_students(&mut roster, "404", &["1".to_string()]),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_student_allows_missing_student() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();
        roster.remove_student("5").unwrap();

        let result = group_remove_student(&mut roster, "2", "5").unwrap();

        assert_eq!(result.changes[0].outcome, Membership::Removed);
        assert_eq!(result.student_ids, vec!["4".to_string()]);
    }

    #[test]
    fn test_set_points_reports_previous() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();

        let result = group_set_points(&mut roster, "2", 1100).unwrap();

        assert_eq!(result.previous, 1009);
        assert_eq!(roster.groups().get("2").unwrap().points, 1100);
        assert!(matches!(
            group_set_points(&mut roster, "404", 1),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_available_excludes_members_and_filters() {
        let env = TestEnv::new();
        let roster = env.open_roster();

        let all = group_available(&roster, "1", None).unwrap();
        assert_eq!(ids(&all.students), vec!["4", "5"]);

        let none = group_available(&roster, "1", Some("zzz")).unwrap();
        assert_eq!(none.count, 0);
    }

    #[test]
    fn test_remove_group_is_idempotent() {
        let env = TestEnv::new();
        let mut roster = env.open_roster();
        assert_eq!(group_remove(&mut roster, "3").unwrap().removed, 1);
        assert_eq!(group_remove(&mut roster, "3").unwrap().removed, 0);
        assert_eq!(roster.groups().len(), 2);
    }
}
