//! Derived views over store snapshots.
//!
//! Every function here is a pure computation over the slices it is given.
//! Nothing is cached: callers pass the live collections on each read.

use crate::models::{Group, Ranked, Student};
use serde::Serialize;

/// Sort by points, highest first, keeping the input order among equal scores.
fn by_points_desc<T: Ranked>(mut items: Vec<&T>) -> Vec<&T> {
    // `sort_by` is stable, which is what keeps ties in insertion order.
    items.sort_by(|a, b| b.effective_points().cmp(&a.effective_points()));
    items
}

/// Members of `group`, highest points first.
///
/// Member ids with no matching student are skipped.
pub fn group_roster<'a>(group: &Group, students: &'a [Student]) -> Vec<&'a Student> {
    by_points_desc(students.iter().filter(|s| group.has_member(&s.id)).collect())
}

/// All groups, highest points first.
pub fn group_ranking(groups: &[Group]) -> Vec<&Group> {
    by_points_desc(groups.iter().collect())
}

/// Students that are not members of `group`, in insertion order.
pub fn available_students<'a>(group: &Group, students: &'a [Student]) -> Vec<&'a Student> {
    students.iter().filter(|s| !group.has_member(&s.id)).collect()
}

/// Case-insensitive substring match on "first last".
///
/// An empty query matches every student.
pub fn search_by_name<'a, I>(students: I, query: &str) -> Vec<&'a Student>
where
    I: IntoIterator<Item = &'a Student>,
{
    let needle = query.to_lowercase();
    students
        .into_iter()
        .filter(|s| s.full_name().to_lowercase().contains(&needle))
        .collect()
}

/// Groups the student belongs to, in group insertion order.
pub fn student_groups<'a>(student_id: &str, groups: &'a [Group]) -> Vec<&'a Group> {
    groups.iter().filter(|g| g.has_member(student_id)).collect()
}

/// A membership entry pointing at a student that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingMembership {
    pub group_id: String,
    pub student_id: String,
}

/// Every membership whose student is missing from `students`.
pub fn dangling_memberships(groups: &[Group], students: &[Student]) -> Vec<DanglingMembership> {
    groups
        .iter()
        .flat_map(move |g| {
            g.student_ids
                .iter()
                .filter(move |id| !students.iter().any(|s| &s.id == *id))
                .map(move |id| DanglingMembership {
                    group_id: g.id.clone(),
                    student_id: id.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupColor, seed};
    use chrono::Utc;

    fn group(id: &str, points: u32, members: &[&str]) -> Group {
        Group {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: "d".to_string(),
            student_ids: members.iter().map(|m| m.to_string()).collect(),
            created_at: Utc::now(),
            color: GroupColor::Gryffindor,
            points,
            tasks: None,
        }
    }

    fn student(id: &str, first: &str, last: &str, points: Option<u32>) -> Student {
        let mut s = Student::new(id.to_string(), first.to_string(), last.to_string(), "0".to_string());
        s.points = points;
        s
    }

    fn group_ids(items: &[&Group]) -> Vec<String> {
        items.iter().map(|g| g.id.clone()).collect()
    }

    fn student_ids(items: &[&Student]) -> Vec<String> {
        items.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_ranking_is_stable_on_ties() {
        let groups = vec![
            group("a", 10, &[]),
            group("b", 20, &[]),
            group("c", 20, &[]),
            group("d", 5, &[]),
        ];
        let ranked = group_ranking(&groups);
        assert_eq!(group_ids(&ranked), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_roster_orders_members_by_points() {
        let students = vec![
            student("1", "A", "A", Some(5)),
            student("2", "B", "B", None),
            student("3", "C", "C", Some(50)),
            student("4", "D", "D", Some(0)),
            student("5", "E", "E", Some(99)),
        ];
        let g = group("g", 0, &["4", "2", "1", "3"]);

        let roster = group_roster(&g, &students);

        // Absent points rank as zero and tie with "4" in student insertion order.
        assert_eq!(student_ids(&roster), vec!["3", "1", "2", "4"]);
    }

    #[test]
    fn test_roster_skips_dangling_members() {
        let students = vec![student("1", "A", "A", Some(1))];
        let g = group("g", 0, &["1", "gone"]);
        assert_eq!(group_roster(&g, &students).len(), 1);
    }

    #[test]
    fn test_available_students() {
        let students = seed::default_students();
        let groups = seed::default_groups();

        let available = available_students(&groups[0], &students);
        assert_eq!(student_ids(&available), vec!["4", "5"]);

        let everyone = available_students(&groups[2], &students);
        assert_eq!(everyone.len(), 5);
    }

    #[test]
    fn test_search_is_case_insensitive_over_full_name() {
        let students = vec![
            student("1", "Hermione", "Granger", None),
            student("2", "Harry", "Potter", None),
            student("3", "Ксения", "Харитонова", None),
        ];

        let hits = search_by_name(&students, "ry pot");
        assert_eq!(student_ids(&hits), vec!["2"]);

        let hits = search_by_name(&students, "GRANGER");
        assert_eq!(student_ids(&hits), vec!["1"]);

        let hits = search_by_name(&students, "ксения");
        assert_eq!(student_ids(&hits), vec!["3"]);
    }

    #[test]
    fn test_search_empty_query_matches_all() {
        let students = seed::default_students();
        assert_eq!(search_by_name(&students, "").len(), students.len());
    }

    #[test]
    fn test_search_composes_with_available() {
        let students = seed::default_students();
        let groups = seed::default_groups();
        let available = available_students(&groups[0], &students);

        let hits = search_by_name(available, "игорь");
        assert_eq!(student_ids(&hits), vec!["5"]);
    }

    #[test]
    fn test_student_groups() {
        let groups = vec![group("x", 0, &["1", "2"]), group("y", 0, &["2"]), group("z", 0, &[])];
        assert_eq!(group_ids(&student_groups("2", &groups)), vec!["x", "y"]);
        assert!(student_groups("9", &groups).is_empty());
    }

    #[test]
    fn test_dangling_memberships() {
        let students = vec![student("1", "A", "A", None)];
        let groups = vec![group("x", 0, &["1", "2"]), group("y", 0, &["3"])];

        let dangling = dangling_memberships(&groups, &students);

        assert_eq!(
            dangling,
            vec![
                DanglingMembership {
                    group_id: "x".to_string(),
                    student_id: "2".to_string()
                },
                DanglingMembership {
                    group_id: "y".to_string(),
                    student_id: "3".to_string()
                },
            ]
        );
    }
}
