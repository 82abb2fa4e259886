//! Store and view properties checked through the public library API.

use roster::models::{GroupColor, NewGroup, Student};
use roster::storage::{GROUPS_KEY, MemoryBackend, STUDENTS_KEY};
use roster::store::{CascadePolicy, GroupStore, Membership, Roster, StudentStore};
use roster::views;

fn memory_roster(cascade: CascadePolicy) -> (MemoryBackend, Roster) {
    let backend = MemoryBackend::new();
    let roster = Roster::new(
        StudentStore::open(Box::new(backend.clone())),
        GroupStore::open(Box::new(backend.clone())),
        cascade,
    );
    (backend, roster)
}

fn student(id: &str, first: &str, points: Option<u32>) -> Student {
    let mut s = Student::new(id.to_string(), first.to_string(), "Test".to_string(), "000".to_string());
    s.points = points;
    s
}

#[test]
fn test_empty_storage_loads_seed() {
    let (_backend, roster) = memory_roster(CascadePolicy::Keep);
    assert_eq!(roster.students().len(), 5);
    assert_eq!(roster.groups().len(), 3);
}

#[test]
fn test_mixed_operations_keep_order_and_unique_ids() {
    let (backend, mut roster) = memory_roster(CascadePolicy::Keep);

    roster.students_mut().add_student(student("10", "Ann", Some(1))).unwrap();
    roster.students_mut().add_student(student("11", "Bob", None)).unwrap();
    roster.remove_student("2").unwrap();
    let mut bob = roster.students().get("11").unwrap().clone();
    bob.points = Some(7);
    roster.students_mut().update_student(bob).unwrap();

    let order: Vec<&str> = roster.students().students().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(order, vec!["1", "3", "4", "5", "10", "11"]);

    let reloaded = StudentStore::open(Box::new(backend.clone()));
    assert_eq!(reloaded.students(), roster.students().students());
}

#[test]
fn test_persisted_value_matches_memory_after_group_ops() {
    let (backend, mut roster) = memory_roster(CascadePolicy::Keep);

    let created = roster
        .groups_mut()
        .add_group(NewGroup::new("Test", "D", GroupColor::Ravenclaw))
        .unwrap();
    roster.groups_mut().add_student_to_group(&created.id, "3").unwrap();
    roster.groups_mut().update_group_points(&created.id, 12).unwrap();

    let reloaded = GroupStore::open(Box::new(backend.clone()));
    assert_eq!(reloaded.groups(), roster.groups().groups());
    assert_eq!(reloaded.get(&created.id).unwrap().points, 12);
    assert!(backend.write_count(GROUPS_KEY) >= 3);
}

#[test]
fn test_redundant_membership_add_writes_unchanged_list() {
    let (backend, mut roster) = memory_roster(CascadePolicy::Keep);
    roster.groups_mut().add_student_to_group("2", "1").unwrap();
    let writes = backend.write_count(GROUPS_KEY);

    let outcome = roster.groups_mut().add_student_to_group("2", "1").unwrap();

    assert_eq!(outcome, Membership::AlreadyMember);
    assert_eq!(backend.write_count(GROUPS_KEY), writes + 1);
    let reloaded = GroupStore::open(Box::new(backend.clone()));
    assert_eq!(
        reloaded.get("2").unwrap().student_ids,
        vec!["4".to_string(), "5".to_string(), "1".to_string()]
    );
}

#[test]
fn test_remove_student_is_idempotent_but_always_writes() {
    let (backend, mut roster) = memory_roster(CascadePolicy::Keep);

    assert_eq!(roster.remove_student("404").unwrap().removed, 0);
    assert_eq!(roster.students().len(), 5);
    assert_eq!(backend.write_count(STUDENTS_KEY), 1);
}

#[test]
fn test_roster_ranking_is_stable() {
    let students = vec![
        student("a", "A", Some(10)),
        student("b", "B", Some(20)),
        student("c", "C", Some(20)),
        student("d", "D", Some(5)),
    ];
    let (_backend, mut roster) = memory_roster(CascadePolicy::Keep);
    for s in students {
        roster.students_mut().add_student(s).unwrap();
    }
    let group = roster
        .groups_mut()
        .add_group(NewGroup::new("Ranked", "D", GroupColor::Gryffindor))
        .unwrap();
    for id in ["a", "b", "c", "d"] {
        roster.groups_mut().add_student_to_group(&group.id, id).unwrap();
    }

    let group = roster.groups().get(&group.id).unwrap();
    let ranked: Vec<&str> = views::group_roster(group, roster.students().students())
        .into_iter()
        .map(|s| s.id.as_str())
        .collect();

    assert_eq!(ranked, vec!["b", "c", "a", "d"]);
}

#[test]
fn test_missing_points_rank_as_zero() {
    let (_backend, mut roster) = memory_roster(CascadePolicy::Keep);
    roster.students_mut().add_student(student("x", "X", None)).unwrap();
    roster.groups_mut().add_student_to_group("3", "x").unwrap();
    roster.groups_mut().add_student_to_group("3", "5").unwrap();

    let group = roster.groups().get("3").unwrap();
    let ranked: Vec<&str> = views::group_roster(group, roster.students().students())
        .into_iter()
        .map(|s| s.id.as_str())
        .collect();

    assert_eq!(ranked, vec!["5", "x"]);
}

#[test]
fn test_cascade_prune_removes_memberships() {
    let (_backend, mut roster) = memory_roster(CascadePolicy::Prune);

    let removal = roster.remove_student("1").unwrap();

    assert_eq!(removal.pruned_from, vec!["1".to_string()]);
    assert!(roster.dangling_memberships().is_empty());
}
