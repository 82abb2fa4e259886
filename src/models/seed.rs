//! Default dataset used when nothing usable is stored yet.

use super::{Group, GroupColor, Student, Task, TaskStatus};
use chrono::Utc;

fn student(id: &str, first: &str, last: &str, phone: &str, email: Option<&str>, grade: &str, points: u32) -> Student {
    let mut s = Student::new(id.to_string(), first.to_string(), last.to_string(), phone.to_string());
    s.email = email.map(str::to_string);
    s.grade = Some(grade.to_string());
    s.points = Some(points);
    s
}

fn task(id: &str, title: &str, date_range: &str, difficulty: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        date_range: date_range.to_string(),
        difficulty: difficulty.to_string(),
        status,
    }
}

/// The five default students. Creation time is the moment the seed is built.
pub fn default_students() -> Vec<Student> {
    vec![
        student("1", "Александр", "Гришенкин", "+7 900 123-45-67", Some("ivan@example.com"), "11.2", 215),
        student("2", "Ксения", "Харитонова", "+7 900 234-56-78", Some("maria@example.com"), "10.2", 200),
        student("3", "Олеся", "Михальчук", "+7 900 345-67-89", None, "8.1", 190),
        student("4", "Андрей", "Романович", "+7 900 456-78-90", None, "10.2", 160),
        student("5", "Игорь", "Алексеевич", "+7 900 567-89-01", None, "11.2", 130),
    ]
}

/// The three default houses.
pub fn default_groups() -> Vec<Group> {
    let now = Utc::now();
    vec![
        Group {
            id: "1".to_string(),
            name: "Гриффиндор".to_string(),
            description: "Среди наших учеников царит дух смелости и отваги. Мы приветствуем инициативу и поощряем самых ярких и активных".to_string(),
            student_ids: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            created_at: now,
            color: GroupColor::Gryffindor,
            points: 1280,
            tasks: Some(vec![
                task("t1", "Организация школьного спектакля", "12.04 - 26.04", "Школьный уровень", TaskStatus::NotStarted),
                task("t2", "Принять участие в викторине", "10.04 - 17.04", "Муниципальный уровень", TaskStatus::NotStarted),
                task("t3", "Поучаствовать во ВКОШП", "10.04 - 17.04", "Всероссийский уровень", TaskStatus::Completed),
            ]),
        },
        Group {
            id: "2".to_string(),
            name: "Слизерин".to_string(),
            description: "Мудрость и хитрость - наши главные качества".to_string(),
            student_ids: vec!["4".to_string(), "5".to_string()],
            created_at: now,
            color: GroupColor::Slytherin,
            points: 1009,
            tasks: None,
        },
        Group {
            id: "3".to_string(),
            name: "Когтевран".to_string(),
            description: "Ум и знания превыше всего".to_string(),
            student_ids: Vec::new(),
            created_at: now,
            color: GroupColor::Ravenclaw,
            points: 963,
            tasks: None,
        },
    ]
}
