use choreust::chores::{ChoreUpdate, NewChore, NewSchedule};
use choreust::commands::*;
use choreust::error::{parse_date, ChoreError};
use choreust::models::{ChoreKind, DateWindow, InstanceId};
use choreust::project_for_display;
use choreust::storage::{JsonStore, Store};
use chrono::NaiveDate;
use tempfile::TempDir;

fn with_test_db<F>(f: F)
where
    F: FnOnce(&JsonStore),
{
    let dir = TempDir::new().unwrap();
    let store = JsonStore::new(dir.path());
    f(&store);
}

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn weekly(title: &str, days: &str, start: &str) -> NewChore {
    NewChore {
        title: title.into(),
        description: None,
        assigned_to: Vec::new(),
        schedule: NewSchedule::Weekly { days: days.parse().unwrap(), start: date(start), end: None },
    }
}

fn once(title: &str, due: &str) -> NewChore {
    NewChore {
        title: title.into(),
        description: Some("Behind the fridge too".into()),
        assigned_to: vec!["Ana".into()],
        schedule: NewSchedule::Once(date(due)),
    }
}

#[test]
fn test_add_and_reload() {
    with_test_db(|store| {
        cmd_add(store, once("Mop floor", "2025-12-01"), true).unwrap();

        let chores = store.load_chores();
        assert_eq!(chores.len(), 1);
        assert_eq!(chores[0].title, "Mop floor");
        assert_eq!(chores[0].assigned_to, vec!["Ana".to_string()]);
        assert!(store.chores_path().exists());
    });
}

#[test]
fn test_invalid_chore_is_not_saved() {
    with_test_db(|store| {
        let err = cmd_add(store, weekly("Trash", "", "2025-12-01"), true).unwrap_err();
        assert!(matches!(err, ChoreError::Invalid(_)));
        assert!(store.load_chores().is_empty());
        assert!(!store.chores_path().exists());
    });
}

#[test]
fn test_complete_occurrence_persists_on_template() {
    with_test_db(|store| {
        let id = cmd_add(store, weekly("Trash", "wed", "2024-01-01"), true).unwrap();
        let occurrence = InstanceId::new(id, date("2024-02-07")).to_string();

        assert!(cmd_complete(store, &occurrence, Some("Bo".into()), true).unwrap());

        let chores = store.load_chores();
        assert_eq!(chores.len(), 1, "occurrences are never stored");
        assert_eq!(chores[0].completions()[0].date, date("2024-02-07"));
        assert_eq!(chores[0].completions()[0].completed_by.as_deref(), Some("Bo"));

        let entries = project_for_display(&chores, &DateWindow::month(2024, 2).unwrap());
        let done: Vec<NaiveDate> = entries.iter().filter(|e| e.is_completed()).map(|e| e.date()).collect();
        assert_eq!(done, vec![date("2024-02-07")]);

        assert!(!cmd_complete(store, &occurrence, None, true).unwrap());
        assert!(store.load_chores()[0].completions().is_empty());
    });
}

#[test]
fn test_complete_one_time_chore() {
    with_test_db(|store| {
        let id = cmd_add(store, once("Sink", "2025-12-01"), true).unwrap();
        assert!(cmd_complete(store, &id.to_string(), None, true).unwrap());
        assert!(matches!(
            store.load_chores()[0].kind,
            ChoreKind::OneTime { is_completed: true, .. }
        ));
    });
}

#[test]
fn test_unknown_ids_are_reported() {
    with_test_db(|store| {
        assert!(matches!(cmd_complete(store, "  ", None, true), Err(ChoreError::InvalidId(_))));
        assert!(matches!(cmd_complete(store, "nope", None, true), Err(ChoreError::ChoreNotFound(_))));
        assert!(matches!(
            cmd_remove(store, "1700000000000-missing01", true),
            Err(ChoreError::ChoreNotFound(_))
        ));
        assert!(matches!(
            cmd_remove(store, "1700000000000-missing01:2024-02-07", true),
            Err(ChoreError::ChoreNotFound(_))
        ));
    });
}

#[test]
fn test_remove_occurrence_removes_template() {
    with_test_db(|store| {
        let id = cmd_add(store, weekly("Trash", "mon", "2024-01-01"), true).unwrap();
        cmd_add(store, once("Sink", "2024-01-02"), true).unwrap();

        cmd_remove(store, &format!("{}:2024-01-08", id), true).unwrap();

        let chores = store.load_chores();
        assert_eq!(chores.len(), 1);
        assert_eq!(chores[0].title, "Sink");
    });
}

#[test]
fn test_edit_changes_pattern() {
    with_test_db(|store| {
        let id = cmd_add(store, weekly("Trash", "mon", "2024-01-01"), true).unwrap();
        let update = ChoreUpdate {
            days_of_week: Some("tue,thu".parse().unwrap()),
            end_date: Some(Some(date("2024-01-31"))),
            ..Default::default()
        };
        cmd_edit(store, &id.to_string(), update, true).unwrap();

        let chores = store.load_chores();
        let pattern = chores[0].recurrence().unwrap();
        assert_eq!(pattern.days_of_week.indices(), vec![2, 4]);
        assert_eq!(pattern.end_date, Some(date("2024-01-31")));
        assert!(project_for_display(&chores, &DateWindow::month(2024, 2).unwrap()).is_empty());
    });
}

#[test]
fn test_team_add_duplicate_and_remove() {
    with_test_db(|store| {
        let id = cmd_team_add(store, "Ana", true).unwrap();
        let err = cmd_team_add(store, "ana", true).unwrap_err();
        assert!(matches!(err, ChoreError::DuplicateMember(_)));
        assert_eq!(store.load_team().len(), 1);

        cmd_add(store, once("Sink", "2025-12-01"), true).unwrap();
        cmd_team_remove(store, &id.to_string(), true).unwrap();
        assert!(store.load_team().is_empty());
        // Chores keep the name.
        assert_eq!(store.load_chores()[0].assigned_to, vec!["Ana".to_string()]);
    });
}

#[test]
fn test_team_remove_by_name() {
    with_test_db(|store| {
        cmd_team_add(store, "Bo", true).unwrap();
        cmd_team_remove(store, "BO", true).unwrap();
        assert!(store.load_team().is_empty());
        assert!(cmd_team_remove(store, "Bo", true).is_err());
    });
}

#[test]
fn test_reset_deletes_files() {
    with_test_db(|store| {
        cmd_add(store, once("Sink", "2025-12-01"), true).unwrap();
        cmd_team_add(store, "Ana", true).unwrap();
        cmd_reset(store, true).unwrap();
        assert!(!store.chores_path().exists());
        assert!(!store.team_path().exists());
        assert!(store.load_chores().is_empty());
    });
}

fn detail(details: &[(&str, String)], label: &str) -> Option<String> {
    details.iter().find(|(l, _)| *l == label).map(|(_, v)| v.clone())
}

#[test]
fn test_show_occurrence_includes_description_pattern_and_completer() {
    with_test_db(|store| {
        let mut new = weekly("Trash", "mon,wed", "2024-01-01");
        new.description = Some("Green bin on Wednesdays".into());
        new.assigned_to = vec!["Ana".into(), "Bo".into()];
        let id = cmd_add(store, new, true).unwrap();
        let occurrence = format!("{}:2024-02-07", id);
        cmd_complete(store, &occurrence, Some("Bo".into()), true).unwrap();

        let details = chore_details(&store.load_chores(), &occurrence).unwrap();
        assert_eq!(detail(&details, "Description").as_deref(), Some("Green bin on Wednesdays"));
        assert_eq!(detail(&details, "Assigned").as_deref(), Some("Ana, Bo"));
        assert_eq!(detail(&details, "Part of"), Some(format!("recurring chore {}", id)));
        assert_eq!(detail(&details, "Repeats").as_deref(), Some("weekly on Mon, Wed from 2024-01-01, no end"));
        assert_eq!(detail(&details, "Status").as_deref(), Some("Done"));
        assert_eq!(detail(&details, "Completed by").as_deref(), Some("Bo"));
        assert!(detail(&details, "Completed at").is_some());

        let other_day = chore_details(&store.load_chores(), &format!("{}:2024-02-05", id)).unwrap();
        assert_eq!(detail(&other_day, "Status").as_deref(), Some("Pending"));
        assert_eq!(detail(&other_day, "Completed by"), None);

        assert!(cmd_show(store, &occurrence).is_ok());
    });
}

#[test]
fn test_show_recurring_and_one_time_chores() {
    with_test_db(|store| {
        let tmpl = cmd_add(store, weekly("Trash", "wed", "2024-01-01"), true).unwrap();
        cmd_complete(store, &format!("{}:2024-02-07", tmpl), Some("Ana".into()), true).unwrap();
        let one = cmd_add(store, once("Sink", "2025-12-01"), true).unwrap();
        let chores = store.load_chores();

        let details = chore_details(&chores, &tmpl.to_string()).unwrap();
        assert_eq!(detail(&details, "Repeats").as_deref(), Some("weekly on Wed from 2024-01-01, no end"));
        assert_eq!(detail(&details, "Completed").as_deref(), Some("1 occurrence(s)"));
        assert_eq!(detail(&details, "Last done").as_deref(), Some("2024-02-07 by Ana"));

        let details = chore_details(&chores, &one.to_string()).unwrap();
        assert_eq!(detail(&details, "Description").as_deref(), Some("Behind the fridge too"));
        assert_eq!(detail(&details, "Repeats"), None);
    });
}

#[test]
fn test_show_rejects_dates_without_an_occurrence() {
    with_test_db(|store| {
        let id = cmd_add(store, weekly("Trash", "wed", "2024-01-01"), true).unwrap();
        let thursday = format!("{}:2024-02-08", id);
        assert!(matches!(
            chore_details(&store.load_chores(), &thursday),
            Err(ChoreError::NotAnOccurrence { .. })
        ));
    });
}
