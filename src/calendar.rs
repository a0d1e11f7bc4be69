use chrono::{Local, NaiveDate};

use crate::models::{CalendarEntry, Chore, ChoreKind, DateWindow};
use crate::recurrence::expand;

/// Builds the flat list of entries to display for `window`.
///
/// Chores are visited in collection order and each contributes a contiguous
/// block: one-time chores due inside the window appear as-is, recurring
/// chores are expanded, and stored instance records are skipped.
pub fn project_for_display(chores: &[Chore], window: &DateWindow) -> Vec<CalendarEntry> {
    let mut entries = Vec::new();
    for chore in chores {
        match &chore.kind {
            ChoreKind::Instance { .. } => continue,
            ChoreKind::Recurring { .. } => {
                entries.extend(expand(chore, window).into_iter().map(CalendarEntry::Occurrence));
            }
            ChoreKind::OneTime { due_date, .. } => {
                if window.contains(*due_date) {
                    entries.push(CalendarEntry::OneTime(chore.clone()));
                }
            }
        }
    }
    entries
}

/// Entries falling on `date`, in projection order.
pub fn entries_on(entries: &[CalendarEntry], date: NaiveDate) -> Vec<&CalendarEntry> {
    entries.iter().filter(|e| e.date() == date).collect()
}

/// Label and value pairs describing one entry, in display order.
///
/// Occurrences also name their recurring chore and pattern and, once done,
/// who completed them and when.
pub fn entry_details(entry: &CalendarEntry) -> Vec<(&'static str, String)> {
    let assigned = match entry.assigned_to() {
        [] => "-".to_string(),
        names => names.join(", "),
    };
    let mut details = vec![
        ("Title", entry.title().to_string()),
        ("ID", entry.id_string()),
        ("Date", entry.date().format("%a %Y-%m-%d").to_string()),
        ("Description", entry.description().unwrap_or("-").to_string()),
        ("Assigned", assigned),
        ("Status", if entry.is_completed() { "Done" } else { "Pending" }.to_string()),
    ];
    if let CalendarEntry::Occurrence(o) = entry {
        details.push(("Part of", format!("recurring chore {}", o.template_id())));
        details.push(("Repeats", o.recurrence.to_string()));
        if let Some(c) = o.completion() {
            details.push(("Completed by", c.completed_by.clone().unwrap_or_else(|| "-".to_string())));
            details.push((
                "Completed at",
                c.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            ));
        }
    }
    details
}

/// Completion counts for a projected month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Entries in the window.
    pub total: usize,
    /// Entries already done.
    pub completed: usize,
}

impl Summary {
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }
}

pub fn summarize(entries: &[CalendarEntry]) -> Summary {
    Summary {
        total: entries.len(),
        completed: entries.iter().filter(|e| e.is_completed()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::parse_date;
    use crate::models::{RecurrencePattern, WeekdaySet};
    use crate::models::ChoreId;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn february() -> DateWindow {
        DateWindow::new(date("2024-02-01"), date("2024-02-29"))
    }

    fn weekly(days: &str) -> Chore {
        let pattern = RecurrencePattern::weekly(days.parse().unwrap(), date("2024-01-01"), None);
        Chore::recurring("Trash", pattern, Utc::now())
    }

    #[test]
    fn test_one_time_boundaries_are_inclusive() {
        let now = Utc::now();
        let chores = vec![
            Chore::one_time("on start", date("2024-02-01"), now),
            Chore::one_time("on end", date("2024-02-29"), now),
            Chore::one_time("day before", date("2024-01-31"), now),
            Chore::one_time("day after", date("2024-03-01"), now),
        ];
        let titles: Vec<String> = project_for_display(&chores, &february())
            .iter()
            .map(|e| e.title().to_string())
            .collect();
        assert_eq!(titles, vec!["on start", "on end"]);
    }

    #[test]
    fn test_stored_instances_are_never_expanded() {
        let template = weekly("wed");
        let stray = Chore {
            id: ChoreId::from("stray"),
            title: "Trash".into(),
            description: None,
            assigned_to: Vec::new(),
            kind: ChoreKind::Instance { parent_id: template.id.clone(), due_date: date("2024-02-07") },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let entries = project_for_display(&[stray.clone()], &february());
        assert!(entries.is_empty());

        let entries = project_for_display(&[template, stray], &february());
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.is_recurring()));
    }

    #[test]
    fn test_blocks_follow_collection_order() {
        let now = Utc::now();
        let chores = vec![
            Chore::one_time("first", date("2024-02-20"), now),
            weekly("mon"),
            Chore::one_time("last", date("2024-02-02"), now),
        ];
        let entries = project_for_display(&chores, &february());
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].title(), "first");
        let mondays: Vec<NaiveDate> = entries[1..5].iter().map(|e| e.date()).collect();
        assert_eq!(
            mondays,
            vec![date("2024-02-05"), date("2024-02-12"), date("2024-02-19"), date("2024-02-26")]
        );
        assert_eq!(entries[5].title(), "last");
    }

    #[test]
    fn test_entries_on_and_summary() {
        let now = Utc::now();
        let mut done = Chore::one_time("done", date("2024-02-05"), now);
        done.kind = ChoreKind::OneTime { due_date: date("2024-02-05"), is_completed: true };
        let chores = vec![done, weekly("mon")];
        let entries = project_for_display(&chores, &february());

        assert_eq!(entries_on(&entries, date("2024-02-05")).len(), 2);
        assert!(entries_on(&entries, date("2024-02-06")).is_empty());

        let summary = summarize(&entries);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.pending(), 4);
    }

    #[test]
    fn test_occurrence_details_name_template_and_completer() {
        let mut template = weekly("wed");
        template.description = Some("Bins to the curb".into());
        template.assigned_to = vec!["Ana".into()];
        if let ChoreKind::Recurring { completions, .. } = &mut template.kind {
            completions.push(crate::models::Completion {
                date: date("2024-02-07"),
                completed_by: Some("Bo".into()),
                completed_at: Utc::now(),
            });
        }
        let entries = project_for_display(&[template.clone()], &february());
        let details = entry_details(entries_on(&entries, date("2024-02-07"))[0]);
        let value = |label: &str| details.iter().find(|(l, _)| *l == label).map(|(_, v)| v.clone());

        assert_eq!(value("Description").as_deref(), Some("Bins to the curb"));
        assert_eq!(value("Assigned").as_deref(), Some("Ana"));
        assert_eq!(value("Status").as_deref(), Some("Done"));
        assert_eq!(value("Part of"), Some(format!("recurring chore {}", template.id)));
        assert_eq!(value("Repeats").as_deref(), Some("weekly on Wed from 2024-01-01, no end"));
        assert_eq!(value("Completed by").as_deref(), Some("Bo"));
        assert!(value("Completed at").is_some());

        let pending = entry_details(entries_on(&entries, date("2024-02-14"))[0]);
        assert!(pending.iter().all(|(l, _)| *l != "Completed by"));
    }

    #[test]
    fn test_one_time_details_have_no_schedule() {
        let chore = Chore::one_time("Sink", date("2024-02-07"), Utc::now());
        let details = entry_details(&CalendarEntry::OneTime(chore));
        assert!(details.contains(&("Description", "-".to_string())));
        assert!(details.iter().all(|(l, _)| *l != "Part of" && *l != "Repeats"));
    }

    #[test]
    fn test_empty_weekday_template_contributes_nothing() {
        let pattern = RecurrencePattern::weekly(WeekdaySet::new(), date("2024-01-01"), None);
        let chores = vec![Chore::recurring("never", pattern, Utc::now())];
        assert!(project_for_display(&chores, &february()).is_empty());
    }
}
