use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{Chore, ChoreKind, Completion, DateWindow, InstanceId, Occurrence};

/// Expands a recurring chore into its occurrences inside `window`.
///
/// Occurrences are returned in ascending date order, each carrying the
/// template's completion record for its date when one exists. Anything that
/// is not a recurring template with a pattern, or a pattern with no weekdays,
/// yields an empty list.
pub fn expand(template: &Chore, window: &DateWindow) -> Vec<Occurrence> {
    let (pattern, completions) = match &template.kind {
        ChoreKind::Recurring { recurrence: Some(p), completions } => (p, completions),
        _ => return Vec::new(),
    };
    if pattern.days_of_week.is_empty() || window.is_empty() {
        return Vec::new();
    }
    let active = match window.intersect(pattern.start_date, pattern.end_date) {
        Some(w) => w,
        None => return Vec::new(),
    };

    // First record wins when a date was completed more than once.
    let mut done: HashMap<NaiveDate, &Completion> = HashMap::with_capacity(completions.len());
    for c in completions {
        done.entry(c.date).or_insert(c);
    }

    let occurrences: Vec<Occurrence> = active
        .days()
        .filter(|d| pattern.days_of_week.contains_date(*d))
        .map(|date| Occurrence {
            id: InstanceId::new(template.id.clone(), date),
            title: template.title.clone(),
            description: template.description.clone(),
            assigned_to: template.assigned_to.clone(),
            recurrence: pattern.clone(),
            created_at: template.created_at,
            updated_at: template.updated_at,
            completion: done.get(&date).map(|c| (*c).clone()),
        })
        .collect();

    tracing::debug!(
        chore = %template.id,
        window = %active,
        count = occurrences.len(),
        "expanded recurring chore"
    );
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::parse_date;
    use crate::models::{RecurrencePattern, WeekdaySet};
    use crate::models::ChoreId;
    use chrono::{Datelike, Utc, Weekday};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn template(days: &[i64], start: &str, end: Option<&str>) -> Chore {
        let pattern = RecurrencePattern::weekly(
            WeekdaySet::from_indices(days.iter().copied()),
            date(start),
            end.map(date),
        );
        let mut chore = Chore::recurring("Water plants", pattern, Utc::now());
        chore.id = ChoreId::from("1700000000000-plants042");
        chore
    }

    fn february() -> DateWindow {
        DateWindow::new(date("2024-02-01"), date("2024-02-29"))
    }

    fn complete(chore: &mut Chore, on: &str, by: Option<&str>) {
        if let ChoreKind::Recurring { completions, .. } = &mut chore.kind {
            completions.push(Completion {
                date: date(on),
                completed_by: by.map(String::from),
                completed_at: Utc::now(),
            });
        }
    }

    #[test]
    fn test_expand_mondays_and_wednesdays_in_window() {
        let chore = template(&[1, 3], "2024-01-01", Some("2024-03-31"));
        let dates: Vec<NaiveDate> = expand(&chore, &february()).iter().map(|o| o.date()).collect();

        let expected: Vec<NaiveDate> = february()
            .days()
            .filter(|d| matches!(d.weekday(), Weekday::Mon | Weekday::Wed))
            .collect();
        assert_eq!(dates, expected);
        assert_eq!(dates.len(), 8);
        assert_eq!(dates[0], date("2024-02-05"));
        assert_eq!(dates[7], date("2024-02-28"));
    }

    #[test]
    fn test_expand_disjoint_window_is_empty() {
        let chore = template(&[0, 1, 2, 3, 4, 5, 6], "2024-01-01", Some("2024-01-31"));
        let march = DateWindow::new(date("2024-03-01"), date("2024-03-31"));
        assert!(expand(&chore, &march).is_empty());

        let later = template(&[0, 1, 2, 3, 4, 5, 6], "2024-04-01", None);
        assert!(expand(&later, &march).is_empty());
    }

    #[test]
    fn test_expand_clamps_to_pattern_range() {
        let chore = template(&[0, 1, 2, 3, 4, 5, 6], "2024-02-10", Some("2024-02-12"));
        let dates: Vec<NaiveDate> = expand(&chore, &february()).iter().map(|o| o.date()).collect();
        assert_eq!(dates, vec![date("2024-02-10"), date("2024-02-11"), date("2024-02-12")]);
    }

    #[test]
    fn test_expand_resolves_completions() {
        let mut chore = template(&[3], "2024-01-01", None);
        complete(&mut chore, "2024-02-07", Some("Sam"));

        let occurrences = expand(&chore, &february());
        assert_eq!(occurrences.len(), 4);
        for o in &occurrences {
            if o.date() == date("2024-02-07") {
                assert!(o.is_completed());
                assert_eq!(o.completion().unwrap().completed_by.as_deref(), Some("Sam"));
            } else {
                assert!(!o.is_completed());
                assert!(o.completion().is_none());
            }
        }
    }

    #[test]
    fn test_expand_is_deterministic() {
        let mut chore = template(&[1, 5], "2024-01-01", None);
        complete(&mut chore, "2024-02-02", None);
        let first = expand(&chore, &february());
        let second = expand(&chore, &february());
        assert_eq!(first, second);
        assert_eq!(first[0].id, InstanceId::new(ChoreId::from("1700000000000-plants042"), date("2024-02-02")));
    }

    #[test]
    fn test_expand_empty_weekdays_is_empty() {
        let chore = template(&[], "2024-01-01", None);
        assert!(expand(&chore, &february()).is_empty());
        assert!(expand(&chore, &DateWindow::single(date("2024-02-05"))).is_empty());
    }

    #[test]
    fn test_expand_single_day_window() {
        let chore = template(&[1], "2024-01-01", None);
        assert_eq!(expand(&chore, &DateWindow::single(date("2024-02-05"))).len(), 1);
        assert!(expand(&chore, &DateWindow::single(date("2024-02-06"))).is_empty());
    }

    #[test]
    fn test_expand_inverted_window_is_empty() {
        let chore = template(&[0, 1, 2, 3, 4, 5, 6], "2024-01-01", None);
        let inverted = DateWindow::new(date("2024-02-29"), date("2024-02-01"));
        assert!(expand(&chore, &inverted).is_empty());
    }

    #[test]
    fn test_expand_ignores_non_templates() {
        let one_time = Chore::one_time("Fix sink", date("2024-02-07"), Utc::now());
        assert!(expand(&one_time, &february()).is_empty());

        let mut broken = template(&[3], "2024-01-01", None);
        broken.kind = ChoreKind::Recurring { recurrence: None, completions: Vec::new() };
        assert!(expand(&broken, &february()).is_empty());
    }

    #[test]
    fn test_expand_copies_template_fields() {
        let mut chore = template(&[4], "2024-01-01", None);
        chore.description = Some("Top shelf too".into());
        chore.assigned_to = vec!["Ana".into(), "Bo".into()];
        let o = &expand(&chore, &february())[0];
        assert_eq!(o.title, "Water plants");
        assert_eq!(o.description.as_deref(), Some("Top shelf too"));
        assert_eq!(o.assigned_to, vec!["Ana".to_string(), "Bo".to_string()]);
        assert_eq!(o.template_id(), &chore.id);
    }
}
