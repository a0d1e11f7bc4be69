use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ChoreError, Result};
use crate::models::{Chore, ChoreId, ChoreKind, Completion, InstanceId, RecurrencePattern, WeekdaySet};

/// What a user-supplied id refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoreTarget {
    /// A stored chore.
    Chore(ChoreId),
    /// A generated occurrence. Mutations go to the owning template.
    Occurrence(InstanceId),
}

impl ChoreTarget {
    /// Resolves `s` against the stored chores.
    ///
    /// Ids are opaque, so an exact match on a stored chore wins. Anything
    /// else must be `<chore id>:<YYYY-MM-DD>`; whether that date really is an
    /// occurrence is checked by the operation using the target.
    pub fn resolve(chores: &[Chore], s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChoreError::InvalidId(s.to_string()));
        }
        if let Some(chore) = find_chore(chores, &ChoreId::from(s)) {
            return Ok(ChoreTarget::Chore(chore.id.clone()));
        }
        match s.parse::<InstanceId>() {
            Ok(iid) => Ok(ChoreTarget::Occurrence(iid)),
            Err(_) => Err(ChoreError::ChoreNotFound(s.to_string())),
        }
    }

    /// The stored chore a mutation on this target lands on.
    pub fn chore_id(&self) -> &ChoreId {
        match self {
            ChoreTarget::Chore(id) => id,
            ChoreTarget::Occurrence(iid) => &iid.template_id,
        }
    }
}

impl fmt::Display for ChoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoreTarget::Chore(id) => write!(f, "{}", id),
            ChoreTarget::Occurrence(iid) => write!(f, "{}", iid),
        }
    }
}

/// When a new chore happens.
#[derive(Debug, Clone, PartialEq)]
pub enum NewSchedule {
    /// Due on one date.
    Once(NaiveDate),
    /// Repeats on `days` from `start` through `end` (open when `None`).
    Weekly {
        days: WeekdaySet,
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
}

/// Input for creating a chore.
#[derive(Debug, Clone)]
pub struct NewChore {
    /// Trimmed; must not be empty.
    pub title: String,
    /// Blank descriptions are dropped.
    pub description: Option<String>,
    /// Team member names, stored as given.
    pub assigned_to: Vec<String>,
    pub schedule: NewSchedule,
}

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ChoreError::Invalid("please enter a chore title".into()));
    }
    Ok(title.to_string())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

fn checked_pattern(days: WeekdaySet, start: NaiveDate, end: Option<NaiveDate>) -> Result<RecurrencePattern> {
    if days.is_empty() {
        return Err(ChoreError::Invalid(
            "please select at least one day for recurring chores".into(),
        ));
    }
    if let Some(end) = end {
        if end < start {
            return Err(ChoreError::Invalid(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
    }
    Ok(RecurrencePattern::weekly(days, start, end))
}

impl NewChore {
    /// Validates the input and builds the stored chore.
    pub fn build(self, now: DateTime<Utc>) -> Result<Chore> {
        let title = clean_title(&self.title)?;
        let mut chore = match self.schedule {
            NewSchedule::Once(due) => Chore::one_time(title, due, now),
            NewSchedule::Weekly { days, start, end } => {
                Chore::recurring(title, checked_pattern(days, start, end)?, now)
            }
        };
        chore.description = clean_description(self.description);
        chore.assigned_to = self.assigned_to;
        Ok(chore)
    }
}

/// Adds a validated chore to the collection and returns its id.
pub fn add_chore(chores: &mut Vec<Chore>, new: NewChore, now: DateTime<Utc>) -> Result<ChoreId> {
    let chore = new.build(now)?;
    let id = chore.id.clone();
    tracing::debug!(chore = %id, "adding chore");
    chores.push(chore);
    Ok(id)
}

pub fn find_chore<'a>(chores: &'a [Chore], id: &ChoreId) -> Option<&'a Chore> {
    chores.iter().find(|c| &c.id == id)
}

fn find_chore_mut<'a>(chores: &'a mut [Chore], id: &ChoreId) -> Result<&'a mut Chore> {
    chores
        .iter_mut()
        .find(|c| &c.id == id)
        .ok_or_else(|| ChoreError::ChoreNotFound(id.to_string()))
}

/// Field-wise edit of a stored chore. `None` leaves a field unchanged.
///
/// Setting `due_date` makes the chore one-time; setting any of the pattern
/// fields makes it recurring, keeping whatever pattern fields are not given.
#[derive(Debug, Clone, Default)]
pub struct ChoreUpdate {
    pub title: Option<String>,
    /// A blank value clears the description.
    pub description: Option<String>,
    /// Replaces the whole list.
    pub assigned_to: Option<Vec<String>>,
    /// Makes the chore one-time.
    pub due_date: Option<NaiveDate>,
    pub days_of_week: Option<WeekdaySet>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date.
    pub end_date: Option<Option<NaiveDate>>,
}

impl ChoreUpdate {
    fn touches_pattern(&self) -> bool {
        self.days_of_week.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }

    fn next_kind(&self, current: &ChoreKind) -> Result<Option<ChoreKind>> {
        if let ChoreKind::Instance { .. } = current {
            if self.due_date.is_some() || self.touches_pattern() {
                return Err(ChoreError::Invalid(
                    "stored occurrence records cannot be rescheduled".into(),
                ));
            }
            return Ok(None);
        }
        if self.due_date.is_some() && self.touches_pattern() {
            return Err(ChoreError::Invalid(
                "a due date and a weekly pattern cannot be set together".into(),
            ));
        }
        if let Some(due_date) = self.due_date {
            let is_completed = matches!(current, ChoreKind::OneTime { is_completed: true, .. });
            return Ok(Some(ChoreKind::OneTime { due_date, is_completed }));
        }
        if !self.touches_pattern() {
            return Ok(None);
        }
        let (days, start, end, completions) = match current {
            ChoreKind::Recurring { recurrence: Some(p), completions } => {
                (p.days_of_week, p.start_date, p.end_date, completions.clone())
            }
            ChoreKind::Recurring { recurrence: None, completions } => {
                let start = self.start_date.ok_or_else(|| {
                    ChoreError::Invalid("a start date is required to repair this chore".into())
                })?;
                (WeekdaySet::new(), start, None, completions.clone())
            }
            ChoreKind::OneTime { due_date, .. } => (WeekdaySet::new(), *due_date, None, Vec::new()),
            ChoreKind::Instance { .. } => return Ok(None),
        };
        let pattern = checked_pattern(
            self.days_of_week.unwrap_or(days),
            self.start_date.unwrap_or(start),
            self.end_date.unwrap_or(end),
        )?;
        Ok(Some(ChoreKind::Recurring {
            recurrence: Some(pattern),
            completions,
        }))
    }
}

/// Applies `update` to the chore `target` refers to. An occurrence target
/// edits its template. Nothing changes when validation fails.
pub fn update_chore<'a>(
    chores: &'a mut [Chore],
    target: &ChoreTarget,
    update: ChoreUpdate,
    now: DateTime<Utc>,
) -> Result<&'a Chore> {
    let chore = find_chore_mut(chores, target.chore_id())?;
    let title = update.title.as_deref().map(clean_title).transpose()?;
    let kind = update.next_kind(&chore.kind)?;

    if let Some(title) = title {
        chore.title = title;
    }
    if let Some(description) = update.description {
        chore.description = clean_description(Some(description));
    }
    if let Some(assigned_to) = update.assigned_to {
        chore.assigned_to = assigned_to;
    }
    if let Some(kind) = kind {
        chore.kind = kind;
    }
    chore.updated_at = now;
    Ok(chore)
}

/// Removes the chore `target` refers to. Deleting an occurrence deletes the
/// whole recurring chore.
pub fn delete_chore(chores: &mut Vec<Chore>, target: &ChoreTarget) -> Result<Chore> {
    let id = target.chore_id();
    let idx = chores
        .iter()
        .position(|c| &c.id == id)
        .ok_or_else(|| ChoreError::ChoreNotFound(target.to_string()))?;
    Ok(chores.remove(idx))
}

/// Flips the completion state of `target` and returns the new state.
///
/// One-time chores flip their own flag. Occurrences add or remove the
/// template's completion record for that date; a stored instance record is
/// redirected to its template the same way.
pub fn toggle_completion(
    chores: &mut [Chore],
    target: &ChoreTarget,
    completed_by: Option<&str>,
    now: DateTime<Utc>,
) -> Result<bool> {
    let occurrence = match target {
        ChoreTarget::Occurrence(iid) => iid.clone(),
        ChoreTarget::Chore(id) => {
            let chore = find_chore_mut(chores, id)?;
            match &mut chore.kind {
                ChoreKind::OneTime { is_completed, .. } => {
                    *is_completed = !*is_completed;
                    let done = *is_completed;
                    chore.updated_at = now;
                    return Ok(done);
                }
                ChoreKind::Instance { parent_id, due_date } => InstanceId::new(parent_id.clone(), *due_date),
                ChoreKind::Recurring { .. } => {
                    return Err(ChoreError::Invalid(format!(
                        "'{}' is recurring; complete a single occurrence as <id>:<YYYY-MM-DD>",
                        id
                    )))
                }
            }
        }
    };

    let template = find_chore_mut(chores, &occurrence.template_id)?;
    let completions = match &mut template.kind {
        ChoreKind::Recurring { recurrence: Some(p), completions } if p.occurs_on(occurrence.date) => completions,
        _ => {
            return Err(ChoreError::NotAnOccurrence {
                template_id: occurrence.template_id,
                date: occurrence.date,
            })
        }
    };

    let done = if completions.iter().any(|c| c.date == occurrence.date) {
        completions.retain(|c| c.date != occurrence.date);
        false
    } else {
        completions.push(Completion {
            date: occurrence.date,
            completed_by: completed_by.map(String::from),
            completed_at: now,
        });
        true
    };
    template.updated_at = now;
    tracing::debug!(occurrence = %occurrence, done, "toggled occurrence");
    Ok(done)
}
