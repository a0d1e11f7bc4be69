use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{parse_date, ChoreError, Result};

/// Opaque identity of a stored chore.
///
/// Existing data carries ids in more than one format (timestamp based
/// `1700000000000-abc123def` as well as UUIDs), so the value is kept as text
/// and only compared for equality. New chores get a random UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoreId(String);

impl ChoreId {
    pub fn generate() -> Self {
        ChoreId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChoreId {
    fn from(s: &str) -> Self {
        ChoreId(s.to_string())
    }
}

impl From<String> for ChoreId {
    fn from(s: String) -> Self {
        ChoreId(s)
    }
}

impl fmt::Display for ChoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identity of a team member. Same rules as [`ChoreId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn generate() -> Self {
        MemberId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        MemberId(s.to_string())
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of weekdays, stored as a bitmask indexed 0=Sunday..6=Saturday.
///
/// Serialized as an ascending list of indices. Duplicates collapse and
/// indices outside `0..=6` are dropped when reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<i64>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn weekday_from_index(index: u32) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

impl WeekdaySet {
    pub fn new() -> Self {
        WeekdaySet(0)
    }

    /// Builds a set from Sunday-based indices, ignoring anything out of range.
    pub fn from_indices<I: IntoIterator<Item = i64>>(indices: I) -> Self {
        let mut set = WeekdaySet::new();
        for i in indices {
            if let Some(day) = u32::try_from(i).ok().and_then(weekday_from_index) {
                set.insert(day);
            }
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in the set, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7).filter_map(weekday_from_index).filter(|d| self.contains(*d))
    }

    pub fn indices(&self) -> Vec<u8> {
        self.iter().map(|d| d.num_days_from_sunday() as u8).collect()
    }
}

impl From<Vec<i64>> for WeekdaySet {
    fn from(indices: Vec<i64>) -> Self {
        WeekdaySet::from_indices(indices)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.indices()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .iter()
            .map(|d| DAY_NAMES[d.num_days_from_sunday() as usize])
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

impl FromStr for WeekdaySet {
    type Err = ChoreError;

    /// Accepts a comma separated list of day names (`mon,wed`) or indices (`1,3`).
    fn from_str(s: &str) -> Result<Self> {
        let mut set = WeekdaySet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day = match part.parse::<u32>() {
                Ok(i) => weekday_from_index(i),
                Err(_) => part.parse::<Weekday>().ok(),
            };
            match day {
                Some(d) => set.insert(d),
                None => return Err(ChoreError::Invalid(format!("unknown weekday '{}'", part))),
            }
        }
        Ok(set)
    }
}

/// Only weekly patterns are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    Weekly,
}

/// A weekly day-of-week pattern with an inclusive active range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    /// Pattern kind; older records may omit it.
    #[serde(default)]
    pub pattern: RecurrenceKind,
    /// Days the chore occurs on.
    pub days_of_week: WeekdaySet,
    /// First active date (inclusive).
    pub start_date: NaiveDate,
    /// Last active date (inclusive). `None` means unbounded.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl RecurrencePattern {
    pub fn weekly(days_of_week: WeekdaySet, start_date: NaiveDate, end_date: Option<NaiveDate>) -> Self {
        RecurrencePattern {
            pattern: RecurrenceKind::Weekly,
            days_of_week,
            start_date,
            end_date,
        }
    }

    /// Whether the pattern produces an occurrence on `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date
            && self.end_date.map_or(true, |end| date <= end)
            && self.days_of_week.contains_date(date)
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "weekly on {} from {}", self.days_of_week, self.start_date)?;
        match self.end_date {
            Some(end) => write!(f, " to {}", end),
            None => write!(f, ", no end"),
        }
    }
}

/// Marks one occurrence date of a recurring chore as done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// The occurrence date this record completes.
    pub date: NaiveDate,
    /// Name of whoever did it, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    /// When the completion was recorded.
    pub completed_at: DateTime<Utc>,
}

/// The role a stored chore plays.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoreKind {
    /// A single chore due on one date.
    OneTime { due_date: NaiveDate, is_completed: bool },
    /// A template that expands into dated occurrences. Completion state of
    /// every occurrence lives in `completions`. A missing pattern means the
    /// stored record was malformed; it produces no occurrences.
    Recurring {
        recurrence: Option<RecurrencePattern>,
        completions: Vec<Completion>,
    },
    /// A persisted copy of a generated occurrence. These only show up in old
    /// data; they are never expanded or displayed.
    Instance { parent_id: ChoreId, due_date: NaiveDate },
}

/// A chore as stored in the chore collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ChoreRecord", into = "ChoreRecord")]
pub struct Chore {
    /// Unique within the collection.
    pub id: ChoreId,
    /// Non-empty, trimmed.
    pub title: String,
    /// Optional free text shown in the detail view.
    pub description: Option<String>,
    /// Team member names. Not checked against the team collection.
    pub assigned_to: Vec<String>,
    /// One-time, recurring template, or legacy stored instance.
    pub kind: ChoreKind,
    /// When the chore was first saved.
    pub created_at: DateTime<Utc>,
    /// Bumped on every edit or completion toggle.
    pub updated_at: DateTime<Utc>,
}

impl Chore {
    pub fn one_time(title: impl Into<String>, due_date: NaiveDate, now: DateTime<Utc>) -> Self {
        Chore {
            id: ChoreId::generate(),
            title: title.into(),
            description: None,
            assigned_to: Vec::new(),
            kind: ChoreKind::OneTime { due_date, is_completed: false },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn recurring(title: impl Into<String>, recurrence: RecurrencePattern, now: DateTime<Utc>) -> Self {
        Chore {
            id: ChoreId::generate(),
            title: title.into(),
            description: None,
            assigned_to: Vec::new(),
            kind: ChoreKind::Recurring {
                recurrence: Some(recurrence),
                completions: Vec::new(),
            },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn recurrence(&self) -> Option<&RecurrencePattern> {
        match &self.kind {
            ChoreKind::Recurring { recurrence, .. } => recurrence.as_ref(),
            _ => None,
        }
    }

    pub fn completions(&self) -> &[Completion] {
        match &self.kind {
            ChoreKind::Recurring { completions, .. } => completions,
            _ => &[],
        }
    }

    /// The template a legacy stored instance belongs to.
    pub fn parent_id(&self) -> Option<&ChoreId> {
        match &self.kind {
            ChoreKind::Instance { parent_id, .. } => Some(parent_id),
            _ => None,
        }
    }
}

/// Stored representation of a pattern that may fail to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RecurrenceField {
    Valid(RecurrencePattern),
    Malformed(serde_json::Value),
}

/// Flat on-disk shape of a chore. One record shape covers all three roles,
/// distinguished by `isRecurring` and `parentId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChoreRecord {
    id: ChoreId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    assigned_to: Vec<String>,
    due_date: NaiveDate,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurrence: Option<RecurrenceField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<ChoreId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    completions: Vec<Completion>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChoreRecord> for Chore {
    fn from(r: ChoreRecord) -> Self {
        let kind = if let Some(parent_id) = r.parent_id {
            ChoreKind::Instance { parent_id, due_date: r.due_date }
        } else if r.is_recurring {
            let recurrence = match r.recurrence {
                Some(RecurrenceField::Valid(p)) => Some(p),
                Some(RecurrenceField::Malformed(_)) => {
                    tracing::warn!(chore = %r.id, "ignoring malformed recurrence pattern");
                    None
                }
                None => None,
            };
            ChoreKind::Recurring { recurrence, completions: r.completions }
        } else {
            ChoreKind::OneTime { due_date: r.due_date, is_completed: r.is_completed }
        };
        Chore {
            id: r.id,
            title: r.title,
            description: r.description,
            assigned_to: r.assigned_to,
            kind,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<Chore> for ChoreRecord {
    fn from(c: Chore) -> Self {
        let mut record = ChoreRecord {
            id: c.id,
            title: c.title,
            description: c.description,
            assigned_to: c.assigned_to,
            due_date: c.created_at.date_naive(),
            is_completed: false,
            is_recurring: false,
            recurrence: None,
            parent_id: None,
            completions: Vec::new(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        };
        match c.kind {
            ChoreKind::OneTime { due_date, is_completed } => {
                record.due_date = due_date;
                record.is_completed = is_completed;
            }
            ChoreKind::Recurring { recurrence, completions } => {
                if let Some(p) = &recurrence {
                    record.due_date = p.start_date;
                }
                record.is_recurring = true;
                record.recurrence = recurrence.map(RecurrenceField::Valid);
                record.completions = completions;
            }
            ChoreKind::Instance { parent_id, due_date } => {
                record.due_date = due_date;
                record.parent_id = Some(parent_id);
            }
        }
        record
    }
}

/// Identity of a generated occurrence: the owning template plus the date.
///
/// Text form is `<template id>:<YYYY-MM-DD>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    /// The recurring chore that generated the occurrence.
    pub template_id: ChoreId,
    /// The occurrence date.
    pub date: NaiveDate,
}

impl InstanceId {
    pub fn new(template_id: ChoreId, date: NaiveDate) -> Self {
        InstanceId { template_id, date }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.template_id, self.date.format("%Y-%m-%d"))
    }
}

impl FromStr for InstanceId {
    type Err = ChoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (id, date) = s.rsplit_once(':').ok_or_else(|| ChoreError::InvalidId(s.to_string()))?;
        if id.trim().is_empty() {
            return Err(ChoreError::InvalidId(s.to_string()));
        }
        let date = parse_date(date).map_err(|_| ChoreError::InvalidId(s.to_string()))?;
        Ok(InstanceId::new(ChoreId::from(id), date))
    }
}

/// One dated occurrence of a recurring chore, generated on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// Template id plus occurrence date.
    pub id: InstanceId,
    /// Copied from the template.
    pub title: String,
    /// Copied from the template.
    pub description: Option<String>,
    /// Copied from the template.
    pub assigned_to: Vec<String>,
    /// The template's pattern, so a detail view can show the schedule.
    pub recurrence: RecurrencePattern,
    /// The template's creation time.
    pub created_at: DateTime<Utc>,
    /// The template's last update time.
    pub updated_at: DateTime<Utc>,
    pub(crate) completion: Option<Completion>,
}

impl Occurrence {
    pub fn template_id(&self) -> &ChoreId {
        &self.id.template_id
    }

    pub fn date(&self) -> NaiveDate {
        self.id.date
    }

    /// The template's completion record for this date, if any.
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_some()
    }
}

/// An item on the calendar: a one-time chore or a generated occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarEntry {
    /// A stored one-time chore.
    OneTime(Chore),
    /// A generated occurrence of a recurring chore.
    Occurrence(Occurrence),
}

impl CalendarEntry {
    /// Id a user can pass back to edit or complete this entry.
    pub fn id_string(&self) -> String {
        match self {
            CalendarEntry::OneTime(c) => c.id.to_string(),
            CalendarEntry::Occurrence(o) => o.id.to_string(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CalendarEntry::OneTime(c) => &c.title,
            CalendarEntry::Occurrence(o) => &o.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            CalendarEntry::OneTime(c) => c.description.as_deref(),
            CalendarEntry::Occurrence(o) => o.description.as_deref(),
        }
    }

    pub fn assigned_to(&self) -> &[String] {
        match self {
            CalendarEntry::OneTime(c) => &c.assigned_to,
            CalendarEntry::Occurrence(o) => &o.assigned_to,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            CalendarEntry::OneTime(c) => match c.kind {
                ChoreKind::OneTime { due_date, .. } | ChoreKind::Instance { due_date, .. } => due_date,
                ChoreKind::Recurring { .. } => c.created_at.date_naive(),
            },
            CalendarEntry::Occurrence(o) => o.date(),
        }
    }

    pub fn is_completed(&self) -> bool {
        match self {
            CalendarEntry::OneTime(c) => matches!(c.kind, ChoreKind::OneTime { is_completed: true, .. }),
            CalendarEntry::Occurrence(o) => o.is_completed(),
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, CalendarEntry::Occurrence(_))
    }
}

/// A closed interval of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    /// First date (inclusive).
    pub start: NaiveDate,
    /// Last date (inclusive).
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateWindow { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        DateWindow { start: date, end: date }
    }

    /// First through last day of the given month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(DateWindow { start, end })
    }

    pub fn month_of(date: NaiveDate) -> Self {
        // Every valid date lies in a month chrono can represent, except the
        // very last one where the successor month overflows.
        DateWindow::month(date.year(), date.month()).unwrap_or(DateWindow {
            start: date.with_day(1).unwrap_or(date),
            end: NaiveDate::MAX,
        })
    }

    /// Parses `YYYY-MM` into that month's window.
    pub fn parse_month(s: &str) -> Result<Self> {
        let first = parse_date(&format!("{}-01", s.trim()))?;
        Ok(DateWindow::month_of(first))
    }

    pub fn next_month(&self) -> Self {
        match self.start.checked_add_months(Months::new(1)) {
            Some(d) => DateWindow::month_of(d),
            None => *self,
        }
    }

    pub fn previous_month(&self) -> Self {
        match self.start.checked_sub_months(Months::new(1)) {
            Some(d) => DateWindow::month_of(d),
            None => *self,
        }
    }

    /// True when `start > end`; such a window contains no dates.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersection with the range `[start, end]`, where `end = None` is unbounded.
    pub fn intersect(&self, start: NaiveDate, end: Option<NaiveDate>) -> Option<DateWindow> {
        let from = self.start.max(start);
        let to = end.map_or(self.end, |e| e.min(self.end));
        if from > to {
            None
        } else {
            Some(DateWindow::new(from, to))
        }
    }

    /// Every date in the window, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        let first = (self.start <= end).then_some(self.start);
        // Stops after `end` itself, so a window ending on NaiveDate::MAX
        // still yields its last day.
        std::iter::successors(first, move |d| if *d < end { d.succ_opt() } else { None })
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Someone chores can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Unique within the team.
    pub id: MemberId,
    /// Unique within the team, ignoring case.
    pub name: String,
    /// When the member was added.
    pub created_at: DateTime<Utc>,
}
