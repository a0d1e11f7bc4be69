use chrono::{Local, NaiveDate, Utc};
use ratatui::widgets::TableState;

use crate::calendar::{entries_on, entry_details, project_for_display, summarize, Summary};
use crate::chores::{add_chore, delete_chore, toggle_completion, ChoreTarget, NewChore, NewSchedule};
use crate::error::{parse_date, Result};
use crate::models::{CalendarEntry, Chore, DateWindow, TeamMember, WeekdaySet};
use crate::storage::Store;
use crate::team::{add_member, remove_member};

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    AddingChore,
    AddingMember,
}

#[derive(Debug, PartialEq)]
pub enum ViewMode {
    Calendar,
    Team,
}

/// State for the multi-step "Add Chore" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub step: usize, // 0: Title, 1: Date, 2: Days
}

pub struct App<S: Store> {
    pub store: S,
    pub chores: Vec<Chore>,
    pub team: Vec<TeamMember>,
    pub window: DateWindow,
    pub entries: Vec<CalendarEntry>,
    pub summary: Summary,
    pub state: TableState,
    pub team_state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub show_completed: bool,
    /// Last error or confirmation, shown in the status bar.
    pub message: Option<String>,
}

impl<S: Store> App<S> {
    /// Creates the app showing the current month.
    pub fn new(store: S) -> App<S> {
        let today = Local::now().date_naive();
        App::with_window(store, DateWindow::month_of(today))
    }

    pub fn with_window(store: S, window: DateWindow) -> App<S> {
        let chores = store.load_chores();
        let team = store.load_team();
        let mut app = App {
            store,
            chores,
            team,
            window,
            entries: Vec::new(),
            summary: Summary::default(),
            state: TableState::default(),
            team_state: TableState::default(),
            view_mode: ViewMode::Calendar,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            show_completed: true,
            message: None,
        };
        app.refresh();
        app
    }

    /// Recomputes the calendar entries for the current window, day by day.
    pub fn refresh(&mut self) {
        let mut entries = project_for_display(&self.chores, &self.window);
        self.summary = summarize(&entries);
        if !self.show_completed {
            entries.retain(|e| !e.is_completed());
        }
        self.entries = self
            .window
            .days()
            .flat_map(|day| entries_on(&entries, day))
            .cloned()
            .collect();
        clamp_selection(&mut self.state, self.entries.len());
        clamp_selection(&mut self.team_state, self.team.len());
    }

    fn persist_chores(&mut self) {
        if let Err(e) = self.store.save_chores(&self.chores) {
            self.message = Some(format!("Failed to save chores: {}", e));
        }
        self.refresh();
    }

    fn persist_team(&mut self) {
        if let Err(e) = self.store.save_team(&self.team) {
            self.message = Some(format!("Failed to save team: {}", e));
        }
        self.refresh();
    }

    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    /// Selects the next row in the current list.
    pub fn next(&mut self) {
        let (state, len) = self.current_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous row in the current list.
    pub fn previous(&mut self) {
        let (state, len) = self.current_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn current_list(&mut self) -> (&mut TableState, usize) {
        match self.view_mode {
            ViewMode::Calendar => (&mut self.state, self.entries.len()),
            ViewMode::Team => (&mut self.team_state, self.team.len()),
        }
    }

    pub fn next_month(&mut self) {
        self.window = self.window.next_month();
        self.state.select(None);
        self.refresh();
    }

    pub fn previous_month(&mut self) {
        self.window = self.window.previous_month();
        self.state.select(None);
        self.refresh();
    }

    pub fn this_month(&mut self) {
        self.window = DateWindow::month_of(Local::now().date_naive());
        self.state.select(None);
        self.refresh();
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Calendar => ViewMode::Team,
            ViewMode::Team => ViewMode::Calendar,
        };
    }

    pub fn toggle_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.refresh();
    }

    fn selected_entry(&self) -> Option<&CalendarEntry> {
        self.entries.get(self.state.selected()?)
    }

    fn selected_target(&self) -> Option<ChoreTarget> {
        Some(match self.selected_entry()? {
            CalendarEntry::OneTime(c) => ChoreTarget::Chore(c.id.clone()),
            CalendarEntry::Occurrence(o) => ChoreTarget::Occurrence(o.id.clone()),
        })
    }

    /// One line describing the selected entry: description, assignees,
    /// schedule and, when done, who completed it.
    pub fn selected_details(&self) -> Option<String> {
        let entry = self.selected_entry()?;
        let parts: Vec<String> = entry_details(entry)
            .into_iter()
            .filter(|(label, _)| !matches!(*label, "Title" | "ID" | "Date" | "Status"))
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect();
        Some(parts.join(" | "))
    }

    /// Toggles completion of the selected entry.
    pub fn complete_selected(&mut self) {
        if self.view_mode != ViewMode::Calendar {
            return;
        }
        if let Some(target) = self.selected_target() {
            let result = toggle_completion(&mut self.chores, &target, None, Utc::now());
            if self.report(result).is_some() {
                self.message = None;
                self.persist_chores();
            }
        }
    }

    /// Deletes the selected chore or team member. Deleting an occurrence
    /// deletes its recurring chore.
    pub fn delete_selected(&mut self) {
        match self.view_mode {
            ViewMode::Calendar => {
                if let Some(target) = self.selected_target() {
                    let result = delete_chore(&mut self.chores, &target);
                    if let Some(removed) = self.report(result) {
                        self.message = Some(format!("Removed '{}'", removed.title));
                        self.persist_chores();
                    }
                }
            }
            ViewMode::Team => {
                let id = self.team_state.selected().and_then(|i| self.team.get(i)).map(|m| m.id.clone());
                if let Some(id) = id {
                    let result = remove_member(&mut self.team, &id);
                    if let Some(removed) = self.report(result) {
                        self.message = Some(format!("Removed '{}'", removed.name));
                        self.persist_team();
                    }
                }
            }
        }
    }

    pub fn start_add(&mut self) {
        self.input_buffer.clear();
        self.message = None;
        match self.view_mode {
            ViewMode::Calendar => {
                self.add_state = AddState::default();
                self.input_mode = InputMode::AddingChore;
            }
            ViewMode::Team => self.input_mode = InputMode::AddingMember,
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Prompt for the current input step.
    pub fn prompt(&self) -> &'static str {
        match self.input_mode {
            InputMode::Normal => "",
            InputMode::AddingMember => "Member name",
            InputMode::AddingChore => match self.add_state.step {
                0 => "Title",
                1 => "Date (YYYY-MM-DD, empty for today)",
                _ => "Repeat on days (e.g. mon,wed; empty for one-time)",
            },
        }
    }

    /// Consumes the input buffer for the current step.
    pub fn handle_input(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        match self.input_mode {
            InputMode::Normal => {}
            InputMode::AddingMember => {
                self.input_mode = InputMode::Normal;
                let result = add_member(&mut self.team, &input, Utc::now()).map(|m| m.name.clone());
                if let Some(name) = self.report(result) {
                    self.message = Some(format!("Added '{}'", name));
                    self.persist_team();
                }
            }
            InputMode::AddingChore => self.handle_add_step(input),
        }
    }

    fn handle_add_step(&mut self, input: String) {
        match self.add_state.step {
            0 => {
                self.add_state.title = input;
                self.add_state.step = 1;
            }
            1 => {
                let date = if input.trim().is_empty() {
                    Ok(Local::now().date_naive())
                } else {
                    parse_date(&input)
                };
                // Stay on this step until the date parses.
                if let Some(date) = self.report(date) {
                    self.message = None;
                    self.add_state.date = Some(date);
                    self.add_state.step = 2;
                }
            }
            _ => {
                let days = if input.trim().is_empty() {
                    Ok(WeekdaySet::new())
                } else {
                    input.parse::<WeekdaySet>()
                };
                let Some(days) = self.report(days) else { return };
                let date = self.add_state.date.unwrap_or_else(|| Local::now().date_naive());
                let schedule = if days.is_empty() {
                    NewSchedule::Once(date)
                } else {
                    NewSchedule::Weekly { days, start: date, end: None }
                };
                let new = NewChore {
                    title: std::mem::take(&mut self.add_state.title),
                    description: None,
                    assigned_to: Vec::new(),
                    schedule,
                };
                self.input_mode = InputMode::Normal;
                self.add_state = AddState::default();
                let result = add_chore(&mut self.chores, new, Utc::now());
                if self.report(result).is_some() {
                    self.message = None;
                    if !self.window.contains(date) {
                        self.window = DateWindow::month_of(date);
                    }
                    self.persist_chores();
                }
            }
        }
    }
}

fn clamp_selection(state: &mut TableState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}
