use std::io::{self, Write};

use chrono::{Datelike, Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::calendar::{entries_on, entry_details, project_for_display, summarize};
use crate::chores::{
    add_chore, delete_chore, find_chore, toggle_completion, update_chore, ChoreTarget, ChoreUpdate, NewChore,
};
use crate::error::{ChoreError, Result};
use crate::models::{CalendarEntry, Chore, ChoreId, ChoreKind, DateWindow, MemberId};
use crate::recurrence::expand;
use crate::storage::{JsonStore, Store};
use crate::team::{add_member, find_member, remove_member};

fn bold(s: &str) -> Cell {
    Cell::new(s).add_attribute(Attribute::Bold)
}

/// Notes assignees that are not on the team. Names are stored as given.
fn warn_unknown_assignees<S: Store>(store: &S, names: &[String], silent: bool) {
    if silent || names.is_empty() {
        return;
    }
    let team = store.load_team();
    for name in names {
        if find_member(&team, name).is_none() {
            eprintln!("Note: '{}' is not a team member.", name);
        }
    }
}

/// Adds a new chore.
pub fn cmd_add<S: Store>(store: &S, new: NewChore, silent: bool) -> Result<ChoreId> {
    warn_unknown_assignees(store, &new.assigned_to, silent);
    let mut chores = store.load_chores();
    let id = add_chore(&mut chores, new, Utc::now())?;
    store.save_chores(&chores)?;
    if !silent {
        println!("Chore added (id = {})", id);
    }
    Ok(id)
}

/// Prints every chore on the calendar for `window`, grouped by day. Within
/// a day, entries keep collection order.
pub fn cmd_list<S: Store>(store: &S, window: DateWindow, all: bool) -> Result<()> {
    let chores = store.load_chores();
    let mut entries = project_for_display(&chores, &window);
    let summary = summarize(&entries);
    if !all {
        entries.retain(|e| !e.is_completed());
    }
    if entries.is_empty() {
        println!("No chores between {} and {}.", window.start, window.end);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            bold("Date"),
            bold("Day"),
            bold("Title"),
            bold("Assigned"),
            bold("Repeats"),
            bold("Status"),
            bold("ID"),
        ]);

    let today = Local::now().date_naive();
    for day in window.days() {
        for (i, e) in entries_on(&entries, day).into_iter().enumerate() {
            // Date and weekday only on the first row of each day.
            let (date_cell, day_cell) = if i == 0 {
                let date_color = if day == today {
                    Color::Cyan
                } else if day < today {
                    Color::Red
                } else {
                    Color::Reset
                };
                (Cell::new(day).fg(date_color), Cell::new(day.weekday()))
            } else {
                (Cell::new(""), Cell::new(""))
            };
            let (status, status_color) = if e.is_completed() {
                ("Done", Color::Green)
            } else {
                ("Pending", Color::Yellow)
            };
            table.add_row(vec![
                date_cell,
                day_cell,
                Cell::new(e.title()),
                Cell::new(e.assigned_to().join(", ")),
                Cell::new(if e.is_recurring() { "weekly" } else { "" }),
                Cell::new(status).fg(status_color),
                Cell::new(e.id_string()),
            ]);
        }
    }

    println!("{table}");
    println!(
        "{}: {} done, {} pending",
        window,
        summary.completed,
        summary.pending()
    );
    Ok(())
}

fn schedule_text(chore: &Chore) -> String {
    match &chore.kind {
        ChoreKind::OneTime { due_date, .. } => format!("once on {}", due_date),
        ChoreKind::Recurring { recurrence: Some(p), .. } => p.to_string(),
        ChoreKind::Recurring { recurrence: None, .. } => "invalid pattern".to_string(),
        ChoreKind::Instance { parent_id, due_date } => format!("stray copy of {} on {}", parent_id, due_date),
    }
}

/// Prints the stored chores, recurring ones once each.
pub fn cmd_chores<S: Store>(store: &S) -> Result<()> {
    let chores = store.load_chores();
    if chores.is_empty() {
        println!("No chores found.");
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![bold("ID"), bold("Title"), bold("Schedule"), bold("Assigned"), bold("Done")]);
    for c in &chores {
        let done = match &c.kind {
            ChoreKind::OneTime { is_completed, .. } => if *is_completed { "yes".to_string() } else { "no".to_string() },
            ChoreKind::Recurring { completions, .. } => format!("{}x", completions.len()),
            ChoreKind::Instance { .. } => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(&c.title),
            Cell::new(schedule_text(c)),
            Cell::new(c.assigned_to.join(", ")),
            Cell::new(done),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Everything known about a stored chore or a single occurrence, as label
/// and value pairs.
pub fn chore_details(chores: &[Chore], id: &str) -> Result<Vec<(&'static str, String)>> {
    let target = ChoreTarget::resolve(chores, id)?;
    let chore = find_chore(chores, target.chore_id())
        .ok_or_else(|| ChoreError::ChoreNotFound(target.to_string()))?;

    let iid = match (&target, &chore.kind) {
        (ChoreTarget::Occurrence(iid), _) => iid.clone(),
        (ChoreTarget::Chore(_), ChoreKind::OneTime { .. }) => {
            return Ok(entry_details(&CalendarEntry::OneTime(chore.clone())));
        }
        (ChoreTarget::Chore(_), ChoreKind::Instance { .. }) => {
            let parent = chore.parent_id().map(ChoreId::to_string).unwrap_or_default();
            return Ok(vec![
                ("Title", chore.title.clone()),
                ("ID", chore.id.to_string()),
                ("Schedule", schedule_text(chore)),
                ("Part of", format!("recurring chore {}", parent)),
            ]);
        }
        (ChoreTarget::Chore(_), ChoreKind::Recurring { .. }) => {
            let assigned = if chore.assigned_to.is_empty() {
                "-".to_string()
            } else {
                chore.assigned_to.join(", ")
            };
            let mut details = vec![
                ("Title", chore.title.clone()),
                ("ID", chore.id.to_string()),
                ("Description", chore.description.clone().unwrap_or_else(|| "-".to_string())),
                ("Assigned", assigned),
                ("Repeats", schedule_text(chore)),
                ("Completed", format!("{} occurrence(s)", chore.completions().len())),
            ];
            if let Some(last) = chore.completions().iter().max_by_key(|c| c.date) {
                let by = last.completed_by.as_deref().unwrap_or("-");
                details.push(("Last done", format!("{} by {}", last.date, by)));
            }
            return Ok(details);
        }
    };

    let occurrence = expand(chore, &DateWindow::single(iid.date))
        .into_iter()
        .next()
        .ok_or(ChoreError::NotAnOccurrence { template_id: iid.template_id, date: iid.date })?;
    Ok(entry_details(&CalendarEntry::Occurrence(occurrence)))
}

/// Prints the details of one chore or occurrence.
pub fn cmd_show<S: Store>(store: &S, id: &str) -> Result<()> {
    let chores = store.load_chores();
    let details = chore_details(&chores, id)?;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for (label, value) in details {
        table.add_row(vec![bold(label), Cell::new(value)]);
    }
    println!("{table}");
    Ok(())
}

/// Toggles completion of a chore or of one occurrence of a recurring chore.
pub fn cmd_complete<S: Store>(store: &S, id: &str, by: Option<String>, silent: bool) -> Result<bool> {
    let mut chores = store.load_chores();
    let target = ChoreTarget::resolve(&chores, id)?;
    let done = toggle_completion(&mut chores, &target, by.as_deref(), Utc::now())?;
    store.save_chores(&chores)?;
    if !silent {
        let state = if done { "complete" } else { "pending" };
        println!("Chore {} marked as {}.", target, state);
    }
    Ok(done)
}

/// Removes a chore. An occurrence id removes its recurring chore.
pub fn cmd_remove<S: Store>(store: &S, id: &str, silent: bool) -> Result<()> {
    let mut chores = store.load_chores();
    let target = ChoreTarget::resolve(&chores, id)?;
    let removed = delete_chore(&mut chores, &target)?;
    store.save_chores(&chores)?;
    if !silent {
        println!("Chore '{}' removed.", removed.title);
    }
    Ok(())
}

/// Edits a chore. An occurrence id edits its recurring chore.
pub fn cmd_edit<S: Store>(store: &S, id: &str, update: ChoreUpdate, silent: bool) -> Result<()> {
    let mut chores = store.load_chores();
    let target = ChoreTarget::resolve(&chores, id)?;
    if let Some(names) = &update.assigned_to {
        warn_unknown_assignees(store, names, silent);
    }
    let chore_id = update_chore(&mut chores, &target, update, Utc::now())?.id.clone();
    store.save_chores(&chores)?;
    if !silent {
        println!("Chore {} updated.", chore_id);
    }
    Ok(())
}

/// Adds a team member.
pub fn cmd_team_add<S: Store>(store: &S, name: &str, silent: bool) -> Result<MemberId> {
    let mut members = store.load_team();
    let member = add_member(&mut members, name, Utc::now())?;
    let (id, name) = (member.id.clone(), member.name.clone());
    store.save_team(&members)?;
    if !silent {
        println!("Team member '{}' added (id = {}).", name, id);
    }
    Ok(id)
}

/// Lists team members.
pub fn cmd_team_list<S: Store>(store: &S) -> Result<()> {
    let members = store.load_team();
    if members.is_empty() {
        println!("No team members found.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["ID", "Name", "Added"]);
    for m in members {
        table.add_row(vec![
            m.id.to_string(),
            m.name,
            m.created_at.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Removes a team member by id or by name. Chores assigned to them are left alone.
pub fn cmd_team_remove<S: Store>(store: &S, member: &str, silent: bool) -> Result<()> {
    let mut members = store.load_team();
    let wanted = MemberId::from(member.trim());
    let id = match members.iter().find(|m| m.id == wanted) {
        Some(m) => m.id.clone(),
        None => find_member(&members, member)
            .map(|m| m.id.clone())
            .ok_or_else(|| ChoreError::Invalid(format!("no team member named '{}'", member.trim())))?,
    };
    let removed = remove_member(&mut members, &id)?;
    store.save_team(&members)?;
    if !silent {
        println!("Team member '{}' removed.", removed.name);
    }
    Ok(())
}

/// Deletes all chores and team members.
pub fn cmd_reset(store: &JsonStore, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all chores and team members? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    store.delete_all()?;
    println!("Database reset successfully.");
    Ok(())
}
