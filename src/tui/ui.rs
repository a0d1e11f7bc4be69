use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use chrono::{Datelike, Local};
use crate::storage::Store;
use super::app::{App, InputMode, ViewMode};

pub fn ui<S: Store>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Selected chore details
            Constraint::Length(3)  // Help / status
        ].as_ref())
        .split(f.area());

    let header_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let highlight = Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray);

    match app.view_mode {
        ViewMode::Calendar => {
            let today = Local::now().date_naive();

            let rows: Vec<Row> = app
                .entries
                .iter()
                .map(|e| {
                    let style = if e.is_completed() {
                        Style::default().fg(Color::Green)
                    } else if e.date() < today {
                        Style::default().fg(Color::Red)
                    } else if e.date() == today {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default()
                    };

                    Row::new(vec![
                        Cell::from(e.date().to_string()),
                        Cell::from(e.date().weekday().to_string()),
                        Cell::from(e.title().to_string()),
                        Cell::from(e.assigned_to().join(", ")),
                        Cell::from(if e.is_recurring() { "weekly" } else { "" }),
                        Cell::from(if e.is_completed() { "Done" } else { "Pending" }),
                    ]).style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(12),
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(20),
                Constraint::Length(8),
                Constraint::Length(8),
            ];

            let title = format!(
                "Chores - {} ({} done, {} pending{})",
                app.window.start.format("%B %Y"),
                app.summary.completed,
                app.summary.pending(),
                if app.show_completed { "" } else { ", done hidden" },
            );

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Date", "Day", "Title", "Assigned", "Repeats", "Status"])
                    .style(header_style)
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title(title))
                .row_highlight_style(highlight)
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.state);

            let details = Paragraph::new(app.selected_details().unwrap_or_default())
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Details"));
            f.render_widget(details, chunks[1]);
        }
        ViewMode::Team => {
            let rows: Vec<Row> = app
                .team
                .iter()
                .map(|m| {
                    Row::new(vec![
                        Cell::from(m.name.clone()),
                        Cell::from(m.created_at.with_timezone(&Local).format("%Y-%m-%d").to_string()),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Min(20),
                Constraint::Length(12),
            ];

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Name", "Added"])
                    .style(header_style)
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title("Chores - Team"))
                .row_highlight_style(highlight)
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.team_state);
            f.render_widget(Block::default().borders(Borders::ALL), chunks[1]);
        }
    }

    let help_text = match (&app.message, &app.input_mode) {
        (Some(msg), InputMode::Normal) => msg.as_str(),
        (None, InputMode::Normal) => match app.view_mode {
            ViewMode::Calendar => "q: Quit | a: Add | Space: Toggle Done | d: Del | h/l: Prev/Next Month | t: Today | c: Show/Hide Done | v: Team",
            ViewMode::Team => "q: Quit | a: Add Member | d: Del | v: Calendar",
        },
        (_, _) => "Enter: Next Step | Esc: Cancel",
    };
    let help_style = if app.message.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = match &app.message {
            Some(msg) => format!("{} ({})", app.prompt(), msg),
            None => app.prompt().to_string(),
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
