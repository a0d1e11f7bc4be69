//! # Choreust
//!
//! A terminal chore tracker for small teams. Chores are one-time or repeat
//! weekly on chosen days; each occurrence of a weekly chore is completed on
//! its own.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! choreust
//! # or explicitly
//! choreust ui
//! ```
//!
//! **Calendar View**
//! *   `h`/`l`: Previous/next month, `t`: back to this month
//! *   `a`: Add chore (title, date, optional weekdays)
//! *   `Space`: Toggle completion of the selected chore
//! *   The bottom panel shows the selected chore's description, schedule and completer
//! *   `d`: Delete selected chore (deleting an occurrence deletes the weekly chore)
//! *   `c`: Show/hide completed chores
//! *   `v`: Switch to Team view
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # One-time chore
//! choreust add "Clean fridge" --due 2025-12-01 --assign Ana
//!
//! # Every Monday and Wednesday from a start date
//! choreust add "Take out trash" --days mon,wed --start 2025-12-01
//!
//! # This month's calendar, or another month
//! choreust list
//! choreust list --month 2025-12
//!
//! # Complete one occurrence of a weekly chore
//! choreust complete <ID>:2025-12-03 --by Ana
//!
//! # Description, schedule and who completed it
//! choreust show <ID>:2025-12-03
//!
//! # Team
//! choreust team add Ana
//! choreust team list
//! ```
//!
//! ## Data Storage
//!
//! Chores and team members are saved as JSON in your local data directory
//! (`~/.local/share/choreust/` on Linux). Set `CHOREUST_DATA_DIR` to use
//! another directory and `CHOREUST_LOG` (e.g. `choreust=debug`) for logging.

use chrono::Local;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use tracing_subscriber::EnvFilter;

use choreust::chores::{ChoreUpdate, NewChore, NewSchedule};
use choreust::commands::*;
use choreust::config::Config;
use choreust::error::{parse_date, ChoreError, Result};
use choreust::models::{DateWindow, WeekdaySet};
use choreust::tui::run_tui;

#[derive(Parser)]
#[command(name = "choreust")]
#[command(about = "Track one-time and weekly chores for a team", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new chore
    Add {
        /// Chore title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Team member to assign (repeatable)
        #[arg(short, long = "assign")]
        assign: Vec<String>,
        /// Due date in YYYY-MM-DD for a one-time chore (default: today)
        #[arg(short, long, conflicts_with_all = ["days", "start", "end"])]
        due: Option<String>,
        #[command(flatten)]
        weekly: WeeklyArgs,
    },
    /// Show chores on the calendar for a month
    List {
        /// Month in YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,
        /// Include completed chores
        #[arg(short, long)]
        all: bool,
    },
    /// Show stored chores with their ids and schedules
    Chores,
    /// Show details of a chore or of one occurrence (<id>:<YYYY-MM-DD>)
    Show {
        id: String,
    },
    /// Toggle completion of a chore or of one occurrence (<id>:<YYYY-MM-DD>)
    Complete {
        id: String,
        /// Who completed it
        #[arg(short, long)]
        by: Option<String>,
    },
    /// Remove a chore (an occurrence id removes the whole weekly chore)
    Remove {
        id: String,
    },
    /// Edit a chore (an occurrence id edits the whole weekly chore)
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Replace assignees (repeatable)
        #[arg(short, long = "assign")]
        assign: Vec<String>,
        /// Remove all assignees
        #[arg(long, conflicts_with = "assign")]
        unassign: bool,
        /// Make it a one-time chore due on this date
        #[arg(short, long, conflicts_with_all = ["days", "start", "end", "no_end"])]
        due: Option<String>,
        #[command(flatten)]
        weekly: WeeklyArgs,
        /// Let the weekly chore repeat forever
        #[arg(long, conflicts_with = "end")]
        no_end: bool,
    },
    /// Manage team members
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },
    /// Reset the database (delete all chores and team members)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Args)]
struct WeeklyArgs {
    /// Weekdays the chore repeats on, e.g. mon,wed or 1,3
    #[arg(long)]
    days: Option<String>,
    /// First day of the weekly pattern in YYYY-MM-DD (default: today)
    #[arg(short, long)]
    start: Option<String>,
    /// Last day of the weekly pattern in YYYY-MM-DD
    #[arg(short, long)]
    end: Option<String>,
}

#[derive(Subcommand)]
enum TeamCommands {
    /// Add a team member
    Add {
        name: String,
    },
    /// List team members
    List,
    /// Remove a team member by id or name
    Remove {
        member: String,
    },
}

fn optional_date(s: Option<String>) -> Result<Option<chrono::NaiveDate>> {
    s.as_deref().map(parse_date).transpose()
}

fn new_chore(
    title: String,
    description: Option<String>,
    assign: Vec<String>,
    due: Option<String>,
    weekly: WeeklyArgs,
) -> Result<NewChore> {
    let today = Local::now().date_naive();
    let schedule = match weekly.days {
        Some(days) => NewSchedule::Weekly {
            days: days.parse::<WeekdaySet>()?,
            start: optional_date(weekly.start)?.unwrap_or(today),
            end: optional_date(weekly.end)?,
        },
        None if weekly.start.is_some() || weekly.end.is_some() => {
            return Err(ChoreError::Invalid("--start/--end need --days".into()))
        }
        None => NewSchedule::Once(optional_date(due)?.unwrap_or(today)),
    };
    Ok(NewChore { title, description, assigned_to: assign, schedule })
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let store = config.store();
    match cli.command {
        Some(Commands::Add { title, description, assign, due, weekly }) => {
            cmd_add(&store, new_chore(title, description, assign, due, weekly)?, false)?;
        }
        Some(Commands::List { month, all }) => {
            let window = match month {
                Some(m) => DateWindow::parse_month(&m)?,
                None => DateWindow::month_of(Local::now().date_naive()),
            };
            cmd_list(&store, window, all)?;
        }
        Some(Commands::Chores) => cmd_chores(&store)?,
        Some(Commands::Show { id }) => cmd_show(&store, &id)?,
        Some(Commands::Complete { id, by }) => {
            cmd_complete(&store, &id, by, false)?;
        }
        Some(Commands::Remove { id }) => cmd_remove(&store, &id, false)?,
        Some(Commands::Edit { id, title, description, assign, unassign, due, weekly, no_end }) => {
            let assigned_to = if unassign {
                Some(Vec::new())
            } else if assign.is_empty() {
                None
            } else {
                Some(assign)
            };
            let end_date = if no_end { Some(None) } else { optional_date(weekly.end)?.map(Some) };
            let update = ChoreUpdate {
                title,
                description,
                assigned_to,
                due_date: optional_date(due)?,
                days_of_week: weekly.days.as_deref().map(str::parse::<WeekdaySet>).transpose()?,
                start_date: optional_date(weekly.start)?,
                end_date,
            };
            cmd_edit(&store, &id, update, false)?;
        }
        Some(Commands::Team { command }) => match command {
            TeamCommands::Add { name } => {
                cmd_team_add(&store, &name, false)?;
            }
            TeamCommands::List => cmd_team_list(&store)?,
            TeamCommands::Remove { member } => cmd_team_remove(&store, &member, false)?,
        },
        Some(Commands::Reset { force }) => cmd_reset(&store, force)?,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "choreust", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(store) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
