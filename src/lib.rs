//! Chore tracking with weekly recurrence.
//!
//! Chores are either one-time (due on a single date) or recurring on a set of
//! weekdays between a start date and an optional end date. Recurring chores
//! are stored once; their dated occurrences are generated for whatever date
//! window is being viewed, and completion of each occurrence is recorded on
//! the recurring chore itself.

pub mod calendar;
pub mod chores;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod storage;
pub mod team;
pub mod tui;

pub use calendar::project_for_display;
pub use error::{ChoreError, Result};
pub use recurrence::expand;
pub use storage::{JsonStore, MemoryStore, Store};
