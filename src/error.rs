use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{ChoreId, MemberId};

#[derive(Error, Debug)]
pub enum ChoreError {
    #[error("Chore not found: {0}")]
    ChoreNotFound(String),

    #[error("Team member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Team member with this name already exists: {0}")]
    DuplicateMember(String),

    #[error("Invalid chore: {0}")]
    Invalid(String),

    #[error("Chore {template_id} has no occurrence on {date}")]
    NotAnOccurrence { template_id: ChoreId, date: NaiveDate },

    #[error("Invalid id '{0}'. Expected a chore id or <chore id>:<YYYY-MM-DD>.")]
    InvalidId(String),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChoreError>;

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ChoreError::InvalidDate(s.to_string()))
}
