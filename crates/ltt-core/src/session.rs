//! Persisted work sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::format::format_duration;
use crate::timer::FinishedRun;
use crate::types::SessionId;

/// One contiguous timed work interval for a customer.
///
/// Sessions are append-only: once handed to the store they are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSession {
    pub id: SessionId,
    /// Local calendar day the session was stopped on.
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    /// Always present once persisted.
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds the timer was running; paused time is excluded.
    pub duration_seconds: u64,
    pub duration_formatted: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeSession {
    /// Builds the durable record for a stopped timer run.
    pub fn from_run(run: &FinishedRun, date: NaiveDate, end_time: DateTime<Utc>) -> Self {
        Self {
            id: run.session_id.clone(),
            date,
            start_time: run.start_time,
            end_time: Some(end_time),
            duration_seconds: run.elapsed_seconds,
            duration_formatted: format_duration(run.elapsed_seconds),
            notes: None,
        }
    }
}
