//! Per-customer hours aggregation.
//!
//! A [`CustomerTimeLog`] is always derived from the full session history; it
//! is recomputed on every save and every load rather than updated in place.
//! [`HoursSummary`] layers the not-yet-persisted running session on top for
//! live display.

use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::format::{format_duration, hours_to_abs_seconds};
use crate::session::TimeSession;
use crate::types::CustomerId;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// A customer's session history with derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTimeLog {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub engagement_type: String,
    pub initial_hours: f64,
    /// Sessions in the order they were saved.
    pub sessions: Vec<TimeSession>,
    pub total_seconds_logged: u64,
    /// Rounded to two decimals.
    pub total_hours_logged: f64,
    /// `initial_hours - total_hours_logged`, rounded to two decimals. Negative
    /// when over budget.
    pub hours_remaining: f64,
}

impl CustomerTimeLog {
    /// Log for a customer with no sessions yet.
    pub fn empty(customer: &Customer) -> Self {
        Self::from_sessions(customer, Vec::new())
    }

    /// Builds the log and recomputes every total from `sessions`.
    pub fn from_sessions(customer: &Customer, sessions: Vec<TimeSession>) -> Self {
        let total_seconds_logged: u64 = sessions.iter().map(|s| s.duration_seconds).sum();
        let total_hours_logged = round_hundredths(seconds_to_hours(total_seconds_logged));
        let hours_remaining = round_hundredths(customer.initial_hours - total_hours_logged);

        Self {
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            engagement_type: customer.engagement_type.clone(),
            initial_hours: customer.initial_hours,
            sessions,
            total_seconds_logged,
            total_hours_logged,
            hours_remaining,
        }
    }

    /// Sessions ordered by date, most recent first. Same-day sessions keep
    /// their saved order.
    pub fn sessions_most_recent_first(&self) -> Vec<&TimeSession> {
        let mut sorted: Vec<_> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    /// Totals with nothing in progress.
    pub fn summary(&self) -> HoursSummary {
        HoursSummary::compute(self, 0)
    }
}

/// Spent/remaining figures for display, including an in-progress session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursSummary {
    pub initial_hours: f64,
    pub spent_hours: f64,
    /// Not clamped; negative when over budget.
    pub remaining_hours: f64,
    /// Share of the budget used, capped at 100.
    pub progress_percent: f64,
    pub over_budget: bool,
}

impl HoursSummary {
    /// Persisted totals plus `in_progress_seconds` of unsaved running time.
    pub fn compute(log: &CustomerTimeLog, in_progress_seconds: u64) -> Self {
        let spent_hours = log.total_hours_logged + seconds_to_hours(in_progress_seconds);
        let remaining_hours = log.initial_hours - spent_hours;
        let progress_percent = if log.initial_hours > 0.0 {
            (spent_hours / log.initial_hours * 100.0).min(100.0)
        } else if spent_hours > 0.0 {
            100.0
        } else {
            0.0
        };

        Self {
            initial_hours: log.initial_hours,
            spent_hours,
            remaining_hours,
            progress_percent,
            over_budget: remaining_hours < 0.0,
        }
    }

    pub fn spent_display(&self) -> String {
        format_duration(hours_to_abs_seconds(self.spent_hours))
    }

    /// Remaining time as a duration, suffixed with `over` past the budget.
    pub fn remaining_display(&self) -> String {
        let magnitude = format_duration(hours_to_abs_seconds(self.remaining_hours));
        if self.over_budget {
            format!("{magnitude} over")
        } else {
            magnitude
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn seconds_to_hours(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
