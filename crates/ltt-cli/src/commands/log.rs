//! `ltt log`: a customer's sessions and hour totals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ltt_core::{CustomerTimeLog, HoursSummary, TimeStore, format_hours};
use serde::Serialize;

use super::util::resolve_stored_customer;

#[derive(Debug, Serialize)]
struct JsonTimeLog<'a> {
    #[serde(flatten)]
    log: &'a CustomerTimeLog,
    summary: HoursSummary,
}

fn clock_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

/// Writes the log as a human-readable table, most recent sessions first.
pub fn write_time_log<W: Write>(writer: &mut W, log: &CustomerTimeLog) -> Result<()> {
    let summary = log.summary();

    if log.engagement_type.is_empty() {
        writeln!(writer, "{}", log.customer_name)?;
    } else {
        writeln!(writer, "{} ({})", log.customer_name, log.engagement_type)?;
    }
    writeln!(
        writer,
        "Budget: {}h  Spent: {}  Remaining: {}  Progress: {:.0}%",
        format_hours(summary.initial_hours),
        summary.spent_display(),
        summary.remaining_display(),
        summary.progress_percent
    )?;
    writeln!(writer)?;

    if log.sessions.is_empty() {
        writeln!(writer, "No sessions recorded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<10}  {:>9}  {:<11}  End (UTC)",
        "Date", "Duration", "Start (UTC)"
    )?;
    for session in log.sessions_most_recent_first() {
        let end = session
            .end_time
            .map_or_else(|| "-".to_string(), clock_time);
        writeln!(
            writer,
            "{:<10}  {:>9}  {:<11}  {}",
            session.date,
            session.duration_formatted,
            clock_time(session.start_time),
            end
        )?;
    }
    Ok(())
}

/// Runs `ltt log`.
pub fn run<S: TimeStore, W: Write>(
    writer: &mut W,
    store: &S,
    reference: &str,
    json: bool,
) -> Result<()> {
    let customer = resolve_stored_customer(store, reference)?;
    let log = store
        .get_customer_time_log(&customer.id)
        .with_context(|| format!("failed to load time log for {}", customer.name))?;

    if json {
        let output = JsonTimeLog {
            log: &log,
            summary: log.summary(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        write_time_log(writer, &log)?;
    }
    Ok(())
}
