//! CSV rendering of a customer's time log.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::format::format_duration;
use crate::time_log::CustomerTimeLog;

const CSV_HEADER: &str = "Date,Duration,Start Time,End Time";

/// Renders the log as CSV, most recent sessions first.
///
/// Data fields are always double-quoted; rows are joined with `\n` and there
/// is no trailing newline.
pub fn time_log_csv(log: &CustomerTimeLog) -> String {
    let mut lines = Vec::with_capacity(log.sessions.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for session in log.sessions_most_recent_first() {
        let row = [
            session.date.to_string(),
            format_duration(session.duration_seconds),
            format_time(session.start_time),
            session.end_time.map(format_time).unwrap_or_default(),
        ];
        let quoted: Vec<_> = row.iter().map(|cell| quote(cell)).collect();
        lines.push(quoted.join(","));
    }

    lines.join("\n")
}

/// Default export file name, e.g. `time-log-acme-corp.csv`.
pub fn export_file_name(customer_name: &str) -> String {
    let slug = customer_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("time-log-{slug}.csv")
}

fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use insta::assert_snapshot;

    use super::*;
    use crate::customer::Customer;
    use crate::session::TimeSession;
    use crate::types::{CustomerId, SessionId};

    fn log_with(sessions: Vec<TimeSession>) -> CustomerTimeLog {
        let customer = Customer {
            id: CustomerId::new("acme").unwrap(),
            name: "Acme Corp".to_string(),
            engagement_type: "Retainer".to_string(),
            initial_hours: 10.0,
            created_at: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            archived: false,
        };
        CustomerTimeLog::from_sessions(&customer, sessions)
    }

    fn session(id: &str, day: u32, seconds: u64, ended: bool) -> TimeSession {
        let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
        let start = date.and_hms_opt(9, 0, 0).unwrap().and_utc();
        TimeSession {
            id: SessionId::new(id).unwrap(),
            date,
            start_time: start,
            end_time: ended
                .then(|| start + chrono::Duration::seconds(i64::try_from(seconds).unwrap())),
            duration_seconds: seconds,
            duration_formatted: format_duration(seconds),
            notes: None,
        }
    }

    #[test]
    fn csv_lists_sessions_most_recent_first() {
        let log = log_with(vec![
            session("a", 1, 65, true),
            session("b", 4, 5400, true),
            session("c", 2, 3600, false),
        ]);

        assert_snapshot!(time_log_csv(&log), @r#"
        Date,Duration,Start Time,End Time
        "2025-03-04","1h 30m","2025-03-04T09:00:00Z","2025-03-04T10:30:00Z"
        "2025-03-02","1h","2025-03-02T09:00:00Z",""
        "2025-03-01","1m 5s","2025-03-01T09:00:00Z","2025-03-01T09:01:05Z"
        "#);
    }

    #[test]
    fn csv_without_sessions_is_header_only() {
        assert_eq!(time_log_csv(&log_with(Vec::new())), CSV_HEADER);
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn export_file_name_slugifies_whitespace() {
        assert_eq!(export_file_name("Acme Corp"), "time-log-acme-corp.csv");
        assert_eq!(export_file_name("  Big   Co "), "time-log-big-co.csv");
    }
}
