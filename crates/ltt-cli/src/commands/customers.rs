//! `ltt customers` subcommands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use ltt_core::customer::{active_customers, sort_by_name};
use ltt_core::{Clock, NewCustomer, TimeStore, Tracker, format_hours};
use serde::Serialize;

use super::util::resolve_stored_customer;

// ========== Listing ==========

/// A customer row with its current totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerEntry {
    pub id: String,
    pub name: String,
    pub engagement_type: String,
    pub initial_hours: f64,
    pub hours_logged: f64,
    pub hours_remaining: f64,
    /// `hours_remaining` as a duration, with an `over` suffix past the budget.
    pub remaining: String,
    pub archived: bool,
}

/// Active customers (or all with `include_archived`), sorted by name.
pub fn customer_entries<S: TimeStore>(store: &S, include_archived: bool) -> Result<Vec<CustomerEntry>> {
    let mut customers = store.list_customers().context("failed to list customers")?;
    if include_archived {
        sort_by_name(&mut customers);
    } else {
        customers = active_customers(customers);
    }

    customers
        .into_iter()
        .map(|customer| {
            let log = store
                .get_customer_time_log(&customer.id)
                .with_context(|| format!("failed to load time log for {}", customer.name))?;
            Ok(CustomerEntry {
                id: customer.id.to_string(),
                name: customer.name,
                engagement_type: customer.engagement_type,
                initial_hours: customer.initial_hours,
                hours_logged: log.total_hours_logged,
                hours_remaining: log.hours_remaining,
                remaining: log.summary().remaining_display(),
                archived: customer.archived,
            })
        })
        .collect()
}

fn write_customers<W: Write>(writer: &mut W, entries: &[CustomerEntry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No customers.")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Hint: Run 'ltt customers add --name <NAME> --hours <HOURS>' to add one."
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<24}  {:<14}  {:>8}  Remaining",
        "Name", "Engagement", "Budget"
    )?;
    for entry in entries {
        // Truncate by characters, not bytes
        let name = if entry.name.chars().count() > 24 {
            format!("{}...", entry.name.chars().take(21).collect::<String>())
        } else {
            entry.name.clone()
        };
        let archived = if entry.archived { "  (archived)" } else { "" };
        writeln!(
            writer,
            "{:<24}  {:<14}  {:>8}  {}{}",
            name,
            entry.engagement_type,
            format!("{}h", format_hours(entry.initial_hours)),
            entry.remaining,
            archived
        )?;
    }
    Ok(())
}

/// Runs `ltt customers list`.
pub fn list<S: TimeStore, W: Write>(
    writer: &mut W,
    store: &S,
    include_archived: bool,
    json: bool,
) -> Result<()> {
    let entries = customer_entries(store, include_archived)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write_customers(writer, &entries)?;
    }
    Ok(())
}

// ========== Changes ==========

/// Runs `ltt customers add`.
pub fn add<S: TimeStore, C: Clock, W: Write>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    form: NewCustomer,
) -> Result<()> {
    let customer = tracker
        .add_customer(form)
        .context("failed to add customer")?;
    writeln!(
        writer,
        "Added {} ({}) with a budget of {}h",
        customer.name,
        customer.id,
        format_hours(customer.initial_hours)
    )?;
    Ok(())
}

/// Fields to change on an existing customer.
#[derive(Debug, Default)]
pub struct CustomerEdit {
    pub name: Option<String>,
    pub engagement_type: Option<String>,
    pub initial_hours: Option<f64>,
}

/// Runs `ltt customers edit`.
pub fn edit<S: TimeStore, C: Clock, W: Write>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    reference: &str,
    changes: CustomerEdit,
) -> Result<()> {
    if changes.name.is_none() && changes.engagement_type.is_none() && changes.initial_hours.is_none()
    {
        bail!("nothing to change; pass --name, --engagement-type or --hours");
    }

    let mut customer = resolve_stored_customer(tracker.store(), reference)?;
    if let Some(name) = changes.name {
        customer.name = name.trim().to_string();
    }
    if let Some(engagement_type) = changes.engagement_type {
        customer.engagement_type = engagement_type.trim().to_string();
    }
    if let Some(hours) = changes.initial_hours {
        customer.initial_hours = hours;
    }

    let name = customer.name.clone();
    tracker
        .update_customer(customer)
        .context("failed to update customer")?;
    writeln!(writer, "Updated {name}")?;
    Ok(())
}

/// Runs `ltt customers archive` and `ltt customers unarchive`.
pub fn set_archived<S: TimeStore, C: Clock, W: Write>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    reference: &str,
    archived: bool,
) -> Result<()> {
    let mut customer = resolve_stored_customer(tracker.store(), reference)?;
    let state = if archived { "archived" } else { "active" };
    if customer.archived == archived {
        writeln!(writer, "{} is already {state}", customer.name)?;
        return Ok(());
    }

    customer.archived = archived;
    let name = customer.name.clone();
    tracker
        .update_customer(customer)
        .with_context(|| format!("failed to mark {name} {state}"))?;
    let verb = if archived { "Archived" } else { "Unarchived" };
    writeln!(writer, "{verb} {name}")?;
    Ok(())
}

/// Runs `ltt customers delete`.
pub fn delete<S: TimeStore, C: Clock, W: Write>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    reference: &str,
) -> Result<()> {
    let customer = resolve_stored_customer(tracker.store(), reference)?;
    tracker
        .delete_customer(&customer.id)
        .context("failed to delete customer")?;
    writeln!(writer, "Deleted {}", customer.name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use insta::assert_snapshot;
    use ltt_core::ManualClock;
    use ltt_db::Database;

    use super::*;
    use crate::commands::util::open_tracker;

    fn clock() -> ManualClock {
        ManualClock::new(
            DateTime::parse_from_rfc3339("2025-03-10T09:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn form(name: &str, engagement_type: &str, initial_hours: f64) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            engagement_type: engagement_type.to_string(),
            initial_hours,
        }
    }

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn empty_list_shows_hint() {
        let db = Database::open_in_memory().unwrap();
        let mut buffer = Vec::new();
        list(&mut buffer, &db, false, false).unwrap();
        assert_snapshot!(output(buffer), @r"
        No customers.

        Hint: Run 'ltt customers add --name <NAME> --hours <HOURS>' to add one.
        ");
    }

    #[test]
    fn list_sorts_by_name_and_hides_archived() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        let mut sink = Vec::new();
        add(&mut sink, &mut tracker, form("globex", "Project", 20.0)).unwrap();
        add(&mut sink, &mut tracker, form("Acme Corp", "Retainer", 10.5)).unwrap();
        add(&mut sink, &mut tracker, form("Initech", "", 5.0)).unwrap();
        set_archived(&mut sink, &mut tracker, "initech", true).unwrap();

        let mut buffer = Vec::new();
        list(&mut buffer, tracker.store(), false, false).unwrap();
        assert_snapshot!(output(buffer), @r"
        Name                      Engagement        Budget  Remaining
        Acme Corp                 Retainer          10.50h  10h 30m
        globex                    Project           20.00h  20h
        ");

        let mut buffer = Vec::new();
        list(&mut buffer, tracker.store(), true, false).unwrap();
        assert_snapshot!(output(buffer), @r"
        Name                      Engagement        Budget  Remaining
        Acme Corp                 Retainer          10.50h  10h 30m
        globex                    Project           20.00h  20h
        Initech                                      5.00h  5h  (archived)
        ");
    }

    #[test]
    fn list_json_uses_camel_case() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        add(&mut Vec::new(), &mut tracker, form("Acme", "Retainer", 2.0)).unwrap();

        let mut buffer = Vec::new();
        list(&mut buffer, tracker.store(), false, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value[0]["name"], "Acme");
        assert_eq!(value[0]["engagementType"], "Retainer");
        assert_eq!(value[0]["hoursRemaining"], 2.0);
        assert_eq!(value[0]["archived"], false);
    }

    #[test]
    fn add_rejects_negative_hours() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        let result = add(&mut Vec::new(), &mut tracker, form("Acme", "", -1.0));
        assert!(result.is_err());
        assert!(tracker.store().list_customers().unwrap().is_empty());
    }

    #[test]
    fn edit_changes_only_given_fields() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        add(&mut Vec::new(), &mut tracker, form("Acme", "Retainer", 10.0)).unwrap();

        let mut buffer = Vec::new();
        edit(
            &mut buffer,
            &mut tracker,
            "acme",
            CustomerEdit {
                initial_hours: Some(12.0),
                ..CustomerEdit::default()
            },
        )
        .unwrap();
        assert_eq!(output(buffer), "Updated Acme\n");

        let stored = &tracker.store().list_customers().unwrap()[0];
        assert_eq!(stored.engagement_type, "Retainer");
        assert!((stored.initial_hours - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn edit_without_changes_fails() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        add(&mut Vec::new(), &mut tracker, form("Acme", "", 1.0)).unwrap();
        let err = edit(&mut Vec::new(), &mut tracker, "Acme", CustomerEdit::default()).unwrap_err();
        assert!(err.to_string().contains("nothing to change"));
    }

    #[test]
    fn archive_twice_reports_state() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        add(&mut Vec::new(), &mut tracker, form("Acme", "", 1.0)).unwrap();

        let mut buffer = Vec::new();
        set_archived(&mut buffer, &mut tracker, "Acme", true).unwrap();
        set_archived(&mut buffer, &mut tracker, "Acme", true).unwrap();
        set_archived(&mut buffer, &mut tracker, "Acme", false).unwrap();
        assert_snapshot!(output(buffer), @r"
        Archived Acme
        Acme is already archived
        Unarchived Acme
        ");
        assert_eq!(tracker.customers().len(), 1);
    }

    #[test]
    fn delete_unknown_customer_fails() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        let err = delete(&mut Vec::new(), &mut tracker, "ghost").unwrap_err();
        assert_eq!(err.to_string(), "no customer matching 'ghost'");
    }

    #[test]
    fn delete_removes_customer() {
        let clock = clock();
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), &clock).unwrap();
        add(&mut Vec::new(), &mut tracker, form("Acme", "", 1.0)).unwrap();

        let mut buffer = Vec::new();
        delete(&mut buffer, &mut tracker, "ACME").unwrap();
        assert_eq!(output(buffer), "Deleted Acme\n");
        assert!(tracker.store().list_customers().unwrap().is_empty());
    }
}
