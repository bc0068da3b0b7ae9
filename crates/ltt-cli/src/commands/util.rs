//! Shared utilities for CLI commands.

use anyhow::{Context, Result, anyhow};
use ltt_core::customer::find_customer;
use ltt_core::{Clock, Customer, TimeStore, Tracker};

/// Builds a tracker with settings and the active customer list loaded.
pub fn open_tracker<S: TimeStore, C: Clock>(store: S, clock: C) -> Result<Tracker<S, C>> {
    let mut tracker = Tracker::new(store, clock);
    tracker.load_settings().context("failed to load settings")?;
    tracker
        .load_customers()
        .context("failed to load customers")?;
    Ok(tracker)
}

/// Resolves a customer ID or name among `customers`.
pub fn resolve_customer(customers: &[Customer], reference: &str) -> Result<Customer> {
    find_customer(customers, reference)
        .cloned()
        .ok_or_else(|| anyhow!("no customer matching '{reference}'"))
}

/// Resolves a customer ID or name among all stored customers, archived included.
pub fn resolve_stored_customer<S: TimeStore>(store: &S, reference: &str) -> Result<Customer> {
    let customers = store
        .list_customers()
        .context("failed to list customers")?;
    resolve_customer(&customers, reference)
}
