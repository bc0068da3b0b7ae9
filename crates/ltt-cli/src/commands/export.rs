//! `ltt export`: write a customer's time log to a CSV file.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ltt_core::{TimeStore, export_file_name, time_log_csv};
use tracing::debug;

use super::util::resolve_stored_customer;

/// Runs `ltt export`, returning the path written.
///
/// Without `output` the file lands in the current directory under the
/// default `time-log-<name>.csv` name.
pub fn run<S: TimeStore, W: Write>(
    writer: &mut W,
    store: &S,
    reference: &str,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let customer = resolve_stored_customer(store, reference)?;
    let log = store
        .get_customer_time_log(&customer.id)
        .with_context(|| format!("failed to load time log for {}", customer.name))?;

    let path = output.map_or_else(|| PathBuf::from(export_file_name(&customer.name)), Path::to_path_buf);
    let csv = time_log_csv(&log);
    std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), sessions = log.sessions.len(), "time log exported");

    let noun = if log.sessions.len() == 1 { "session" } else { "sessions" };
    writeln!(
        writer,
        "Exported {} {noun} for {} to {}",
        log.sessions.len(),
        customer.name,
        path.display()
    )?;
    Ok(path)
}
