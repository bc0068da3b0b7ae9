//! Core domain logic for the local time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer: the idle/running/paused state machine and its elapsed counter
//! - Idle detection: stopping a timer left running past a configured cutoff
//! - Hours accounting: per-customer totals, remaining budget, live progress
//! - The storage contract ([`TimeStore`]) and the [`Tracker`] that drives it

pub mod clock;
pub mod customer;
pub mod export;
pub mod format;
pub mod idle;
#[cfg(test)]
mod memory;
pub mod session;
pub mod settings;
pub mod store;
pub mod time_log;
pub mod timer;
pub mod tracker;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use customer::{Customer, NewCustomer};
pub use export::{export_file_name, time_log_csv};
pub use format::{format_duration, format_hours, format_time};
pub use idle::IdleMonitor;
pub use session::TimeSession;
pub use settings::{AppSettings, SettingsPatch};
pub use store::{StoreError, TimeStore};
pub use time_log::{CustomerTimeLog, HoursSummary};
pub use timer::{ActiveRun, FinishedRun, TimerState, TimerStatus};
pub use tracker::{TickOutcome, Tracker, TrackerError};
pub use types::{CustomerId, SessionId, Theme, ValidationError};
