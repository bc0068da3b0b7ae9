//! Application state: the timer, the selected customer and its hours.
//!
//! [`Tracker`] is the single owner of everything the shell displays. It is
//! driven synchronously: the shell calls [`Tracker::tick`] once per second
//! while the timer runs, and the transition methods in response to input.
//! Storage failures are returned to the caller and also kept as
//! [`Tracker::last_error`] until cleared, mirroring a transient error banner.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::customer::{Customer, NewCustomer, active_customers, sort_by_name, validate_hours};
use crate::idle::IdleMonitor;
use crate::session::TimeSession;
use crate::settings::{AppSettings, SettingsPatch};
use crate::store::{StoreError, TimeStore};
use crate::time_log::{CustomerTimeLog, HoursSummary};
use crate::timer::TimerState;
use crate::types::{CustomerId, ValidationError};

/// Errors from tracker operations that take user input.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result of one periodic tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed.
    Skipped,
    /// One second was added.
    Counted { elapsed_seconds: u64 },
    /// The idle cutoff was reached and the timer was stopped.
    IdleStopped {
        elapsed_seconds: u64,
        notice: String,
        /// Whether the session reached storage.
        persisted: bool,
    },
}

pub struct Tracker<S, C = SystemClock> {
    store: S,
    clock: C,
    settings: AppSettings,
    /// Active (non-archived) customers, sorted by name.
    customers: Vec<Customer>,
    selected: Option<CustomerId>,
    time_log: Option<CustomerTimeLog>,
    timer: TimerState,
    notice: Option<String>,
    last_error: Option<String>,
}

impl<S, C> fmt::Debug for Tracker<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("selected", &self.selected)
            .field("timer", &self.timer)
            .field("customers", &self.customers.len())
            .finish_non_exhaustive()
    }
}

impl<S: TimeStore, C: Clock> Tracker<S, C> {
    /// Creates a tracker with default settings and nothing loaded.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            settings: AppSettings::default(),
            customers: Vec::new(),
            selected: None,
            time_log: None,
            timer: TimerState::new(),
            notice: None,
            last_error: None,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub const fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub const fn selected_customer_id(&self) -> Option<&CustomerId> {
        self.selected.as_ref()
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        let id = self.selected.as_ref()?;
        self.customers.iter().find(|c| &c.id == id)
    }

    pub const fn time_log(&self) -> Option<&CustomerTimeLog> {
        self.time_log.as_ref()
    }

    pub const fn timer(&self) -> &TimerState {
        &self.timer
    }

    /// The pending advisory (e.g. an idle stop), until dismissed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Records a failure on the error surface and passes the result through.
    fn surface<T, E: fmt::Display>(&mut self, context: &str, result: Result<T, E>) -> Result<T, E> {
        if let Err(err) = &result {
            let message = format!("{context}: {err}");
            warn!(error = %message, "operation failed");
            self.last_error = Some(message);
        }
        result
    }

    // ========== Settings ==========

    pub fn load_settings(&mut self) -> Result<(), StoreError> {
        let loaded = self.store.get_settings();
        self.settings = self.surface("failed to load settings", loaded)?;
        debug!(settings = ?self.settings, "settings loaded");
        Ok(())
    }

    /// Applies a partial update, keeping the old settings if saving fails.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<AppSettings, StoreError> {
        let updated = self.settings.merged(patch);
        let saved = self.store.save_settings(&updated);
        self.surface("failed to save settings", saved)?;
        self.settings = updated;
        Ok(self.settings.clone())
    }

    // ========== Customers ==========

    /// Reloads the active customer list and repairs the selection.
    ///
    /// If the selected customer is gone or archived the first active customer
    /// is selected instead; with nothing selected the first one is picked.
    pub fn load_customers(&mut self) -> Result<(), StoreError> {
        let listed = self.store.list_customers();
        let all = self.surface("failed to load customers", listed)?;
        self.customers = active_customers(all);

        let still_active = self
            .selected
            .as_ref()
            .is_some_and(|id| self.customers.iter().any(|c| &c.id == id));
        if !still_active {
            let first = self.customers.first().map(|c| c.id.clone());
            self.select_customer(first)?;
        }
        Ok(())
    }

    /// Customer selection is locked while a timer is active.
    pub const fn can_select_customer(&self) -> bool {
        self.timer.is_idle()
    }

    /// Selects a customer (or none) and loads its time log.
    pub fn select_customer(&mut self, id: Option<CustomerId>) -> Result<(), StoreError> {
        self.selected.clone_from(&id);
        let Some(id) = id else {
            self.time_log = None;
            return Ok(());
        };

        let loaded = self.store.get_customer_time_log(&id);
        match self.surface("failed to load time log", loaded) {
            Ok(log) => {
                debug!(customer_id = %id, total_seconds = log.total_seconds_logged, "time log loaded");
                self.time_log = Some(log);
                Ok(())
            }
            Err(err) => {
                self.time_log = None;
                Err(err)
            }
        }
    }

    /// Reloads the selected customer's log. A failure keeps the previous one.
    pub fn refresh_time_log(&mut self) -> Result<(), StoreError> {
        let Some(id) = self.selected.clone() else {
            return Ok(());
        };
        let loaded = self.store.get_customer_time_log(&id);
        self.time_log = Some(self.surface("failed to refresh time log", loaded)?);
        Ok(())
    }

    pub fn add_customer(&mut self, form: NewCustomer) -> Result<Customer, TrackerError> {
        let customer = form.into_customer(self.clock.now())?;
        let saved = self.store.save_customer(customer);
        let saved = self.surface("failed to save customer", saved)?;
        info!(customer_id = %saved.id, name = %saved.name, "customer added");

        self.customers.push(saved.clone());
        sort_by_name(&mut self.customers);
        Ok(saved)
    }

    /// Saves an edited customer (including archive/unarchive).
    pub fn update_customer(&mut self, customer: Customer) -> Result<(), TrackerError> {
        if customer.name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "customer name",
            }
            .into());
        }
        validate_hours(customer.initial_hours)?;

        let id = customer.id.clone();
        let archived = customer.archived;
        let saved = self.store.save_customer(customer);
        let saved = self.surface("failed to save customer", saved)?;
        info!(customer_id = %id, archived, "customer updated");

        match self.customers.iter().position(|c| c.id == id) {
            Some(index) if !archived => {
                self.customers[index] = saved;
                sort_by_name(&mut self.customers);
            }
            // Archived, or unarchived and not yet listed
            _ => self.load_customers()?,
        }

        if self.selected.as_ref() == Some(&id) {
            self.refresh_time_log()?;
        }
        Ok(())
    }

    /// Permanently deletes a customer and clears it from the selection.
    pub fn delete_customer(&mut self, id: &CustomerId) -> Result<(), StoreError> {
        let deleted = self.store.delete_customer(id);
        self.surface("failed to delete customer", deleted)?;
        info!(customer_id = %id, "customer deleted");

        self.customers.retain(|c| &c.id != id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.time_log = None;
        }
        Ok(())
    }

    // ========== Timer ==========

    /// Whether the start control should be offered.
    pub const fn can_start(&self) -> bool {
        self.selected.is_some() && self.timer.is_idle()
    }

    /// Starts timing for `customer_id`. Ignored unless the timer is idle.
    pub fn start(&mut self, customer_id: CustomerId) -> bool {
        let now = self.clock.now();
        self.timer.start(customer_id, now)
    }

    pub fn pause(&mut self) -> bool {
        self.timer.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.timer.resume()
    }

    /// Advances the running timer by one second and applies idle detection
    /// to the new value.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.timer.tick() {
            return TickOutcome::Skipped;
        }
        let elapsed_seconds = self.timer.elapsed_seconds();

        let monitor = IdleMonitor::from_settings(&self.settings);
        if !monitor.should_stop(self.timer.status(), elapsed_seconds) {
            return TickOutcome::Counted { elapsed_seconds };
        }

        info!(elapsed_seconds, "idle timeout reached, stopping timer");
        let persisted = self.stop().is_ok();
        let notice = monitor.stop_message().unwrap_or_default();
        self.notice = Some(notice.clone());
        TickOutcome::IdleStopped {
            elapsed_seconds,
            notice,
            persisted,
        }
    }

    /// Stops the timer and persists the session.
    ///
    /// Returns `Ok(None)` without side effects when idle. The timer is reset to
    /// idle before saving, so a storage failure loses the session; the error
    /// is returned and kept on the error surface.
    pub fn stop(&mut self) -> Result<Option<CustomerTimeLog>, StoreError> {
        let Some(run) = self.timer.stop() else {
            return Ok(None);
        };

        let session = TimeSession::from_run(&run, self.clock.today(), self.clock.now());
        let saved = self.store.save_time_session(&run.customer_id, session);
        let log = match self.surface("failed to save time session", saved) {
            Ok(log) => log,
            Err(err) => {
                warn!(
                    session_id = %run.session_id,
                    elapsed_seconds = run.elapsed_seconds,
                    "session discarded after failed save"
                );
                return Err(err);
            }
        };
        info!(
            customer_id = %run.customer_id,
            session_id = %run.session_id,
            duration_seconds = run.elapsed_seconds,
            "time session saved"
        );

        let cached_for_customer = self
            .time_log
            .as_ref()
            .is_some_and(|cached| cached.customer_id == run.customer_id);
        if cached_for_customer || self.selected.as_ref() == Some(&run.customer_id) {
            self.time_log = Some(log.clone());
        }
        Ok(Some(log))
    }

    /// Saves any active session before the process exits.
    pub fn shutdown(&mut self) -> Result<Option<CustomerTimeLog>, StoreError> {
        if !self.timer.is_idle() {
            info!("saving active session before exit");
        }
        self.stop()
    }

    /// Spent/remaining for the selected customer, counting the running
    /// session when it belongs to that customer.
    pub fn hours_summary(&self) -> Option<HoursSummary> {
        let log = self.time_log.as_ref()?;
        let in_progress = if self.timer.customer_id() == Some(&log.customer_id) {
            self.timer.elapsed_seconds()
        } else {
            0
        };
        Some(HoursSummary::compute(log, in_progress))
    }
}
