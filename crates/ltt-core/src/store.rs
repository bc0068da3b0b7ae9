//! Storage contract consumed by the tracker.
//!
//! The tracker never knows how data is kept; it only calls these operations.
//! `ltt-db` provides the SQLite implementation.

use thiserror::Error;

use crate::customer::Customer;
use crate::session::TimeSession;
use crate::settings::AppSettings;
use crate::time_log::CustomerTimeLog;
use crate::types::CustomerId;

/// Failures reported by a [`TimeStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The referenced record does not exist (for example a deleted customer).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Stored data could not be decoded.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn customer_not_found(id: &CustomerId) -> Self {
        Self::NotFound {
            entity: "customer",
            id: id.to_string(),
        }
    }
}

/// Customer, session and settings persistence.
pub trait TimeStore {
    /// All customers, archived or not.
    fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Inserts a new customer or fully replaces an existing one with the same id.
    fn save_customer(&mut self, customer: Customer) -> Result<Customer, StoreError>;

    /// Permanently removes a customer. Fails with `NotFound` for unknown ids.
    fn delete_customer(&mut self, id: &CustomerId) -> Result<(), StoreError>;

    /// Freshly computed log for a customer.
    fn get_customer_time_log(&self, id: &CustomerId) -> Result<CustomerTimeLog, StoreError>;

    /// Appends a session to a customer's history and returns the new log.
    ///
    /// A session id the customer already has is ignored, so repeating the
    /// call does not double-count.
    fn save_time_session(
        &mut self,
        customer_id: &CustomerId,
        session: TimeSession,
    ) -> Result<CustomerTimeLog, StoreError>;

    /// Stored settings, or defaults if none were ever saved.
    fn get_settings(&self) -> Result<AppSettings, StoreError>;

    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), StoreError>;
}
