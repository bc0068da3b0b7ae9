//! In-memory [`TimeStore`] for tests.

use std::collections::HashMap;

use crate::customer::Customer;
use crate::session::TimeSession;
use crate::settings::AppSettings;
use crate::store::{StoreError, TimeStore};
use crate::time_log::CustomerTimeLog;
use crate::types::CustomerId;

#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: Vec<Customer>,
    sessions: HashMap<CustomerId, Vec<TimeSession>>,
    settings: Option<AppSettings>,
    /// When set, every call fails with `Unavailable`.
    pub offline: bool,
}

impl MemoryStore {
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers,
            ..Self::default()
        }
    }

    pub fn session_count(&self, id: &CustomerId) -> usize {
        self.sessions.get(id).map_or(0, Vec::len)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn customer(&self, id: &CustomerId) -> Result<&Customer, StoreError> {
        self.customers
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| StoreError::customer_not_found(id))
    }
}

impl TimeStore for MemoryStore {
    fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        self.check_online()?;
        Ok(self.customers.clone())
    }

    fn save_customer(&mut self, customer: Customer) -> Result<Customer, StoreError> {
        self.check_online()?;
        match self.customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer.clone(),
            None => self.customers.push(customer.clone()),
        }
        Ok(customer)
    }

    fn delete_customer(&mut self, id: &CustomerId) -> Result<(), StoreError> {
        self.check_online()?;
        self.customer(id)?;
        self.customers.retain(|c| &c.id != id);
        Ok(())
    }

    fn get_customer_time_log(&self, id: &CustomerId) -> Result<CustomerTimeLog, StoreError> {
        self.check_online()?;
        let customer = self.customer(id)?;
        let sessions = self.sessions.get(id).cloned().unwrap_or_default();
        Ok(CustomerTimeLog::from_sessions(customer, sessions))
    }

    fn save_time_session(
        &mut self,
        customer_id: &CustomerId,
        session: TimeSession,
    ) -> Result<CustomerTimeLog, StoreError> {
        self.check_online()?;
        self.customer(customer_id)?;
        let sessions = self.sessions.entry(customer_id.clone()).or_default();
        if !sessions.iter().any(|s| s.id == session.id) {
            sessions.push(session);
        }
        self.get_customer_time_log(customer_id)
    }

    fn get_settings(&self) -> Result<AppSettings, StoreError> {
        self.check_online()?;
        Ok(self.settings.clone().unwrap_or_default())
    }

    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), StoreError> {
        self.check_online()?;
        self.settings = Some(settings.clone());
        Ok(())
    }
}
