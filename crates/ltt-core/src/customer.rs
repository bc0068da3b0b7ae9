//! Customers and their contracted hours budget.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, ValidationError};

/// A customer that time is tracked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Free-text label for the kind of engagement (retainer, project, ...).
    pub engagement_type: String,
    /// Contracted budget in hours.
    pub initial_hours: f64,
    pub created_at: DateTime<Utc>,
    /// Archived customers keep their history but are hidden from selection.
    #[serde(default)]
    pub archived: bool,
}

/// Form input for adding a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub engagement_type: String,
    pub initial_hours: f64,
}

impl NewCustomer {
    /// Validates the form and builds an active customer with a fresh id.
    pub fn into_customer(self, created_at: DateTime<Utc>) -> Result<Customer, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "customer name",
            });
        }
        validate_hours(self.initial_hours)?;

        Ok(Customer {
            id: CustomerId::generate(),
            name: name.to_string(),
            engagement_type: self.engagement_type.trim().to_string(),
            initial_hours: self.initial_hours,
            created_at,
            archived: false,
        })
    }
}

/// Rejects negative, NaN and infinite budgets.
pub fn validate_hours(hours: f64) -> Result<(), ValidationError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidHours { value: hours })
    }
}

/// Case-insensitive name ordering used for every customer list.
fn compare_names(a: &Customer, b: &Customer) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Sorts customers alphabetically by name, ignoring case.
pub fn sort_by_name(customers: &mut [Customer]) {
    customers.sort_by(compare_names);
}

/// Non-archived customers, sorted by name.
pub fn active_customers(customers: Vec<Customer>) -> Vec<Customer> {
    let mut active: Vec<_> = customers.into_iter().filter(|c| !c.archived).collect();
    sort_by_name(&mut active);
    active
}

/// Finds a customer by exact id, falling back to a case-insensitive name match.
pub fn find_customer<'a>(customers: &'a [Customer], reference: &str) -> Option<&'a Customer> {
    let name = reference.trim().to_lowercase();
    customers
        .iter()
        .find(|c| c.id.as_str() == reference)
        .or_else(|| customers.iter().find(|c| c.name.to_lowercase() == name))
}
