//! Storage layer for the local time tracker.
//!
//! Provides persistence for customers, time sessions and settings using
//! `rusqlite`, and implements [`ltt_core::TimeStore`] on top of it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! The tracker is single-threaded, so a `Database` is owned by exactly one
//! [`ltt_core::Tracker`] and never shared.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g., `2024-01-15T10:30:00.000Z`)
//! and session dates as `YYYY-MM-DD`. Lexicographic ordering matches
//! chronological ordering.
//!
//! ## Session History
//!
//! `time_sessions` is append-only. Rows are never updated, and reading a
//! customer's history returns them in insertion (`rowid`) order. There is no
//! foreign key to `customers`: deleting a customer leaves its sessions in
//! place, unreachable through the store.
//!
//! ## Settings
//!
//! Settings are a single JSON document under the `app` key of the `settings`
//! table, so new settings fields need no migration.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ltt_core::{
    AppSettings, Customer, CustomerId, CustomerTimeLog, SessionId, StoreError, TimeSession,
    TimeStore,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::{debug, info};

const SETTINGS_KEY: &str = "app";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Settings JSON could not be encoded or decoded.
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored timestamp or date could not be parsed.
    #[error("invalid timestamp for {record_id}: {value}")]
    TimestampParse {
        record_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates a model invariant (empty id, negative duration).
    #[error("invalid record {record_id}: {message}")]
    InvalidRecord { record_id: String, message: String },
    /// The referenced customer does not exist.
    #[error("customer not found: {0}")]
    CustomerNotFound(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::CustomerNotFound(id) => Self::NotFound {
                entity: "customer",
                id,
            },
            DbError::Sqlite(_) => Self::Unavailable(err.to_string()),
            DbError::Json(_) | DbError::TimestampParse { .. } | DbError::InvalidRecord { .. } => {
                Self::Corrupt(err.to_string())
            }
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A customer row as stored, before validation.
struct CustomerRow {
    id: String,
    name: String,
    engagement_type: String,
    initial_hours: f64,
    created_at: String,
    archived: bool,
}

impl CustomerRow {
    fn into_customer(self) -> Result<Customer, DbError> {
        let id = CustomerId::new(self.id.clone()).map_err(|e| DbError::InvalidRecord {
            record_id: self.id.clone(),
            message: e.to_string(),
        })?;
        let created_at = parse_timestamp(&self.created_at, &self.id)?;
        Ok(Customer {
            id,
            name: self.name,
            engagement_type: self.engagement_type,
            initial_hours: self.initial_hours,
            created_at,
            archived: self.archived,
        })
    }
}

/// A session row as stored, before validation.
struct SessionRow {
    id: String,
    date: String,
    start_time: String,
    end_time: Option<String>,
    duration_seconds: i64,
    duration_formatted: String,
    notes: Option<String>,
}

impl SessionRow {
    fn into_session(self) -> Result<TimeSession, DbError> {
        let invalid = |message: String| DbError::InvalidRecord {
            record_id: self.id.clone(),
            message,
        };
        let id = SessionId::new(self.id.clone()).map_err(|e| invalid(e.to_string()))?;
        let duration_seconds = u64::try_from(self.duration_seconds)
            .map_err(|_| invalid(format!("negative duration {}", self.duration_seconds)))?;
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|source| {
            DbError::TimestampParse {
                record_id: self.id.clone(),
                value: self.date.clone(),
                source,
            }
        })?;
        let start_time = parse_timestamp(&self.start_time, &self.id)?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|value| parse_timestamp(value, &self.id))
            .transpose()?;

        Ok(TimeSession {
            id,
            date,
            start_time,
            end_time,
            duration_seconds,
            duration_formatted: self.duration_formatted,
            notes: self.notes,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                engagement_type TEXT NOT NULL DEFAULT '',
                initial_hours REAL NOT NULL,
                created_at TEXT NOT NULL,
                archived INTEGER NOT NULL DEFAULT 0
            );

            -- Append-only session history, one row per stopped timer run
            -- date: local calendar day (e.g., '2024-01-15')
            -- start_time/end_time: ISO 8601 (e.g., '2024-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS time_sessions (
                customer_id TEXT NOT NULL,
                id TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                duration_seconds INTEGER NOT NULL,
                duration_formatted TEXT NOT NULL,
                notes TEXT,
                PRIMARY KEY (customer_id, id)
            );

            CREATE INDEX IF NOT EXISTS idx_time_sessions_date ON time_sessions(date);

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Lists all customers, archived included, ordered by creation time.
    pub fn list_customers(&self) -> Result<Vec<Customer>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, engagement_type, initial_hours, created_at, archived
            FROM customers
            ORDER BY created_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CustomerRow {
                id: row.get(0)?,
                name: row.get(1)?,
                engagement_type: row.get(2)?,
                initial_hours: row.get(3)?,
                created_at: row.get(4)?,
                archived: row.get(5)?,
            })
        })?;
        let mut customers = Vec::new();
        for row in rows {
            customers.push(row?.into_customer()?);
        }
        Ok(customers)
    }

    /// Fetches a single customer by ID.
    pub fn get_customer(&self, id: &CustomerId) -> Result<Option<Customer>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, name, engagement_type, initial_hours, created_at, archived
                FROM customers
                WHERE id = ?
                ",
                [id.as_str()],
                |row| {
                    Ok(CustomerRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        engagement_type: row.get(2)?,
                        initial_hours: row.get(3)?,
                        created_at: row.get(4)?,
                        archived: row.get(5)?,
                    })
                },
            )
            .optional()?;
        row.map(CustomerRow::into_customer).transpose()
    }

    /// Inserts a customer, or replaces every field of an existing one.
    pub fn upsert_customer(&self, customer: &Customer) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO customers (id, name, engagement_type, initial_hours, created_at, archived)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                engagement_type = excluded.engagement_type,
                initial_hours = excluded.initial_hours,
                created_at = excluded.created_at,
                archived = excluded.archived
            ",
            params![
                customer.id.as_str(),
                customer.name,
                customer.engagement_type,
                customer.initial_hours,
                format_timestamp(customer.created_at),
                customer.archived,
            ],
        )?;
        Ok(())
    }

    /// Deletes a customer row. Sessions are left in place.
    pub fn delete_customer(&self, id: &CustomerId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?", [id.as_str()])?;
        if deleted == 0 {
            return Err(DbError::CustomerNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Lists a customer's sessions in the order they were saved.
    pub fn list_sessions(&self, customer_id: &CustomerId) -> Result<Vec<TimeSession>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, start_time, end_time, duration_seconds, duration_formatted, notes
            FROM time_sessions
            WHERE customer_id = ?
            ORDER BY rowid ASC
            ",
        )?;
        let rows = stmt.query_map([customer_id.as_str()], |row| {
            Ok(SessionRow {
                id: row.get(0)?,
                date: row.get(1)?,
                start_time: row.get(2)?,
                end_time: row.get(3)?,
                duration_seconds: row.get(4)?,
                duration_formatted: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    /// Appends a session for an existing customer, ignoring duplicate IDs.
    ///
    /// Returns whether a row was inserted.
    pub fn insert_session(
        &mut self,
        customer_id: &CustomerId,
        session: &TimeSession,
    ) -> Result<bool, DbError> {
        let duration_seconds =
            i64::try_from(session.duration_seconds).map_err(|_| DbError::InvalidRecord {
                record_id: session.id.to_string(),
                message: format!("duration out of range: {}", session.duration_seconds),
            })?;

        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = ?)",
            [customer_id.as_str()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::CustomerNotFound(customer_id.to_string()));
        }

        let inserted = tx.execute(
            "
            INSERT OR IGNORE INTO time_sessions
            (customer_id, id, date, start_time, end_time, duration_seconds, duration_formatted, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                customer_id.as_str(),
                session.id.as_str(),
                session.date.to_string(),
                format_timestamp(session.start_time),
                session.end_time.map(format_timestamp),
                duration_seconds,
                session.duration_formatted,
                session.notes,
            ],
        )?;
        tx.commit()?;
        Ok(inserted > 0)
    }

    /// Builds the time log for a customer from its full session history.
    pub fn customer_time_log(&self, id: &CustomerId) -> Result<CustomerTimeLog, DbError> {
        let customer = self
            .get_customer(id)?
            .ok_or_else(|| DbError::CustomerNotFound(id.to_string()))?;
        let sessions = self.list_sessions(id)?;
        Ok(CustomerTimeLog::from_sessions(&customer, sessions))
    }

    /// Loads stored settings, if any were ever saved.
    pub fn load_settings(&self) -> Result<Option<AppSettings>, DbError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                [SETTINGS_KEY],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(DbError::from)
    }

    pub fn store_settings(&self, settings: &AppSettings) -> Result<(), DbError> {
        let json = serde_json::to_string(settings)?;
        self.conn.execute(
            "
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![SETTINGS_KEY, json],
        )?;
        Ok(())
    }
}

impl TimeStore for Database {
    fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(Self::list_customers(self)?)
    }

    fn save_customer(&mut self, customer: Customer) -> Result<Customer, StoreError> {
        self.upsert_customer(&customer)?;
        debug!(customer_id = %customer.id, "customer saved");
        Ok(customer)
    }

    fn delete_customer(&mut self, id: &CustomerId) -> Result<(), StoreError> {
        Self::delete_customer(self, id)?;
        Ok(())
    }

    fn get_customer_time_log(&self, id: &CustomerId) -> Result<CustomerTimeLog, StoreError> {
        Ok(self.customer_time_log(id)?)
    }

    fn save_time_session(
        &mut self,
        customer_id: &CustomerId,
        session: TimeSession,
    ) -> Result<CustomerTimeLog, StoreError> {
        let inserted = self.insert_session(customer_id, &session)?;
        if inserted {
            info!(%customer_id, session_id = %session.id, "session appended");
        } else {
            debug!(%customer_id, session_id = %session.id, "session already stored");
        }
        Ok(self.customer_time_log(customer_id)?)
    }

    fn get_settings(&self) -> Result<AppSettings, StoreError> {
        Ok(self.load_settings()?.unwrap_or_default())
    }

    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), StoreError> {
        Ok(self.store_settings(settings)?)
    }
}

fn parse_timestamp(timestamp: &str, record_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record_id: record_id.to_string(),
            value: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
