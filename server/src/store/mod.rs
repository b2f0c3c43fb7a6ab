//! Table Store
//!
//! Row-oriented access to the hosted store that owns accounts, role
//! assignments, complaints and contact messages.
//!
//! Rows travel as JSON objects so that every backend speaks the same shape;
//! typed entities are converted at the edge with [`decode_rows`] and
//! [`encode_row`].

mod memory;
mod postgres;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub use futures::future::BoxFuture;

/// A single stored record.
pub type Row = serde_json::Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Collections known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Accounts,
    UserRoles,
    Complaints,
    ContactMessages,
}

impl Table {
    /// Table name in the backing store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::UserRoles => "user_roles",
            Self::Complaints => "complaints",
            Self::ContactMessages => "contact_messages",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Accounts,
            Self::UserRoles,
            Self::Complaints,
            Self::ContactMessages,
        ]
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort direction for [`TableStore::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Conjunction of column-equality clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(&'static str, Value)>,
}

impl Filter {
    /// Filter matching rows where `column == value`.
    pub fn eq(column: &'static str, value: impl Serialize) -> StoreResult<Self> {
        Self::default().and(column, value)
    }

    /// Add another equality clause.
    ///
    /// Fails if `value` does not serialize, or serializes to something other
    /// than a non-null scalar.
    pub fn and(mut self, column: &'static str, value: impl Serialize) -> StoreResult<Self> {
        let value = serde_json::to_value(value)?;
        if matches!(value, Value::Null | Value::Array(_) | Value::Object(_)) {
            return Err(StoreError::Malformed(serde::ser::Error::custom(format!(
                "filter on {column} needs a scalar value, got {value}"
            ))));
        }
        self.clauses.push((column, value));
        Ok(self)
    }

    #[must_use]
    pub fn clauses(&self) -> &[(&'static str, Value)] {
        &self.clauses
    }

    /// Whether `row` satisfies every clause.
    ///
    /// Values compare by their text form, which is how the PostgreSQL store
    /// compares them too (`column::text = $n`).
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.clauses.iter().all(|(column, expected)| {
            row.get(*column)
                .is_some_and(|actual| value_text(actual) == value_text(expected))
        })
    }
}

/// Text form of a JSON scalar as PostgreSQL renders it with `::text`.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write violated a table constraint.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A write referenced a row that does not exist.
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// A column or record key is not a plain identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A row could not be converted to or from its typed entity.
    #[error("Malformed row: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err)
                if db_err.kind() == sqlx::error::ErrorKind::ForeignKeyViolation =>
            {
                Self::ForeignKey(db_err.message().to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.constraint().is_some() => {
                Self::Constraint(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// The remote row store.
///
/// Every write is a single atomic statement; no operation spans several
/// calls in a transaction.
pub trait TableStore: Send + Sync {
    /// All rows of `table`, ordered by `order_by`.
    fn read(
        &self,
        table: Table,
        order_by: &'static str,
        direction: Direction,
    ) -> BoxFuture<'_, StoreResult<Vec<Row>>>;

    /// Rows of `table` matching `filter`, in no particular order.
    fn select<'a>(&'a self, table: Table, filter: &'a Filter)
        -> BoxFuture<'a, StoreResult<Vec<Row>>>;

    /// Append `record` to `table`.
    fn insert(&self, table: Table, record: Row) -> BoxFuture<'_, StoreResult<()>>;

    /// Insert `record`, or overwrite the provided columns of the row whose
    /// `on_conflict` column equals the record's. Columns omitted from
    /// `record` keep their defaults on insert and their values on update.
    fn upsert(
        &self,
        table: Table,
        record: Row,
        on_conflict: &'static str,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Apply `patch` to every row matching `filter`, returning rows affected.
    fn update<'a>(
        &'a self,
        table: Table,
        filter: &'a Filter,
        patch: Row,
    ) -> BoxFuture<'a, StoreResult<u64>>;

    /// Delete every row matching `filter`, returning rows affected.
    /// Deleting nothing is not an error.
    fn delete<'a>(&'a self, table: Table, filter: &'a Filter) -> BoxFuture<'a, StoreResult<u64>>;
}

/// Convert raw rows into typed entities.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> StoreResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(StoreError::from))
        .collect()
}

/// Convert a typed value into a row.
pub fn encode_row<T: Serialize>(value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Malformed(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

/// Reject anything that is not a lowercase snake_case identifier.
pub(crate) fn check_identifier(name: &str) -> StoreResult<&str> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}
