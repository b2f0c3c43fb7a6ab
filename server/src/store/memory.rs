//! In-process table store.
//!
//! Mirrors the PostgreSQL schema closely enough for local runs and tests:
//! column defaults, unique keys, references to `accounts`, and `ON CONFLICT`
//! upserts. Tables can be switched into a failing state to exercise the
//! degraded paths of callers.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    value_text, BoxFuture, Direction, Filter, Row, StoreError, StoreResult, Table, TableStore,
};

/// In-memory implementation of [`TableStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    failing: RwLock<HashSet<Table>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `table` fail (or succeed again) from now on.
    pub async fn set_failing(&self, table: Table, failing: bool) {
        let mut set = self.failing.write().await;
        if failing {
            set.insert(table);
        } else {
            set.remove(&table);
        }
    }

    /// Snapshot of the raw rows of `table`, in insertion order.
    pub async fn rows(&self, table: Table) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed a bare account row so role rows can reference it.
    #[cfg(test)]
    pub(crate) async fn insert_account(&self, id: impl serde::Serialize) {
        let record = super::encode_row(&serde_json::json!({
            "id": id,
            "name": "Test Account",
            "email": "test@uni.edu",
        }))
        .expect("account row");
        self.insert(Table::Accounts, record)
            .await
            .expect("insert account");
    }

    async fn check_available(&self, table: Table) -> StoreResult<()> {
        if self.failing.read().await.contains(&table) {
            return Err(StoreError::Unavailable(format!(
                "{table} is not reachable"
            )));
        }
        Ok(())
    }
}

/// Columns that carry a unique constraint in the schema.
const fn unique_columns(table: Table) -> &'static [&'static str] {
    match table {
        Table::UserRoles => &["id", "user_id"],
        Table::Accounts | Table::Complaints | Table::ContactMessages => &["id"],
    }
}

/// Columns that reference `accounts.id`.
const fn account_references(table: Table) -> &'static [&'static str] {
    match table {
        Table::UserRoles => &["user_id", "assigned_by"],
        Table::Accounts | Table::Complaints | Table::ContactMessages => &[],
    }
}

fn apply_defaults(table: Table, record: &mut Row) {
    if table == Table::Complaints && !record.contains_key("status") {
        record.insert("status".into(), Value::String("pending".into()));
    }
    if !record.contains_key("id") {
        record.insert("id".into(), Value::String(Uuid::now_v7().to_string()));
    }
    if !record.contains_key("created_at") {
        record.insert(
            "created_at".into(),
            serde_json::to_value(Utc::now()).unwrap_or(Value::Null),
        );
    }
}

fn check_unique(table: Table, rows: &[Row], record: &Row, skip: Option<usize>) -> StoreResult<()> {
    for column in unique_columns(table) {
        let Some(value) = record.get(*column) else {
            continue;
        };
        let clash = rows.iter().enumerate().any(|(i, row)| {
            Some(i) != skip && row.get(*column).is_some_and(|v| value_text(v) == value_text(value))
        });
        if clash {
            return Err(StoreError::Constraint(format!(
                "duplicate key value violates unique constraint on {table}.{column}"
            )));
        }
    }
    Ok(())
}

/// Reject `record` if it names an account that does not exist. Null
/// references are allowed.
fn check_references(
    tables: &HashMap<Table, Vec<Row>>,
    table: Table,
    record: &Row,
) -> StoreResult<()> {
    let accounts = tables.get(&Table::Accounts).map(Vec::as_slice).unwrap_or_default();
    for column in account_references(table) {
        let Some(value) = record.get(*column).filter(|v| !v.is_null()) else {
            continue;
        };
        let known = accounts
            .iter()
            .any(|a| a.get("id").is_some_and(|id| value_text(id) == value_text(value)));
        if !known {
            return Err(StoreError::ForeignKey(format!(
                "{table}.{column} = {} is not present in accounts",
                value_text(value)
            )));
        }
    }
    Ok(())
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn present(v: Option<&Value>) -> Option<&Value> {
        v.filter(|v| !v.is_null())
    }

    match (present(a), present(b)) {
        // NULLS LAST for ascending order, as PostgreSQL does
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => value_text(x).cmp(&value_text(y)),
    }
}

impl TableStore for MemoryStore {
    fn read(
        &self,
        table: Table,
        order_by: &'static str,
        direction: Direction,
    ) -> BoxFuture<'_, StoreResult<Vec<Row>>> {
        Box::pin(async move {
            self.check_available(table).await?;
            let mut rows = self.rows(table).await;
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(order_by), b.get(order_by));
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
            Ok(rows)
        })
    }

    fn select<'a>(
        &'a self,
        table: Table,
        filter: &'a Filter,
    ) -> BoxFuture<'a, StoreResult<Vec<Row>>> {
        Box::pin(async move {
            self.check_available(table).await?;
            let tables = self.tables.read().await;
            Ok(tables
                .get(&table)
                .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
                .unwrap_or_default())
        })
    }

    fn insert(&self, table: Table, mut record: Row) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.check_available(table).await?;
            apply_defaults(table, &mut record);
            let mut tables = self.tables.write().await;
            check_references(&tables, table, &record)?;
            let rows = tables.entry(table).or_default();
            check_unique(table, rows, &record, None)?;
            rows.push(record);
            Ok(())
        })
    }

    fn upsert(
        &self,
        table: Table,
        mut record: Row,
        on_conflict: &'static str,
    ) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.check_available(table).await?;
            if !unique_columns(table).contains(&on_conflict) {
                return Err(StoreError::Constraint(format!(
                    "there is no unique constraint matching {table}.{on_conflict}"
                )));
            }
            let key = record.get(on_conflict).cloned().ok_or_else(|| {
                StoreError::Constraint(format!("upsert record lacks {on_conflict}"))
            })?;

            let mut tables = self.tables.write().await;
            check_references(&tables, table, &record)?;
            let rows = tables.entry(table).or_default();
            let existing = rows
                .iter()
                .position(|r| r.get(on_conflict).is_some_and(|v| value_text(v) == value_text(&key)));

            match existing {
                Some(index) => {
                    let mut merged = rows[index].clone();
                    merged.extend(record);
                    check_unique(table, rows, &merged, Some(index))?;
                    rows[index] = merged;
                }
                None => {
                    apply_defaults(table, &mut record);
                    check_unique(table, rows, &record, None)?;
                    rows.push(record);
                }
            }
            Ok(())
        })
    }

    fn update<'a>(
        &'a self,
        table: Table,
        filter: &'a Filter,
        patch: Row,
    ) -> BoxFuture<'a, StoreResult<u64>> {
        Box::pin(async move {
            self.check_available(table).await?;
            let mut tables = self.tables.write().await;
            check_references(&tables, table, &patch)?;
            let rows = tables.entry(table).or_default();

            // Build every patched row first so a constraint failure leaves
            // the table untouched.
            let mut patched = rows.clone();
            let mut affected = 0u64;
            for (index, row) in patched.iter_mut().enumerate() {
                if filter.matches(&rows[index]) {
                    row.extend(patch.clone());
                    affected += 1;
                }
            }
            for (index, row) in patched.iter().enumerate() {
                check_unique(table, &patched, row, Some(index))?;
            }
            *rows = patched;
            Ok(affected)
        })
    }

    fn delete<'a>(&'a self, table: Table, filter: &'a Filter) -> BoxFuture<'a, StoreResult<u64>> {
        Box::pin(async move {
            self.check_available(table).await?;
            let mut tables = self.tables.write().await;
            let rows = tables.entry(table).or_default();
            let before = rows.len();
            rows.retain(|r| !filter.matches(r));
            Ok((before - rows.len()) as u64)
        })
    }
}
