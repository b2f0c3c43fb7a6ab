//! PostgreSQL table store.
//!
//! Rows are read with `to_jsonb` and written through
//! `jsonb_populate_record`, so the column types declared in the schema do
//! the casting and the store itself never needs per-table code.

use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use super::{
    check_identifier, value_text, BoxFuture, Direction, Filter, Row, StoreError, StoreResult,
    Table, TableStore,
};

/// [`TableStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Validated column names of `record`.
fn column_list(record: &Row) -> StoreResult<Vec<&str>> {
    record.keys().map(String::as_str).map(check_identifier).collect()
}

/// `WHERE` clause for `filter`, with placeholders starting at `$first`.
fn where_clause(filter: &Filter, first: usize) -> StoreResult<(String, Vec<String>)> {
    if filter.clauses().is_empty() {
        return Ok(("TRUE".to_string(), Vec::new()));
    }
    let mut parts = Vec::with_capacity(filter.clauses().len());
    let mut binds = Vec::with_capacity(filter.clauses().len());
    for (offset, (column, value)) in filter.clauses().iter().enumerate() {
        let column = check_identifier(column)?;
        parts.push(format!("{column}::text = ${}", first + offset));
        binds.push(value_text(value));
    }
    Ok((parts.join(" AND "), binds))
}

fn into_rows(values: Vec<Value>) -> StoreResult<Vec<Row>> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Malformed(serde::de::Error::custom(format!(
                "expected a row object, got {other}"
            )))),
        })
        .collect()
}

impl TableStore for PgStore {
    fn read(
        &self,
        table: Table,
        order_by: &'static str,
        direction: Direction,
    ) -> BoxFuture<'_, StoreResult<Vec<Row>>> {
        Box::pin(async move {
            let order_by = check_identifier(order_by)?;
            let sql = format!(
                "SELECT to_jsonb(t) FROM {} t ORDER BY t.{order_by} {}",
                table.name(),
                direction.keyword()
            );
            let values: Vec<Value> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
            debug!(table = %table, rows = values.len(), "Read table");
            into_rows(values)
        })
    }

    fn select<'a>(
        &'a self,
        table: Table,
        filter: &'a Filter,
    ) -> BoxFuture<'a, StoreResult<Vec<Row>>> {
        Box::pin(async move {
            let (clause, binds) = where_clause(filter, 1)?;
            let sql = format!("SELECT to_jsonb(t) FROM {} t WHERE {clause}", table.name());
            let mut query = sqlx::query_scalar::<_, Value>(&sql);
            for bind in binds {
                query = query.bind(bind);
            }
            into_rows(query.fetch_all(&self.pool).await?)
        })
    }

    fn insert(&self, table: Table, record: Row) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            let columns = column_list(&record)?.join(", ");
            let sql = format!(
                "INSERT INTO {t} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{t}, $1)",
                t = table.name()
            );
            sqlx::query(&sql)
                .bind(Value::Object(record))
                .execute(&self.pool)
                .await?;
            Ok(())
        })
    }

    fn upsert(
        &self,
        table: Table,
        record: Row,
        on_conflict: &'static str,
    ) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            let on_conflict = check_identifier(on_conflict)?;
            let columns = column_list(&record)?;
            let assignments: Vec<String> = columns
                .iter()
                .filter(|c| **c != on_conflict)
                .map(|c| format!("{c} = EXCLUDED.{c}"))
                .collect();
            let action = if assignments.is_empty() {
                "DO NOTHING".to_string()
            } else {
                format!("DO UPDATE SET {}", assignments.join(", "))
            };
            let sql = format!(
                "INSERT INTO {t} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{t}, $1) \
                 ON CONFLICT ({on_conflict}) {action}",
                t = table.name(),
                cols = columns.join(", "),
            );
            sqlx::query(&sql)
                .bind(Value::Object(record))
                .execute(&self.pool)
                .await?;
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
            let columns = column_list(&patch)?.join(", ");
            let (clause, binds) = where_clause(filter, 2)?;
            let sql = format!(
                "UPDATE {t} SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::{t}, $1)) \
                 WHERE {clause}",
                t = table.name()
            );
            let mut query = sqlx::query(&sql).bind(Value::Object(patch));
            for bind in binds {
                query = query.bind(bind);
            }
            Ok(query.execute(&self.pool).await?.rows_affected())
        })
    }

    fn delete<'a>(&'a self, table: Table, filter: &'a Filter) -> BoxFuture<'a, StoreResult<u64>> {
        Box::pin(async move {
            let (clause, binds) = where_clause(filter, 1)?;
            let sql = format!("DELETE FROM {} WHERE {clause}", table.name());
            let mut query = sqlx::query(&sql);
            for bind in binds {
                query = query.bind(bind);
            }
            Ok(query.execute(&self.pool).await?.rows_affected())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::encode_row;
    use serde_json::json;
    use uuid::Uuid;

    fn row(value: Value) -> Row {
        encode_row(&value).unwrap()
    }

    async fn create_account(store: &PgStore, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        store
            .insert(
                Table::Accounts,
                row(json!({"id": id, "name": name, "email": format!("{name}@uni.edu")})),
            )
            .await
            .expect("Failed to create account");
        id
    }

    async fn create_pending_complaint(store: &PgStore) -> Uuid {
        let id = Uuid::now_v7();
        store
            .insert(
                Table::Complaints,
                row(json!({
                    "id": id,
                    "email": "x@y.com",
                    "phone": "555-0100",
                    "subject": "Bug",
                    "message": "Broken",
                })),
            )
            .await
            .expect("Failed to create complaint");
        id
    }

    fn resolution_patch(admin: Uuid) -> Row {
        row(json!({
            "status": "resolved",
            "admin_reply": "Fixed in v2",
            "replied_at": chrono::Utc::now(),
            "replied_by": admin,
        }))
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_role_upsert_keeps_one_row(pool: PgPool) {
        let store = PgStore::new(pool);
        let admin = create_account(&store, "admin").await;
        let target = create_account(&store, "student").await;

        let write = |role: &str| row(json!({"user_id": target, "role": role, "assigned_by": admin}));
        store.upsert(Table::UserRoles, write("moderator"), "user_id").await.unwrap();
        let filter = Filter::eq("user_id", target).unwrap();
        let first = store.select(Table::UserRoles, &filter).await.unwrap();

        store.upsert(Table::UserRoles, write("admin"), "user_id").await.unwrap();
        let rows = store.select(Table::UserRoles, &filter).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["role"], "admin");
        assert_eq!(rows[0]["id"], first[0]["id"]);
        assert_eq!(rows[0]["created_at"], first[0]["created_at"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_guarded_update_skips_resolved_complaint(pool: PgPool) {
        let store = PgStore::new(pool);
        let admin = create_account(&store, "admin").await;
        let complaint = create_pending_complaint(&store).await;

        let filter = Filter::eq("id", complaint)
            .unwrap()
            .and("status", "pending")
            .unwrap();
        let first = store
            .update(Table::Complaints, &filter, resolution_patch(admin))
            .await
            .unwrap();
        let second = store
            .update(Table::Complaints, &filter, resolution_patch(admin))
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_reply_fields_must_match_status(pool: PgPool) {
        let store = PgStore::new(pool);
        let complaint = create_pending_complaint(&store).await;
        let filter = Filter::eq("id", complaint).unwrap();

        let result = store
            .update(Table::Complaints, &filter, row(json!({"status": "resolved"})))
            .await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));

        let rows = store.select(Table::Complaints, &filter).await.unwrap();
        assert_eq!(rows[0]["status"], "pending");
        assert!(rows[0]["admin_reply"].is_null());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_delete_absent_role_affects_nothing(pool: PgPool) {
        let store = PgStore::new(pool);
        let target = create_account(&store, "student").await;

        let filter = Filter::eq("user_id", target).unwrap();
        assert_eq!(store.delete(Table::UserRoles, &filter).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_role_for_unknown_account_is_foreign_key_error(pool: PgPool) {
        let store = PgStore::new(pool);

        let result = store
            .upsert(
                Table::UserRoles,
                row(json!({"user_id": Uuid::now_v7(), "role": "admin"})),
                "user_id",
            )
            .await;
        assert!(matches!(result, Err(StoreError::ForeignKey(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_read_orders_newest_first(pool: PgPool) {
        let store = PgStore::new(pool);
        for (name, ts) in [("old", "2024-01-01T00:00:00Z"), ("new", "2024-06-01T00:00:00Z")] {
            store
                .insert(
                    Table::Accounts,
                    row(json!({"name": name, "email": "a@uni.edu", "created_at": ts})),
                )
                .await
                .unwrap();
        }

        let rows = store
            .read(Table::Accounts, "created_at", Direction::Desc)
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["new", "old"]);
    }

    #[test]
    fn test_where_clause_numbers_placeholders() {
        let filter = Filter::eq("id", "c1").unwrap().and("status", "pending").unwrap();
        let (clause, binds) = where_clause(&filter, 2).unwrap();
        assert_eq!(clause, "id::text = $2 AND status::text = $3");
        assert_eq!(binds, vec!["c1".to_string(), "pending".to_string()]);
    }

    #[test]
    fn test_where_clause_rejects_bad_column() {
        let filter = Filter::eq("id = id OR 1", "x").unwrap();
        assert!(matches!(
            where_clause(&filter, 1),
            Err(StoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_column_list_rejects_bad_keys() {
        let mut record = Row::new();
        record.insert("role".into(), Value::from("admin"));
        assert_eq!(column_list(&record).unwrap(), vec!["role"]);

        record.insert("role\"; --".into(), Value::from("x"));
        assert!(column_list(&record).is_err());
    }
}
