//! Role mutation.
//!
//! Writes go straight to the store; callers refresh their view from a new
//! read afterwards rather than patching it locally.

use tracing::info;
use uuid::Uuid;

use super::types::AdminError;
use crate::db::RoleAssignmentWrite;
use crate::permissions::{Role, SessionRole};
use crate::store::{encode_row, Filter, StoreError, Table, TableStore};

/// Create or overwrite the role of `target`.
///
/// Upserts on `user_id`, so exactly one row per account survives. The
/// row's `id` and `created_at` are only set on first insert.
#[tracing::instrument(skip(store, actor), fields(actor = %actor.user_id))]
pub async fn assign_role(
    store: &dyn TableStore,
    actor: &SessionRole,
    target: Uuid,
    role: Role,
) -> Result<(), AdminError> {
    if !actor.is_admin() {
        return Err(AdminError::NotAdmin);
    }

    let record = encode_row(&RoleAssignmentWrite {
        user_id: target,
        role,
        assigned_by: actor.user_id,
    })?;
    store
        .upsert(Table::UserRoles, record, "user_id")
        .await
        .map_err(|e| match e {
            StoreError::ForeignKey(_) => AdminError::UnknownAccount(target),
            other => AdminError::Store(other),
        })?;

    info!(%target, role = %role, "Role assigned");
    Ok(())
}

/// Delete the role row of `target`, reverting it to the default role.
///
/// Idempotent: returns `false` when there was nothing to delete.
#[tracing::instrument(skip(store, actor), fields(actor = %actor.user_id))]
pub async fn remove_role(
    store: &dyn TableStore,
    actor: &SessionRole,
    target: Uuid,
) -> Result<bool, AdminError> {
    if !actor.is_admin() {
        return Err(AdminError::NotAdmin);
    }

    let removed = store
        .delete(Table::UserRoles, &Filter::eq("user_id", target)?)
        .await?;

    info!(%target, removed, "Role removed");
    Ok(removed > 0)
}

/// Parse a role name supplied by a client.
pub fn parse_role(value: &str) -> Result<Role, AdminError> {
    value
        .trim()
        .parse()
        .map_err(|e: crate::permissions::UnknownRole| AdminError::Validation(e.to_string()))
}
