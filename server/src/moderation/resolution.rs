//! Complaint resolution.
//!
//! The only transition is `pending -> resolved`, written as one update so
//! the status and the three reply columns change together.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::types::{ComplaintError, ComplaintStatus, ResolutionPatch};
use crate::permissions::SessionRole;
use crate::store::{encode_row, Filter, Table, TableStore};

/// Resolve a pending complaint with `reply`.
///
/// Whitespace-only replies are rejected before the store is touched. An
/// unknown or already resolved complaint yields [`ComplaintError::NotPending`].
#[tracing::instrument(skip(store, actor, reply), fields(actor = %actor.user_id))]
pub async fn resolve_complaint(
    store: &dyn TableStore,
    actor: &SessionRole,
    complaint_id: Uuid,
    reply: &str,
) -> Result<(), ComplaintError> {
    if !actor.is_admin() {
        return Err(ComplaintError::NotAdmin);
    }

    let reply = reply.trim();
    if reply.is_empty() {
        return Err(ComplaintError::EmptyReply);
    }

    let patch = encode_row(&ResolutionPatch {
        status: ComplaintStatus::Resolved,
        admin_reply: reply.to_string(),
        replied_at: Utc::now(),
        replied_by: actor.user_id,
    })?;

    // Guarding on status keeps `resolved` terminal.
    let filter = Filter::eq("id", complaint_id)?.and("status", ComplaintStatus::Pending)?;
    let affected = store.update(Table::Complaints, &filter, patch).await?;
    if affected == 0 {
        return Err(ComplaintError::NotPending);
    }

    info!(%complaint_id, "Complaint resolved");
    Ok(())
}
