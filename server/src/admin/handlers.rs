//! Admin API handlers.
//!
//! Every handler here sits behind [`require_admin`](super::require_admin),
//! which injects the caller's resolved `SessionRole`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::aggregator::load_overview;
use super::roles::{assign_role, parse_role, remove_role};
use super::types::{AdminError, AdminOverview, RoleResponse, SetRoleRequest};
use crate::api::AppState;
use crate::permissions::SessionRole;

/// GET /api/admin/overview
pub async fn get_overview(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRole>,
) -> Result<Json<AdminOverview>, AdminError> {
    Ok(Json(load_overview(state.store.as_ref(), &session).await?))
}

/// PUT /api/admin/users/{id}/role
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRole>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<RoleResponse>, AdminError> {
    let role = parse_role(&body.role)?;
    assign_role(state.store.as_ref(), &session, user_id, role).await?;
    Ok(Json(RoleResponse { role }))
}

/// DELETE /api/admin/users/{id}/role
pub async fn delete_user_role(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRole>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AdminError> {
    remove_role(state.store.as_ref(), &session, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
