//! Moderation HTTP handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::intake::{submit_complaint, submit_contact_message, IntakeError};
use super::resolution::resolve_complaint;
use super::types::{ComplaintError, ComplaintForm, ContactForm, ResolveComplaintRequest};
use crate::api::AppState;
use crate::permissions::SessionRole;

/// POST /api/complaints
pub async fn create_complaint(
    State(state): State<AppState>,
    Json(body): Json<ComplaintForm>,
) -> Result<StatusCode, IntakeError> {
    submit_complaint(state.store.as_ref(), &body).await?;
    Ok(StatusCode::CREATED)
}

/// POST /api/contact
pub async fn create_contact_message(
    State(state): State<AppState>,
    Json(body): Json<ContactForm>,
) -> Result<StatusCode, IntakeError> {
    submit_contact_message(state.store.as_ref(), &body).await?;
    Ok(StatusCode::CREATED)
}

/// POST /api/admin/complaints/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Extension(session): Extension<SessionRole>,
    Path(complaint_id): Path<Uuid>,
    Json(body): Json<ResolveComplaintRequest>,
) -> Result<StatusCode, ComplaintError> {
    resolve_complaint(state.store.as_ref(), &session, complaint_id, &body.reply).await?;
    Ok(StatusCode::NO_CONTENT)
}
