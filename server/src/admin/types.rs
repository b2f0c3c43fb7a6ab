//! Admin module types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Account, RoleAssignment};
use crate::moderation::Complaint;
use crate::permissions::Role;
use crate::store::StoreError;

/// Admin API error type.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Caller does not hold the admin role.
    #[error("Admin privileges required")]
    NotAdmin,

    /// The target account does not exist.
    #[error("Account {0} not found")]
    UnknownAccount(Uuid),

    /// Validation error.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store rejected or could not serve the request.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::NotAdmin => (StatusCode::FORBIDDEN, "NOT_ADMIN", self.to_string()),
            Self::UnknownAccount(_) => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND", self.to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Self::Store(e) => {
                tracing::error!(error = %e, "Admin store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Store error".to_string(),
                )
            }
        };
        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}

/// Raw collections backing the admin view.
#[derive(Debug, Clone, Default)]
pub struct AdminCollections {
    pub accounts: Vec<Account>,
    pub roles: Vec<RoleAssignment>,
    pub complaints: Vec<Complaint>,
}

/// Account joined with its current role.
#[derive(Debug, Clone, Serialize)]
pub struct AccountWithRole {
    #[serde(flatten)]
    pub account: Account,
    pub role: Role,
}

/// Account totals per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub total_accounts: usize,
    pub moderators: usize,
    pub admins: usize,
}

/// View model of the admin panel.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub accounts: Vec<AccountWithRole>,
    pub counts: RoleCounts,
    pub pending_complaints: usize,
    pub complaints: Vec<Complaint>,
}

// Request types
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}
