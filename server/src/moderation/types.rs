//! Moderation Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::store::StoreError;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    Resolved,
}

impl ComplaintStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

// ============================================================================
// Complaint
// ============================================================================

/// Reply attached when a complaint is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintReply {
    pub body: String,
    pub replied_at: DateTime<Utc>,
    pub replied_by: Uuid,
}

/// Lifecycle of a complaint. `Resolved` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintState {
    Pending,
    Resolved(ComplaintReply),
}

/// A support ticket with a resolution workflow.
///
/// Stored flat (see [`ComplaintRecord`]); the reply columns only exist
/// together with `status = resolved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ComplaintRecord", into = "ComplaintRecord")]
pub struct Complaint {
    pub id: Uuid,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub state: ComplaintState,
}

impl Complaint {
    #[must_use]
    pub const fn status(&self) -> ComplaintStatus {
        match self.state {
            ComplaintState::Pending => ComplaintStatus::Pending,
            ComplaintState::Resolved(_) => ComplaintStatus::Resolved,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, ComplaintState::Pending)
    }

    #[must_use]
    pub const fn reply(&self) -> Option<&ComplaintReply> {
        match &self.state {
            ComplaintState::Pending => None,
            ComplaintState::Resolved(reply) => Some(reply),
        }
    }
}

/// Row shape of the `complaints` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: Uuid,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub admin_reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub replied_by: Option<Uuid>,
}

impl TryFrom<ComplaintRecord> for Complaint {
    type Error = String;

    fn try_from(r: ComplaintRecord) -> Result<Self, Self::Error> {
        let state = match (r.status, r.admin_reply, r.replied_at, r.replied_by) {
            (ComplaintStatus::Pending, None, None, None) => ComplaintState::Pending,
            (ComplaintStatus::Resolved, Some(body), Some(replied_at), Some(replied_by)) => {
                ComplaintState::Resolved(ComplaintReply {
                    body,
                    replied_at,
                    replied_by,
                })
            }
            (status, ..) => {
                return Err(format!(
                    "complaint {} has reply fields inconsistent with status {}",
                    r.id,
                    status.as_str()
                ))
            }
        };

        Ok(Self {
            id: r.id,
            email: r.email,
            phone: r.phone,
            subject: r.subject,
            message: r.message,
            created_at: r.created_at,
            state,
        })
    }
}

impl From<Complaint> for ComplaintRecord {
    fn from(c: Complaint) -> Self {
        let status = c.status();
        let (admin_reply, replied_at, replied_by) = match c.state {
            ComplaintState::Pending => (None, None, None),
            ComplaintState::Resolved(reply) => (
                Some(reply.body),
                Some(reply.replied_at),
                Some(reply.replied_by),
            ),
        };
        Self {
            id: c.id,
            email: c.email,
            phone: c.phone,
            subject: c.subject,
            message: c.message,
            status,
            created_at: c.created_at,
            admin_reply,
            replied_at,
            replied_by,
        }
    }
}

/// Patch written by the resolution service: every reply column at once.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionPatch {
    pub status: ComplaintStatus,
    pub admin_reply: String,
    pub replied_at: DateTime<Utc>,
    pub replied_by: Uuid,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ResolveComplaintRequest {
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ComplaintForm {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 32, message = "Phone must be 1-32 characters"))]
    pub phone: String,
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ComplaintError {
    #[error("Reply must not be empty")]
    EmptyReply,

    #[error("Admin privileges required")]
    NotAdmin,

    #[error("Complaint not found or already resolved")]
    NotPending,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ComplaintError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Store(err) => {
                tracing::error!("Store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Store error".to_string(),
                )
            }
            Self::EmptyReply => (StatusCode::BAD_REQUEST, "EMPTY_REPLY", self.to_string()),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "NOT_ADMIN", self.to_string()),
            Self::NotPending => (StatusCode::CONFLICT, "NOT_PENDING", self.to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        };

        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}
