//! Database Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::Role;

/// Account owned by the identity system. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub institution: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Role assignment row in `user_roles`.
///
/// At most one row exists per account; an account without a row holds the
/// implicit default role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: Uuid,
    /// Account the role applies to.
    pub user_id: Uuid,
    pub role: Role,
    /// Admin who last set the role. Absent on rows seeded outside the app.
    pub assigned_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Write shape for a role upsert. `id` and `created_at` come from column
/// defaults on first insert and are never overwritten afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RoleAssignmentWrite {
    pub user_id: Uuid,
    pub role: Role,
    pub assigned_by: Uuid,
}

/// Message left through the public contact form. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
