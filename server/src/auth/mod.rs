//! Authentication
//!
//! Identities are managed by the hosted identity service; this module
//! validates its bearer tokens and exposes the caller's resolved role.

mod error;
pub mod jwt;
mod middleware;

use axum::{extract::State, routing::get, Json, Router};

use crate::admin::types::RoleResponse;
use crate::api::AppState;
use crate::permissions::resolve_role;

pub use error::{AuthError, AuthResult};
pub use middleware::{require_auth, AuthUser};

/// Routes about the authenticated caller. Requires `require_auth`.
///
/// - GET /role - Effective role of the caller
pub fn me_router() -> Router<AppState> {
    Router::new().route("/role", get(get_my_role))
}

/// GET /api/me/role
async fn get_my_role(State(state): State<AppState>, auth: AuthUser) -> Json<RoleResponse> {
    Json(RoleResponse {
        role: resolve_role(state.store.as_ref(), auth.id).await,
    })
}
