//! Admin authorization middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::types::AdminError;
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::permissions::resolve_session;

/// Middleware that requires the caller to hold the admin role.
///
/// Resolves the caller's [`SessionRole`](crate::permissions::SessionRole)
/// and injects it for the handlers behind it.
#[tracing::instrument(skip(state, request, next))]
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AdminError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AdminError::NotAdmin)?;

    let session = resolve_session(state.store.as_ref(), auth.id).await;
    if !session.is_admin() {
        tracing::debug!(user_id = %auth.id, role = %session.role(), "Admin access denied");
        return Err(AdminError::NotAdmin);
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
