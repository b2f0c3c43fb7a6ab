//! Admin Module
//!
//! Admin-only management of the platform:
//! - Overview of accounts with their roles, role totals and complaints
//! - Assigning and removing roles
//! - Resolving complaints
//!
//! [`AdminPanel`] drives the same operations for a stateful front end.

pub mod aggregator;
pub mod handlers;
pub mod middleware;
pub mod panel;
pub mod roles;
pub mod types;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::api::AppState;
use crate::moderation;

pub use aggregator::{load_collections, load_overview};
pub use middleware::require_admin;
pub use panel::AdminPanel;
pub use roles::{assign_role, remove_role};
pub use types::{AdminCollections, AdminError, AdminOverview, RoleCounts};

/// Create the admin router.
///
/// All routes require the admin role (applied via middleware); the auth
/// layer must run first.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/overview", get(handlers::get_overview))
        .route(
            "/users/{id}/role",
            put(handlers::set_user_role).delete(handlers::delete_user_role),
        )
        .route(
            "/complaints/{id}/resolve",
            post(moderation::handlers::resolve),
        )
        .layer(from_fn_with_state(state, require_admin))
}
