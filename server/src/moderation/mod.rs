//! Complaint moderation.
//!
//! Public intake of complaints and contact messages, and the admin-only
//! `pending -> resolved` transition.

pub mod handlers;
pub mod intake;
pub mod resolution;
pub mod types;

use axum::{routing::post, Router};

use crate::api::AppState;

pub use intake::{submit_complaint, submit_contact_message, IntakeError};
pub use resolution::resolve_complaint;
pub use types::{
    Complaint, ComplaintError, ComplaintForm, ComplaintReply, ComplaintState, ComplaintStatus,
    ContactForm,
};

/// Public submission routes (no authentication).
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/complaints", post(handlers::create_complaint))
        .route("/contact", post(handlers::create_contact_message))
}
