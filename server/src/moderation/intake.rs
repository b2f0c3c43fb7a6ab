//! Public submission paths: complaints and contact messages.

use tracing::info;
use validator::Validate;

use super::types::{ComplaintForm, ComplaintStatus, ContactForm};
use crate::store::{encode_row, StoreError, Table, TableStore};

/// Intake error types.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl axum::response::IntoResponse for IntakeError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, code, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Self::Store(err) => {
                tracing::error!("Store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Store error".to_string(),
                )
            }
        };
        (
            status,
            axum::Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Record a new pending complaint.
pub async fn submit_complaint(
    store: &dyn TableStore,
    form: &ComplaintForm,
) -> Result<(), IntakeError> {
    let form = ComplaintForm {
        email: trimmed(&form.email),
        phone: trimmed(&form.phone),
        subject: trimmed(&form.subject),
        message: trimmed(&form.message),
    };
    form.validate()
        .map_err(|e| IntakeError::Validation(e.to_string()))?;

    let mut row = encode_row(&form)?;
    row.insert(
        "status".into(),
        serde_json::to_value(ComplaintStatus::Pending).map_err(StoreError::from)?,
    );
    store.insert(Table::Complaints, row).await?;

    info!(subject = %form.subject, "Complaint submitted");
    Ok(())
}

/// Append a contact-form message.
pub async fn submit_contact_message(
    store: &dyn TableStore,
    form: &ContactForm,
) -> Result<(), IntakeError> {
    let form = ContactForm {
        name: trimmed(&form.name),
        email: trimmed(&form.email),
        message: trimmed(&form.message),
    };
    form.validate()
        .map_err(|e| IntakeError::Validation(e.to_string()))?;

    store
        .insert(Table::ContactMessages, encode_row(&form)?)
        .await?;

    info!("Contact message received");
    Ok(())
}
