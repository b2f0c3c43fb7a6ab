//! HTTP Integration Tests for the public intake forms
//!
//! Run with: `cargo test --test moderation_http_test -- --nocapture`

mod helpers;

use axum::http::Method;
use helpers::{body_to_json, TestApp};
use serde_json::json;
use studyhub_server::store::Table;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let resp = app.send_json(Method::GET, "/health", None, None).await;
    assert_eq!(resp.status(), 200);

    let json = body_to_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], false);
}

#[tokio::test]
async fn test_submit_complaint_creates_pending_row() {
    let app = TestApp::new();

    let resp = app
        .send_json(
            Method::POST,
            "/api/complaints",
            None,
            Some(json!({
                "email": "student@uni.edu",
                "phone": "555-0100",
                "subject": "Quiz page crashes",
                "message": "It fails when I submit.",
            })),
        )
        .await;
    assert_eq!(resp.status(), 201);

    let rows = app.store.rows(Table::Complaints).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "pending");
    assert!(rows[0]
        .get("admin_reply")
        .is_none_or(serde_json::Value::is_null));
}

#[tokio::test]
async fn test_submit_complaint_validation_errors() {
    let app = TestApp::new();

    let resp = app
        .send_json(
            Method::POST,
            "/api/complaints",
            None,
            Some(json!({
                "email": "not-an-email",
                "phone": "555-0100",
                "subject": "Subject",
                "message": "Body",
            })),
        )
        .await;
    assert_eq!(resp.status(), 400, "Invalid email should return 400");
    assert_eq!(body_to_json(resp).await["error"], "VALIDATION_ERROR");
    assert!(app.store.rows(Table::Complaints).await.is_empty());
}

#[tokio::test]
async fn test_submit_contact_message() {
    let app = TestApp::new();

    let resp = app
        .send_json(
            Method::POST,
            "/api/contact",
            None,
            Some(json!({
                "name": "Ada",
                "email": "ada@uni.edu",
                "message": "Do you offer group plans?",
            })),
        )
        .await;
    assert_eq!(resp.status(), 201);

    let rows = app.store.rows(Table::ContactMessages).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Ada");
}

#[tokio::test]
async fn test_contact_store_failure_returns_500() {
    let app = TestApp::new();
    app.store.set_failing(Table::ContactMessages, true).await;

    let resp = app
        .send_json(
            Method::POST,
            "/api/contact",
            None,
            Some(json!({
                "name": "Ada",
                "email": "ada@uni.edu",
                "message": "Hello",
            })),
        )
        .await;
    assert_eq!(resp.status(), 500);
}
