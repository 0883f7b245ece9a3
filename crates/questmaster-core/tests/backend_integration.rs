//! Integration tests for the companion backend client against a mock server.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use mockito::Matcher;
use questmaster_core::backend::BackendClient;
use questmaster_core::error::BackendError;
use questmaster_core::{Priority, Task, TaskCategory};
use serde_json::json;

fn task() -> Task {
    let at = Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap();
    Task {
        id: "task-1".into(),
        name: "File taxes".into(),
        category: TaskCategory::Finance,
        deadline: Utc.with_ymd_and_hms(2024, 8, 2, 9, 0, 0).unwrap(),
        priority: Priority::High,
        description: String::new(),
        completed: false,
        created_at: at,
        completed_at: None,
    }
}

#[tokio::test]
async fn test_register_and_duplicate() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("POST", "/register")
        .match_body(Matcher::PartialJson(json!({"email": "ana@example.com"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Registration successful"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
    let message = client.register("Ana", "ana@example.com", "secret1").await.unwrap();
    assert_eq!(message, "Registration successful");
    ok.assert_async().await;
    drop(ok);

    let _duplicate = server
        .mock("POST", "/register")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"User already exists"}"#)
        .create_async()
        .await;
    match client.register("Ana", "ana@example.com", "secret1").await {
        Err(BackendError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "User already exists");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _login = server
        .mock("POST", "/login")
        .with_status(401)
        .with_body(r#"{"message":"Invalid credentials"}"#)
        .create_async()
        .await;

    let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
    let err = client.login("ana@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, BackendError::Rejected { status: 401, .. }));
}

#[tokio::test]
async fn test_completion_email_outcome() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/task/completed")
        .match_body(Matcher::Json(json!({"email": "ana@example.com", "taskName": "File taxes"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Completion email sent","success":true}"#)
        .create_async()
        .await;

    let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
    let outcome = client.send_task_completed("ana@example.com", &task()).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Completion email sent");
    assert!(outcome.error.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deadline_email_failure_is_reported_not_raised() {
    let mut server = mockito::Server::new_async().await;
    let _deadline = server
        .mock("POST", "/task/deadline")
        .match_body(Matcher::PartialJson(json!({"deadline": "2024-08-02T09:00:00+00:00"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Failed to send reminder email","success":false,"error":"smtp down"}"#)
        .create_async()
        .await;

    let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
    let outcome = client.send_deadline_reminder("ana@example.com", &task()).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("smtp down"));
}

#[tokio::test]
async fn test_unreachable_server_yields_failed_outcome() {
    let client = BackendClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let outcome = client.send_task_completed("ana@example.com", &task()).await;
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
}
