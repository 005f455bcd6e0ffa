//! End-to-end tests driving the full router the way an HTTP client would:
//! register, login, then exercise the token-protected task endpoints.

use api_lib::adapters::{InMemorySessions, SqliteAdapter};
use api_lib::config::Config;
use api_lib::web::{api_router, state::AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> Router {
    // One connection keeps the in-memory SQLite database alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let db = Arc::new(SqliteAdapter::new(pool));
    db.run_migrations().await.unwrap();

    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        log_level: tracing::Level::INFO,
    };

    let state = Arc::new(AppState {
        users: db.clone(),
        tasks: db,
        sessions: Arc::new(InMemorySessions::new()),
        config: Arc::new(config),
    });

    api_router(state)
}

/// Sends one request through the router and returns the status plus the
/// parsed JSON body (Null when the body is empty, e.g. 204s).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

/// Registers (ignoring conflicts) and logs in, returning the bearer token.
async fn login(app: &Router, username: &str, password: &str) -> String {
    register(app, username, password).await;
    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_then_login_then_create_then_get() {
    let app = test_app().await;

    let (status, registered) = register(&app, "alice", "pw1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["username"], "alice");
    let alice_id = registered["user_id"].as_i64().unwrap();

    let (status, login_body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login_body["user_id"], alice_id);
    assert_eq!(login_body["username"], "alice");
    let token = login_body["token"].as_str().unwrap();

    // Status is forced to Pending no matter what the client sends.
    let (status, created) = send(
        &app,
        "POST",
        "/tasks/create",
        Some(token),
        Some(json!({ "name": "X", "description": "Y", "status": "Completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "Pending");
    assert_eq!(created["user_id"], alice_id);
    let task_id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/tasks/{}", task_id),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, listed) = send(&app, "GET", "/tasks", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_missing_fields_are_rejected() {
    let app = test_app().await;

    let (status, _) = register(&app, "alice", "pw1").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = register(&app, "alice", "other").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_both_get_401() {
    let app = test_app().await;
    register(&app, "alice", "pw1").await;

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "nobody", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn task_routes_require_a_valid_bearer_token() {
    let app = test_app().await;

    let (status, _) = send(&app, "GET", "/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/tasks", Some("made-up-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tasks_are_invisible_across_users() {
    let app = test_app().await;
    let alice = login(&app, "alice", "pw1").await;
    let bob = login(&app, "bob", "pw2").await;

    let (_, created) = send(
        &app,
        "POST",
        "/tasks/create",
        Some(&alice),
        Some(json!({ "name": "Secret", "description": "" })),
    )
    .await;
    let task_id = created["id"].as_i64().unwrap();

    // Bob sees 404 everywhere, never a hint the task exists.
    let uri = format!("/tasks/{}", task_id);
    let (status, _) = send(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/tasks/delete/{}", task_id);
    let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/tasks/complete/{}", task_id);
    let (status, _) = send(&app, "POST", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = send(&app, "GET", "/tasks", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());

    // Alice's task is untouched.
    let uri = format!("/tasks/{}", task_id);
    let (status, fetched) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "Pending");
}

#[tokio::test]
async fn delete_succeeds_once_then_404s() {
    let app = test_app().await;
    let token = login(&app, "alice", "pw1").await;

    let (_, created) = send(
        &app,
        "POST",
        "/tasks/create",
        Some(&token),
        Some(json!({ "name": "Ephemeral", "description": "" })),
    )
    .await;
    let uri = format!("/tasks/delete/{}", created["id"].as_i64().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_transitions_and_filters() {
    let app = test_app().await;
    let token = login(&app, "alice", "pw1").await;

    let (_, created) = send(
        &app,
        "POST",
        "/tasks/create",
        Some(&token),
        Some(json!({ "name": "Flip me", "description": "" })),
    )
    .await;
    let task_id = created["id"].as_i64().unwrap();

    let uri = format!("/tasks/complete/{}", task_id);
    let (status, updated) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Completed");

    // Repeating the transition is a no-op returning the same state,
    // and PATCH works as well as POST.
    let (status, repeated) = send(&app, "PATCH", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repeated, updated);

    let (status, completed) = send(&app, "GET", "/tasks/completed", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed.as_array().unwrap().len(), 1);

    // No match is an empty 200 array, not a 404.
    let (status, pending) = send(&app, "GET", "/tasks/pending", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(pending.as_array().unwrap().is_empty());

    let uri = format!("/tasks/in-progress/{}", task_id);
    let (status, updated) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "In Progress");
}

#[tokio::test]
async fn dates_serialize_as_plain_calendar_days() {
    let app = test_app().await;
    let token = login(&app, "alice", "pw1").await;

    let (_, created) = send(
        &app,
        "POST",
        "/tasks/create",
        Some(&token),
        Some(json!({ "name": "Dated", "description": "", "date": "2024-03-01" })),
    )
    .await;
    assert_eq!(created["date"], "2024-03-01");

    // Empty string means "today".
    let (_, defaulted) = send(
        &app,
        "POST",
        "/tasks/create",
        Some(&token),
        Some(json!({ "name": "Undated", "description": "", "date": "" })),
    )
    .await;
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(defaulted["date"], today);
}

#[tokio::test]
async fn non_numeric_task_ids_are_a_bad_request() {
    let app = test_app().await;
    let token = login(&app, "alice", "pw1").await;

    let (status, _) = send(&app, "GET", "/tasks/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
