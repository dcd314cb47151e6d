mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn signup_returns_id_username_and_email() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/users",
            json!({"username": "alice", "name": "Alice", "email": "alice@example.com", "password": "Secret1!"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_i64());
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn duplicate_username_is_a_client_error() {
    let app = TestApp::new();
    app.signup("alice", "Secret1!").await;

    let (status, body) = app
        .post_json(
            "/api/users",
            json!({"username": "alice", "name": "Imposter", "email": "x@example.com", "password": "other"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    let (_, users) = app.get("/api/users").await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn signup_with_missing_fields_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/users", json!({"username": "alice"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn signup_with_empty_password_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .post_json(
            "/api/users",
            json!({"username": "alice", "name": "Alice", "email": "a@example.com", "password": ""}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_full_row_without_credential() {
    let app = TestApp::new();
    let id = app.signup("alice", "Secret1!").await;

    let (status, body) = app
        .post_json("/api/users/login", json!({"username": "alice", "password": "Secret1!"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["requestsNum"], 0);
    assert_eq!(body["repliesNum"], 0);
    assert!(body["created_at"].is_string());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn login_is_case_sensitive() {
    let app = TestApp::new();
    app.signup("alice", "Secret1!").await;

    for (username, password) in [("alice", "secret1!"), ("Alice", "Secret1!"), ("nobody", "Secret1!")] {
        let (status, body) = app
            .post_json("/api/users/login", json!({"username": username, "password": password}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{username}/{password}");
        assert_eq!(body["error"], "Invalid username or password");
    }
}

#[tokio::test]
async fn list_users_never_exposes_passwords() {
    let app = TestApp::new();
    app.signup("alice", "Secret1!").await;
    app.signup("bob", "hunter22").await;

    let (status, body) = app.get("/api/users").await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

#[tokio::test]
async fn counters_increment_through_their_endpoints() {
    let app = TestApp::new();
    let id = app.signup("alice", "Secret1!").await;

    let (status, body) = app.put(&format!("/api/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    app.put(&format!("/api/users/replies/{id}")).await;
    app.put(&format!("/api/users/replies/{id}")).await;

    let (_, user) = app
        .post_json("/api/users/login", json!({"username": "alice", "password": "Secret1!"}))
        .await;
    assert_eq!(user["requestsNum"], 1);
    assert_eq!(user["repliesNum"], 2);
}

#[tokio::test]
async fn incrementing_unknown_user_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.put("/api/users/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, _) = app.put("/api/users/replies/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_user_id_is_a_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.put("/api/users/replies/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
