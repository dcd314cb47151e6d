use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::ApiError;
use crate::state::AppState;
use crate::{docs, replies, requests, users};

/// Every resource route under `/api`, the per-resource API docs and
/// `/health`. Unknown paths and methods still answer with a JSON error.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Users
        .route("/api/users", get(users::list_users).post(users::signup))
        .route("/api/users/login", post(users::login))
        .route("/api/users/{id}", put(users::increment_requests_num))
        .route("/api/users/replies/{id}", put(users::increment_replies_num))
        // Requests
        .route(
            "/api/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/api/requests/submit", post(requests::submit_request))
        .route("/api/requests/search", get(requests::search_all_requests))
        .route("/api/requests/search/{text}", get(requests::search_requests))
        .route("/api/requests/user/{user_id}", get(requests::requests_by_user))
        .route(
            "/api/requests/{id}",
            get(requests::get_request).put(requests::increment_reply_count),
        )
        // Replies
        .route("/api/replies", post(replies::create_reply))
        .route("/api/replies/submit", post(replies::submit_reply))
        .route("/api/replies/user/{user_id}", get(replies::replies_by_user))
        .route("/api/replies/{request_id}", get(replies::replies_by_request))
        // Health check
        .route("/health", get(health))
        // API docs
        .merge(docs::routes())
        .fallback(no_route)
        .method_not_allowed_fallback(wrong_method)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn no_route() -> ApiError {
    ApiError::NotFound("Route not found".into())
}

async fn wrong_method() -> ApiError {
    ApiError::MethodNotAllowed
}
