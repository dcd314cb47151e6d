use axum::{Json, extract::State, response::IntoResponse};
use tracing::warn;

use tabhub_db::models::{NewRequest, RequestRow};
use tabhub_db::time;
use tabhub_types::api::{CreateTabRequest, MessageResponse};
use tabhub_types::models::TabRequest;

use crate::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::{AppState, blocking};

/// GET /requests
pub async fn list_requests(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |db| Ok(db.list_requests()?)).await?;
    Ok(Json(to_requests(rows)))
}

/// POST /requests. Inserts the row only; the author's `requestsNum` is the
/// caller's business (PUT /users/{id}) unless it uses POST /requests/submit.
pub async fn create_request(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTabRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = new_request(req)?;
    let row = blocking(&state, move |db| Ok(db.create_request(&new)?)).await?;
    Ok(Json(to_request(row)))
}

/// POST /requests/submit: insert and count against the author atomically.
pub async fn submit_request(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTabRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = new_request(req)?;
    let row = blocking(&state, move |db| Ok(db.submit_request(&new)?)).await?;
    Ok(Json(to_request(row)))
}

/// GET /requests/search/{text}
pub async fn search_requests(
    State(state): State<AppState>,
    ApiPath(text): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| Ok(db.search_requests(&text)?)).await?;
    Ok(Json(to_requests(rows)))
}

/// GET /requests/search: the empty search, which matches everything.
pub async fn search_all_requests(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |db| Ok(db.search_requests("")?)).await?;
    Ok(Json(to_requests(rows)))
}

/// GET /requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(&state, move |db| Ok(db.get_request(&id)?)).await?;
    Ok(Json(to_request(row)))
}

/// GET /requests/user/{user_id}
pub async fn requests_by_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| Ok(db.requests_by_user(user_id)?)).await?;
    Ok(Json(to_requests(rows)))
}

/// PUT /requests/{id}: one more reply against this request.
pub async fn increment_reply_count(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| Ok(db.increment_reply_count(&id)?)).await?;
    Ok(Json(MessageResponse::new("Request updated successfully")))
}

fn new_request(req: CreateTabRequest) -> Result<NewRequest, ApiError> {
    if req.id.trim().is_empty() {
        return Err(ApiError::BadRequest("id must not be empty".into()));
    }

    Ok(NewRequest {
        id: req.id,
        user: req.user,
        user_id: req.user_id,
        song: req.song,
        artist: req.artist,
        comment: req.comment,
        link: req.link,
    })
}

fn to_requests(rows: Vec<RequestRow>) -> Vec<TabRequest> {
    rows.into_iter().map(to_request).collect()
}

fn to_request(row: RequestRow) -> TabRequest {
    TabRequest {
        date: time::parse(&row.date).unwrap_or_else(|| {
            warn!("Corrupt date '{}' on request '{}'", row.date, row.id);
            chrono::DateTime::default()
        }),
        id: row.id,
        user: row.user,
        user_id: row.user_id,
        song: row.song,
        artist: row.artist,
        comment: row.comment,
        number_of_replies: row.number_of_replies,
        link: row.link,
    }
}
