use axum::{Json, extract::State, response::IntoResponse};
use tracing::warn;

use tabhub_db::models::ReplyRow;
use tabhub_db::time;
use tabhub_types::api::ReplyCreated;
use tabhub_types::models::Reply;

use crate::ApiError;
use crate::encoding::encode_pdf;
use crate::extract::{ApiMultipart, ApiPath};
use crate::state::{AppState, blocking};
use crate::upload::read_reply_form;

/// POST /replies. Stores the reply only; the two counters are bumped by
/// separate calls unless the caller uses POST /replies/submit.
pub async fn create_reply(
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<impl IntoResponse, ApiError> {
    let new = read_reply_form(multipart).await?;
    let row = blocking(&state, move |db| Ok(db.create_reply(new)?)).await?;
    Ok(Json(to_created(row)))
}

/// POST /replies/submit: store the reply and bump both counters atomically.
pub async fn submit_reply(
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<impl IntoResponse, ApiError> {
    let new = read_reply_form(multipart).await?;
    let row = blocking(&state, move |db| Ok(db.submit_reply(new)?)).await?;
    Ok(Json(to_created(row)))
}

/// GET /replies/{request_id}
pub async fn replies_by_request(
    State(state): State<AppState>,
    ApiPath(request_id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| Ok(db.replies_by_request(&request_id)?)).await?;
    Ok(Json(rows.into_iter().map(to_reply).collect::<Vec<_>>()))
}

/// GET /replies/user/{user_id}
pub async fn replies_by_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| Ok(db.replies_by_user(user_id)?)).await?;
    Ok(Json(rows.into_iter().map(to_reply).collect::<Vec<_>>()))
}

fn parse_date(row: &ReplyRow) -> chrono::DateTime<chrono::Utc> {
    time::parse(&row.date).unwrap_or_else(|| {
        warn!("Corrupt date '{}' on reply '{}'", row.date, row.id);
        chrono::DateTime::default()
    })
}

fn to_reply(row: ReplyRow) -> Reply {
    Reply {
        date: parse_date(&row),
        id: row.id,
        pdf: encode_pdf(row.pdf.as_deref()),
        request_id: row.request_id,
        username: row.username,
        comment: row.comment,
        user_id: row.user_id,
        song: row.song,
        artist: row.artist,
    }
}

fn to_created(row: ReplyRow) -> ReplyCreated {
    ReplyCreated {
        date: parse_date(&row),
        id: row.id,
        request_id: row.request_id,
        username: row.username,
        comment: row.comment,
        user_id: row.user_id,
        song: row.song,
        artist: row.artist,
    }
}
