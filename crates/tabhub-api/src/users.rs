use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use tabhub_db::models::UserRow;
use tabhub_db::time;
use tabhub_types::api::{LoginRequest, MessageResponse, SignupRequest, SignupResponse};
use tabhub_types::models::User;

use crate::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::{AppState, blocking, compute};

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |db| Ok(db.list_users()?)).await?;
    Ok(Json(rows.into_iter().map(to_user).collect::<Vec<_>>()))
}

/// POST /users. Stores an Argon2 hash of the password, never the password.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username must not be empty".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".into()));
    }

    let password = req.password;
    let password_hash = compute(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
    })
    .await?;

    let (username, name, email) = (req.username, req.name, req.email);
    let row = blocking(&state, move |db| {
        Ok(db.create_user(&username, &name, &email, &password_hash)?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: row.id,
            username: row.username,
            email: row.email,
        }),
    ))
}

/// POST /users/login. Unknown user and wrong password both answer 401.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let user = blocking(&state, move |db| Ok(db.get_user_by_username(&username)?)).await?;
    let Some(row) = user else {
        warn!("Failed login for {}", req.username);
        return Err(ApiError::InvalidCredentials);
    };

    let stored = row.password.clone();
    let password = req.password;
    let verified = compute(move || {
        let parsed_hash = PasswordHash::new(&stored)
            .map_err(|e| ApiError::Internal(format!("stored credential is corrupt: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await?;

    if !verified {
        warn!("Failed login for {}", req.username);
        return Err(ApiError::InvalidCredentials);
    }

    info!("User {} logged in", row.username);
    Ok(Json(to_user(row)))
}

/// PUT /users/{id}: one more request authored by this user.
pub async fn increment_requests_num(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| Ok(db.increment_requests_num(id)?)).await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// PUT /users/replies/{id}: one more reply authored by this user.
pub async fn increment_replies_num(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| Ok(db.increment_replies_num(id)?)).await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

pub(crate) fn to_user(row: UserRow) -> User {
    User {
        created_at: time::parse(&row.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on user {}", row.created_at, row.id);
            chrono::DateTime::default()
        }),
        id: row.id,
        username: row.username,
        name: row.name,
        email: row.email,
        requests_num: row.requests_num,
        replies_num: row.replies_num,
    }
}
