//! Handlers for signup, login and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use versawiki_core::validation::validate_signup;
use versawiki_db::models::user::UserResponse;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{cleared_session_cookie, session_cookie, MaybeUser};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    /// Must repeat `password`.
    pub verify: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /signup
///
/// Register a user and start a session. Field problems come back together
/// as a 422 with a `fields` map; a taken username is a 409.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    validate_signup(
        &input.username,
        &input.password,
        &input.verify,
        input.email.as_deref(),
    )
    .map_err(AppError::Signup)?;

    let user = state
        .wiki
        .credentials
        .register(&input.username, &input.password, input.email.as_deref())
        .await?;

    let cookie = session_cookie(&state.wiki.session_token(&user));
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /login
///
/// Check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .wiki
        .credentials
        .verify_login(&input.username, &input.password)
        .await?;

    tracing::info!(user_id = user.id, "User logged in");
    let cookie = session_cookie(&state.wiki.session_token(&user));
    Ok((
        [(SET_COOKIE, cookie)],
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /logout
///
/// Clear the session cookie. Succeeds whether or not a session existed.
pub async fn logout(MaybeUser(user): MaybeUser) -> impl IntoResponse {
    if let Some(user) = user {
        tracing::info!(user_id = user.id, "User logged out");
    }
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cleared_session_cookie())])
}
