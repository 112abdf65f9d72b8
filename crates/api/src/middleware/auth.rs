//! Cookie session extractors for Axum handlers.
//!
//! The session cookie holds the user's id signed with the server's
//! [`IntegrityCodec`](versawiki_core::integrity::IntegrityCodec). A missing,
//! forged or stale cookie means "not logged in"; it is never an error on its
//! own.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use versawiki_core::error::CoreError;
use versawiki_db::models::user::User;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "user_id";

/// `Set-Cookie` value establishing a session with `token`.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/")
}

/// `Set-Cookie` value ending the session.
pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/")
}

/// The session cookie's value, if the request carries a non-empty one.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// The logged-in user, if any.
///
/// ```ignore
/// async fn show(MaybeUser(user): MaybeUser) -> AppResult<Json<()>> {
///     tracing::info!(logged_in = user.is_some(), "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        let user = state.wiki.session_user(token).await?;
        if user.is_none() {
            tracing::debug!("Ignoring invalid session cookie");
        }
        Ok(MaybeUser(user))
    }
}

/// The logged-in user; requests without a valid session are rejected with
/// 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(AuthUser).ok_or_else(|| {
            AppError::from(CoreError::Unauthorized("You must be logged in".into()))
        })
    }
}
