use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use versawiki_cache::CacheError;
use versawiki_core::error::CoreError;
use versawiki_core::validation::SignupErrors;
use versawiki_db::StoreError;
use versawiki_wiki::WikiError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`WikiError`] for everything the stores report, plus per-field
/// signup failures. Every variant renders as
/// `{ "error": <message>, "code": <CODE> }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Wiki(#[from] WikiError),

    /// A signup form with one or more invalid fields; the body also carries
    /// a `fields` map.
    #[error("Invalid signup")]
    Signup(SignupErrors),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Wiki(WikiError::Core(err))
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Wiki(WikiError::Core(core)) => classify_core_error(core),
            AppError::Wiki(WikiError::Store(err)) => classify_store_error(err),
            AppError::Wiki(WikiError::Cache(err)) => classify_cache_error(err),

            AppError::Signup(fields) => {
                let body = json!({
                    "error": "Invalid signup",
                    "code": "VALIDATION_ERROR",
                    "fields": fields,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::NoOp(reason) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            reason.code(),
            reason.message().to_string(),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Duplicate(constraint) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Durable store unavailable");
            unavailable()
        }
        StoreError::Database(db_err) => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}

fn classify_cache_error(err: &CacheError) -> (StatusCode, &'static str, String) {
    match err {
        CacheError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Cache unavailable");
            unavailable()
        }
        CacheError::Contention { key, attempts } => {
            tracing::warn!(key = %key, attempts, "Cache write abandoned under contention");
            unavailable()
        }
        CacheError::Encode(err) => {
            tracing::error!(error = %err, "Cache encoding error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn unavailable() -> (StatusCode, &'static str, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "SERVICE_UNAVAILABLE",
        "The service is temporarily unavailable".to_string(),
    )
}
