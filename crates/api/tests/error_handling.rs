//! `AppError` to HTTP response mapping, checked without a server.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use versawiki_api::error::AppError;
use versawiki_cache::CacheError;
use versawiki_core::error::{CoreError, NoOpReason};
use versawiki_core::validation::SignupErrors;
use versawiki_db::StoreError;
use versawiki_wiki::WikiError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, json) = error_to_response(CoreError::not_found("Page", "/home").into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Page '/home' not found");
}

#[tokio::test]
async fn no_op_reasons_have_distinct_codes() {
    let (status, empty) = error_to_response(CoreError::NoOp(NoOpReason::Empty).into()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(empty["code"], "EMPTY_CONTENT");

    let (status, unchanged) =
        error_to_response(CoreError::NoOp(NoOpReason::Unchanged).into()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(unchanged["code"], "UNCHANGED_CONTENT");
    assert_ne!(empty["error"], unchanged["error"]);
}

#[tokio::test]
async fn domain_errors_map_to_client_statuses() {
    let cases = [
        (CoreError::Validation("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (CoreError::Conflict("taken".into()), StatusCode::CONFLICT, "CONFLICT"),
        (CoreError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
    ];
    for (err, expected_status, expected_code) in cases {
        let (status, json) = error_to_response(err.into()).await;
        assert_eq!(status, expected_status);
        assert_eq!(json["code"], expected_code);
    }
}

#[tokio::test]
async fn signup_errors_carry_fields() {
    let fields = SignupErrors {
        username: Some("That's not a valid username".into()),
        ..Default::default()
    };
    let (status, json) = error_to_response(AppError::Signup(fields)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["fields"]["username"], "That's not a valid username");
    assert!(json["fields"].get("email").is_none());
}

#[tokio::test]
async fn outages_are_503_without_details() {
    let store = AppError::Wiki(WikiError::Store(StoreError::Unavailable("pool closed".into())));
    let cache = AppError::Wiki(WikiError::Cache(CacheError::Contention {
        key: "page:/home".into(),
        attempts: 32,
    }));
    for err in [store, cache] {
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!json["error"].as_str().unwrap().contains("page:/home"));
        assert!(!json["error"].as_str().unwrap().contains("pool closed"));
    }
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(CoreError::Internal("Corrupt page history: 2 snapshots".into()).into())
            .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
