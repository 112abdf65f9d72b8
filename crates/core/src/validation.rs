//! Input validation for usernames, passwords, emails, page paths and the
//! `version` query parameter.
//!
//! The HTTP layer runs these before calling into the stores, and the stores
//! run them again: nothing downstream assumes the caller already checked.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::VersionNumber;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,20}$").expect("valid regex"));
static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.{3,20}$").expect("valid regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("valid regex")
});
static PAGE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/(?:[a-zA-Z0-9_-]+/?)*)$").expect("valid regex"));

pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "Username must be 3-20 letters, digits, '_' or '-'".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if !PASSWORD_RE.is_match(password) {
        return Err(CoreError::Validation(
            "Password must be 3-20 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation("Invalid email address".into()));
    }
    Ok(())
}

/// Validate a page path such as `/`, `/foo` or `/foo/bar/`.
pub fn validate_page_path(path: &str) -> Result<(), CoreError> {
    if !PAGE_PATH_RE.is_match(path) {
        return Err(CoreError::Validation(format!("Invalid page path '{path}'")));
    }
    Ok(())
}

/// Per-field signup errors, so a form can show every problem at once.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SignupErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.verify.is_none()
            && self.email.is_none()
    }
}

/// Check a signup submission field by field.
///
/// An empty `email` counts as "not provided".
pub fn validate_signup(
    username: &str,
    password: &str,
    verify: &str,
    email: Option<&str>,
) -> Result<(), SignupErrors> {
    let mut errors = SignupErrors::default();

    if let Err(CoreError::Validation(msg)) = validate_username(username) {
        errors.username = Some(msg);
    }
    if let Err(CoreError::Validation(msg)) = validate_password(password) {
        errors.password = Some(msg);
    } else if password != verify {
        errors.verify = Some("Passwords do not match".into());
    }
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        if let Err(CoreError::Validation(msg)) = validate_email(email) {
            errors.email = Some(msg);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Interpret the optional `version` query parameter.
///
/// Only an all-digit string is treated as a version number; anything else
/// (including an absent parameter or an overflowing number) means "latest".
/// Range clamping happens later, against the actual history length.
pub fn parse_version_param(raw: Option<&str>) -> Option<VersionNumber> {
    let raw = raw?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
