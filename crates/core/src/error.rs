use std::fmt;

/// Why an edit was rejected without touching the page history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The submitted content was empty.
    Empty,
    /// The submitted content equals the latest version.
    Unchanged,
}

impl NoOpReason {
    /// User-facing message; each reason gets its own wording.
    pub fn message(self) -> &'static str {
        match self {
            NoOpReason::Empty => "Page content must not be empty",
            NoOpReason::Unchanged => "No changes were made to the page",
        }
    }

    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            NoOpReason::Empty => "EMPTY_CONTENT",
            NoOpReason::Unchanged => "UNCHANGED_CONTENT",
        }
    }
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Edit rejected: {0}")]
    NoOp(NoOpReason),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            key: key.into(),
        }
    }
}
