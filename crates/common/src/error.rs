//! Error types for reviewboard.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Validation Errors ===
    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    #[error("Review title is required")]
    MissingTitle,

    #[error("Review text is required")]
    MissingText,

    #[error("Select at least one category")]
    MissingCategories,

    #[error("No book selected; pick one of the search results")]
    NoSelectionMade,

    #[error("Enter a keyword to search for")]
    MissingKeyword,

    #[error("That username is already taken")]
    UsernameTaken,

    #[error("Validation error: {0}")]
    Validation(String),

    // === Access Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not permitted: {0}")]
    PermissionDenied(String),

    #[error("Login required")]
    AuthenticationRequired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    // === External Dependencies ===
    #[error("{message}")]
    ExternalServiceUnavailable {
        /// User-facing message.
        message: String,
        /// Last underlying failure, kept for diagnostics.
        cause: String,
    },

    #[error("Upstream rejected the request ({status}): {message}")]
    UpstreamRejected {
        /// HTTP status returned by the upstream service.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    #[error("Could not fetch page metadata: {0}")]
    MetadataFetchFailed(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    // === Server Errors ===
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::InvalidRating
            | Self::MissingTitle
            | Self::MissingText
            | Self::MissingCategories
            | Self::NoSelectionMade
            | Self::MissingKeyword
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UsernameTaken | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::AuthenticationRequired | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            // External dependencies
            Self::ExternalServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamRejected { .. } | Self::MetadataFetchFailed(_) => {
                StatusCode::BAD_GATEWAY
            }

            // 5xx Server Errors
            Self::NotConfigured(_)
            | Self::Database(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRating => "INVALID_RATING",
            Self::MissingTitle => "MISSING_TITLE",
            Self::MissingText => "MISSING_TEXT",
            Self::MissingCategories => "MISSING_CATEGORIES",
            Self::NoSelectionMade => "NO_SELECTION_MADE",
            Self::MissingKeyword => "MISSING_KEYWORD",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::ExternalServiceUnavailable { .. } => "EXTERNAL_SERVICE_UNAVAILABLE",
            Self::UpstreamRejected { .. } => "UPSTREAM_REJECTED",
            Self::MetadataFetchFailed(_) => "METADATA_FETCH_FAILED",
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns whether this error rejects user input, so the submitted form
    /// should be shown again with its values intact.
    #[must_use]
    pub const fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidRating
                | Self::MissingTitle
                | Self::MissingText
                | Self::MissingCategories
                | Self::NoSelectionMade
                | Self::MissingKeyword
                | Self::UsernameTaken
                | Self::Validation(_)
                | Self::InvalidCredentials
                | Self::ExternalServiceUnavailable { .. }
                | Self::UpstreamRejected { .. }
                | Self::MetadataFetchFailed(_)
        )
    }

    /// Where a client should send the user after this error, if anywhere.
    ///
    /// Authentication failures go to the login page; missing or forbidden
    /// resources fall back to the public listing.
    #[must_use]
    pub const fn redirect_to(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationRequired => Some("/login"),
            Self::NotFound(_) | Self::PermissionDenied(_) => Some("/"),
            _ => None,
        }
    }

    /// Builds the JSON error object shared by every error response.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        if let Some(target) = self.redirect_to() {
            body["redirectTo"] = json!(target);
        }
        body
    }

    /// Logs this error at a level matching its severity.
    pub fn log(&self) {
        let code = self.error_code();
        match self {
            Self::NotConfigured(_) => {
                tracing::error!(error = %self, code = code, "Required configuration is missing");
            }
            Self::ExternalServiceUnavailable { cause, .. } => {
                tracing::warn!(error = %self, cause = %cause, code = code, "External service unavailable");
            }
            _ if self.is_server_error() => {
                tracing::error!(error = %self, code = code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %self, code = code, "Client error occurred");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(json!({ "error": self.to_json() }));
        (self.status_code(), body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
