//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reviewboard_common::AppError;
use serde::Serialize;
use serde_json::json;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub fn ok() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// An error raised while handling a submitted form.
///
/// Input rejections echo the submitted values back under `form` so the
/// client can show the form again as it was. Every other error renders
/// exactly like a bare [`AppError`].
#[derive(Debug)]
pub struct FormError<F: Serialize> {
    pub error: AppError,
    pub form: F,
}

impl<F: Serialize> IntoResponse for FormError<F> {
    fn into_response(self) -> Response {
        if !self.error.is_input_rejection() {
            return self.error.into_response();
        }

        self.error.log();
        let body = json!({
            "error": self.error.to_json(),
            "form": self.form,
        });
        (self.error.status_code(), Json(body)).into_response()
    }
}

/// Attach the submitted form to a failed result.
pub trait WithForm<T> {
    fn with_form<F: Serialize>(self, form: F) -> Result<T, FormError<F>>;
}

impl<T> WithForm<T> for Result<T, AppError> {
    fn with_form<F: Serialize>(self, form: F) -> Result<T, FormError<F>> {
        self.map_err(|error| FormError { error, form })
    }
}
