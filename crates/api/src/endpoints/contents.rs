//! Contents endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use reviewboard_common::{AppError, PageMeta};
use serde::{Deserialize, Serialize};

use crate::{
    middleware::AppState,
    response::{ApiResponse, FormError, WithForm},
};

/// URL preview query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub url: String,
}

/// Fetch title and image for a URL without storing anything.
async fn preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<ApiResponse<PageMeta>, FormError<PreviewQuery>> {
    if query.url.trim().is_empty() {
        return Err(FormError {
            error: AppError::Validation("Enter a URL".to_string()),
            form: query,
        });
    }

    let meta = state.meta_fetcher.fetch(&query.url).await.with_form(query)?;
    Ok(ApiResponse::ok(meta))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/preview", get(preview))
}
