//! Book search endpoint.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use reviewboard_common::AppError;
use reviewboard_core::BookSummary;
use serde::{Deserialize, Serialize};

use crate::{
    middleware::AppState,
    response::{ApiResponse, FormError, WithForm},
};

/// Book search query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookSearchQuery {
    #[serde(default)]
    pub title: String,
}

/// Book search response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSearchResponse {
    pub query: String,
    pub items: Vec<BookSummary>,
}

/// Search the external catalog by title.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<BookSearchQuery>,
) -> Result<ApiResponse<BookSearchResponse>, FormError<BookSearchQuery>> {
    let title = query.title.trim().to_string();
    if title.is_empty() {
        return Err(FormError {
            error: AppError::Validation("Enter a title to search for".to_string()),
            form: query,
        });
    }

    let items = state
        .book_search
        .search_by_title(&title, state.book_search_hits)
        .await
        .with_form(query)?;

    Ok(ApiResponse::ok(BookSearchResponse { query: title, items }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search))
}
