//! Category endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use reviewboard_common::AppResult;
use serde::Serialize;

use super::reviews::{CategoryResponse, ReviewResponse, to_responses};
use crate::{middleware::AppState, response::ApiResponse};

/// Reviews under one category.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReviewsResponse {
    pub category: CategoryResponse,
    pub reviews: Vec<ReviewResponse>,
}

/// All categories, ordered by name.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let categories = state.category_service.list().await?;
    Ok(ApiResponse::ok(
        categories.into_iter().map(Into::into).collect(),
    ))
}

/// Active reviews tagged with a category.
async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<CategoryReviewsResponse>> {
    let listing = state.review_query_service.by_category(id).await?;
    Ok(ApiResponse::ok(CategoryReviewsResponse {
        category: listing.category.into(),
        reviews: to_responses(listing.reviews),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/reviews", get(reviews))
}
