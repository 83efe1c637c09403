//! User endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use reviewboard_common::AppResult;
use reviewboard_db::entities::user;
use serde::Serialize;

use super::reviews::{ReviewResponse, to_responses};
use crate::{middleware::AppState, response::ApiResponse};

/// Public user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Show a user.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// A user's active reviews.
async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    // 404 for unknown users rather than an empty list
    let user = state.user_service.get(&id).await?;
    let reviews = state.review_query_service.by_user(&user.id).await?;
    Ok(ApiResponse::ok(to_responses(reviews)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/reviews", get(reviews))
}
