//! Endpoints for the logged-in user.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use reviewboard_common::AppResult;
use reviewboard_core::UpdateProfileInput;

use super::reviews::{ReviewResponse, to_responses};
use super::users::UserResponse;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, FormError, WithForm},
};

/// The logged-in user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

/// Change username and optionally password.
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateProfileInput>,
) -> Result<ApiResponse<UserResponse>, FormError<UpdateProfileInput>> {
    let updated = state
        .user_service
        .update_profile(&user.id, req.clone())
        .await
        .with_form(req)?;

    Ok(ApiResponse::ok(updated.into()))
}

/// The logged-in user's active reviews.
async fn my_reviews(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let reviews = state.review_query_service.by_user(&user.id).await?;
    Ok(ApiResponse::ok(to_responses(reviews)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me))
        .route("/profile", post(update_profile))
        .route("/reviews", get(my_reviews))
}
