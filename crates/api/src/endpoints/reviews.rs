//! Review endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use reviewboard_common::AppResult;
use reviewboard_core::{
    ActingUser, BookSelection, ReviewDetail, ReviewDraft, ReviewView, ReviewWithCategories,
};
use reviewboard_db::entities::{category, contents, contents::ContentsType, review};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{ApiResponse, FormError, WithForm, ok},
};

/// Category response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(category: category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Contents response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentsResponse {
    pub id: String,
    pub url: Option<String>,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub book_isbn: Option<String>,
    #[serde(rename = "type")]
    pub contents_type: ContentsType,
}

impl From<contents::Model> for ContentsResponse {
    fn from(contents: contents::Model) -> Self {
        Self {
            id: contents.id,
            url: contents.url,
            title: contents.title,
            thumbnail_url: contents.thumbnail_url,
            book_isbn: contents.book_isbn,
            contents_type: contents.contents_type,
        }
    }
}

/// Review response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub contents_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub rating: i16,
    pub title: String,
    pub text: String,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<ContentsResponse>,
    pub category_ids: Vec<i32>,
    pub categories: Vec<CategoryResponse>,
}

impl ReviewResponse {
    fn build(
        review: review::Model,
        categories: Vec<category::Model>,
        contents: Option<contents::Model>,
        author_name: Option<String>,
    ) -> Self {
        Self {
            id: review.id,
            contents_id: review.contents_id,
            user_id: review.user_id,
            author_name,
            rating: review.rating,
            title: review.title,
            text: review.text,
            is_active: review.is_active,
            created_at: review.created_at,
            updated_at: review.updated_at,
            contents: contents.map(Into::into),
            category_ids: categories.iter().map(|c| c.id).collect(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ReviewView> for ReviewResponse {
    fn from(view: ReviewView) -> Self {
        Self::build(view.review, view.categories, view.contents, view.author_name)
    }
}

impl From<ReviewWithCategories> for ReviewResponse {
    fn from(authored: ReviewWithCategories) -> Self {
        Self::build(authored.review, authored.categories, None, None)
    }
}

pub(crate) fn to_responses(views: Vec<ReviewView>) -> Vec<ReviewResponse> {
    views.into_iter().map(Into::into).collect()
}

/// Review detail response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetailResponse {
    pub review: ReviewResponse,
    /// Reviews of the same contents by other users.
    pub others: Vec<ReviewResponse>,
    pub editable: bool,
}

impl From<ReviewDetail> for ReviewDetailResponse {
    fn from(detail: ReviewDetail) -> Self {
        Self {
            review: detail.view.into(),
            others: to_responses(detail.others),
            editable: detail.editable,
        }
    }
}

/// Keyword search query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

/// Keyword search response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub keyword: String,
    pub total: u64,
    pub reviews: Vec<ReviewResponse>,
}

/// Review of a book picked from search results.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookReviewRequest {
    pub isbn: Option<String>,
    pub item_url: Option<String>,
    pub preview_title: Option<String>,
    pub preview_image: Option<String>,
    /// The search query the book was found with.
    #[serde(default)]
    pub query: String,
    #[serde(flatten)]
    pub draft: ReviewDraft,
}

/// Review of an arbitrary web page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlReviewRequest {
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub draft: ReviewDraft,
}

/// Active reviews, newest first.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let reviews = state.review_query_service.list_active().await?;
    Ok(ApiResponse::ok(to_responses(reviews)))
}

/// Search active reviews by keyword.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse<SearchResponse>, FormError<SearchQuery>> {
    let result = state
        .review_query_service
        .search(&query.keyword)
        .await
        .with_form(query)?;

    Ok(ApiResponse::ok(SearchResponse {
        keyword: result.keyword,
        total: result.total,
        reviews: to_responses(result.reviews),
    }))
}

/// Show one review.
async fn show(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReviewDetailResponse>> {
    let detail = state.review_query_service.show(&id, viewer.id()).await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Current values for the edit form.
async fn edit_form(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.review_service.load_for_edit(&id, viewer.id()).await?;
    Ok(ApiResponse::ok(review.into()))
}

/// Overwrite a review.
async fn edit(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<String>,
    Json(draft): Json<ReviewDraft>,
) -> Result<ApiResponse<ReviewResponse>, FormError<ReviewDraft>> {
    let review = state
        .review_service
        .edit_review(&id, viewer.id(), draft.clone())
        .await
        .with_form(draft)?;

    Ok(ApiResponse::ok(review.into()))
}

/// Logically delete a review.
async fn delete(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.review_service.deactivate_review(&id, viewer.id()).await?;
    Ok(ok())
}

/// Review a book picked from search results.
async fn compose_book(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Json(req): Json<BookReviewRequest>,
) -> Result<ApiResponse<ReviewResponse>, FormError<BookReviewRequest>> {
    let selection = BookSelection {
        isbn: req.isbn.clone(),
        url: req.item_url.clone(),
        preview_title: req.preview_title.clone(),
        preview_image: req.preview_image.clone(),
        fallback_title: req.query.clone(),
    };

    let review = state
        .review_service
        .compose_from_book(ActingUser::from_session(viewer.id()), selection, req.draft.clone())
        .await
        .with_form(req)?;

    Ok(ApiResponse::ok(review.into()))
}

/// Review any web page by URL.
async fn compose_url(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Json(req): Json<UrlReviewRequest>,
) -> Result<ApiResponse<ReviewResponse>, FormError<UrlReviewRequest>> {
    let review = state
        .review_service
        .compose_from_url(
            ActingUser::from_session(viewer.id()),
            req.url.clone(),
            req.draft.clone(),
        )
        .await
        .with_form(req)?;

    Ok(ApiResponse::ok(review.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/search", get(search))
        .route("/book", post(compose_book))
        .route("/url", post(compose_url))
        .route("/{id}", get(show))
        .route("/{id}/edit", get(edit_form).post(edit))
        .route("/{id}/delete", post(delete))
}
