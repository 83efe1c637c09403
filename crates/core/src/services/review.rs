//! Review authoring service.

use reviewboard_common::{AppError, AppResult, IdGenerator};
use reviewboard_db::{
    entities::{category, contents, review},
    repositories::NewReview,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::content::{BookSelection, ContentResolver, ResolveInput};
use super::store::{SharedCategoryStore, SharedReviewStore, SharedUserDirectory};

/// A star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(i16);

impl Rating {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 5;

    /// Accepts a submitted rating; a missing value is as invalid as one out of range.
    pub fn new(value: Option<i32>) -> AppResult<Self> {
        value
            .and_then(|v| i16::try_from(v).ok())
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(AppError::InvalidRating)
    }

    #[must_use]
    pub const fn get(self) -> i16 {
        self.0
    }
}

/// The user-editable part of a review, as submitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub rating: Option<i32>,

    #[validate(length(max = 255, message = "Review title must be at most 255 characters"))]
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub category_ids: Vec<i32>,
}

/// Who is performing an authoring action.
///
/// An explicit id wins over the session; with neither, the caller is
/// anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActingUser<'a> {
    pub explicit_id: Option<&'a str>,
    pub session_user_id: Option<&'a str>,
}

impl<'a> ActingUser<'a> {
    /// The acting user as known from the session alone.
    #[must_use]
    pub const fn from_session(session_user_id: Option<&'a str>) -> Self {
        Self {
            explicit_id: None,
            session_user_id,
        }
    }

    #[must_use]
    pub fn resolved_id(&self) -> Option<&'a str> {
        self.explicit_id
            .filter(|id| !id.is_empty())
            .or(self.session_user_id.filter(|id| !id.is_empty()))
    }
}

/// A review together with its category tags in stored order.
#[derive(Debug, Clone)]
pub struct ReviewWithCategories {
    pub review: review::Model,
    pub categories: Vec<category::Model>,
}

impl ReviewWithCategories {
    /// The first category the author picked.
    #[must_use]
    pub fn primary_category(&self) -> Option<&category::Model> {
        self.categories.first()
    }

    #[must_use]
    pub fn category_ids(&self) -> Vec<i32> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// Draft that passed validation, ready to persist.
struct CheckedDraft {
    rating: Rating,
    title: String,
    text: String,
    categories: Vec<category::Model>,
}

/// Review authoring service for business logic.
#[derive(Clone)]
pub struct ReviewService {
    reviews: SharedReviewStore,
    categories: SharedCategoryStore,
    users: SharedUserDirectory,
    resolver: ContentResolver,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub fn new(
        reviews: SharedReviewStore,
        categories: SharedCategoryStore,
        users: SharedUserDirectory,
        resolver: ContentResolver,
    ) -> Self {
        Self {
            reviews,
            categories,
            users,
            resolver,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a review of already resolved contents.
    pub async fn compose_review(
        &self,
        contents: &contents::Model,
        author: ActingUser<'_>,
        draft: ReviewDraft,
    ) -> AppResult<ReviewWithCategories> {
        let (author_id, checked) = self.prepare(author, draft).await?;
        self.insert(contents, &author_id, checked).await
    }

    /// Publish a review of a book picked from search results.
    ///
    /// Nothing is stored, contents included, unless the whole draft is valid.
    pub async fn compose_from_book(
        &self,
        author: ActingUser<'_>,
        selection: BookSelection,
        draft: ReviewDraft,
    ) -> AppResult<ReviewWithCategories> {
        if !selection.is_selected() {
            return Err(AppError::NoSelectionMade);
        }
        let (author_id, checked) = self.prepare(author, draft).await?;
        let contents = self
            .resolver
            .resolve(ResolveInput::BookSelection(selection))
            .await?;
        self.insert(&contents, &author_id, checked).await
    }

    /// Publish a review of any web page.
    pub async fn compose_from_url(
        &self,
        author: ActingUser<'_>,
        url: String,
        draft: ReviewDraft,
    ) -> AppResult<ReviewWithCategories> {
        if url.trim().is_empty() {
            return Err(AppError::Validation("Enter a URL".to_string()));
        }
        let (author_id, checked) = self.prepare(author, draft).await?;
        let contents = self
            .resolver
            .resolve(ResolveInput::UrlSubmission { url })
            .await?;
        self.insert(&contents, &author_id, checked).await
    }

    /// Load a review for its author to edit.
    pub async fn load_for_edit(
        &self,
        review_id: &str,
        acting_user_id: Option<&str>,
    ) -> AppResult<ReviewWithCategories> {
        let review = self.owned_review(review_id, acting_user_id).await?;
        let ids = self.reviews.category_ids(&review.id).await?;
        let categories = self.categories_in_order(&ids).await?;
        Ok(ReviewWithCategories { review, categories })
    }

    /// Overwrite rating, title, text and the whole category set.
    pub async fn edit_review(
        &self,
        review_id: &str,
        acting_user_id: Option<&str>,
        draft: ReviewDraft,
    ) -> AppResult<ReviewWithCategories> {
        let current = self.owned_review(review_id, acting_user_id).await?;
        let checked = self.check(draft).await?;
        let ids: Vec<i32> = checked.categories.iter().map(|c| c.id).collect();

        let review = self
            .reviews
            .update(current, checked.rating.get(), checked.title, checked.text, &ids)
            .await?;

        info!(review_id = %review.id, categories = ?ids, "Review updated");
        Ok(ReviewWithCategories {
            review,
            categories: checked.categories,
        })
    }

    /// Hide a review from every listing. Repeating it is harmless.
    pub async fn deactivate_review(
        &self,
        review_id: &str,
        acting_user_id: Option<&str>,
    ) -> AppResult<()> {
        let current = self.owned_review(review_id, acting_user_id).await?;
        if !current.is_active {
            debug!(review_id = %review_id, "Review already inactive");
            return Ok(());
        }

        self.reviews.deactivate(current).await?;
        info!(review_id = %review_id, "Review deactivated");
        Ok(())
    }

    async fn prepare(
        &self,
        author: ActingUser<'_>,
        draft: ReviewDraft,
    ) -> AppResult<(String, CheckedDraft)> {
        let checked = self.check(draft).await?;
        let author_id = self.resolve_author(author).await?;
        Ok((author_id, checked))
    }

    /// Field checks in a fixed order, then category resolution.
    async fn check(&self, draft: ReviewDraft) -> AppResult<CheckedDraft> {
        let rating = Rating::new(draft.rating)?;

        let draft = ReviewDraft {
            title: draft.title.trim().to_string(),
            ..draft
        };
        if draft.title.is_empty() {
            return Err(AppError::MissingTitle);
        }
        if draft.text.trim().is_empty() {
            return Err(AppError::MissingText);
        }
        if draft.category_ids.is_empty() {
            return Err(AppError::MissingCategories);
        }
        draft.validate()?;

        let categories = self.categories_in_order(&draft.category_ids).await?;
        if categories.is_empty() {
            // Every requested id was unknown
            return Err(AppError::MissingCategories);
        }

        Ok(CheckedDraft {
            rating,
            title: draft.title,
            text: draft.text,
            categories,
        })
    }

    async fn resolve_author(&self, author: ActingUser<'_>) -> AppResult<String> {
        let id = author.resolved_id().ok_or(AppError::AuthenticationRequired)?;
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AppError::AuthenticationRequired)?;
        Ok(user.id)
    }

    /// Existing categories for `ids`, deduplicated, in request order.
    async fn categories_in_order(&self, ids: &[i32]) -> AppResult<Vec<category::Model>> {
        let mut wanted: Vec<i32> = Vec::with_capacity(ids.len());
        for id in ids {
            if !wanted.contains(id) {
                wanted.push(*id);
            }
        }

        let mut found = self.categories.find_by_ids(&wanted).await?;
        if found.len() < wanted.len() {
            debug!(requested = ?wanted, found = found.len(), "Dropping unknown category ids");
        }
        found.sort_by_key(|c| wanted.iter().position(|id| *id == c.id));
        Ok(found)
    }

    /// The review, if it exists and `acting_user_id` wrote it.
    async fn owned_review(
        &self,
        review_id: &str,
        acting_user_id: Option<&str>,
    ) -> AppResult<review::Model> {
        let acting_user_id = acting_user_id.ok_or(AppError::AuthenticationRequired)?;
        let review = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound("review".to_string()))?;

        if review.user_id != acting_user_id {
            return Err(AppError::PermissionDenied(
                "only the author can change this review".to_string(),
            ));
        }
        Ok(review)
    }

    async fn insert(
        &self,
        contents: &contents::Model,
        author_id: &str,
        checked: CheckedDraft,
    ) -> AppResult<ReviewWithCategories> {
        let ids: Vec<i32> = checked.categories.iter().map(|c| c.id).collect();
        let new = NewReview {
            id: self.id_gen.generate(),
            contents_id: contents.id.clone(),
            user_id: author_id.to_string(),
            rating: checked.rating.get(),
            title: checked.title,
            text: checked.text,
        };

        let review = self.reviews.insert(new, &ids).await?;
        info!(
            review_id = %review.id,
            contents_id = %contents.id,
            user_id = %author_id,
            rating = review.rating,
            "Review created"
        );

        Ok(ReviewWithCategories {
            review,
            categories: checked.categories,
        })
    }
}
