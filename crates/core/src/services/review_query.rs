//! Review read paths.

use std::collections::HashMap;

use reviewboard_common::{AppError, AppResult};
use reviewboard_db::entities::{category, contents, review};

use super::store::{
    SharedCategoryStore, SharedContentsStore, SharedReviewStore, SharedUserDirectory,
};
use super::visibility::can_view;

/// A review with everything a listing shows next to it.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub review: review::Model,
    pub contents: Option<contents::Model>,
    pub author_name: Option<String>,
    pub categories: Vec<category::Model>,
}

/// Detail page payload.
#[derive(Debug, Clone)]
pub struct ReviewDetail {
    pub view: ReviewView,
    /// Active reviews of the same contents by other users.
    pub others: Vec<ReviewView>,
    /// Whether the viewer wrote this review.
    pub editable: bool,
}

/// Keyword search result.
#[derive(Debug, Clone)]
pub struct KeywordSearch {
    pub keyword: String,
    pub total: u64,
    pub reviews: Vec<ReviewView>,
}

/// Reviews listed under one category.
#[derive(Debug, Clone)]
pub struct CategoryReviews {
    pub category: category::Model,
    pub reviews: Vec<ReviewView>,
}

/// Read-side review service.
#[derive(Clone)]
pub struct ReviewQueryService {
    reviews: SharedReviewStore,
    contents: SharedContentsStore,
    users: SharedUserDirectory,
    categories: SharedCategoryStore,
}

impl ReviewQueryService {
    #[must_use]
    pub fn new(
        reviews: SharedReviewStore,
        contents: SharedContentsStore,
        users: SharedUserDirectory,
        categories: SharedCategoryStore,
    ) -> Self {
        Self {
            reviews,
            contents,
            users,
            categories,
        }
    }

    /// A single review, if `viewer_id` may see it.
    pub async fn show(&self, review_id: &str, viewer_id: Option<&str>) -> AppResult<ReviewDetail> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound("review".to_string()))?;

        if !can_view(&review, viewer_id) {
            return Err(AppError::PermissionDenied(
                "this review cannot be viewed".to_string(),
            ));
        }

        let others = self
            .reviews
            .list_active_for_other_users_on_same_contents(
                &review.contents_id,
                &review.id,
                &review.user_id,
            )
            .await?;
        let editable = viewer_id.is_some_and(|id| id == review.user_id);

        let mut views = self.enrich(vec![review]).await?;
        let others = self.enrich(others).await?;
        let view = views
            .pop()
            .ok_or_else(|| AppError::Internal("review vanished during enrichment".to_string()))?;

        Ok(ReviewDetail {
            view,
            others,
            editable,
        })
    }

    /// Home listing, newest first.
    pub async fn list_active(&self) -> AppResult<Vec<ReviewView>> {
        let reviews = self.reviews.list_active().await?;
        self.enrich(reviews).await
    }

    /// Case-insensitive substring search over title and text.
    pub async fn search(&self, keyword: &str) -> AppResult<KeywordSearch> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::MissingKeyword);
        }

        let total = self.reviews.count_by_keyword(keyword).await?;
        let reviews = self.reviews.search_by_keyword(keyword).await?;
        tracing::debug!(keyword = %keyword, total, "Keyword search");

        Ok(KeywordSearch {
            keyword: keyword.to_string(),
            total,
            reviews: self.enrich(reviews).await?,
        })
    }

    /// Active reviews tagged with a category.
    pub async fn by_category(&self, category_id: i32) -> AppResult<CategoryReviews> {
        let category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("category".to_string()))?;
        let reviews = self.reviews.list_active_by_category(category_id).await?;

        Ok(CategoryReviews {
            category,
            reviews: self.enrich(reviews).await?,
        })
    }

    /// Active reviews written by a user. Inactive ones stay hidden even
    /// when the author is looking.
    pub async fn by_user(&self, user_id: &str) -> AppResult<Vec<ReviewView>> {
        let reviews = self.reviews.list_active_by_user(user_id).await?;
        self.enrich(reviews).await
    }

    /// Attach contents, author names and categories with one lookup per kind.
    async fn enrich(&self, reviews: Vec<review::Model>) -> AppResult<Vec<ReviewView>> {
        if reviews.is_empty() {
            return Ok(Vec::new());
        }

        let review_ids: Vec<String> = reviews.iter().map(|r| r.id.clone()).collect();
        let contents_ids = unique(reviews.iter().map(|r| r.contents_id.clone()));
        let user_ids = unique(reviews.iter().map(|r| r.user_id.clone()));

        let contents: HashMap<String, contents::Model> = self
            .contents
            .find_by_ids(&contents_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let authors: HashMap<String, String> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let links = self.reviews.category_links(&review_ids).await?;
        let category_ids = unique(links.iter().map(|l| l.category_id));
        let categories: HashMap<i32, category::Model> = self
            .categories
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut tags: HashMap<&str, Vec<(i32, category::Model)>> = HashMap::new();
        for link in &links {
            if let Some(category) = categories.get(&link.category_id) {
                tags.entry(link.review_id.as_str())
                    .or_default()
                    .push((link.position, category.clone()));
            }
        }

        let views = reviews
            .into_iter()
            .map(|review| {
                let mut tagged = tags.remove(review.id.as_str()).unwrap_or_default();
                tagged.sort_by_key(|(position, _)| *position);
                ReviewView {
                    contents: contents.get(&review.contents_id).cloned(),
                    author_name: authors.get(&review.user_id).cloned(),
                    categories: tagged.into_iter().map(|(_, c)| c).collect(),
                    review,
                }
            })
            .collect();
        Ok(views)
    }
}

fn unique<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
