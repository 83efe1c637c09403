//! Storage capabilities consumed by the services.
//!
//! Services depend on these traits rather than on the sea-orm repositories
//! directly, so they can run against in-memory stores in tests. The
//! repository implementations live here as well.

use std::sync::Arc;

use async_trait::async_trait;
use reviewboard_common::AppResult;
use reviewboard_db::{
    entities::{category, contents, review, review_category, user},
    repositories::{
        CategoryRepository, ContentsRepository, NewReview, ReviewRepository, UserRepository,
    },
};
use sea_orm::{ActiveModelTrait, IntoActiveModel};

/// User lookup and persistence.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>>;

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>>;

    /// Whether `username` belongs to any user other than `excluding_id`.
    async fn exists_by_username(
        &self,
        username: &str,
        excluding_id: Option<&str>,
    ) -> AppResult<bool>;

    async fn insert(&self, user: user::Model) -> AppResult<user::Model>;

    async fn update(&self, user: user::Model) -> AppResult<user::Model>;
}

/// Contents lookup and persistence.
#[async_trait]
pub trait ContentsStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<contents::Model>>;

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<contents::Model>>;

    async fn find_by_url(&self, url: &str) -> AppResult<Option<contents::Model>>;

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<contents::Model>>;

    /// Insert new contents; a taken URL yields `AppError::Conflict`.
    async fn insert(&self, contents: contents::Model) -> AppResult<contents::Model>;
}

/// Review lookup and persistence.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>>;

    /// Insert a review and its category tags atomically.
    async fn insert(&self, review: NewReview, category_ids: &[i32]) -> AppResult<review::Model>;

    /// Overwrite the editable fields and replace the category set atomically.
    async fn update(
        &self,
        current: review::Model,
        rating: i16,
        title: String,
        text: String,
        category_ids: &[i32],
    ) -> AppResult<review::Model>;

    async fn deactivate(&self, current: review::Model) -> AppResult<review::Model>;

    async fn category_ids(&self, review_id: &str) -> AppResult<Vec<i32>>;

    async fn category_links(
        &self,
        review_ids: &[String],
    ) -> AppResult<Vec<review_category::Model>>;

    async fn list_active(&self) -> AppResult<Vec<review::Model>>;

    async fn search_by_keyword(&self, keyword: &str) -> AppResult<Vec<review::Model>>;

    async fn count_by_keyword(&self, keyword: &str) -> AppResult<u64>;

    async fn list_active_by_category(&self, category_id: i32) -> AppResult<Vec<review::Model>>;

    async fn list_active_by_user(&self, user_id: &str) -> AppResult<Vec<review::Model>>;

    async fn list_active_for_other_users_on_same_contents(
        &self,
        contents_id: &str,
        exclude_review_id: &str,
        exclude_user_id: &str,
    ) -> AppResult<Vec<review::Model>>;
}

/// Read-only category access.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<category::Model>>;

    async fn find_all_ordered_by_name(&self) -> AppResult<Vec<category::Model>>;

    /// Existing categories among `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<category::Model>>;
}

pub type SharedUserDirectory = Arc<dyn UserDirectory>;
pub type SharedContentsStore = Arc<dyn ContentsStore>;
pub type SharedReviewStore = Arc<dyn ReviewStore>;
pub type SharedCategoryStore = Arc<dyn CategoryStore>;

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        Self::find_by_id(self, id).await
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        Self::find_by_ids(self, ids).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Self::find_by_username(self, username).await
    }

    async fn exists_by_username(
        &self,
        username: &str,
        excluding_id: Option<&str>,
    ) -> AppResult<bool> {
        Self::exists_by_username(self, username, excluding_id).await
    }

    async fn insert(&self, user: user::Model) -> AppResult<user::Model> {
        self.create(user.into_active_model().reset_all()).await
    }

    async fn update(&self, user: user::Model) -> AppResult<user::Model> {
        Self::update(self, user.into_active_model().reset_all()).await
    }
}

#[async_trait]
impl ContentsStore for ContentsRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<contents::Model>> {
        Self::find_by_id(self, id).await
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<contents::Model>> {
        Self::find_by_ids(self, ids).await
    }

    async fn find_by_url(&self, url: &str) -> AppResult<Option<contents::Model>> {
        Self::find_by_url(self, url).await
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<contents::Model>> {
        Self::find_by_isbn(self, isbn).await
    }

    async fn insert(&self, contents: contents::Model) -> AppResult<contents::Model> {
        self.create(contents.into_active_model().reset_all()).await
    }
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>> {
        Self::find_by_id(self, id).await
    }

    async fn insert(&self, review: NewReview, category_ids: &[i32]) -> AppResult<review::Model> {
        self.create(review, category_ids).await
    }

    async fn update(
        &self,
        current: review::Model,
        rating: i16,
        title: String,
        text: String,
        category_ids: &[i32],
    ) -> AppResult<review::Model> {
        Self::update(self, current, rating, title, text, category_ids).await
    }

    async fn deactivate(&self, current: review::Model) -> AppResult<review::Model> {
        Self::deactivate(self, current).await
    }

    async fn category_ids(&self, review_id: &str) -> AppResult<Vec<i32>> {
        self.find_category_ids(review_id).await
    }

    async fn category_links(
        &self,
        review_ids: &[String],
    ) -> AppResult<Vec<review_category::Model>> {
        self.find_category_links(review_ids).await
    }

    async fn list_active(&self) -> AppResult<Vec<review::Model>> {
        Self::list_active(self).await
    }

    async fn search_by_keyword(&self, keyword: &str) -> AppResult<Vec<review::Model>> {
        Self::search_by_keyword(self, keyword).await
    }

    async fn count_by_keyword(&self, keyword: &str) -> AppResult<u64> {
        Self::count_by_keyword(self, keyword).await
    }

    async fn list_active_by_category(&self, category_id: i32) -> AppResult<Vec<review::Model>> {
        Self::list_active_by_category(self, category_id).await
    }

    async fn list_active_by_user(&self, user_id: &str) -> AppResult<Vec<review::Model>> {
        Self::list_active_by_user(self, user_id).await
    }

    async fn list_active_for_other_users_on_same_contents(
        &self,
        contents_id: &str,
        exclude_review_id: &str,
        exclude_user_id: &str,
    ) -> AppResult<Vec<review::Model>> {
        Self::list_active_for_other_users_on_same_contents(
            self,
            contents_id,
            exclude_review_id,
            exclude_user_id,
        )
        .await
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<category::Model>> {
        Self::find_by_id(self, id).await
    }

    async fn find_all_ordered_by_name(&self) -> AppResult<Vec<category::Model>> {
        Self::find_all_ordered_by_name(self).await
    }

    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<category::Model>> {
        Self::find_by_ids(self, ids).await
    }
}
