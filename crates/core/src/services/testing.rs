//! In-memory capability implementations for service tests.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use reviewboard_common::{AppError, AppResult, PageMeta};
use reviewboard_db::{
    entities::{category, contents, review, review_category, user},
    repositories::NewReview,
};

use super::content::MetaFetcher;
use super::password::PasswordHasher;
use super::store::{CategoryStore, ContentsStore, ReviewStore, UserDirectory};

#[derive(Default)]
struct State {
    users: Vec<user::Model>,
    contents: Vec<contents::Model>,
    categories: Vec<category::Model>,
    reviews: Vec<review::Model>,
    links: Vec<review_category::Model>,
    /// Row that "another request" inserts right before the next contents insert.
    contents_race: Option<contents::Model>,
}

/// All four stores over one shared in-memory state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with categories 1 Books, 2 Technology, 3 Movies.
    pub fn with_categories() -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap();
            for (id, name) in [(1, "Books"), (2, "Technology"), (3, "Movies")] {
                state.categories.push(category::Model {
                    id,
                    name: name.to_string(),
                });
            }
        }
        store
    }

    pub fn add_user(&self, id: &str, username: &str) -> user::Model {
        let user = user::Model {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: format!("hashed:{username}"),
            created_at: Utc::now().into(),
            updated_at: None,
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_contents(&self, id: &str, url: &str) -> contents::Model {
        let contents = contents::Model {
            id: id.to_string(),
            url: Some(url.to_string()),
            title: format!("Contents {id}"),
            thumbnail_url: None,
            book_isbn: None,
            contents_type: contents::ContentsType::Other,
            created_at: Utc::now().into(),
        };
        self.state.lock().unwrap().contents.push(contents.clone());
        contents
    }

    pub fn fail_next_contents_insert_with_existing(&self, existing: contents::Model) {
        self.state.lock().unwrap().contents_race = Some(existing);
    }

    pub async fn contents_count(&self) -> usize {
        self.state.lock().unwrap().contents.len()
    }

    pub async fn review_count(&self) -> usize {
        self.state.lock().unwrap().reviews.len()
    }

    pub async fn stored_review(&self, id: &str) -> Option<review::Model> {
        self.state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn sorted_newest_first(mut reviews: Vec<review::Model>) -> Vec<review::Model> {
        reviews.sort_by(|a, b| b.id.cmp(&a.id));
        reviews
    }

    fn active_where(&self, pred: impl Fn(&review::Model) -> bool) -> Vec<review::Model> {
        let state = self.state.lock().unwrap();
        Self::sorted_newest_first(
            state
                .reviews
                .iter()
                .filter(|r| r.is_active && pred(r))
                .cloned()
                .collect(),
        )
    }

    fn set_links(state: &mut State, review_id: &str, category_ids: &[i32]) {
        state.links.retain(|l| l.review_id != review_id);
        for (category_id, position) in category_ids.iter().zip(0_i32..) {
            state.links.push(review_category::Model {
                review_id: review_id.to_string(),
                category_id: *category_id,
                position,
            });
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn exists_by_username(
        &self,
        username: &str,
        excluding_id: Option<&str>,
    ) -> AppResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .any(|u| u.username == username && Some(u.id.as_str()) != excluding_id))
    }

    async fn insert(&self, user: user::Model) -> AppResult<user::Model> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::UsernameTaken);
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: user::Model) -> AppResult<user::Model> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;
        *slot = user.clone();
        Ok(user)
    }
}

#[async_trait]
impl ContentsStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<contents::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state.contents.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<contents::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contents
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn find_by_url(&self, url: &str) -> AppResult<Option<contents::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contents
            .iter()
            .find(|c| c.url.as_deref() == Some(url))
            .cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<contents::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contents
            .iter()
            .find(|c| c.book_isbn.as_deref() == Some(isbn))
            .cloned())
    }

    async fn insert(&self, contents: contents::Model) -> AppResult<contents::Model> {
        let mut state = self.state.lock().unwrap();
        if let Some(winner) = state.contents_race.take() {
            state.contents.push(winner);
        }
        if contents.url.is_some() && state.contents.iter().any(|c| c.url == contents.url) {
            return Err(AppError::Conflict("contents url".to_string()));
        }
        if contents.book_isbn.is_some()
            && state
                .contents
                .iter()
                .any(|c| c.book_isbn == contents.book_isbn)
        {
            return Err(AppError::Conflict("contents book_isbn".to_string()));
        }
        state.contents.push(contents.clone());
        Ok(contents)
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>> {
        Ok(self.stored_review(id).await)
    }

    async fn insert(&self, new: NewReview, category_ids: &[i32]) -> AppResult<review::Model> {
        let review = review::Model {
            id: new.id,
            contents_id: new.contents_id,
            user_id: new.user_id,
            rating: new.rating,
            title: new.title,
            text: new.text,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let mut state = self.state.lock().unwrap();
        state.reviews.push(review.clone());
        Self::set_links(&mut state, &review.id, category_ids);
        Ok(review)
    }

    async fn update(
        &self,
        current: review::Model,
        rating: i16,
        title: String,
        text: String,
        category_ids: &[i32],
    ) -> AppResult<review::Model> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .reviews
            .iter_mut()
            .find(|r| r.id == current.id)
            .ok_or_else(|| AppError::NotFound("review".to_string()))?;
        slot.rating = rating;
        slot.title = title;
        slot.text = text;
        slot.updated_at = Some(Utc::now().into());
        let updated = slot.clone();
        Self::set_links(&mut state, &current.id, category_ids);
        Ok(updated)
    }

    async fn deactivate(&self, current: review::Model) -> AppResult<review::Model> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .reviews
            .iter_mut()
            .find(|r| r.id == current.id)
            .ok_or_else(|| AppError::NotFound("review".to_string()))?;
        slot.is_active = false;
        Ok(slot.clone())
    }

    async fn category_ids(&self, review_id: &str) -> AppResult<Vec<i32>> {
        let state = self.state.lock().unwrap();
        let mut links: Vec<_> = state
            .links
            .iter()
            .filter(|l| l.review_id == review_id)
            .collect();
        links.sort_by_key(|l| l.position);
        Ok(links.into_iter().map(|l| l.category_id).collect())
    }

    async fn category_links(
        &self,
        review_ids: &[String],
    ) -> AppResult<Vec<review_category::Model>> {
        let state = self.state.lock().unwrap();
        let mut links: Vec<_> = state
            .links
            .iter()
            .filter(|l| review_ids.contains(&l.review_id))
            .cloned()
            .collect();
        links.sort_by(|a, b| (&a.review_id, a.position).cmp(&(&b.review_id, b.position)));
        Ok(links)
    }

    async fn list_active(&self) -> AppResult<Vec<review::Model>> {
        Ok(self.active_where(|_| true))
    }

    async fn search_by_keyword(&self, keyword: &str) -> AppResult<Vec<review::Model>> {
        let needle = keyword.to_lowercase();
        Ok(self.active_where(|r| {
            r.title.to_lowercase().contains(&needle) || r.text.to_lowercase().contains(&needle)
        }))
    }

    async fn count_by_keyword(&self, keyword: &str) -> AppResult<u64> {
        Ok(self.search_by_keyword(keyword).await?.len() as u64)
    }

    async fn list_active_by_category(&self, category_id: i32) -> AppResult<Vec<review::Model>> {
        let tagged: Vec<String> = {
            let state = self.state.lock().unwrap();
            state
                .links
                .iter()
                .filter(|l| l.category_id == category_id)
                .map(|l| l.review_id.clone())
                .collect()
        };
        Ok(self.active_where(|r| tagged.contains(&r.id)))
    }

    async fn list_active_by_user(&self, user_id: &str) -> AppResult<Vec<review::Model>> {
        Ok(self.active_where(|r| r.user_id == user_id))
    }

    async fn list_active_for_other_users_on_same_contents(
        &self,
        contents_id: &str,
        exclude_review_id: &str,
        exclude_user_id: &str,
    ) -> AppResult<Vec<review::Model>> {
        Ok(self.active_where(|r| {
            r.contents_id == contents_id && r.id != exclude_review_id && r.user_id != exclude_user_id
        }))
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<category::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_all_ordered_by_name(&self) -> AppResult<Vec<category::Model>> {
        let mut categories = self.state.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<category::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

/// Metadata fetcher serving canned pages.
#[derive(Clone, Default)]
pub struct FakeMetaFetcher {
    redirects: HashMap<String, String>,
    pages: HashMap<String, (String, String)>,
}

impl FakeMetaFetcher {
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn page(mut self, final_url: &str, title: &str, image_url: &str) -> Self {
        self.pages
            .insert(final_url.to_string(), (title.to_string(), image_url.to_string()));
        self
    }
}

#[async_trait]
impl MetaFetcher for FakeMetaFetcher {
    async fn fetch(&self, raw_url: &str) -> AppResult<PageMeta> {
        let raw = raw_url.trim();
        let final_url = self.redirects.get(raw).map_or(raw, String::as_str);
        let (title, image_url) = self
            .pages
            .get(final_url)
            .cloned()
            .ok_or_else(|| AppError::MetadataFetchFailed(format!("{final_url} returned 404")))?;

        Ok(PageMeta {
            final_url: final_url.to_string(),
            title,
            image_url,
        })
    }
}

/// Reversible "hash" so tests do not pay for Argon2.
#[derive(Clone, Default)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        Ok(format!("hashed:{plaintext}"))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> AppResult<bool> {
        Ok(digest == format!("hashed:{plaintext}"))
    }
}
