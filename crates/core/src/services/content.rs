//! Contents resolution.
//!
//! Turns a book picked from search results, or a URL submitted by a user,
//! into a single stored contents row, reusing an existing row whenever the
//! subject is already known.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reviewboard_common::{
    AppError, AppResult, IdGenerator, PageMeta, PageMetaFetcher, page_meta::UNTITLED,
    sanitize_image_url, sanitize_title,
};
use reviewboard_db::entities::contents::{self, ContentsType};
use tracing::{debug, info};

use super::store::SharedContentsStore;

/// Page metadata capability.
#[async_trait]
pub trait MetaFetcher: Send + Sync {
    /// Fetch a page and extract its final URL, title and image.
    async fn fetch(&self, raw_url: &str) -> AppResult<PageMeta>;
}

pub type SharedMetaFetcher = Arc<dyn MetaFetcher>;

#[async_trait]
impl MetaFetcher for PageMetaFetcher {
    async fn fetch(&self, raw_url: &str) -> AppResult<PageMeta> {
        Self::fetch(self, raw_url).await
    }
}

/// A book chosen from the search results.
#[derive(Debug, Clone, Default)]
pub struct BookSelection {
    pub isbn: Option<String>,
    pub url: Option<String>,
    pub preview_title: Option<String>,
    pub preview_image: Option<String>,
    /// Used when the preview title is blank, typically the search query.
    pub fallback_title: String,
}

impl BookSelection {
    /// Whether an ISBN or URL identifies the book.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        clean(self.isbn.as_deref()).is_some() || clean(self.url.as_deref()).is_some()
    }
}

/// What to resolve contents from.
#[derive(Debug, Clone)]
pub enum ResolveInput {
    BookSelection(BookSelection),
    UrlSubmission { url: String },
}

fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Finds or creates the contents a review is about.
#[derive(Clone)]
pub struct ContentResolver {
    contents: SharedContentsStore,
    meta: SharedMetaFetcher,
    id_gen: IdGenerator,
}

impl ContentResolver {
    #[must_use]
    pub fn new(contents: SharedContentsStore, meta: SharedMetaFetcher) -> Self {
        Self {
            contents,
            meta,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve `input` to a stored contents row.
    pub async fn resolve(&self, input: ResolveInput) -> AppResult<contents::Model> {
        match input {
            ResolveInput::BookSelection(selection) => self.resolve_book(&selection).await,
            ResolveInput::UrlSubmission { url } => self.resolve_url(&url).await,
        }
    }

    /// Look up by ISBN, then by URL, and create a book row if neither matches.
    async fn resolve_book(&self, selection: &BookSelection) -> AppResult<contents::Model> {
        let isbn = clean(selection.isbn.as_deref());
        let url = clean(selection.url.as_deref());
        if isbn.is_none() && url.is_none() {
            return Err(AppError::NoSelectionMade);
        }

        if let Some(existing) = self.find_existing(isbn, url).await? {
            debug!(contents_id = %existing.id, "Reusing existing book contents");
            return Ok(existing);
        }

        let title = clean(selection.preview_title.as_deref())
            .or_else(|| clean(Some(selection.fallback_title.as_str())))
            .map_or_else(|| UNTITLED.to_string(), sanitize_title);
        let thumbnail_url = clean(selection.preview_image.as_deref())
            .map(sanitize_image_url)
            .filter(|u| !u.is_empty());

        let model = contents::Model {
            id: self.id_gen.generate(),
            url: url.map(str::to_string),
            title,
            thumbnail_url,
            book_isbn: isbn.map(str::to_string),
            contents_type: ContentsType::Book,
            created_at: Utc::now().into(),
        };

        match self.contents.insert(model).await {
            Ok(created) => {
                info!(contents_id = %created.id, isbn = ?created.book_isbn, "Created book contents");
                Ok(created)
            }
            Err(AppError::Conflict(detail)) => {
                debug!(detail = %detail, "Book contents created concurrently, re-reading");
                self.find_existing(isbn, url)
                    .await?
                    .ok_or(AppError::Conflict(detail))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the page and dedup on the URL reached after redirects.
    async fn resolve_url(&self, raw_url: &str) -> AppResult<contents::Model> {
        if raw_url.trim().is_empty() {
            return Err(AppError::Validation("Enter a URL".to_string()));
        }

        let meta = self.meta.fetch(raw_url).await?;

        if let Some(existing) = self.contents.find_by_url(&meta.final_url).await? {
            debug!(contents_id = %existing.id, url = %meta.final_url, "Reusing existing contents");
            return Ok(existing);
        }

        let model = contents::Model {
            id: self.id_gen.generate(),
            url: Some(meta.final_url.clone()),
            title: meta.title,
            thumbnail_url: Some(meta.image_url).filter(|u| !u.is_empty()),
            book_isbn: None,
            contents_type: ContentsType::Other,
            created_at: Utc::now().into(),
        };

        match self.contents.insert(model).await {
            Ok(created) => {
                info!(contents_id = %created.id, url = %meta.final_url, "Created contents from URL");
                Ok(created)
            }
            Err(AppError::Conflict(detail)) => {
                debug!(url = %meta.final_url, "Contents created concurrently, re-reading");
                self.contents
                    .find_by_url(&meta.final_url)
                    .await?
                    .ok_or(AppError::Conflict(detail))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_existing(
        &self,
        isbn: Option<&str>,
        url: Option<&str>,
    ) -> AppResult<Option<contents::Model>> {
        if let Some(isbn) = isbn
            && let Some(found) = self.contents.find_by_isbn(isbn).await?
        {
            return Ok(Some(found));
        }
        if let Some(url) = url {
            return self.contents.find_by_url(url).await;
        }
        Ok(None)
    }
}
