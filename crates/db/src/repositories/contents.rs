//! Contents repository.

use std::sync::Arc;

use crate::entities::{Contents, contents};
use reviewboard_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::map_insert_err;

/// Repository for reviewable contents.
#[derive(Clone)]
pub struct ContentsRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentsRepository {
    /// Create a new contents repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find contents by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<contents::Model>> {
        Contents::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find contents by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<contents::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Contents::find()
            .filter(contents::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find contents by exact URL.
    pub async fn find_by_url(&self, url: &str) -> AppResult<Option<contents::Model>> {
        Contents::find()
            .filter(contents::Column::Url.eq(url))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find contents by exact ISBN.
    pub async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<contents::Model>> {
        Contents::find()
            .filter(contents::Column::BookIsbn.eq(isbn))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert new contents.
    ///
    /// Returns [`AppError::Conflict`] when another row already holds the URL.
    pub async fn create(&self, model: contents::ActiveModel) -> AppResult<contents::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_insert_err(e, "contents"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::contents::ContentsType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Set};

    fn book(id: &str, isbn: &str) -> contents::Model {
        contents::Model {
            id: id.to_string(),
            url: Some(format!("https://books.example.com/{isbn}")),
            title: "Clean Code".to_string(),
            thumbnail_url: None,
            book_isbn: Some(isbn.to_string()),
            contents_type: ContentsType::Book,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_isbn() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[book("c1", "9780132350884")]])
                .into_connection(),
        );

        let repo = ContentsRepository::new(db);
        let found = repo.find_by_isbn("9780132350884").await.unwrap().unwrap();

        assert_eq!(found.id, "c1");
        assert_eq!(found.contents_type, ContentsType::Book);
    }

    #[tokio::test]
    async fn test_find_by_url_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<contents::Model>::new()])
                .into_connection(),
        );

        let repo = ContentsRepository::new(db);
        assert!(repo.find_by_url("https://nowhere.example").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create() {
        let model = book("c1", "9780132350884");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[model.clone()]])
                .into_connection(),
        );

        let repo = ContentsRepository::new(db);
        let active = contents::ActiveModel {
            id: Set(model.id.clone()),
            url: Set(model.url.clone()),
            title: Set(model.title.clone()),
            thumbnail_url: Set(None),
            book_isbn: Set(model.book_isbn.clone()),
            contents_type: Set(ContentsType::Book),
            created_at: Set(model.created_at),
        };

        let created = repo.create(active).await.unwrap();
        assert_eq!(created.book_isbn.as_deref(), Some("9780132350884"));
    }
}
