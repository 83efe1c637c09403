//! Category repository.

use std::sync::Arc;

use crate::entities::{Category, category};
use reviewboard_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Read-only access to the seeded categories.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All categories ordered by name.
    pub async fn find_all_ordered_by_name(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the categories that exist among `ids`. Unknown ids are ignored.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<category::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Category::find()
            .filter(category::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn category(id: i32, name: &str) -> category::Model {
        category::Model {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_name() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![category(1, "Books"), category(3, "Movies")]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.find_all_ordered_by_name().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Books");
    }

    #[tokio::test]
    async fn test_find_by_ids_returns_only_existing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![category(2, "Technology")]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.find_by_ids(&[2, 999]).await.unwrap();

        assert_eq!(result, vec![category(2, "Technology")]);
    }

    #[tokio::test]
    async fn test_find_by_ids_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = CategoryRepository::new(db);
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }
}
