//! Category service.

use reviewboard_common::{AppError, AppResult};
use reviewboard_db::entities::category;

use super::store::SharedCategoryStore;

/// Read access to the seeded category list.
#[derive(Clone)]
pub struct CategoryService {
    categories: SharedCategoryStore,
}

impl CategoryService {
    #[must_use]
    pub fn new(categories: SharedCategoryStore) -> Self {
        Self { categories }
    }

    /// All categories, ordered by name.
    pub async fn list(&self) -> AppResult<Vec<category::Model>> {
        self.categories.find_all_ordered_by_name().await
    }

    pub async fn get(&self, id: i32) -> AppResult<category::Model> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category: {id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::testing::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let service = CategoryService::new(Arc::new(MemoryStore::with_categories()));

        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["Books", "Movies", "Technology"]);
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let service = CategoryService::new(Arc::new(MemoryStore::with_categories()));

        assert_eq!(service.get(2).await.unwrap().name, "Technology");
        assert!(matches!(service.get(9).await, Err(AppError::NotFound(_))));
    }
}
