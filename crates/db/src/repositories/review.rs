//! Review repository.

use std::sync::Arc;

use chrono::Utc;
use reviewboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
    sea_query::{Expr, Func, JoinType, LikeExpr},
};

use crate::entities::{Review, ReviewCategory, review, review_category};

/// Fields of a review about to be inserted.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Pre-generated review ID.
    pub id: String,
    /// Contents being reviewed.
    pub contents_id: String,
    /// Author.
    pub user_id: String,
    /// Rating, already validated to 1..=5.
    pub rating: i16,
    /// Review title.
    pub title: String,
    /// Review body.
    pub text: String,
}

/// Repository for reviews and their category tags.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

fn db_err(e: sea_orm::DbErr) -> AppError {
    AppError::Database(e.to_string())
}

/// Escape LIKE wildcards so a keyword is matched literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring match on title or text.
fn keyword_condition(keyword: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&keyword.to_lowercase()));

    Condition::any()
        .add(
            Expr::expr(Func::lower(Expr::col((Review, review::Column::Title))))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((Review, review::Column::Text))))
                .like(LikeExpr::new(pattern).escape('\\')),
        )
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a review by ID, regardless of its active flag.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Insert a review together with its category tags in one transaction.
    ///
    /// `category_ids` must already be filtered to existing categories; their
    /// order is kept as the tag position.
    pub async fn create(&self, new: NewReview, category_ids: &[i32]) -> AppResult<review::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = review::ActiveModel {
            id: Set(new.id),
            contents_id: Set(new.contents_id),
            user_id: Set(new.user_id),
            rating: Set(new.rating),
            title: Set(new.title),
            text: Set(new.text),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        Self::insert_categories(&txn, &model.id, category_ids).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(model)
    }

    /// Overwrite the editable fields and replace the whole category set.
    ///
    /// The old tags are deleted and the new ones inserted in the same
    /// transaction, so the set is never observed half-replaced.
    pub async fn update(
        &self,
        current: review::Model,
        rating: i16,
        title: String,
        text: String,
        category_ids: &[i32],
    ) -> AppResult<review::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let review_id = current.id.clone();
        let mut active = current.into_active_model();
        active.rating = Set(rating);
        active.title = Set(title);
        active.text = Set(text);
        active.updated_at = Set(Some(Utc::now().into()));
        let updated = active.update(&txn).await.map_err(db_err)?;

        ReviewCategory::delete_many()
            .filter(review_category::Column::ReviewId.eq(&review_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        Self::insert_categories(&txn, &review_id, category_ids).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Mark a review inactive. Already inactive reviews are returned unchanged.
    pub async fn deactivate(&self, current: review::Model) -> AppResult<review::Model> {
        if !current.is_active {
            return Ok(current);
        }

        let mut active = current.into_active_model();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now().into()));
        active.update(self.db.as_ref()).await.map_err(db_err)
    }

    async fn insert_categories<C: ConnectionTrait>(
        conn: &C,
        review_id: &str,
        category_ids: &[i32],
    ) -> AppResult<()> {
        if category_ids.is_empty() {
            return Ok(());
        }

        let rows = category_ids
            .iter()
            .zip(0_i32..)
            .map(|(category_id, position)| review_category::ActiveModel {
                review_id: Set(review_id.to_string()),
                category_id: Set(*category_id),
                position: Set(position),
            });

        ReviewCategory::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    /// Category ids of a review in insertion order.
    pub async fn find_category_ids(&self, review_id: &str) -> AppResult<Vec<i32>> {
        let links = ReviewCategory::find()
            .filter(review_category::Column::ReviewId.eq(review_id))
            .order_by_asc(review_category::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)?;

        Ok(links.into_iter().map(|l| l.category_id).collect())
    }

    /// Category links for several reviews, grouped by review in position order.
    pub async fn find_category_links(
        &self,
        review_ids: &[String],
    ) -> AppResult<Vec<review_category::Model>> {
        if review_ids.is_empty() {
            return Ok(vec![]);
        }

        ReviewCategory::find()
            .filter(review_category::Column::ReviewId.is_in(review_ids.to_vec()))
            .order_by_asc(review_category::Column::ReviewId)
            .order_by_asc(review_category::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Active reviews, newest first.
    pub async fn list_active(&self) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::IsActive.eq(true))
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Active reviews whose title or text contains `keyword`, ignoring case.
    pub async fn search_by_keyword(&self, keyword: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::IsActive.eq(true))
            .filter(keyword_condition(keyword))
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Number of active reviews matching `keyword`.
    pub async fn count_by_keyword(&self, keyword: &str) -> AppResult<u64> {
        Review::find()
            .filter(review::Column::IsActive.eq(true))
            .filter(keyword_condition(keyword))
            .count(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Active reviews tagged with a category, newest first.
    pub async fn list_active_by_category(&self, category_id: i32) -> AppResult<Vec<review::Model>> {
        Review::find()
            .join(JoinType::InnerJoin, review::Relation::ReviewCategory.def())
            .filter(review_category::Column::CategoryId.eq(category_id))
            .filter(review::Column::IsActive.eq(true))
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Active reviews written by a user, newest first.
    pub async fn list_active_by_user(&self, user_id: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::IsActive.eq(true))
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Active reviews of the same contents by other users.
    pub async fn list_active_for_other_users_on_same_contents(
        &self,
        contents_id: &str,
        exclude_review_id: &str,
        exclude_user_id: &str,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::ContentsId.eq(contents_id))
            .filter(review::Column::Id.ne(exclude_review_id))
            .filter(review::Column::UserId.ne(exclude_user_id))
            .filter(review::Column::IsActive.eq(true))
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_review(id: &str, user_id: &str, is_active: bool) -> review::Model {
        review::Model {
            id: id.to_string(),
            contents_id: "contents1".to_string(),
            user_id: user_id.to_string(),
            rating: 5,
            title: "Great".to_string(),
            text: "Loved it".to_string(),
            is_active,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn test_create_with_categories() {
        let review = create_test_review("review1", "user1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[review.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let created = repo
            .create(
                NewReview {
                    id: "review1".to_string(),
                    contents_id: "contents1".to_string(),
                    user_id: "user1".to_string(),
                    rating: 5,
                    title: "Great".to_string(),
                    text: "Loved it".to_string(),
                },
                &[2, 4],
            )
            .await
            .unwrap();

        assert_eq!(created.id, "review1");
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_update_replaces_categories() {
        let current = create_test_review("review1", "user1", true);
        let mut updated = current.clone();
        updated.rating = 3;
        updated.title = "Revised".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[updated.clone()]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let result = repo
            .update(current, 3, "Revised".to_string(), "Loved it".to_string(), &[1])
            .await
            .unwrap();

        assert_eq!(result.rating, 3);
        assert_eq!(result.title, "Revised");
    }

    #[tokio::test]
    async fn test_deactivate_inactive_is_noop() {
        // No results appended: any query would fail the test
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ReviewRepository::new(db);
        let review = create_test_review("review1", "user1", false);
        let result = repo.deactivate(review).await.unwrap();

        assert!(!result.is_active);
    }

    #[tokio::test]
    async fn test_deactivate_active() {
        let mut inactive = create_test_review("review1", "user1", true);
        inactive.is_active = false;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[inactive]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let result = repo
            .deactivate(create_test_review("review1", "user1", true))
            .await
            .unwrap();

        assert!(!result.is_active);
    }

    #[tokio::test]
    async fn test_find_category_ids_in_position_order() {
        let links = vec![
            review_category::Model {
                review_id: "review1".to_string(),
                category_id: 4,
                position: 0,
            },
            review_category::Model {
                review_id: "review1".to_string(),
                category_id: 2,
                position: 1,
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([links])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        assert_eq!(repo.find_category_ids("review1").await.unwrap(), vec![4, 2]);
    }

    #[tokio::test]
    async fn test_search_by_keyword_and_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_review("review2", "user1", true),
                    create_test_review("review1", "user2", true),
                ]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let reviews = repo.search_by_keyword("GREAT").await.unwrap();
        let count = repo.count_by_keyword("GREAT").await.unwrap();

        assert_eq!(reviews.len(), 2);
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_list_active_for_other_users_on_same_contents() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_review("review3", "user2", true)]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let others = repo
            .list_active_for_other_users_on_same_contents("contents1", "review1", "user1")
            .await
            .unwrap();

        assert_eq!(others.len(), 1);
        assert_eq!(others[0].user_id, "user2");
    }
}
