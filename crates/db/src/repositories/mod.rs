//! Repositories over the sea-orm entities.

mod category;
mod contents;
mod review;
mod user;

pub use category::CategoryRepository;
pub use contents::ContentsRepository;
pub use review::{NewReview, ReviewRepository};
pub use user::UserRepository;

use reviewboard_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert error, reporting unique index violations as conflicts.
pub(crate) fn map_insert_err(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            AppError::Conflict(format!("{what} already exists: {detail}"))
        }
        _ => AppError::Database(err.to_string()),
    }
}
