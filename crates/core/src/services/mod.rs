//! Business logic services.

#![allow(missing_docs)]

pub mod book_search;
pub mod category;
pub mod content;
pub mod password;
pub mod review;
pub mod review_query;
pub mod session;
pub mod store;
pub mod user;
pub mod visibility;

#[cfg(test)]
pub(crate) mod testing;

pub use book_search::{BookSearch, BookSearchClient, BookSummary, SharedBookSearch};
pub use category::CategoryService;
pub use content::{BookSelection, ContentResolver, MetaFetcher, ResolveInput, SharedMetaFetcher};
pub use password::{Argon2Hasher, PasswordHasher, SharedPasswordHasher};
pub use review::{ActingUser, Rating, ReviewDraft, ReviewService, ReviewWithCategories};
pub use review_query::{CategoryReviews, KeywordSearch, ReviewDetail, ReviewQueryService, ReviewView};
pub use session::{MemorySessionStore, SessionService, SessionStore, SharedSessionStore, USER_ID_KEY};
pub use store::{
    CategoryStore, ContentsStore, ReviewStore, SharedCategoryStore, SharedContentsStore,
    SharedReviewStore, SharedUserDirectory, UserDirectory,
};
pub use user::{LoginInput, RegisterInput, UpdateProfileInput, UserService};
pub use visibility::can_view;
