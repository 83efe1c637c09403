//! Database entities.

pub mod category;
pub mod contents;
pub mod review;
pub mod review_category;
pub mod user;

pub use category::Entity as Category;
pub use contents::Entity as Contents;
pub use review::Entity as Review;
pub use review_category::Entity as ReviewCategory;
pub use user::Entity as User;
