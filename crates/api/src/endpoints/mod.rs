//! API endpoints.

mod auth;
mod books;
mod categories;
mod contents;
mod health;
mod me;
mod reviews;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        .nest("/users", users::router())
        .nest("/reviews", reviews::router())
        .nest("/books", books::router())
        .nest("/contents", contents::router())
        .nest("/categories", categories::router())
        .nest("/health", health::router())
}
