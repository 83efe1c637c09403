//! HTTP API layer for reviewboard.
//!
//! JSON endpoints over the core services:
//!
//! - **Endpoints**: auth, profile, reviews, book search, URL preview, categories
//! - **Extractors**: session-backed authentication
//! - **Middleware**: session cookie resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, session_middleware};
