//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use reviewboard_common::{AppError, AppResult, Config, PageMetaConfig, PageMetaFetcher};
use reviewboard_core::{
    Argon2Hasher, BookSearchClient, CategoryService, ContentResolver, ReviewQueryService,
    ReviewService, SessionService, SharedBookSearch, SharedMetaFetcher, SharedSessionStore,
    UserService,
};
use reviewboard_db::repositories::{
    CategoryRepository, ContentsRepository, ReviewRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub review_service: ReviewService,
    pub review_query_service: ReviewQueryService,
    pub category_service: CategoryService,
    pub session_service: SessionService,
    pub book_search: SharedBookSearch,
    pub meta_fetcher: SharedMetaFetcher,
    /// Name of the cookie carrying the session id.
    pub session_cookie: String,
    /// Number of book search results requested per query.
    pub book_search_hits: u32,
}

impl AppState {
    /// Wire every service over the database repositories.
    pub fn new(
        config: &Config,
        db: Arc<DatabaseConnection>,
        sessions: SharedSessionStore,
    ) -> AppResult<Self> {
        let users = Arc::new(UserRepository::new(Arc::clone(&db)));
        let contents = Arc::new(ContentsRepository::new(Arc::clone(&db)));
        let reviews = Arc::new(ReviewRepository::new(Arc::clone(&db)));
        let categories = Arc::new(CategoryRepository::new(db));

        let meta_fetcher: SharedMetaFetcher = Arc::new(PageMetaFetcher::new(
            PageMetaConfig::from(&config.meta_fetch),
        )?);
        let book_search: SharedBookSearch = Arc::new(BookSearchClient::new(&config.book_search)?);

        let resolver = ContentResolver::new(contents.clone(), Arc::clone(&meta_fetcher));

        Ok(Self {
            user_service: UserService::new(users.clone(), Arc::new(Argon2Hasher)),
            review_service: ReviewService::new(
                reviews.clone(),
                categories.clone(),
                users.clone(),
                resolver,
            ),
            review_query_service: ReviewQueryService::new(
                reviews,
                contents,
                users,
                categories.clone(),
            ),
            category_service: CategoryService::new(categories),
            session_service: SessionService::new(sessions),
            book_search,
            meta_fetcher,
            session_cookie: config.session.cookie_name.clone(),
            book_search_hits: config.book_search.default_hits,
        })
    }
}

/// Session id taken from the request cookie, whether or not it is logged in.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Session middleware.
///
/// Resolves the session cookie to a user id and re-reads that user, so a
/// renamed or removed account is reflected on the very next request. A
/// removed account makes the request anonymous; a storage failure fails
/// the request rather than logging the user out.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());

    if let Some(cookie) = jar.get(&state.session_cookie) {
        let session_id = cookie.value().to_string();

        if let Some(user_id) = state.session_service.user_id(&session_id).await {
            match state.user_service.get(&user_id).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                }
                Err(AppError::NotFound(_)) => {
                    tracing::debug!(user_id = %user_id, "Session user no longer exists");
                }
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "Failed to load session user");
                    return e.into_response();
                }
            }
        }
        req.extensions_mut().insert(SessionId(session_id));
    }

    next.run(req).await
}
