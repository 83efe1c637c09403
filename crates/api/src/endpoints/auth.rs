//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use reviewboard_core::{LoginInput, RegisterInput};
use reviewboard_db::entities::user;
use serde::Serialize;

use crate::{
    extractors::{MaybeAuthUser, MaybeSessionId},
    middleware::AppState,
    response::{ApiResponse, FormError, WithForm, ok},
};

/// Account summary returned by register and login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    /// The request came from a session that was already logged in, so
    /// nothing was changed.
    pub already_authenticated: bool,
}

impl AccountResponse {
    fn new(user: user::Model, already_authenticated: bool) -> Self {
        Self {
            id: user.id,
            username: user.username,
            already_authenticated,
        }
    }
}

/// Create a new account. The client logs in separately afterwards.
async fn register(
    State(state): State<AppState>,
    MaybeAuthUser(current): MaybeAuthUser,
    Json(req): Json<RegisterInput>,
) -> Result<ApiResponse<AccountResponse>, FormError<RegisterInput>> {
    if let Some(user) = current {
        return Ok(ApiResponse::ok(AccountResponse::new(user, true)));
    }

    let user = state
        .user_service
        .register(req.clone())
        .await
        .with_form(req)?;

    Ok(ApiResponse::ok(AccountResponse::new(user, false)))
}

/// Log in and start a fresh session.
async fn login(
    State(state): State<AppState>,
    MaybeAuthUser(current): MaybeAuthUser,
    jar: CookieJar,
    Json(req): Json<LoginInput>,
) -> Result<(CookieJar, ApiResponse<AccountResponse>), FormError<LoginInput>> {
    if let Some(user) = current {
        return Ok((jar, ApiResponse::ok(AccountResponse::new(user, true))));
    }

    let user = state.user_service.login(req.clone()).await.with_form(req)?;
    let session_id = state.session_service.sign_in(&user.id).await;
    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = Cookie::build((state.session_cookie.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        ApiResponse::ok(AccountResponse::new(user, false)),
    ))
}

/// End the current session, if any.
async fn logout(
    State(state): State<AppState>,
    MaybeSessionId(session_id): MaybeSessionId,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Some(session_id) = session_id {
        state.session_service.sign_out(&session_id).await;
    }

    let jar = jar.remove(Cookie::build(state.session_cookie.clone()).path("/"));
    (jar, ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
