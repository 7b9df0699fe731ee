use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
    response::Redirect,
};
use std::convert::Infallible;
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::errors::ApiError;
use crate::models::User;
use crate::session::SessionData;

/// Caller of a JSON API endpoint, authenticated by a bearer access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims =
            crate::auth::verify_access(&state.config.jwt, token).ok_or(ApiError::Unauthorized)?;

        // Tokens outlive accounts; make sure the subject still exists
        let user = User::find_by_id(claims.sub, &state.db)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}

/// Logged-in user of an HTML page, resolved from the session cookie.
/// Missing or stale sessions redirect to the login page.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub session_id: String,
    pub data: SessionData,
    pub user: User,
}

async fn load_session_user(
    parts: &mut Parts,
    state: &Arc<crate::AppState>,
) -> Option<SessionUser> {
    let cookies = Cookies::from_request_parts(parts, state).await.ok()?;
    let session_id = cookies.get(&state.sessions.cookie_name)?.value().to_string();

    let data = state.sessions.get(&session_id).await.ok()??;
    let user = User::find_by_id(data.user_id, &state.db).await.ok()??;

    Some(SessionUser {
        session_id,
        data,
        user,
    })
}

impl FromRequestParts<Arc<crate::AppState>> for SessionUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        load_session_user(parts, state)
            .await
            .ok_or_else(|| Redirect::to("/accounts/login/"))
    }
}

impl OptionalFromRequestParts<Arc<crate::AppState>> for SessionUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(load_session_user(parts, state).await)
    }
}
