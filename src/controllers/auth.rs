use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::auth;
use crate::errors::ApiError;
use crate::forms::{
    error_messages, LoginApiRequest, RegisterApiRequest, TokenObtainRequest, TokenRefreshRequest,
};
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/token/", post(token_obtain))
        .route("/token/refresh/", post(token_refresh))
        .route("/register/", post(register_user))
        .route("/login/", post(login_user))
}

// POST /lol/api/token/ - the issuance endpoint the token client calls
async fn token_obtain(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenObtainRequest>,
) -> Result<Json<auth::TokenPair>, ApiError> {
    let user = User::find_by_username(&request.username, &state.db)
        .await?
        .filter(|u| u.verify_password(&request.password))
        .ok_or(ApiError::Unauthorized)?;

    let pair =
        auth::issue_pair(&state.config.jwt, user.id, &user.username).map_err(|e| {
            tracing::error!("token issuance failed: {:?}", e);
            ApiError::Internal
        })?;
    Ok(Json(pair))
}

// POST /lol/api/token/refresh/ - returns a new access token only; the
// refresh token is not rotated
async fn token_refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let claims =
        auth::verify_refresh(&state.config.jwt, &request.refresh).ok_or(ApiError::Unauthorized)?;

    let user = User::find_by_id(claims.sub, &state.db)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let pair = auth::issue_pair(&state.config.jwt, user.id, &user.username).map_err(|e| {
        tracing::error!("token issuance failed: {:?}", e);
        ApiError::Internal
    })?;
    Ok(Json(json!({ "access": pair.access })))
}

// POST /lol/api/register/
async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterApiRequest>,
) -> Result<Response, ApiError> {
    if let Err(errors) = request.validate() {
        return Err(ApiError::Validation(error_messages(&errors).join("; ")));
    }
    if User::username_taken(&request.username, &state.db).await? {
        return Err(ApiError::Conflict("username already taken".to_string()));
    }

    let password_hash = auth::hash_password(&request.password).map_err(|e| {
        tracing::error!("password hashing failed: {:?}", e);
        ApiError::Internal
    })?;
    let user = User::create(&request.username, &request.email, &password_hash, &state.db).await?;

    let pair = auth::issue_pair(&state.config.jwt, user.id, &user.username).map_err(|e| {
        tracing::error!("token issuance failed: {:?}", e);
        ApiError::Internal
    })?;

    tracing::info!("Registered user {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful!",
            "user_id": user.id,
            "username": user.username,
            "access": pair.access,
            "refresh": pair.refresh,
        })),
    )
        .into_response())
}

// POST /lol/api/login/
async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginApiRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = User::find_by_username(&request.username, &state.db)
        .await?
        .filter(|u| u.verify_password(&request.password))
        .ok_or(ApiError::Unauthorized)?;

    let pair = auth::issue_pair(&state.config.jwt, user.id, &user.username).map_err(|e| {
        tracing::error!("token issuance failed: {:?}", e);
        ApiError::Internal
    })?;

    Ok(Json(json!({
        "message": "Login successful!",
        "user_id": user.id,
        "username": user.username,
        "access": pair.access,
        "refresh": pair.refresh,
    })))
}
