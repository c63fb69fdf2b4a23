//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, AuthSession, User};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthSession>>)> {
    let session = state
        .auth
        .register(&body.email, &body.password, &body.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(session, "User registered successfully")),
    ))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthSession>>> {
    let session = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(ApiResponse::with_message(session, "Login successful")))
}

/// Demo account login
pub async fn demo_login(State(state): State<AppState>) -> AppResult<Json<ApiResponse<AuthSession>>> {
    let session = state.auth.demo_login().await?;
    Ok(Json(ApiResponse::with_message(session, "Demo login successful")))
}

/// Current user profile
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.auth.get_user(current_user.0.user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let token = state.auth.refresh(current_user.0.user_id).await?;
    Ok(Json(ApiResponse::with_message(
        TokenResponse { token },
        "Token refreshed successfully",
    )))
}
