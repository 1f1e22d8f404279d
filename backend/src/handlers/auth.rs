//! Authentication and user management handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Capability, CreateUserInput, CreateUserResponse, LoginInput, LoginResponse};
use crate::services::AuthService;
use crate::AppState;

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let auth_service = AuthService::new(state.db);
    let response = auth_service.login(body).await?;
    Ok(Json(response))
}

/// Create a user account (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<CreateUserResponse>)> {
    current_user.0.require(Capability::ManageUsers)?;

    let auth_service = AuthService::new(state.db);
    let user = auth_service.create_user(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User created".to_string(),
            user,
        }),
    ))
}
