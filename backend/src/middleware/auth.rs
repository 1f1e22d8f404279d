//! Identity middleware
//!
//! Callers identify themselves with the `X-Username` header. The user is
//! loaded from the database and attached to the request; handlers then check
//! role capabilities through [`AuthUser::require`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::models::{Capability, Role};
use crate::services::AuthService;
use crate::AppState;

/// Header carrying the acting user's name
pub const USERNAME_HEADER: &str = "x-username";

/// Authenticated user information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }

    /// Fail with 403 unless the user's role grants `capability`
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            tracing::info!(
                username = %self.username,
                role = %self.role,
                ?capability,
                "Permission denied"
            );
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Resolve `X-Username` to a stored user and insert it into the request
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let username = request
        .headers()
        .get(USERNAME_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?
        .to_string();

    let user = AuthService::new(state.db.clone())
        .find_user(&username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    tracing::debug!(username = %user.username, role = %user.role, "Identified request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }
}
