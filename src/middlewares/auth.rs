use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::{Role, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Identity of the caller, loaded from the store on every request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Extractor for AuthUser - can be used directly in handlers
/// Example: `async fn handler(user: AuthUser) -> ... { }`
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Auth middleware - validates JWT, loads the user and injects AuthUser into
/// request extensions. Every failure ends the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;

    // Verify token and get claims
    let claims = AuthService::verify_token(token, &state.config)?;

    let user_id = claims
        .sub
        .as_deref()
        .and_then(|sub| ObjectId::parse_str(sub).ok())
        .ok_or(AppError::Unauthorized)?;

    let user = match state.store.find_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %user_id, "Token subject no longer exists");
            return Err(AppError::Unauthorized);
        }
        Err(e) => {
            tracing::warn!(error = %e, "User lookup failed during authentication");
            return Err(AppError::Unauthorized);
        }
    };

    request.extensions_mut().insert(AuthUser::from(user));

    // Continue to handler
    Ok(next.run(request).await)
}

/// Admin gate - must run after `auth_middleware`
pub async fn admin_only(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AppError::Unauthorized)?;

    if user.role != Role::Admin {
        tracing::debug!(user_id = %user.id, "Admin route refused");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
