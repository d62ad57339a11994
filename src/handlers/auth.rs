use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::JsonBody;
use crate::middlewares::AuthUser;
use crate::models::{ApiResponse, CreateUser, LoginUser, UserResponse};
use crate::repositories::{now, USER_EMAIL_TAKEN};
use crate::services::AuthService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: AuthUser,
}

// ============ Handlers ============

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 409, description = "Email already exists"),
        (status = 400, description = "Validation error")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<AuthResponse>> {
    let input = CreateUser::from_register(&body)?;

    // Nothing is persisted unless a token can be issued afterwards
    state.config.signing_secret()?;

    if state.store.email_in_use(&input.email, None).await? {
        return Err(AppError::Conflict(USER_EMAIL_TAKEN.to_string()));
    }

    // Hash password
    let password_hash = AuthService::hash_password(&input.password, &state.config).await?;
    let user = input.into_user(password_hash, now());
    state.store.insert_user(&user).await?;

    // Generate token
    let token = AuthService::generate_token(user.id, user.role, &state.config)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok(ApiResponse::created(
        "Registered",
        AuthResponse {
            token,
            user: user.into(),
        },
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<AuthResponse>> {
    let input = LoginUser::parse(&body)?;

    // Unknown email and wrong password look the same to the caller
    let user = state
        .store
        .find_user_by_email(&input.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Verify password
    let is_valid = AuthService::verify_password(&input.password, &user.password_hash).await?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    // Generate token
    let token = AuthService::generate_token(user.id, user.role, &state.config)?;

    Ok(ApiResponse::ok(
        "Logged in",
        AuthResponse {
            token,
            user: user.into(),
        },
    ))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Current user info", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn profile(user: AuthUser) -> AppResult<ApiResponse<ProfileResponse>> {
    Ok(ApiResponse::ok("OK", ProfileResponse { user }))
}
