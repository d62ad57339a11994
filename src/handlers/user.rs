use axum::extract::{Path, Query, State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::{JsonBody, PageParams, DEFAULT_LIMIT};
use crate::models::{ApiResponse, CreateUser, Page, Pagination, UpdateUser, UserResponse};
use crate::repositories::{now, USER_EMAIL_TAKEN};
use crate::services::AuthService;
use crate::state::AppState;
use crate::validation::parse_object_id;

// ============ Request/Response DTOs ============

#[derive(Debug, Serialize, ToSchema)]
pub struct UserData {
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUser {
    pub deleted_user_id: String,
}

// ============ Handlers ============

/// Create a user (admin)
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserData),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<UserData>> {
    let input = CreateUser::from_admin(&body)?;

    if state.store.email_in_use(&input.email, None).await? {
        return Err(AppError::Conflict(USER_EMAIL_TAKEN.to_string()));
    }

    let password_hash = AuthService::hash_password(&input.password, &state.config).await?;
    let user = input.into_user(password_hash, now());
    state.store.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");

    Ok(ApiResponse::created(
        "User created",
        UserData { user: user.into() },
    ))
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated users, newest first", body = Page<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<Page<UserResponse>>> {
    let paging = params.page_request(DEFAULT_LIMIT);
    let search = params.search();

    let (total, users) = tokio::try_join!(
        state.store.count_users(search.as_deref()),
        state.store.list_users(search.as_deref(), paging.window()),
    )?;

    Ok(ApiResponse::ok(
        "OK",
        Page::new(
            users.into_iter().map(UserResponse::from).collect(),
            Pagination::new(paging.page, paging.limit, total),
        ),
    ))
}

/// Get a user by ID (admin)
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserData),
        (status = 400, description = "Invalid user id"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserData>> {
    let id = parse_object_id(&id, "user")?;
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(ApiResponse::ok("OK", UserData { user: user.into() }))
}

/// Update a user (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserData),
        (status = 400, description = "Validation error or nothing to update"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<UserData>> {
    let id = parse_object_id(&id, "user")?;
    let input = UpdateUser::parse(&body)?;

    let mut user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if let Some(email) = &input.email {
        if state.store.email_in_use(email, Some(user.id)).await? {
            return Err(AppError::Conflict(USER_EMAIL_TAKEN.to_string()));
        }
    }

    let password_hash = match input.password.as_deref() {
        Some(password) => Some(AuthService::hash_password(password, &state.config).await?),
        None => None,
    };

    input.apply(&mut user, password_hash, now());
    state.store.update_user(&user).await?;

    Ok(ApiResponse::ok(
        "User updated",
        UserData { user: user.into() },
    ))
}

/// Delete a user (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeletedUser),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedUser>> {
    let id = parse_object_id(&id, "user")?;
    if !state.store.delete_user(id).await? {
        return Err(AppError::NotFound("User".to_string()));
    }
    tracing::info!(user_id = %id, "User deleted");

    Ok(ApiResponse::ok(
        "User deleted",
        DeletedUser {
            deleted_user_id: id.to_hex(),
        },
    ))
}
