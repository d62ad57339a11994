use axum::extract::{Path, State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::JsonBody;
use crate::models::{ApiResponse, CreateTag, TagResponse, UpdateTag};
use crate::repositories::{now, TAG_NAME_TAKEN};
use crate::state::AppState;
use crate::validation::parse_object_id;

// ============ Request/Response DTOs ============

#[derive(Debug, Serialize, ToSchema)]
pub struct TagData {
    pub tag: TagResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagListResponse {
    pub tags: Vec<TagResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTag {
    pub deleted_tag_id: String,
}

// ============ Handlers ============

/// Create a tag (admin)
#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = CreateTag,
    responses(
        (status = 201, description = "Tag created", body = TagData),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Tag name already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<TagData>> {
    let input = CreateTag::parse(&body)?;

    if state.store.tag_name_in_use(&input.name, None).await? {
        return Err(AppError::Conflict(TAG_NAME_TAKEN.to_string()));
    }

    let tag = input.into_tag(now());
    state.store.insert_tag(&tag).await?;
    tracing::info!(tag_id = %tag.id, name = %tag.name, "Tag created");

    Ok(ApiResponse::created("Tag created", TagData { tag: tag.into() }))
}

/// List all tags by name
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "Every tag, sorted by name", body = TagListResponse)
    ),
    tag = "Tags"
)]
pub async fn list_tags(State(state): State<AppState>) -> AppResult<ApiResponse<TagListResponse>> {
    let tags = state.store.list_tags().await?;

    Ok(ApiResponse::ok(
        "OK",
        TagListResponse {
            tags: tags.into_iter().map(TagResponse::from).collect(),
        },
    ))
}

/// Get a tag by ID (admin)
#[utoipa::path(
    get,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = String, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag details", body = TagData),
        (status = 404, description = "Tag not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tags"
)]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TagData>> {
    let id = parse_object_id(&id, "tag")?;
    let tag = state
        .store
        .find_tag(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag".to_string()))?;

    Ok(ApiResponse::ok("OK", TagData { tag: tag.into() }))
}

/// Update a tag (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = String, Path, description = "Tag ID")
    ),
    request_body = UpdateTag,
    responses(
        (status = 200, description = "Tag updated", body = TagData),
        (status = 400, description = "Validation error or nothing to update"),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Tag name already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tags"
)]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<TagData>> {
    let id = parse_object_id(&id, "tag")?;
    let input = UpdateTag::parse(&body)?;

    let mut tag = state
        .store
        .find_tag(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag".to_string()))?;

    if let Some(name) = &input.name {
        if state.store.tag_name_in_use(name, Some(tag.id)).await? {
            return Err(AppError::Conflict(TAG_NAME_TAKEN.to_string()));
        }
    }

    input.apply(&mut tag, now());
    state.store.update_tag(&tag).await?;

    Ok(ApiResponse::ok("Tag updated", TagData { tag: tag.into() }))
}

/// Delete a tag (admin)
///
/// Projects keep the dangling id; it is dropped when they are read.
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = String, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag deleted", body = DeletedTag),
        (status = 404, description = "Tag not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedTag>> {
    let id = parse_object_id(&id, "tag")?;
    if !state.store.delete_tag(id).await? {
        return Err(AppError::NotFound("Tag".to_string()));
    }
    tracing::info!(tag_id = %id, "Tag deleted");

    Ok(ApiResponse::ok(
        "Tag deleted",
        DeletedTag {
            deleted_tag_id: id.to_hex(),
        },
    ))
}
