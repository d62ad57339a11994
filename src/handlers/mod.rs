pub mod auth;
pub mod collection;
pub mod common;
pub mod contact;
pub mod project;
pub mod tag;
pub mod user;

pub use auth::{login, profile, register, AuthResponse, LoginRequest, ProfileResponse, RegisterRequest};
pub use collection::{
    admin_list_collections, create_collection, delete_collection, get_collection,
    list_collections, update_collection, CollectionData, DeletedCollection,
};
pub use common::{
    ContactListParams, JsonBody, PageParams, ProjectListParams, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use contact::{
    create_contact, get_contact, list_contacts, update_contact, ContactData, ContactDetailData,
};
pub use project::{
    create_project, delete_project, get_project, list_projects, update_project, DeletedProject,
    ProjectData,
};
pub use tag::{
    create_tag, delete_tag, get_tag, list_tags, update_tag, DeletedTag, TagData, TagListResponse,
};
pub use user::{create_user, delete_user, get_user, list_users, update_user, DeletedUser, UserData};

use crate::error::{AppError, AppResult};
use crate::models::{ApiResponse, EmptyData};

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API is up", body = EmptyData)
    ),
    tag = "Health"
)]
pub async fn health() -> AppResult<ApiResponse<EmptyData>> {
    Ok(ApiResponse::ok("API Work", EmptyData {}))
}

/// Enveloped 404 for unknown routes
pub async fn fallback() -> AppError {
    AppError::NotFound("Route".to_string())
}
