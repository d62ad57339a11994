use axum::extract::{Path, Query, State};
use bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::common::{search_term, PageRequest};
use crate::handlers::{JsonBody, ProjectListParams, DEFAULT_LIMIT};
use crate::models::{ApiResponse, CreateProject, Page, Pagination, ProjectResponse, UpdateProject};
use crate::repositories::{now, ProjectFilter, ProjectSearch, Store};
use crate::services::references::{expand_project, expand_projects, resolve_tag_names};
use crate::state::AppState;
use crate::validation::parse_object_id;

// ============ Request/Response DTOs ============

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectData {
    pub project: ProjectResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProject {
    pub deleted_project_id: String,
}

// ============ Handlers ============

/// Create a project (admin)
#[utoipa::path(
    post,
    path = "/api/admin/projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created", body = ProjectData),
        (status = 400, description = "Validation error or unknown tags"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<ProjectData>> {
    let input = CreateProject::parse(&body)?;
    let tags = resolve_tag_names(state.store.as_ref(), &input.tag_names).await?;

    let project = input.into_project(tags, now());
    state.store.insert_project(&project).await?;
    tracing::info!(project_id = %project.id, "Project created");

    let project = expand_project(state.store.as_ref(), project).await?;
    Ok(ApiResponse::created("Project created", ProjectData { project }))
}

/// List projects, newest first
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectListParams),
    responses(
        (status = 200, description = "Paginated projects with tags expanded", body = Page<ProjectResponse>)
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<ApiResponse<Page<ProjectResponse>>> {
    let paging = PageRequest::parse(params.page.as_deref(), params.limit.as_deref(), DEFAULT_LIMIT);
    let store = state.store.as_ref();

    let mut filter = ProjectFilter::default();

    if let Some(raw) = params.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        match resolve_tag_filter(store, raw).await? {
            Some(id) => filter.tag = Some(id),
            // An unknown tag name matches nothing
            None => return Ok(ApiResponse::ok("OK", Page::empty(paging.page, paging.limit))),
        }
    }

    if let Some(text) = search_term(params.search.as_deref(), params.q.as_deref()) {
        let tag_ids = store.find_tag_ids_matching(&text).await?;
        filter.search = Some(ProjectSearch { text, tag_ids });
    }

    let (total, projects) = tokio::try_join!(
        store.count_projects(&filter),
        store.list_projects(&filter, paging.window()),
    )?;
    let items = expand_projects(store, projects).await?;

    Ok(ApiResponse::ok(
        "OK",
        Page::new(items, Pagination::new(paging.page, paging.limit, total)),
    ))
}

/// `tag` may be an id or a tag name; names match case-insensitively
async fn resolve_tag_filter(store: &dyn Store, raw: &str) -> AppResult<Option<ObjectId>> {
    if let Ok(id) = ObjectId::parse_str(raw) {
        return Ok(Some(id));
    }

    let tag = store.find_tag_by_name(&raw.to_lowercase()).await?;
    Ok(tag.map(|t| t.id))
}

/// Get a project by ID
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project details", body = ProjectData),
        (status = 400, description = "Invalid project id"),
        (status = 404, description = "Project not found")
    ),
    tag = "Projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProjectData>> {
    let id = parse_object_id(&id, "project")?;
    let project = state
        .store
        .find_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

    let project = expand_project(state.store.as_ref(), project).await?;
    Ok(ApiResponse::ok("OK", ProjectData { project }))
}

/// Update a project (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    request_body = UpdateProject,
    responses(
        (status = 200, description = "Project updated", body = ProjectData),
        (status = 400, description = "Validation error or nothing to update"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<ProjectData>> {
    let id = parse_object_id(&id, "project")?;
    let input = UpdateProject::parse(&body)?;
    let store = state.store.as_ref();

    let mut project = store
        .find_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

    let tags = match input.tag_names.as_deref() {
        Some(names) => Some(resolve_tag_names(store, names).await?),
        None => None,
    };

    input.apply(&mut project, tags, now());
    store.update_project(&project).await?;

    let project = expand_project(store, project).await?;
    Ok(ApiResponse::ok("Project updated", ProjectData { project }))
}

/// Delete a project (admin)
///
/// Collections that reference it keep the id; reads skip it.
#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project deleted", body = DeletedProject),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedProject>> {
    let id = parse_object_id(&id, "project")?;
    if !state.store.delete_project(id).await? {
        return Err(AppError::NotFound("Project".to_string()));
    }
    tracing::info!(project_id = %id, "Project deleted");

    Ok(ApiResponse::ok(
        "Project deleted",
        DeletedProject {
            deleted_project_id: id.to_hex(),
        },
    ))
}
