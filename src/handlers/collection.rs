use axum::extract::{Path, Query, State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::{JsonBody, PageParams, DEFAULT_LIMIT};
use crate::models::{
    ApiResponse, CollectionResponse, CollectionSummaryResponse, CreateCollection, Page,
    Pagination, UpdateCollection,
};
use crate::repositories::{now, COLLECTION_NAME_TAKEN};
use crate::services::references::{expand_collection, expand_collections, ensure_projects_exist};
use crate::state::AppState;
use crate::validation::parse_object_id;

/// The admin list shows more per page than the public one
pub const ADMIN_LIST_LIMIT: u64 = 20;

// ============ Request/Response DTOs ============

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionData {
    pub collection: CollectionResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCollection {
    pub deleted_collection_id: String,
}

// ============ Handlers ============

/// Create a collection (admin)
#[utoipa::path(
    post,
    path = "/api/admin/collections",
    request_body = CreateCollection,
    responses(
        (status = 201, description = "Collection created", body = CollectionData),
        (status = 400, description = "Validation error or unknown projects"),
        (status = 409, description = "Collection name already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<CollectionData>> {
    let input = CreateCollection::parse(&body)?;
    let store = state.store.as_ref();

    ensure_projects_exist(store, &input.projects).await?;
    if store.collection_name_in_use(&input.name, None).await? {
        return Err(AppError::Conflict(COLLECTION_NAME_TAKEN.to_string()));
    }

    let collection = input.into_collection(now());
    store.insert_collection(&collection).await?;
    tracing::info!(collection_id = %collection.id, "Collection created");

    let collection = expand_collection(store, collection).await?;
    Ok(ApiResponse::created(
        "Collection created",
        CollectionData { collection },
    ))
}

/// List collections with projects expanded
#[utoipa::path(
    get,
    path = "/api/collections",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated collections, newest first", body = Page<CollectionResponse>)
    ),
    tag = "Collections"
)]
pub async fn list_collections(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<Page<CollectionResponse>>> {
    let page = collection_page(&state, &params, DEFAULT_LIMIT).await?;
    Ok(ApiResponse::ok("OK", page))
}

/// List collections with project summaries (admin)
#[utoipa::path(
    get,
    path = "/api/admin/collections",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated collections, newest first", body = Page<CollectionSummaryResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn admin_list_collections(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<Page<CollectionSummaryResponse>>> {
    let page = collection_page(&state, &params, ADMIN_LIST_LIMIT).await?;

    Ok(ApiResponse::ok(
        "OK",
        Page::new(
            page.items
                .into_iter()
                .map(CollectionSummaryResponse::from)
                .collect(),
            page.pagination,
        ),
    ))
}

async fn collection_page(
    state: &AppState,
    params: &PageParams,
    default_limit: u64,
) -> AppResult<Page<CollectionResponse>> {
    let paging = params.page_request(default_limit);
    let search = params.search();
    let store = state.store.as_ref();

    let (total, collections) = tokio::try_join!(
        store.count_collections(search.as_deref()),
        store.list_collections(search.as_deref(), paging.window()),
    )?;
    let items = expand_collections(store, collections).await?;

    Ok(Page::new(
        items,
        Pagination::new(paging.page, paging.limit, total),
    ))
}

/// Get a collection by ID
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(
        ("id" = String, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Collection details", body = CollectionData),
        (status = 400, description = "Invalid collection id"),
        (status = 404, description = "Collection not found")
    ),
    tag = "Collections"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CollectionData>> {
    let id = parse_object_id(&id, "collection")?;
    let collection = state
        .store
        .find_collection(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

    let collection = expand_collection(state.store.as_ref(), collection).await?;
    Ok(ApiResponse::ok("OK", CollectionData { collection }))
}

/// Update a collection (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/collections/{id}",
    params(
        ("id" = String, Path, description = "Collection ID")
    ),
    request_body = UpdateCollection,
    responses(
        (status = 200, description = "Collection updated", body = CollectionData),
        (status = 400, description = "Validation error or nothing to update"),
        (status = 404, description = "Collection not found"),
        (status = 409, description = "Collection name already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<CollectionData>> {
    let id = parse_object_id(&id, "collection")?;
    let input = UpdateCollection::parse(&body)?;
    let store = state.store.as_ref();

    let mut collection = store
        .find_collection(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

    if let Some(projects) = &input.projects {
        ensure_projects_exist(store, projects).await?;
    }
    if let Some(name) = &input.name {
        if store.collection_name_in_use(name, Some(collection.id)).await? {
            return Err(AppError::Conflict(COLLECTION_NAME_TAKEN.to_string()));
        }
    }

    input.apply(&mut collection, now());
    store.update_collection(&collection).await?;

    let collection = expand_collection(store, collection).await?;
    Ok(ApiResponse::ok(
        "Collection updated",
        CollectionData { collection },
    ))
}

/// Delete a collection (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/collections/{id}",
    params(
        ("id" = String, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Collection deleted", body = DeletedCollection),
        (status = 404, description = "Collection not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedCollection>> {
    let id = parse_object_id(&id, "collection")?;
    if !state.store.delete_collection(id).await? {
        return Err(AppError::NotFound("Collection".to_string()));
    }
    tracing::info!(collection_id = %id, "Collection deleted");

    Ok(ApiResponse::ok(
        "Collection deleted",
        DeletedCollection {
            deleted_collection_id: id.to_hex(),
        },
    ))
}
