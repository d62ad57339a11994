use axum::extract::{Path, Query, State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::common::{parse_bool_flag, search_term, PageRequest};
use crate::handlers::{ContactListParams, JsonBody, DEFAULT_LIMIT};
use crate::middlewares::ClientMeta;
use crate::models::{
    ApiResponse, ContactDetailResponse, ContactResponse, CreateContact, Page, Pagination,
    UpdateContact,
};
use crate::repositories::{now, ContactFilter, CONTACT_EMAIL_TAKEN};
use crate::state::AppState;
use crate::validation::parse_object_id;

// ============ Request/Response DTOs ============

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactData {
    pub contact: ContactResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactDetailData {
    pub contact: ContactDetailResponse,
}

// ============ Handlers ============

/// Submit a contact request
#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = CreateContact,
    responses(
        (status = 201, description = "Contact request created", body = ContactData),
        (status = 400, description = "Validation error"),
        (status = 409, description = "A request from this email already exists")
    ),
    tag = "Contacts"
)]
pub async fn create_contact(
    State(state): State<AppState>,
    ClientMeta(meta): ClientMeta,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<ContactData>> {
    let input = CreateContact::parse(&body)?;

    if state.store.contact_email_in_use(&input.email).await? {
        return Err(AppError::Conflict(CONTACT_EMAIL_TAKEN.to_string()));
    }

    let contact = input.into_contact(meta, now());
    state.store.insert_contact(&contact).await?;
    tracing::info!(contact_id = %contact.id, "Contact request received");

    Ok(ApiResponse::created(
        "Contact request created",
        ContactData {
            contact: contact.into(),
        },
    ))
}

/// List contact requests, unread first (admin)
#[utoipa::path(
    get,
    path = "/api/admin/contacts",
    params(ContactListParams),
    responses(
        (status = 200, description = "Paginated contact requests", body = Page<ContactResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Contacts"
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<ContactListParams>,
) -> AppResult<ApiResponse<Page<ContactResponse>>> {
    let paging = PageRequest::parse(params.page.as_deref(), params.limit.as_deref(), DEFAULT_LIMIT);
    let filter = ContactFilter {
        is_read: parse_bool_flag(params.is_read.as_deref()),
        search: search_term(params.search.as_deref(), params.q.as_deref()),
    };

    let (total, contacts) = tokio::try_join!(
        state.store.count_contacts(&filter),
        state.store.list_contacts(&filter, paging.window()),
    )?;

    Ok(ApiResponse::ok(
        "OK",
        Page::new(
            contacts.into_iter().map(ContactResponse::from).collect(),
            Pagination::new(paging.page, paging.limit, total),
        ),
    ))
}

/// Get a contact request with its metadata (admin)
#[utoipa::path(
    get,
    path = "/api/admin/contacts/{id}",
    params(
        ("id" = String, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Contact details", body = ContactDetailData),
        (status = 404, description = "Contact not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Contacts"
)]
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ContactDetailData>> {
    let id = parse_object_id(&id, "contact")?;
    let contact = state
        .store
        .find_contact(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contact".to_string()))?;

    Ok(ApiResponse::ok(
        "OK",
        ContactDetailData {
            contact: contact.into(),
        },
    ))
}

/// Mark a contact request read or unread (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/contacts/{id}",
    params(
        ("id" = String, Path, description = "Contact ID")
    ),
    request_body = UpdateContact,
    responses(
        (status = 200, description = "Contact updated", body = ContactData),
        (status = 400, description = "isRead missing or not a boolean"),
        (status = 404, description = "Contact not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Contacts"
)]
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<ApiResponse<ContactData>> {
    let id = parse_object_id(&id, "contact")?;
    let input = UpdateContact::parse(&body)?;

    let mut contact = state
        .store
        .find_contact(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contact".to_string()))?;

    input.apply(&mut contact, now());
    state.store.update_contact(&contact).await?;

    Ok(ApiResponse::ok(
        "Contact updated",
        ContactData {
            contact: contact.into(),
        },
    ))
}
