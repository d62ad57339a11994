// Library crate for the portfolio API
// Exports modules for use by the server binary and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod validation;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{
    admin_list_collections, create_collection, create_contact, create_project, create_tag,
    create_user, delete_collection, delete_project, delete_tag, delete_user, fallback,
    get_collection, get_contact, get_project, get_tag, get_user, health, list_collections,
    list_contacts, list_projects, list_tags, list_users, login, profile, register,
    update_collection, update_contact, update_project, update_tag, update_user,
};
use crate::middlewares::{admin_only, auth_middleware};
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    // Admin routes (authenticated, role must be admin)
    let admin_routes = Router::new()
        // User management
        .route("/api/admin/users", get(list_users).post(create_user))
        .route(
            "/api/admin/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        // Projects
        .route("/api/admin/projects", post(create_project))
        .route(
            "/api/admin/projects/{id}",
            patch(update_project).delete(delete_project),
        )
        // Tags
        .route("/api/admin/tags", post(create_tag))
        .route(
            "/api/admin/tags/{id}",
            get(get_tag).patch(update_tag).delete(delete_tag),
        )
        // Collections
        .route(
            "/api/admin/collections",
            get(admin_list_collections).post(create_collection),
        )
        .route(
            "/api/admin/collections/{id}",
            patch(update_collection).delete(delete_collection),
        )
        // Contacts
        .route("/api/admin/contacts", get(list_contacts))
        .route(
            "/api/admin/contacts/{id}",
            get(get_contact).patch(update_contact),
        )
        // Layers run bottom-up: authenticate first, then check the role
        .route_layer(middleware::from_fn(admin_only))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .route("/api/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health))
        // Public auth routes
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        // Public portfolio routes
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{id}", get(get_project))
        .route("/api/tags", get(list_tags))
        .route("/api/collections", get(list_collections))
        .route("/api/collections/{id}", get(get_collection))
        .route("/api/contacts", post(create_contact))
        .merge(protected_routes)
        .merge(admin_routes)
        .fallback(fallback)
        .with_state(state)
}
