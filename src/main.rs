use std::net::SocketAddr;

use anyhow::Context;
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use folio_api::config::{Config, LogFormat};
use folio_api::handlers::{
    AuthResponse, CollectionData, ContactData, ContactDetailData, DeletedCollection,
    DeletedProject, DeletedTag, DeletedUser, LoginRequest, ProfileResponse, ProjectData,
    RegisterRequest, TagData, TagListResponse, UserData,
};
use folio_api::middlewares::AuthUser;
use folio_api::models::{
    CollectionResponse, CollectionSummaryResponse, ContactDetailResponse, ContactMeta,
    ContactResponse, CreateCollection, CreateContact, CreateProject, CreateTag, CreateUser,
    EmptyData, Pagination, ProjectResponse, ProjectSummary, Role, TagResponse, TagSummary,
    UpdateCollection, UpdateContact, UpdateProject, UpdateTag, UpdateUser, UserResponse,
};
use folio_api::state::AppState;
use folio_api::{build_router, handlers};

/// Security scheme for Bearer token
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::profile,
        handlers::user::create_user,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::project::create_project,
        handlers::project::list_projects,
        handlers::project::get_project,
        handlers::project::update_project,
        handlers::project::delete_project,
        handlers::tag::create_tag,
        handlers::tag::list_tags,
        handlers::tag::get_tag,
        handlers::tag::update_tag,
        handlers::tag::delete_tag,
        handlers::collection::create_collection,
        handlers::collection::list_collections,
        handlers::collection::admin_list_collections,
        handlers::collection::get_collection,
        handlers::collection::update_collection,
        handlers::collection::delete_collection,
        handlers::contact::create_contact,
        handlers::contact::list_contacts,
        handlers::contact::get_contact,
        handlers::contact::update_contact,
    ),
    components(schemas(
        EmptyData,
        Pagination,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        ProfileResponse,
        AuthUser,
        Role,
        CreateUser,
        UpdateUser,
        UserResponse,
        UserData,
        DeletedUser,
        CreateProject,
        UpdateProject,
        ProjectResponse,
        ProjectSummary,
        ProjectData,
        DeletedProject,
        CreateTag,
        UpdateTag,
        TagResponse,
        TagSummary,
        TagData,
        TagListResponse,
        DeletedTag,
        CreateCollection,
        UpdateCollection,
        CollectionResponse,
        CollectionSummaryResponse,
        CollectionData,
        DeletedCollection,
        CreateContact,
        UpdateContact,
        ContactMeta,
        ContactResponse,
        ContactDetailResponse,
        ContactData,
        ContactDetailData,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Users", description = "User management endpoints (admin)"),
        (name = "Projects", description = "Portfolio projects"),
        (name = "Tags", description = "Project tags"),
        (name = "Collections", description = "Curated project collections"),
        (name = "Contacts", description = "Contact requests")
    )
)]
struct ApiDoc;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("folio_api=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .with_context(|| format!("Invalid CORS_ORIGIN: {}", config.cors_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let addr = config.server_addr();
    let cors = cors_layer(&config)?;
    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; token endpoints will fail");
    }

    // Initialize application state (connects to MongoDB and ensures indexes)
    tracing::info!("Connecting to MongoDB...");
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    tracing::info!("Database connection established");

    // Build the main application router
    let app = build_router(state)
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
