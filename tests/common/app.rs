use std::sync::Arc;

use axum_test::TestServer;
use time::Duration;

use folio_api::build_router;
use folio_api::config::{Config, LogFormat};
use folio_api::repositories::InMemoryStore;
use folio_api::state::AppState;

/// Test configuration
pub fn test_config() -> Config {
    Config {
        mongodb_url: "mongodb://localhost:27017".to_string(),
        mongodb_database: "folio_test".to_string(),
        jwt_secret: Some("test-jwt-secret-that-is-at-least-32-characters-long".to_string()),
        jwt_expires_in: Duration::days(7),
        // Keep hashing fast in tests
        password_hash_cost: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origin: "http://localhost:5173".to_string(),
        log_format: LogFormat::Pretty,
    }
}

/// Test application wrapper
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application backed by an in-memory store
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::with_store(config, Arc::new(InMemoryStore::new()));

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, state }
    }
}
