pub mod auth;
pub mod client;

pub use auth::{admin_only, auth_middleware, AuthUser};
pub use client::ClientMeta;
