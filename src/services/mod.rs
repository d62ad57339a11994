pub mod auth;
pub mod references;

pub use auth::{AuthService, Claims};
