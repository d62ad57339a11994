use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::repositories::Window;
use crate::validation::{invalid, parse_leading_int, Body};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Raw JSON object body. An empty body reads as `{}`; anything that is not a
/// JSON object is a 400 with the usual envelope.
#[derive(Debug, Default)]
pub struct JsonBody(pub Body);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| invalid("Invalid request body"))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(invalid("Request body must be a JSON object")),
            Err(_) => Err(invalid("Invalid JSON body")),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number
    #[param(value_type = Option<u64>, default = 1, minimum = 1)]
    pub page: Option<String>,
    #[param(value_type = Option<u64>, default = 10, minimum = 1, maximum = 100)]
    pub limit: Option<String>,
    /// Case-insensitive substring match
    pub search: Option<String>,
    /// Alias for `search`
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListParams {
    #[param(value_type = Option<u64>, default = 1, minimum = 1)]
    pub page: Option<String>,
    #[param(value_type = Option<u64>, default = 10, minimum = 1, maximum = 100)]
    pub limit: Option<String>,
    /// Matches name, description, stack entries and tag names
    pub search: Option<String>,
    pub q: Option<String>,
    /// Tag id, or tag name (case-insensitive)
    pub tag: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactListParams {
    #[param(value_type = Option<u64>, default = 1, minimum = 1)]
    pub page: Option<String>,
    #[param(value_type = Option<u64>, default = 10, minimum = 1, maximum = 100)]
    pub limit: Option<String>,
    pub search: Option<String>,
    pub q: Option<String>,
    /// `true` or `false`; other values are ignored
    #[serde(rename = "isRead")]
    #[param(value_type = Option<bool>)]
    pub is_read: Option<String>,
}

/// Resolved paging input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Lenient parse: unreadable `page` becomes 1, unreadable `limit` the
    /// default, then both are forced into range
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u64) -> Self {
        let page = page.and_then(parse_leading_int).unwrap_or(1).max(1) as u64;
        let limit = limit
            .and_then(parse_leading_int)
            .map(|l| l.clamp(1, MAX_LIMIT as i64) as u64)
            .unwrap_or(default_limit);

        Self { page, limit }
    }

    pub fn window(&self) -> Window {
        Window::page(self.page, self.limit)
    }
}

/// `search` wins over `q`; blank means no search
pub fn search_term(search: Option<&str>, q: Option<&str>) -> Option<String> {
    [search, q]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn parse_bool_flag(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

impl PageParams {
    pub fn page_request(&self, default_limit: u64) -> PageRequest {
        PageRequest::parse(self.page.as_deref(), self.limit.as_deref(), default_limit)
    }

    pub fn search(&self) -> Option<String> {
        search_term(self.search.as_deref(), self.q.as_deref())
    }
}
