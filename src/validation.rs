//! Normalization helpers shared by the command parsers, plus [`Fields`], a
//! reader over the untyped JSON object every write endpoint receives.

use std::sync::LazyLock;

use bson::oid::ObjectId;
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{AppError, AppResult};

/// Untyped request body as received at the HTTP boundary
pub type Body = Map<String, Value>;

pub const MAX_DESCRIPTION_LEN: usize = 4000;
pub const MAX_IMAGE_URL_LEN: usize = 2048;

pub fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

/// Trimmed, lowercased email
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `local@domain.tld` with no whitespace and a top-level part of two or
/// more characters.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("Invalid regex pattern for email")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Accepts `RGB` or `RRGGBB` with an optional leading `#` and returns the
/// value with the `#` always present. Letter case is kept.
pub fn normalize_hex_color(raw: &str) -> Option<String> {
    let value = raw.trim();
    let hex = value.strip_prefix('#').unwrap_or(value);

    let valid = matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit());
    valid.then(|| format!("#{}", hex))
}

/// Returns the serialized URL when `raw` is an absolute http(s) URL, otherwise
/// an empty string. Blank input is also empty.
pub fn normalize_image_url(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => String::new(),
    }
}

/// Trim entries, drop blanks, keep the first occurrence of each value
pub fn dedup_trimmed<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if !value.is_empty() && !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Normalized tag names: lowercased, trimmed and deduplicated
pub fn normalize_tag_names<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedup_trimmed(values.into_iter().map(|v| v.as_ref().trim().to_lowercase()))
}

/// Length in characters, not bytes
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Escape a user-supplied string for use inside a MongoDB `$regex`
pub fn escape_regex(raw: &str) -> String {
    regex::escape(raw)
}

/// Case-insensitive substring match used by the in-memory store
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Parse a path segment as a record id
pub fn parse_object_id(raw: &str, entity: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw.trim()).map_err(|_| invalid(format!("Invalid {} id", entity)))
}

/// Leading-integer parse in the manner of query strings: optional sign, then
/// digits; trailing garbage is ignored. `None` when no digits lead.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Saturate huge values instead of failing
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Typed accessors over an untyped JSON body.
///
/// A key that is absent or `null` counts as "not supplied". A supplied value
/// of the wrong JSON type is a validation error naming the field.
pub struct Fields<'a> {
    body: &'a Body,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a Body) -> Self {
        Self { body }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.body.get(key).filter(|v| !v.is_null())
    }

    /// Whether any of the given keys carries a value
    pub fn any_present(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.get(key).is_some())
    }

    pub fn string(&self, key: &str) -> AppResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(invalid(format!("{} must be a string", key))),
        }
    }

    /// A string that must be present and non-empty; `None` otherwise
    pub fn non_empty_string(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.string(key)?.filter(|s| !s.is_empty()))
    }

    /// Array of strings. Non-string entries are dropped.
    pub fn string_list(&self, key: &str) -> AppResult<Option<Vec<String>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            Some(_) => Err(invalid(format!("{} must be an array of strings", key))),
        }
    }

    /// Array of identifiers as raw text. Non-string scalars keep their JSON
    /// rendering so they show up in the invalid-id report.
    pub fn id_list(&self, key: &str) -> AppResult<Option<Vec<String>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            Some(_) => Err(invalid(format!("{} must be an array", key))),
        }
    }

    pub fn bool(&self, key: &str) -> AppResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(invalid(format!("{} must be a boolean", key))),
        }
    }
}

/// Deduplicate raw id strings and parse them, reporting every malformed one
pub fn parse_id_list(raw: &[String], label: &str) -> AppResult<Vec<ObjectId>> {
    let ids = dedup_trimmed(raw);
    let malformed: Vec<&str> = ids
        .iter()
        .filter(|id| ObjectId::parse_str(id.as_str()).is_err())
        .map(String::as_str)
        .collect();
    if !malformed.is_empty() {
        return Err(invalid(format!(
            "Invalid {} ids: {}",
            label,
            malformed.join(", ")
        )));
    }

    ids.iter()
        .map(|id| ObjectId::parse_str(id).map_err(|e| AppError::Internal(e.to_string())))
        .collect()
}
