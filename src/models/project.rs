use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::models::TagSummary;
use crate::validation::{
    char_len, dedup_trimmed, invalid, normalize_image_url, normalize_tag_names, Body, Fields,
    MAX_DESCRIPTION_LEN, MAX_IMAGE_URL_LEN,
};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 120;

#[derive(Debug, Clone)]
pub struct Project {
    pub id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub stack: Vec<String>,
    /// References to `Tag` records; may dangle after a tag is deleted
    pub tags: Vec<ObjectId>,
    pub image_url: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stack: Vec<String>,
    /// Tag names, resolved to existing tags case-insensitively
    #[serde(default, rename = "tags")]
    pub tag_names: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

impl CreateProject {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        let name = fields
            .non_empty_string("name")?
            .ok_or_else(|| invalid("name is required"))?;

        Ok(Self {
            name: validate_name(&name)?,
            description: fields
                .string("description")?
                .map(|d| validate_description(&d))
                .transpose()?,
            stack: dedup_trimmed(fields.string_list("stack")?.unwrap_or_default()),
            tag_names: normalize_tag_names(fields.string_list("tags")?.unwrap_or_default()),
            image_url: fields
                .string("imageUrl")?
                .map(|u| validate_image_url(&u))
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// `tags` are the ids resolved from `tag_names`
    pub fn into_project(self, tags: Vec<ObjectId>, at: OffsetDateTime) -> Project {
        Project {
            id: ObjectId::new(),
            name: self.name,
            description: self.description,
            stack: self.stack,
            tags,
            image_url: self.image_url,
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stack: Option<Vec<String>>,
    #[serde(rename = "tags")]
    pub tag_names: Option<Vec<String>>,
    /// Empty string clears the image
    pub image_url: Option<String>,
}

impl UpdateProject {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        if !fields.any_present(&["name", "description", "stack", "tags", "imageUrl"]) {
            return Err(invalid("Nothing to update"));
        }

        Ok(Self {
            name: fields.string("name")?.map(|n| validate_name(&n)).transpose()?,
            description: fields
                .string("description")?
                .map(|d| validate_description(&d))
                .transpose()?,
            stack: fields.string_list("stack")?.map(dedup_trimmed),
            tag_names: fields.string_list("tags")?.map(normalize_tag_names),
            image_url: fields
                .string("imageUrl")?
                .map(|u| validate_image_url(&u))
                .transpose()?,
        })
    }

    /// `tags` are the ids resolved from `tag_names`, when those were supplied
    pub fn apply(self, project: &mut Project, tags: Option<Vec<ObjectId>>, at: OffsetDateTime) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = Some(description);
        }
        if let Some(stack) = self.stack {
            project.stack = stack;
        }
        if let Some(tags) = tags {
            project.tags = tags;
        }
        if let Some(image_url) = self.image_url {
            project.image_url = image_url;
        }
        project.updated_at = at;
    }
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    match char_len(name) {
        n if n < NAME_MIN => Err(invalid("name is too short")),
        n if n > NAME_MAX => Err(invalid("name is too long")),
        _ => Ok(name.to_string()),
    }
}

fn validate_description(raw: &str) -> AppResult<String> {
    let description = raw.trim();
    if char_len(description) > MAX_DESCRIPTION_LEN {
        return Err(invalid("description is too long"));
    }
    Ok(description.to_string())
}

/// Blank clears the field; anything else must be a usable http(s) URL
fn validate_image_url(raw: &str) -> AppResult<String> {
    if raw.trim().is_empty() {
        return Ok(String::new());
    }

    let url = normalize_image_url(raw);
    if url.is_empty() || url.len() > MAX_IMAGE_URL_LEN {
        return Err(invalid("imageUrl must be a valid http/https url"));
    }
    Ok(url)
}

/// Project with its tags expanded
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub stack: Vec<String>,
    pub tags: Vec<TagSummary>,
    pub image_url: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl ProjectResponse {
    pub fn new(p: Project, tags: Vec<TagSummary>) -> Self {
        Self {
            id: p.id.to_hex(),
            name: p.name,
            description: p.description,
            stack: p.stack,
            tags,
            image_url: p.image_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Reduced project view used by the admin collection list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub tags: Vec<TagSummary>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl From<ProjectResponse> for ProjectSummary {
    fn from(p: ProjectResponse) -> Self {
        Self {
            id: p.id,
            name: p.name,
            image_url: p.image_url,
            tags: p.tags,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn body(value: Value) -> Body {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_normalizes_lists() {
        let cmd = CreateProject::parse(&body(json!({
            "name": " Portfolio ",
            "stack": [" Rust", "Axum", "Rust", ""],
            "tags": ["REACT", "react ", "Vue"]
        })))
        .unwrap();

        assert_eq!(cmd.name, "Portfolio");
        assert_eq!(cmd.stack, vec!["Rust", "Axum"]);
        assert_eq!(cmd.tag_names, vec!["react", "vue"]);
        assert_eq!(cmd.image_url, "");
        assert_eq!(cmd.description, None);
    }

    #[test]
    fn test_create_name_rules() {
        let err = CreateProject::parse(&body(json!({ "name": "" }))).unwrap_err();
        assert_eq!(err.public_message(), "name is required");

        let err = CreateProject::parse(&body(json!({ "name": " x " }))).unwrap_err();
        assert_eq!(err.public_message(), "name is too short");

        let long = "n".repeat(121);
        let err = CreateProject::parse(&body(json!({ "name": long }))).unwrap_err();
        assert_eq!(err.public_message(), "name is too long");
    }

    #[test]
    fn test_image_url_rules() {
        let err = CreateProject::parse(&body(json!({
            "name": "Portfolio",
            "imageUrl": "javascript:alert(1)"
        })))
        .unwrap_err();
        assert_eq!(err.public_message(), "imageUrl must be a valid http/https url");

        let cmd = CreateProject::parse(&body(json!({
            "name": "Portfolio",
            "imageUrl": "https://img.example.com/cover.png"
        })))
        .unwrap();
        assert_eq!(cmd.image_url, "https://img.example.com/cover.png");

        let cmd = UpdateProject::parse(&body(json!({ "imageUrl": "  " }))).unwrap();
        assert_eq!(cmd.image_url.as_deref(), Some(""));
    }

    #[test]
    fn test_description_limit() {
        let long = "d".repeat(4001);
        let err = UpdateProject::parse(&body(json!({ "description": long }))).unwrap_err();
        assert_eq!(err.public_message(), "description is too long");
    }

    #[test]
    fn test_update_requires_a_field_and_arrays() {
        let err = UpdateProject::parse(&body(json!({}))).unwrap_err();
        assert_eq!(err.public_message(), "Nothing to update");

        let err = UpdateProject::parse(&body(json!({ "stack": "rust" }))).unwrap_err();
        assert_eq!(err.public_message(), "stack must be an array of strings");

        let cmd = UpdateProject::parse(&body(json!({ "tags": [] }))).unwrap();
        assert_eq!(cmd.tag_names, Some(vec![]));
        assert!(cmd.stack.is_none());
    }
}
