use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::models::{ProjectResponse, ProjectSummary};
use crate::validation::{char_len, invalid, parse_id_list, Body, Fields};

const NAME_MIN: usize = 2;

/// A curated, ordered group of projects
#[derive(Debug, Clone)]
pub struct ProjectCollection {
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub cover: String,
    pub projects: Vec<ObjectId>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover: String,
    /// Project ids; every one must exist
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub projects: Vec<ObjectId>,
}

impl CreateCollection {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        let name = fields
            .string("name")?
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| invalid("name is required"))?;

        Ok(Self {
            name: validate_name(&name)?,
            description: trimmed(fields.string("description")?),
            cover: trimmed(fields.string("cover")?),
            projects: match fields.id_list("projects")? {
                Some(raw) => parse_id_list(&raw, "project")?,
                None => Vec::new(),
            },
        })
    }

    pub fn into_collection(self, at: OffsetDateTime) -> ProjectCollection {
        ProjectCollection {
            id: ObjectId::new(),
            name: self.name,
            description: self.description,
            cover: self.cover,
            projects: self.projects,
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCollection {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub projects: Option<Vec<ObjectId>>,
}

impl UpdateCollection {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        if !fields.any_present(&["name", "description", "cover", "projects"]) {
            return Err(invalid("Nothing to update"));
        }

        Ok(Self {
            name: fields.string("name")?.map(|n| validate_name(&n)).transpose()?,
            description: fields.string("description")?.map(|d| d.trim().to_string()),
            cover: fields.string("cover")?.map(|c| c.trim().to_string()),
            projects: fields
                .id_list("projects")?
                .map(|raw| parse_id_list(&raw, "project"))
                .transpose()?,
        })
    }

    pub fn apply(self, collection: &mut ProjectCollection, at: OffsetDateTime) {
        if let Some(name) = self.name {
            collection.name = name;
        }
        if let Some(description) = self.description {
            collection.description = description;
        }
        if let Some(cover) = self.cover {
            collection.cover = cover;
        }
        if let Some(projects) = self.projects {
            collection.projects = projects;
        }
        collection.updated_at = at;
    }
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if char_len(name) < NAME_MIN {
        return Err(invalid("name is too short"));
    }
    Ok(name.to_string())
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Public collection view with fully expanded projects
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover: String,
    /// Number of referenced projects that still exist
    pub projects_count: usize,
    pub projects: Vec<ProjectResponse>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl CollectionResponse {
    pub fn new(c: ProjectCollection, projects: Vec<ProjectResponse>) -> Self {
        Self {
            id: c.id.to_hex(),
            name: c.name,
            description: c.description,
            cover: c.cover,
            projects_count: projects.len(),
            projects,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Admin list entry: projects reduced to summaries
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummaryResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover: String,
    pub projects_count: usize,
    pub projects: Vec<ProjectSummary>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl From<CollectionResponse> for CollectionSummaryResponse {
    fn from(c: CollectionResponse) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            cover: c.cover,
            projects_count: c.projects_count,
            projects: c.projects.into_iter().map(ProjectSummary::from).collect(),
            created_at: c.created_at,
            updated_at: c.updated_at,
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
    fn test_create_defaults() {
        let cmd = CreateCollection::parse(&body(json!({ "name": "  Best of 2024 " }))).unwrap();
        assert_eq!(cmd.name, "Best of 2024");
        assert_eq!(cmd.description, "");
        assert_eq!(cmd.cover, "");
        assert!(cmd.projects.is_empty());
    }

    #[test]
    fn test_create_name_rules() {
        let err = CreateCollection::parse(&body(json!({ "name": "   " }))).unwrap_err();
        assert_eq!(err.public_message(), "name is required");

        let err = CreateCollection::parse(&body(json!({ "name": " a " }))).unwrap_err();
        assert_eq!(err.public_message(), "name is too short");
    }

    #[test]
    fn test_projects_must_be_an_array_of_ids() {
        let err = CreateCollection::parse(&body(json!({ "name": "Web", "projects": "abc" })))
            .unwrap_err();
        assert_eq!(err.public_message(), "projects must be an array");

        let err = CreateCollection::parse(&body(json!({ "name": "Web", "projects": ["zzz", 7] })))
            .unwrap_err();
        assert_eq!(err.public_message(), "Invalid project ids: zzz, 7");
    }

    #[test]
    fn test_project_ids_are_deduplicated() {
        let id = ObjectId::new().to_hex();
        let cmd = CreateCollection::parse(&body(json!({
            "name": "Web",
            "projects": [id, format!(" {} ", id), ""]
        })))
        .unwrap();
        assert_eq!(cmd.projects.len(), 1);
    }

    #[test]
    fn test_update_partial() {
        let err = UpdateCollection::parse(&body(json!({}))).unwrap_err();
        assert_eq!(err.public_message(), "Nothing to update");

        let cmd = UpdateCollection::parse(&body(json!({ "projects": [] }))).unwrap();
        assert_eq!(cmd.projects, Some(vec![]));
        assert!(cmd.name.is_none());
    }
}
