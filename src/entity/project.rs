use bson::{doc, oid::ObjectId, DateTime};
use mongodb::IndexModel;
use serde::{Deserialize, Serialize};

use super::{from_bson, to_bson};
use crate::models::Project;

pub const COLLECTION: &str = "projects";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub stack: Vec<String>,
    #[serde(default)]
    pub tags: Vec<ObjectId>,
    #[serde(default)]
    pub image_url: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Not unique: serves the tag filter and the newest-first sort
pub fn indexes() -> Vec<IndexModel> {
    vec![
        IndexModel::builder().keys(doc! { "tags": 1 }).build(),
        IndexModel::builder()
            .keys(doc! { "createdAt": -1, "_id": -1 })
            .build(),
    ]
}

impl From<ProjectDocument> for Project {
    fn from(d: ProjectDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            stack: d.stack,
            tags: d.tags,
            image_url: d.image_url,
            created_at: from_bson(d.created_at),
            updated_at: from_bson(d.updated_at),
        }
    }
}

impl From<&Project> for ProjectDocument {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            stack: p.stack.clone(),
            tags: p.tags.clone(),
            image_url: p.image_url.clone(),
            created_at: to_bson(p.created_at),
            updated_at: to_bson(p.updated_at),
        }
    }
}
