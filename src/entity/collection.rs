use bson::{doc, oid::ObjectId, DateTime};
use mongodb::{
    options::{Collation, CollationStrength, IndexOptions},
    IndexModel,
};
use serde::{Deserialize, Serialize};

use super::{from_bson, to_bson};
use crate::models::ProjectCollection;

pub const COLLECTION: &str = "projectcollections";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub projects: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Collection names are unique regardless of letter case
pub fn case_insensitive() -> Collation {
    Collation::builder()
        .locale("en".to_string())
        .strength(CollationStrength::Secondary)
        .build()
}

pub fn indexes() -> Vec<IndexModel> {
    vec![IndexModel::builder()
        .keys(doc! { "name": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .collation(case_insensitive())
                .build(),
        )
        .build()]
}

impl From<CollectionDocument> for ProjectCollection {
    fn from(d: CollectionDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            cover: d.cover,
            projects: d.projects,
            created_at: from_bson(d.created_at),
            updated_at: from_bson(d.updated_at),
        }
    }
}

impl From<&ProjectCollection> for CollectionDocument {
    fn from(c: &ProjectCollection) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            description: c.description.clone(),
            cover: c.cover.clone(),
            projects: c.projects.clone(),
            created_at: to_bson(c.created_at),
            updated_at: to_bson(c.updated_at),
        }
    }
}
