use bson::{doc, oid::ObjectId, DateTime};
use mongodb::{options::IndexOptions, IndexModel};
use serde::{Deserialize, Serialize};

use super::{from_bson, to_bson};
use crate::models::Tag;

pub const COLLECTION: &str = "tags";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub color: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

pub fn indexes() -> Vec<IndexModel> {
    vec![IndexModel::builder()
        .keys(doc! { "name": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()]
}

impl From<TagDocument> for Tag {
    fn from(d: TagDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            color: d.color,
            created_at: from_bson(d.created_at),
            updated_at: from_bson(d.updated_at),
        }
    }
}

impl From<&Tag> for TagDocument {
    fn from(t: &Tag) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            color: t.color.clone(),
            created_at: to_bson(t.created_at),
            updated_at: to_bson(t.updated_at),
        }
    }
}
