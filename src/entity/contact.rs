use bson::{doc, oid::ObjectId, DateTime};
use mongodb::{options::IndexOptions, IndexModel};
use serde::{Deserialize, Serialize};

use super::{from_bson, to_bson};
use crate::models::{Contact, ContactMeta};

pub const COLLECTION: &str = "contacts";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub meta: ContactMeta,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

pub fn indexes() -> Vec<IndexModel> {
    vec![
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build(),
        IndexModel::builder().keys(doc! { "isRead": 1 }).build(),
    ]
}

impl From<ContactDocument> for Contact {
    fn from(d: ContactDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            message: d.message,
            is_read: d.is_read,
            meta: d.meta,
            created_at: from_bson(d.created_at),
            updated_at: from_bson(d.updated_at),
        }
    }
}

impl From<&Contact> for ContactDocument {
    fn from(c: &Contact) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            message: c.message.clone(),
            is_read: c.is_read,
            meta: c.meta.clone(),
            created_at: to_bson(c.created_at),
            updated_at: to_bson(c.updated_at),
        }
    }
}
