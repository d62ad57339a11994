use bson::{doc, oid::ObjectId, DateTime};
use mongodb::{options::IndexOptions, IndexModel};
use serde::{Deserialize, Serialize};

use super::{from_bson, to_bson};
use crate::models::{Role, User};

pub const COLLECTION: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

pub fn indexes() -> Vec<IndexModel> {
    vec![IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()]
}

impl From<UserDocument> for User {
    fn from(d: UserDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            password_hash: d.password,
            role: d.role,
            created_at: from_bson(d.created_at),
            updated_at: from_bson(d.updated_at),
        }
    }
}

impl From<&User> for UserDocument {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            password: u.password_hash.clone(),
            role: u.role,
            created_at: to_bson(u.created_at),
            updated_at: to_bson(u.updated_at),
        }
    }
}
