use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    Client, Collection, Database, IndexModel,
};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::entity::{
    self, CollectionDocument, ContactDocument, ProjectDocument, TagDocument, UserDocument,
};
use crate::error::{AppError, AppResult};
use crate::validation::escape_regex;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed store
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect and make sure every collection has its indexes
    pub async fn connect(config: &Config) -> Result<Self, StoreInitError> {
        let client = Client::with_uri_str(&config.mongodb_url)
            .await
            .map_err(|e| StoreInitError::Connect(e.to_string()))?;

        let store = Self {
            db: client.database(&config.mongodb_database),
        };
        store.ensure_indexes().await?;

        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreInitError> {
        create_indexes(&self.users(), entity::user::indexes()).await?;
        create_indexes(&self.tags(), entity::tag::indexes()).await?;
        create_indexes(&self.projects(), entity::project::indexes()).await?;
        create_indexes(&self.collections(), entity::collection::indexes()).await?;
        create_indexes(&self.contacts(), entity::contact::indexes()).await?;

        tracing::info!(database = %self.db.name(), "MongoDB indexes ensured");
        Ok(())
    }

    pub(super) fn users(&self) -> Collection<UserDocument> {
        self.db.collection(entity::user::COLLECTION)
    }

    pub(super) fn tags(&self) -> Collection<TagDocument> {
        self.db.collection(entity::tag::COLLECTION)
    }

    pub(super) fn projects(&self) -> Collection<ProjectDocument> {
        self.db.collection(entity::project::COLLECTION)
    }

    pub(super) fn collections(&self) -> Collection<CollectionDocument> {
        self.db.collection(entity::collection::COLLECTION)
    }

    pub(super) fn contacts(&self) -> Collection<ContactDocument> {
        self.db.collection(entity::contact::COLLECTION)
    }
}

async fn create_indexes<T: Send + Sync>(
    collection: &Collection<T>,
    indexes: Vec<IndexModel>,
) -> Result<(), StoreInitError> {
    collection
        .create_indexes(indexes)
        .await
        .map_err(|e| StoreInitError::Index {
            collection: collection.name().to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}

/// Whether a write failed on a unique index
pub(super) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Map a unique-index violation to `Conflict(message)`, anything else to `Database`
pub(super) fn conflict_or_database(err: mongodb::error::Error, message: &str) -> AppError {
    if is_duplicate_key(&err) {
        AppError::Conflict(message.to_string())
    } else {
        err.into()
    }
}

/// `{ $regex, $options: "i" }` matching `text` literally
pub(super) fn contains_ci(text: &str) -> Document {
    doc! { "$regex": escape_regex(text), "$options": "i" }
}

/// Exact, case-insensitive match
pub(super) fn equals_ci(text: &str) -> Document {
    doc! { "$regex": format!("^{}$", escape_regex(text)), "$options": "i" }
}

/// Combine clauses with `$and`, or match everything when there are none
pub(super) fn all_of(mut clauses: Vec<Document>) -> Document {
    match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    }
}

pub(super) fn newest_first() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

/// Run a find and convert every document to its domain record
pub(super) async fn collect<D, T>(cursor: mongodb::Cursor<D>) -> AppResult<Vec<T>>
where
    D: DeserializeOwned + Send + Sync + Unpin,
    T: From<D>,
{
    let docs: Vec<D> = cursor.try_collect().await?;
    Ok(docs.into_iter().map(T::from).collect())
}

#[derive(Debug, thiserror::Error)]
pub enum StoreInitError {
    #[error("MongoDB connection error: {0}")]
    Connect(String),

    #[error("Failed to create indexes on {collection}: {reason}")]
    Index { collection: String, reason: String },
}
