use async_trait::async_trait;
use bson::{doc, oid::ObjectId};

use super::mongo::{collect, conflict_or_database, contains_ci, MongoStore};
use super::{TagStore, TAG_NAME_TAKEN};
use crate::entity::TagDocument;
use crate::error::{AppError, AppResult};
use crate::models::Tag;

#[async_trait]
impl TagStore for MongoStore {
    async fn insert_tag(&self, tag: &Tag) -> AppResult<()> {
        self.tags()
            .insert_one(TagDocument::from(tag))
            .await
            .map_err(|e| conflict_or_database(e, TAG_NAME_TAKEN))?;
        Ok(())
    }

    async fn find_tag(&self, id: ObjectId) -> AppResult<Option<Tag>> {
        let doc = self.tags().find_one(doc! { "_id": id }).await?;
        Ok(doc.map(Tag::from))
    }

    async fn find_tag_by_name(&self, name: &str) -> AppResult<Option<Tag>> {
        let doc = self.tags().find_one(doc! { "name": name }).await?;
        Ok(doc.map(Tag::from))
    }

    async fn tag_name_in_use(&self, name: &str, except: Option<ObjectId>) -> AppResult<bool> {
        let mut filter = doc! { "name": name };
        if let Some(id) = except {
            filter.insert("_id", doc! { "$ne": id });
        }
        Ok(self.tags().count_documents(filter).await? > 0)
    }

    async fn update_tag(&self, tag: &Tag) -> AppResult<()> {
        let result = self
            .tags()
            .replace_one(doc! { "_id": tag.id }, TagDocument::from(tag))
            .await
            .map_err(|e| conflict_or_database(e, TAG_NAME_TAKEN))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Tag".to_string()));
        }
        Ok(())
    }

    async fn delete_tag(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.tags().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let cursor = self.tags().find(doc! {}).sort(doc! { "name": 1 }).await?;
        collect(cursor).await
    }

    async fn find_tags_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.tags().find(doc! { "_id": { "$in": ids.to_vec() } }).await?;
        collect(cursor).await
    }

    async fn find_tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.tags().find(doc! { "name": { "$in": names.to_vec() } }).await?;
        collect(cursor).await
    }

    async fn find_tag_ids_matching(&self, text: &str) -> AppResult<Vec<ObjectId>> {
        let cursor = self.tags().find(doc! { "name": contains_ci(text) }).await?;
        let tags: Vec<Tag> = collect(cursor).await?;
        Ok(tags.into_iter().map(|t| t.id).collect())
    }
}
