use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};

use super::mongo::{
    all_of, collect, conflict_or_database, contains_ci, equals_ci, newest_first, MongoStore,
};
use super::{CollectionStore, Window, COLLECTION_NAME_TAKEN};
use crate::entity::CollectionDocument;
use crate::error::{AppError, AppResult};
use crate::models::ProjectCollection;

fn search_filter(search: Option<&str>) -> Document {
    all_of(
        search
            .map(|text| vec![doc! { "name": contains_ci(text) }])
            .unwrap_or_default(),
    )
}

#[async_trait]
impl CollectionStore for MongoStore {
    async fn insert_collection(&self, collection: &ProjectCollection) -> AppResult<()> {
        self.collections()
            .insert_one(CollectionDocument::from(collection))
            .await
            .map_err(|e| conflict_or_database(e, COLLECTION_NAME_TAKEN))?;
        Ok(())
    }

    async fn find_collection(&self, id: ObjectId) -> AppResult<Option<ProjectCollection>> {
        let doc = self.collections().find_one(doc! { "_id": id }).await?;
        Ok(doc.map(ProjectCollection::from))
    }

    async fn collection_name_in_use(
        &self,
        name: &str,
        except: Option<ObjectId>,
    ) -> AppResult<bool> {
        let mut filter = doc! { "name": equals_ci(name) };
        if let Some(id) = except {
            filter.insert("_id", doc! { "$ne": id });
        }
        Ok(self.collections().count_documents(filter).await? > 0)
    }

    async fn update_collection(&self, collection: &ProjectCollection) -> AppResult<()> {
        let result = self
            .collections()
            .replace_one(
                doc! { "_id": collection.id },
                CollectionDocument::from(collection),
            )
            .await
            .map_err(|e| conflict_or_database(e, COLLECTION_NAME_TAKEN))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Collection".to_string()));
        }
        Ok(())
    }

    async fn delete_collection(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.collections().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_collections(
        &self,
        search: Option<&str>,
        window: Window,
    ) -> AppResult<Vec<ProjectCollection>> {
        let cursor = self
            .collections()
            .find(search_filter(search))
            .sort(newest_first())
            .skip(window.skip)
            .limit(window.limit as i64)
            .await?;
        collect(cursor).await
    }

    async fn count_collections(&self, search: Option<&str>) -> AppResult<u64> {
        Ok(self
            .collections()
            .count_documents(search_filter(search))
            .await?)
    }
}
