use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};

use super::mongo::{all_of, collect, contains_ci, newest_first, MongoStore};
use super::{ProjectFilter, ProjectStore, Window};
use crate::entity::ProjectDocument;
use crate::error::{AppError, AppResult};
use crate::models::Project;

fn to_document(filter: &ProjectFilter) -> Document {
    let mut clauses = Vec::new();

    if let Some(tag) = filter.tag {
        clauses.push(doc! { "tags": tag });
    }

    if let Some(search) = &filter.search {
        let pattern = contains_ci(&search.text);
        // `stack` is an array: the regex matches when any entry does
        let mut any = vec![
            doc! { "name": pattern.clone() },
            doc! { "description": pattern.clone() },
            doc! { "stack": pattern },
        ];
        if !search.tag_ids.is_empty() {
            any.push(doc! { "tags": { "$in": search.tag_ids.clone() } });
        }
        clauses.push(doc! { "$or": any });
    }

    all_of(clauses)
}

#[async_trait]
impl ProjectStore for MongoStore {
    async fn insert_project(&self, project: &Project) -> AppResult<()> {
        self.projects()
            .insert_one(ProjectDocument::from(project))
            .await?;
        Ok(())
    }

    async fn find_project(&self, id: ObjectId) -> AppResult<Option<Project>> {
        let doc = self.projects().find_one(doc! { "_id": id }).await?;
        Ok(doc.map(Project::from))
    }

    async fn update_project(&self, project: &Project) -> AppResult<()> {
        let result = self
            .projects()
            .replace_one(doc! { "_id": project.id }, ProjectDocument::from(project))
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Project".to_string()));
        }
        Ok(())
    }

    async fn delete_project(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.projects().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_projects(
        &self,
        filter: &ProjectFilter,
        window: Window,
    ) -> AppResult<Vec<Project>> {
        let cursor = self
            .projects()
            .find(to_document(filter))
            .sort(newest_first())
            .skip(window.skip)
            .limit(window.limit as i64)
            .await?;
        collect(cursor).await
    }

    async fn count_projects(&self, filter: &ProjectFilter) -> AppResult<u64> {
        Ok(self.projects().count_documents(to_document(filter)).await?)
    }

    async fn find_projects_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<Project>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.projects().find(doc! { "_id": { "$in": ids.to_vec() } }).await?;
        collect(cursor).await
    }
}
