use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};

use super::mongo::{all_of, collect, conflict_or_database, contains_ci, newest_first, MongoStore};
use super::{UserStore, Window, USER_EMAIL_TAKEN};
use crate::entity::UserDocument;
use crate::error::{AppError, AppResult};
use crate::models::User;

fn search_filter(search: Option<&str>) -> Document {
    let clauses = search
        .map(|text| {
            let pattern = contains_ci(text);
            vec![doc! { "$or": [ { "name": pattern.clone() }, { "email": pattern } ] }]
        })
        .unwrap_or_default();
    all_of(clauses)
}

#[async_trait]
impl UserStore for MongoStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        self.users()
            .insert_one(UserDocument::from(user))
            .await
            .map_err(|e| conflict_or_database(e, USER_EMAIL_TAKEN))?;
        Ok(())
    }

    async fn find_user(&self, id: ObjectId) -> AppResult<Option<User>> {
        let doc = self.users().find_one(doc! { "_id": id }).await?;
        Ok(doc.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let doc = self.users().find_one(doc! { "email": email }).await?;
        Ok(doc.map(User::from))
    }

    async fn email_in_use(&self, email: &str, except: Option<ObjectId>) -> AppResult<bool> {
        let mut filter = doc! { "email": email };
        if let Some(id) = except {
            filter.insert("_id", doc! { "$ne": id });
        }
        Ok(self.users().count_documents(filter).await? > 0)
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        let result = self
            .users()
            .replace_one(doc! { "_id": user.id }, UserDocument::from(user))
            .await
            .map_err(|e| conflict_or_database(e, USER_EMAIL_TAKEN))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }
        Ok(())
    }

    async fn delete_user(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.users().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_users(&self, search: Option<&str>, window: Window) -> AppResult<Vec<User>> {
        let cursor = self
            .users()
            .find(search_filter(search))
            .sort(newest_first())
            .skip(window.skip)
            .limit(window.limit as i64)
            .await?;
        collect(cursor).await
    }

    async fn count_users(&self, search: Option<&str>) -> AppResult<u64> {
        Ok(self.users().count_documents(search_filter(search)).await?)
    }
}
