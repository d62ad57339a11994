use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};

use super::mongo::{all_of, collect, conflict_or_database, contains_ci, MongoStore};
use super::{ContactFilter, ContactStore, Window, CONTACT_EMAIL_TAKEN};
use crate::entity::ContactDocument;
use crate::error::{AppError, AppResult};
use crate::models::Contact;

fn to_document(filter: &ContactFilter) -> Document {
    let mut clauses = Vec::new();

    if let Some(is_read) = filter.is_read {
        clauses.push(doc! { "isRead": is_read });
    }

    if let Some(text) = &filter.search {
        let pattern = contains_ci(text);
        clauses.push(doc! {
            "$or": [
                { "name": pattern.clone() },
                { "email": pattern.clone() },
                { "message": pattern },
            ]
        });
    }

    all_of(clauses)
}

#[async_trait]
impl ContactStore for MongoStore {
    async fn insert_contact(&self, contact: &Contact) -> AppResult<()> {
        self.contacts()
            .insert_one(ContactDocument::from(contact))
            .await
            .map_err(|e| conflict_or_database(e, CONTACT_EMAIL_TAKEN))?;
        Ok(())
    }

    async fn find_contact(&self, id: ObjectId) -> AppResult<Option<Contact>> {
        let doc = self.contacts().find_one(doc! { "_id": id }).await?;
        Ok(doc.map(Contact::from))
    }

    async fn contact_email_in_use(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .contacts()
            .count_documents(doc! { "email": email })
            .await?
            > 0)
    }

    async fn update_contact(&self, contact: &Contact) -> AppResult<()> {
        let result = self
            .contacts()
            .replace_one(doc! { "_id": contact.id }, ContactDocument::from(contact))
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Contact".to_string()));
        }
        Ok(())
    }

    async fn list_contacts(
        &self,
        filter: &ContactFilter,
        window: Window,
    ) -> AppResult<Vec<Contact>> {
        let cursor = self
            .contacts()
            .find(to_document(filter))
            .sort(doc! { "isRead": 1, "createdAt": -1, "_id": -1 })
            .skip(window.skip)
            .limit(window.limit as i64)
            .await?;
        collect(cursor).await
    }

    async fn count_contacts(&self, filter: &ContactFilter) -> AppResult<u64> {
        Ok(self.contacts().count_documents(to_document(filter)).await?)
    }
}
