use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::Mutex;

use super::{
    CollectionStore, ContactFilter, ContactStore, ProjectFilter, ProjectStore, TagStore,
    UserStore, Window, COLLECTION_NAME_TAKEN, CONTACT_EMAIL_TAKEN, TAG_NAME_TAKEN,
    USER_EMAIL_TAKEN,
};
use crate::error::{AppError, AppResult};
use crate::models::{Contact, Project, ProjectCollection, Tag, User};
use crate::validation::contains_ci;

/// In-memory store for tests and local runs without MongoDB.
///
/// Every operation takes the single lock, so a uniqueness check and the
/// write that follows it are atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<ObjectId, User>,
    tags: HashMap<ObjectId, Tag>,
    projects: HashMap<ObjectId, Project>,
    collections: HashMap<ObjectId, ProjectCollection>,
    contacts: HashMap<ObjectId, Contact>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T>(items: Vec<T>, window: Window) -> Vec<T> {
    items
        .into_iter()
        .skip(window.skip as usize)
        .take(window.limit as usize)
        .collect()
}

fn lower(search: Option<&str>) -> Option<String> {
    search.map(str::to_lowercase)
}

fn user_matches(user: &User, needle: Option<&str>) -> bool {
    needle.is_none_or(|n| contains_ci(&user.name, n) || contains_ci(&user.email, n))
}

fn project_matches(project: &Project, filter: &ProjectFilter) -> bool {
    if filter.tag.is_some_and(|tag| !project.tags.contains(&tag)) {
        return false;
    }

    let Some(search) = &filter.search else {
        return true;
    };
    let needle = search.text.to_lowercase();
    contains_ci(&project.name, &needle)
        || project
            .description
            .as_deref()
            .is_some_and(|d| contains_ci(d, &needle))
        || project.stack.iter().any(|s| contains_ci(s, &needle))
        || project.tags.iter().any(|t| search.tag_ids.contains(t))
}

fn contact_matches(contact: &Contact, filter: &ContactFilter, needle: Option<&str>) -> bool {
    if filter.is_read.is_some_and(|r| r != contact.is_read) {
        return false;
    }
    needle.is_none_or(|n| {
        contains_ci(&contact.name, n)
            || contains_ci(&contact.email, n)
            || contact.message.as_deref().is_some_and(|m| contains_ci(m, n))
    })
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(USER_EMAIL_TAKEN.to_string()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: ObjectId) -> AppResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn email_in_use(&self, email: &str, except: Option<ObjectId>) -> AppResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .any(|u| u.email == email && Some(u.id) != except))
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.users.contains_key(&user.id) {
            return Err(AppError::NotFound("User".to_string()));
        }
        if inner
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(AppError::Conflict(USER_EMAIL_TAKEN.to_string()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: ObjectId) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.users.remove(&id).is_some())
    }

    async fn list_users(&self, search: Option<&str>, window: Window) -> AppResult<Vec<User>> {
        let needle = lower(search);
        let inner = self.inner.lock().await;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| user_matches(u, needle.as_deref()))
            .cloned()
            .collect();

        users.sort_by_key(|u| Reverse((u.created_at, u.id)));
        Ok(page(users, window))
    }

    async fn count_users(&self, search: Option<&str>) -> AppResult<u64> {
        let needle = lower(search);
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .filter(|u| user_matches(u, needle.as_deref()))
            .count() as u64)
    }
}

#[async_trait]
impl TagStore for InMemoryStore {
    async fn insert_tag(&self, tag: &Tag) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.tags.values().any(|t| t.name == tag.name) {
            return Err(AppError::Conflict(TAG_NAME_TAKEN.to_string()));
        }
        inner.tags.insert(tag.id, tag.clone());
        Ok(())
    }

    async fn find_tag(&self, id: ObjectId) -> AppResult<Option<Tag>> {
        let inner = self.inner.lock().await;
        Ok(inner.tags.get(&id).cloned())
    }

    async fn find_tag_by_name(&self, name: &str) -> AppResult<Option<Tag>> {
        let inner = self.inner.lock().await;
        Ok(inner.tags.values().find(|t| t.name == name).cloned())
    }

    async fn tag_name_in_use(&self, name: &str, except: Option<ObjectId>) -> AppResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tags
            .values()
            .any(|t| t.name == name && Some(t.id) != except))
    }

    async fn update_tag(&self, tag: &Tag) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.tags.contains_key(&tag.id) {
            return Err(AppError::NotFound("Tag".to_string()));
        }
        if inner
            .tags
            .values()
            .any(|t| t.name == tag.name && t.id != tag.id)
        {
            return Err(AppError::Conflict(TAG_NAME_TAKEN.to_string()));
        }
        inner.tags.insert(tag.id, tag.clone());
        Ok(())
    }

    async fn delete_tag(&self, id: ObjectId) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.tags.remove(&id).is_some())
    }

    async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let inner = self.inner.lock().await;
        let mut tags: Vec<Tag> = inner.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tags_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<Tag>> {
        let inner = self.inner.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.tags.get(id).cloned())
            .collect())
    }

    async fn find_tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tags
            .values()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn find_tag_ids_matching(&self, text: &str) -> AppResult<Vec<ObjectId>> {
        let needle = text.to_lowercase();
        let inner = self.inner.lock().await;
        Ok(inner
            .tags
            .values()
            .filter(|t| contains_ci(&t.name, &needle))
            .map(|t| t.id)
            .collect())
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn insert_project(&self, project: &Project) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn find_project(&self, id: ObjectId) -> AppResult<Option<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner.projects.get(&id).cloned())
    }

    async fn update_project(&self, project: &Project) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        match inner.projects.get_mut(&project.id) {
            Some(stored) => {
                *stored = project.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Project".to_string())),
        }
    }

    async fn delete_project(&self, id: ObjectId) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.projects.remove(&id).is_some())
    }

    async fn list_projects(
        &self,
        filter: &ProjectFilter,
        window: Window,
    ) -> AppResult<Vec<Project>> {
        let inner = self.inner.lock().await;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| project_matches(p, filter))
            .cloned()
            .collect();

        projects.sort_by_key(|p| Reverse((p.created_at, p.id)));
        Ok(page(projects, window))
    }

    async fn count_projects(&self, filter: &ProjectFilter) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner
            .projects
            .values()
            .filter(|p| project_matches(p, filter))
            .count() as u64)
    }

    async fn find_projects_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<Project>> {
        let inner = self.inner.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.projects.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    async fn insert_collection(&self, collection: &ProjectCollection) -> AppResult<()> {
        let name = collection.name.to_lowercase();
        let mut inner = self.inner.lock().await;
        if inner
            .collections
            .values()
            .any(|c| c.name.to_lowercase() == name)
        {
            return Err(AppError::Conflict(COLLECTION_NAME_TAKEN.to_string()));
        }
        inner.collections.insert(collection.id, collection.clone());
        Ok(())
    }

    async fn find_collection(&self, id: ObjectId) -> AppResult<Option<ProjectCollection>> {
        let inner = self.inner.lock().await;
        Ok(inner.collections.get(&id).cloned())
    }

    async fn collection_name_in_use(
        &self,
        name: &str,
        except: Option<ObjectId>,
    ) -> AppResult<bool> {
        let name = name.to_lowercase();
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .values()
            .any(|c| c.name.to_lowercase() == name && Some(c.id) != except))
    }

    async fn update_collection(&self, collection: &ProjectCollection) -> AppResult<()> {
        let name = collection.name.to_lowercase();
        let mut inner = self.inner.lock().await;
        if !inner.collections.contains_key(&collection.id) {
            return Err(AppError::NotFound("Collection".to_string()));
        }
        if inner
            .collections
            .values()
            .any(|c| c.name.to_lowercase() == name && c.id != collection.id)
        {
            return Err(AppError::Conflict(COLLECTION_NAME_TAKEN.to_string()));
        }
        inner.collections.insert(collection.id, collection.clone());
        Ok(())
    }

    async fn delete_collection(&self, id: ObjectId) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.collections.remove(&id).is_some())
    }

    async fn list_collections(
        &self,
        search: Option<&str>,
        window: Window,
    ) -> AppResult<Vec<ProjectCollection>> {
        let needle = lower(search);
        let inner = self.inner.lock().await;
        let mut collections: Vec<ProjectCollection> = inner
            .collections
            .values()
            .filter(|c| needle.as_deref().is_none_or(|n| contains_ci(&c.name, n)))
            .cloned()
            .collect();

        collections.sort_by_key(|c| Reverse((c.created_at, c.id)));
        Ok(page(collections, window))
    }

    async fn count_collections(&self, search: Option<&str>) -> AppResult<u64> {
        let needle = lower(search);
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .values()
            .filter(|c| needle.as_deref().is_none_or(|n| contains_ci(&c.name, n)))
            .count() as u64)
    }
}

#[async_trait]
impl ContactStore for InMemoryStore {
    async fn insert_contact(&self, contact: &Contact) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.contacts.values().any(|c| c.email == contact.email) {
            return Err(AppError::Conflict(CONTACT_EMAIL_TAKEN.to_string()));
        }
        inner.contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn find_contact(&self, id: ObjectId) -> AppResult<Option<Contact>> {
        let inner = self.inner.lock().await;
        Ok(inner.contacts.get(&id).cloned())
    }

    async fn contact_email_in_use(&self, email: &str) -> AppResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.contacts.values().any(|c| c.email == email))
    }

    async fn update_contact(&self, contact: &Contact) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        match inner.contacts.get_mut(&contact.id) {
            Some(stored) => {
                *stored = contact.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Contact".to_string())),
        }
    }

    async fn list_contacts(
        &self,
        filter: &ContactFilter,
        window: Window,
    ) -> AppResult<Vec<Contact>> {
        let needle = lower(filter.search.as_deref());
        let inner = self.inner.lock().await;
        let mut contacts: Vec<Contact> = inner
            .contacts
            .values()
            .filter(|c| contact_matches(c, filter, needle.as_deref()))
            .cloned()
            .collect();

        contacts.sort_by_key(|c| (c.is_read, Reverse((c.created_at, c.id))));
        Ok(page(contacts, window))
    }

    async fn count_contacts(&self, filter: &ContactFilter) -> AppResult<u64> {
        let needle = lower(filter.search.as_deref());
        let inner = self.inner.lock().await;
        Ok(inner
            .contacts
            .values()
            .filter(|c| contact_matches(c, filter, needle.as_deref()))
            .count() as u64)
    }
}
