//! Persistence port.
//!
//! One trait per record kind, gathered under [`Store`]. Handlers only see
//! `Arc<dyn Store>`; [`MongoStore`] backs production and [`InMemoryStore`]
//! backs tests and local runs.

pub mod memory;
pub mod mongo;

mod collection;
mod contact;
mod project;
mod tag;
mod user;

pub use memory::InMemoryStore;
pub use mongo::{MongoStore, StoreInitError};

use async_trait::async_trait;
use bson::oid::ObjectId;
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{Contact, Project, ProjectCollection, Tag, User};

pub const USER_EMAIL_TAKEN: &str = "User with this email already exists";
pub const TAG_NAME_TAKEN: &str = "Tag with this name already exists";
pub const COLLECTION_NAME_TAKEN: &str = "Collection with this name already exists";
pub const CONTACT_EMAIL_TAKEN: &str = "Request from this email already exists";

/// Slice of a sorted result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: u64,
}

impl Window {
    /// `page` is 1-based
    pub fn page(page: u64, limit: u64) -> Self {
        // Drivers take skip as a signed 64-bit value
        Self {
            skip: page
                .saturating_sub(1)
                .saturating_mul(limit)
                .min(i64::MAX as u64),
            limit,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Only projects referencing this tag
    pub tag: Option<ObjectId>,
    pub search: Option<ProjectSearch>,
}

/// Case-insensitive text match over name, description and stack, or a
/// reference to one of `tag_ids` (tags whose name matched the same text)
#[derive(Debug, Clone)]
pub struct ProjectSearch {
    pub text: String,
    pub tag_ids: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub is_read: Option<bool>,
    /// Case-insensitive match over name, email and message
    pub search: Option<String>,
}

/// Current time at the precision stored documents keep (milliseconds)
pub fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_millisecond(now.millisecond()).unwrap_or(now)
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    async fn find_user(&self, id: ObjectId) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Whether another user (not `except`) already has this email
    async fn email_in_use(&self, email: &str, except: Option<ObjectId>) -> AppResult<bool>;

    /// Replace the stored record; `NotFound` if it vanished
    async fn update_user(&self, user: &User) -> AppResult<()>;

    async fn delete_user(&self, id: ObjectId) -> AppResult<bool>;

    /// Newest first; `search` matches name or email
    async fn list_users(&self, search: Option<&str>, window: Window) -> AppResult<Vec<User>>;

    async fn count_users(&self, search: Option<&str>) -> AppResult<u64>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn insert_tag(&self, tag: &Tag) -> AppResult<()>;

    async fn find_tag(&self, id: ObjectId) -> AppResult<Option<Tag>>;

    async fn find_tag_by_name(&self, name: &str) -> AppResult<Option<Tag>>;

    async fn tag_name_in_use(&self, name: &str, except: Option<ObjectId>) -> AppResult<bool>;

    async fn update_tag(&self, tag: &Tag) -> AppResult<()>;

    async fn delete_tag(&self, id: ObjectId) -> AppResult<bool>;

    /// Every tag, sorted by name
    async fn list_tags(&self) -> AppResult<Vec<Tag>>;

    /// Tags that still exist among `ids`, in no particular order
    async fn find_tags_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<Tag>>;

    /// Exact match against stored (normalized) names
    async fn find_tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>>;

    /// Ids of tags whose name contains `text`, ignoring case
    async fn find_tag_ids_matching(&self, text: &str) -> AppResult<Vec<ObjectId>>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert_project(&self, project: &Project) -> AppResult<()>;

    async fn find_project(&self, id: ObjectId) -> AppResult<Option<Project>>;

    async fn update_project(&self, project: &Project) -> AppResult<()>;

    async fn delete_project(&self, id: ObjectId) -> AppResult<bool>;

    /// Newest first
    async fn list_projects(&self, filter: &ProjectFilter, window: Window)
        -> AppResult<Vec<Project>>;

    async fn count_projects(&self, filter: &ProjectFilter) -> AppResult<u64>;

    async fn find_projects_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<Project>>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn insert_collection(&self, collection: &ProjectCollection) -> AppResult<()>;

    async fn find_collection(&self, id: ObjectId) -> AppResult<Option<ProjectCollection>>;

    /// Case-insensitive
    async fn collection_name_in_use(&self, name: &str, except: Option<ObjectId>)
        -> AppResult<bool>;

    async fn update_collection(&self, collection: &ProjectCollection) -> AppResult<()>;

    async fn delete_collection(&self, id: ObjectId) -> AppResult<bool>;

    /// Newest first; `search` matches the name
    async fn list_collections(
        &self,
        search: Option<&str>,
        window: Window,
    ) -> AppResult<Vec<ProjectCollection>>;

    async fn count_collections(&self, search: Option<&str>) -> AppResult<u64>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, contact: &Contact) -> AppResult<()>;

    async fn find_contact(&self, id: ObjectId) -> AppResult<Option<Contact>>;

    async fn contact_email_in_use(&self, email: &str) -> AppResult<bool>;

    async fn update_contact(&self, contact: &Contact) -> AppResult<()>;

    /// Unread first, then newest first
    async fn list_contacts(&self, filter: &ContactFilter, window: Window)
        -> AppResult<Vec<Contact>>;

    async fn count_contacts(&self, filter: &ContactFilter) -> AppResult<u64>;
}

/// Everything the handlers need from persistence
pub trait Store: UserStore + TagStore + ProjectStore + CollectionStore + ContactStore {}

impl<T> Store for T where T: UserStore + TagStore + ProjectStore + CollectionStore + ContactStore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_from_page() {
        assert_eq!(Window::page(1, 10), Window { skip: 0, limit: 10 });
        assert_eq!(Window::page(3, 20), Window { skip: 40, limit: 20 });
        assert_eq!(Window::page(0, 10), Window { skip: 0, limit: 10 });
    }

    #[test]
    fn test_window_skip_fits_signed_range() {
        let window = Window::page(i64::MAX as u64, 100);
        assert_eq!(window.skip, i64::MAX as u64);
        assert_eq!(Window::page(u64::MAX, u64::MAX).skip, i64::MAX as u64);
    }
}
