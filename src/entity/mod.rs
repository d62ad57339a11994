//! MongoDB document schemas, one module per collection.
//!
//! Field names match the stored documents (`_id`, camelCase, `createdAt`,
//! `updatedAt`). Each module declares the indexes its collection needs.

pub mod collection;
pub mod contact;
pub mod project;
pub mod tag;
pub mod user;

pub use collection::CollectionDocument;
pub use contact::ContactDocument;
pub use project::ProjectDocument;
pub use tag::TagDocument;
pub use user::UserDocument;

use bson::DateTime;
use time::OffsetDateTime;

pub(crate) fn to_bson(at: OffsetDateTime) -> DateTime {
    DateTime::from_time_0_3(at)
}

pub(crate) fn from_bson(at: DateTime) -> OffsetDateTime {
    at.to_time_0_3()
}
