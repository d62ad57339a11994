pub mod collection;
pub mod contact;
pub mod project;
pub mod response;
pub mod tag;
pub mod user;

pub use collection::{
    CollectionResponse, CollectionSummaryResponse, CreateCollection, ProjectCollection,
    UpdateCollection,
};
pub use contact::{
    Contact, ContactDetailResponse, ContactMeta, ContactResponse, CreateContact, UpdateContact,
};
pub use project::{CreateProject, Project, ProjectResponse, ProjectSummary, UpdateProject};
pub use response::{ApiResponse, EmptyData, Envelope, Page, Pagination};
pub use tag::{CreateTag, Tag, TagResponse, TagSummary, UpdateTag};
pub use user::{CreateUser, LoginUser, Role, UpdateUser, User, UserResponse};
