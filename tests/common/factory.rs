use bson::oid::ObjectId;
use uuid::Uuid;

use folio_api::models::{Project, ProjectCollection, Role, Tag, User};
use folio_api::repositories::now;
use folio_api::services::AuthService;
use folio_api::state::AppState;

pub const PASSWORD: &str = "secret123";

/// Authentication info for tests
pub struct TestAuth {
    pub user_id: ObjectId,
    pub email: String,
    pub token: String,
}

impl TestAuth {
    /// Get the Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Factory for creating test data straight through the store
pub struct Factory<'a> {
    state: &'a AppState,
}

impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Create a regular user and return auth info
    pub async fn create_user(&self) -> TestAuth {
        self.create_with_role(Role::User).await
    }

    /// Create an admin and return auth info
    pub async fn create_admin(&self) -> TestAuth {
        self.create_with_role(Role::Admin).await
    }

    async fn create_with_role(&self, role: Role) -> TestAuth {
        let email = format!("test-{}@example.com", Uuid::new_v4().simple());
        let user = self.create_user_with_email(&email, role).await;

        let token = AuthService::generate_token(user.id, role, &self.state.config).unwrap();

        TestAuth {
            user_id: user.id,
            email,
            token,
        }
    }

    /// Create a user with a specific email; the password is [`PASSWORD`]
    pub async fn create_user_with_email(&self, email: &str, role: Role) -> User {
        let at = now();
        let user = User {
            id: ObjectId::new(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: AuthService::hash_password(PASSWORD, &self.state.config)
                .await
                .unwrap(),
            role,
            created_at: at,
            updated_at: at,
        };

        self.state.store.insert_user(&user).await.unwrap();
        user
    }

    pub async fn create_tag(&self, name: &str, color: &str) -> Tag {
        let at = now();
        let tag = Tag {
            id: ObjectId::new(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: at,
            updated_at: at,
        };

        self.state.store.insert_tag(&tag).await.unwrap();
        tag
    }

    pub async fn create_project(&self, name: &str, tags: Vec<ObjectId>) -> Project {
        let at = now();
        let project = Project {
            id: ObjectId::new(),
            name: name.to_string(),
            description: Some(format!("About {}", name)),
            stack: vec!["Rust".to_string(), "Axum".to_string()],
            tags,
            image_url: String::new(),
            created_at: at,
            updated_at: at,
        };

        self.state.store.insert_project(&project).await.unwrap();
        project
    }

    pub async fn create_collection(&self, name: &str, projects: Vec<ObjectId>) -> ProjectCollection {
        let at = now();
        let collection = ProjectCollection {
            id: ObjectId::new(),
            name: name.to_string(),
            description: String::new(),
            cover: String::new(),
            projects,
            created_at: at,
            updated_at: at,
        };

        self.state.store.insert_collection(&collection).await.unwrap();
        collection
    }
}
