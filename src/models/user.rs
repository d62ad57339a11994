use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::validation::{char_len, invalid, is_valid_email, normalize_email, Body, Fields};

pub const MIN_PASSWORD_LEN: usize = 6;
const NAME_MIN: usize = 2;
const NAME_MAX: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)] // Never expose password hash
    pub password_hash: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated input for register and admin create
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl CreateUser {
    /// Public registration: any `role` in the body is ignored
    pub fn from_register(body: &Body) -> AppResult<Self> {
        Self::parse(body, false)
    }

    /// Admin create: `role` may be `user` or `admin`
    pub fn from_admin(body: &Body) -> AppResult<Self> {
        Self::parse(body, true)
    }

    fn parse(body: &Body, allow_role: bool) -> AppResult<Self> {
        let fields = Fields::new(body);
        let (Some(name), Some(email), Some(password)) = (
            fields.non_empty_string("name")?,
            fields.non_empty_string("email")?,
            fields.non_empty_string("password")?,
        ) else {
            return Err(invalid("name, email, password are required"));
        };

        validate_password(&password)?;
        let name = validate_name(&name)?;
        let email = validate_email(&email)?;

        let role = if allow_role {
            match fields.string("role")? {
                Some(raw) => Role::parse(&raw).ok_or_else(|| invalid("Invalid role"))?,
                None => Role::User,
            }
        } else {
            Role::User
        };

        Ok(Self {
            name,
            email,
            password,
            role,
        })
    }

    /// Build the record to persist; the password is already hashed
    pub fn into_user(self, password_hash: String, at: OffsetDateTime) -> User {
        User {
            id: ObjectId::new(),
            name: self.name,
            email: self.email,
            password_hash,
            role: self.role,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Validated input for login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

impl LoginUser {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        match (
            fields.non_empty_string("email")?,
            fields.non_empty_string("password")?,
        ) {
            (Some(email), Some(password)) => Ok(Self {
                email: normalize_email(&email),
                password,
            }),
            _ => Err(invalid("email and password are required")),
        }
    }
}

/// Validated partial update; `None` leaves the field untouched
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUser {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        if !fields.any_present(&["name", "email", "password", "role"]) {
            return Err(invalid("Nothing to update"));
        }

        let name = fields.string("name")?.map(|n| validate_name(&n)).transpose()?;
        let email = fields
            .string("email")?
            .map(|e| validate_email(&e))
            .transpose()?;
        let password = fields
            .string("password")?
            .map(|p| validate_password(&p).map(|_| p))
            .transpose()?;
        let role = fields
            .string("role")?
            .map(|r| Role::parse(&r).ok_or_else(|| invalid("Invalid role")))
            .transpose()?;

        Ok(Self {
            name,
            email,
            password,
            role,
        })
    }

    /// Apply supplied fields. `password_hash` replaces the stored hash when set.
    pub fn apply(self, user: &mut User, password_hash: Option<String>, at: OffsetDateTime) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        user.updated_at = at;
    }
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    match char_len(name) {
        n if n < NAME_MIN => Err(invalid("name is too short")),
        n if n > NAME_MAX => Err(invalid("name is too long")),
        _ => Ok(name.to_string()),
    }
}

fn validate_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(invalid("email is invalid"));
    }
    Ok(email)
}

fn validate_password(raw: &str) -> AppResult<()> {
    if char_len(raw) < MIN_PASSWORD_LEN {
        return Err(invalid("password must be at least 6 chars"));
    }
    Ok(())
}

/// Public user view (safe to return via API)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn body(value: Value) -> Body {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_register_requires_all_fields() {
        let err = CreateUser::from_register(&body(json!({
            "name": "Anna",
            "email": "",
            "password": "secret1"
        })))
        .unwrap_err();
        assert_eq!(err.public_message(), "name, email, password are required");
    }

    #[test]
    fn test_register_normalizes_and_ignores_role() {
        let cmd = CreateUser::from_register(&body(json!({
            "name": "  Anna ",
            "email": " Anna@Example.com",
            "password": "secret1",
            "role": "admin"
        })))
        .unwrap();

        assert_eq!(cmd.name, "Anna");
        assert_eq!(cmd.email, "anna@example.com");
        assert_eq!(cmd.role, Role::User);
    }

    #[test]
    fn test_short_password_rejected() {
        let err = CreateUser::from_register(&body(json!({
            "name": "Anna",
            "email": "anna@example.com",
            "password": "12345"
        })))
        .unwrap_err();
        assert_eq!(err.public_message(), "password must be at least 6 chars");
    }

    #[test]
    fn test_admin_create_role() {
        let cmd = CreateUser::from_admin(&body(json!({
            "name": "Root",
            "email": "root@example.com",
            "password": "secret1",
            "role": "admin"
        })))
        .unwrap();
        assert_eq!(cmd.role, Role::Admin);

        let err = CreateUser::from_admin(&body(json!({
            "name": "Root",
            "email": "root@example.com",
            "password": "secret1",
            "role": "owner"
        })))
        .unwrap_err();
        assert_eq!(err.public_message(), "Invalid role");
    }

    #[test]
    fn test_update_nothing_to_update() {
        let err = UpdateUser::parse(&body(json!({}))).unwrap_err();
        assert_eq!(err.public_message(), "Nothing to update");

        let err = UpdateUser::parse(&body(json!({ "unknown": 1 }))).unwrap_err();
        assert_eq!(err.public_message(), "Nothing to update");
    }

    #[test]
    fn test_update_validates_only_supplied_fields() {
        let cmd = UpdateUser::parse(&body(json!({ "name": " Bo " }))).unwrap();
        assert_eq!(cmd.name.as_deref(), Some("Bo"));
        assert!(cmd.email.is_none() && cmd.password.is_none() && cmd.role.is_none());

        let err = UpdateUser::parse(&body(json!({ "name": "B" }))).unwrap_err();
        assert_eq!(err.public_message(), "name is too short");

        let err = UpdateUser::parse(&body(json!({ "email": "nope" }))).unwrap_err();
        assert_eq!(err.public_message(), "email is invalid");
    }

    #[test]
    fn test_response_has_no_password() {
        let user = User {
            id: ObjectId::new(),
            name: "Anna".to_string(),
            email: "anna@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Admin,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(value["role"], "admin");
        assert!(value.get("password").is_none());
        assert!(value.get("passwordHash").is_none());
        assert!(value["createdAt"].as_str().is_some());
    }
}
