use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::validation::{
    char_len, invalid, is_valid_email, normalize_email, Body, Fields, MAX_DESCRIPTION_LEN,
};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 120;
const EMAIL_MAX: usize = 200;

/// Inbound contact request from the public site
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub is_read: bool,
    pub meta: ContactMeta,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Where a contact request came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMeta {
    pub ip: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContact {
    pub name: String,
    pub email: String,
    pub message: Option<String>,
}

impl CreateContact {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        let (Some(name), Some(email)) = (
            fields.non_empty_string("name")?,
            fields.non_empty_string("email")?,
        ) else {
            return Err(invalid("name and email are required"));
        };

        let name = name.trim();
        match char_len(name) {
            n if n < NAME_MIN => return Err(invalid("name is too short")),
            n if n > NAME_MAX => return Err(invalid("name is too long")),
            _ => {}
        }

        let email = normalize_email(&email);
        if char_len(&email) > EMAIL_MAX || !is_valid_email(&email) {
            return Err(invalid("email is invalid"));
        }

        let message = fields
            .string("message")?
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if message
            .as_deref()
            .is_some_and(|m| char_len(m) > MAX_DESCRIPTION_LEN)
        {
            return Err(invalid("message is too long"));
        }

        Ok(Self {
            name: name.to_string(),
            email,
            message,
        })
    }

    pub fn into_contact(self, meta: ContactMeta, at: OffsetDateTime) -> Contact {
        Contact {
            id: ObjectId::new(),
            name: self.name,
            email: self.email,
            message: self.message,
            is_read: false,
            meta,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Admins can only toggle the read flag
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContact {
    pub is_read: bool,
}

impl UpdateContact {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let is_read = Fields::new(body)
            .bool("isRead")?
            .ok_or_else(|| invalid("Nothing to update"))?;
        Ok(Self { is_read })
    }

    pub fn apply(self, contact: &mut Contact, at: OffsetDateTime) {
        contact.is_read = self.is_read;
        contact.updated_at = at;
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id.to_hex(),
            name: c.name,
            email: c.email,
            message: c.message,
            is_read: c.is_read,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Admin detail view, including request metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactDetailResponse {
    #[serde(flatten)]
    pub contact: ContactResponse,
    pub meta: ContactMeta,
}

impl From<Contact> for ContactDetailResponse {
    fn from(c: Contact) -> Self {
        let meta = c.meta.clone();
        Self {
            contact: c.into(),
            meta,
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
    fn test_create_normalizes() {
        let cmd = CreateContact::parse(&body(json!({
            "name": " Anna ",
            "email": " Anna@Example.com ",
            "message": "  Hello there  "
        })))
        .unwrap();

        assert_eq!(cmd.name, "Anna");
        assert_eq!(cmd.email, "anna@example.com");
        assert_eq!(cmd.message.as_deref(), Some("Hello there"));
    }

    #[test]
    fn test_create_rules() {
        let err = CreateContact::parse(&body(json!({ "name": "Anna" }))).unwrap_err();
        assert_eq!(err.public_message(), "name and email are required");

        let err = CreateContact::parse(&body(json!({ "name": "A", "email": "a@example.com" })))
            .unwrap_err();
        assert_eq!(err.public_message(), "name is too short");

        let err = CreateContact::parse(&body(json!({ "name": "Anna", "email": "anna@example" })))
            .unwrap_err();
        assert_eq!(err.public_message(), "email is invalid");

        let long_email = format!("{}@example.com", "a".repeat(200));
        let err = CreateContact::parse(&body(json!({ "name": "Anna", "email": long_email })))
            .unwrap_err();
        assert_eq!(err.public_message(), "email is invalid");

        let err = CreateContact::parse(&body(json!({
            "name": "Anna",
            "email": "anna@example.com",
            "message": "m".repeat(4001)
        })))
        .unwrap_err();
        assert_eq!(err.public_message(), "message is too long");
    }

    #[test]
    fn test_update_is_read() {
        let err = UpdateContact::parse(&body(json!({}))).unwrap_err();
        assert_eq!(err.public_message(), "Nothing to update");

        let err = UpdateContact::parse(&body(json!({ "isRead": "yes" }))).unwrap_err();
        assert_eq!(err.public_message(), "isRead must be a boolean");

        assert!(UpdateContact::parse(&body(json!({ "isRead": true }))).unwrap().is_read);
    }

    #[test]
    fn test_detail_view_includes_meta() {
        let contact = Contact {
            id: ObjectId::new(),
            name: "Anna".to_string(),
            email: "anna@example.com".to_string(),
            message: None,
            is_read: false,
            meta: ContactMeta {
                ip: "203.0.113.9".to_string(),
                user_agent: "curl/8".to_string(),
            },
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        let value = serde_json::to_value(ContactDetailResponse::from(contact)).unwrap();
        assert_eq!(value["isRead"], false);
        assert_eq!(value["meta"]["ip"], "203.0.113.9");
        assert_eq!(value["meta"]["userAgent"], "curl/8");
    }
}
