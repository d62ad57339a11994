use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::validation::{char_len, invalid, normalize_hex_color, Body, Fields};

const NAME_MAX: usize = 64;

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: ObjectId,
    /// Always trimmed and lowercase
    pub name: String,
    /// Always `#RGB` or `#RRGGBB`
    pub color: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTag {
    pub name: String,
    pub color: String,
}

impl CreateTag {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        let (Some(name), Some(color)) = (
            fields.non_empty_string("name")?,
            fields.non_empty_string("color")?,
        ) else {
            return Err(invalid("name and color are required"));
        };

        Ok(Self {
            name: validate_name(&name)?,
            color: validate_color(&color)?,
        })
    }

    pub fn into_tag(self, at: OffsetDateTime) -> Tag {
        Tag {
            id: ObjectId::new(),
            name: self.name,
            color: self.color,
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl UpdateTag {
    pub fn parse(body: &Body) -> AppResult<Self> {
        let fields = Fields::new(body);
        if !fields.any_present(&["name", "color"]) {
            return Err(invalid("Nothing to update"));
        }

        Ok(Self {
            name: fields.string("name")?.map(|n| validate_name(&n)).transpose()?,
            color: fields
                .string("color")?
                .map(|c| validate_color(&c))
                .transpose()?,
        })
    }

    pub fn apply(self, tag: &mut Tag, at: OffsetDateTime) {
        if let Some(name) = self.name {
            tag.name = name;
        }
        if let Some(color) = self.color {
            tag.color = color;
        }
        tag.updated_at = at;
    }
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err(invalid("name is invalid"));
    }
    if char_len(&name) > NAME_MAX {
        return Err(invalid("name is too long"));
    }
    Ok(name)
}

fn validate_color(raw: &str) -> AppResult<String> {
    normalize_hex_color(raw)
        .ok_or_else(|| invalid("color must be a valid hex like #AABBCC or #ABC"))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id.to_hex(),
            name: t.name,
            color: t.color,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Tag as embedded in an expanded project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TagSummary {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl From<&Tag> for TagSummary {
    fn from(t: &Tag) -> Self {
        Self {
            id: t.id.to_hex(),
            name: t.name.clone(),
            color: t.color.clone(),
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
    fn test_create_normalizes_name_and_color() {
        let cmd = CreateTag::parse(&body(json!({ "name": " React ", "color": "61dafb" }))).unwrap();
        assert_eq!(cmd.name, "react");
        assert_eq!(cmd.color, "#61dafb");
    }

    #[test]
    fn test_create_requires_both_fields() {
        let err = CreateTag::parse(&body(json!({ "name": "react" }))).unwrap_err();
        assert_eq!(err.public_message(), "name and color are required");
    }

    #[test]
    fn test_invalid_colors() {
        for color in ["ZZZ", "#12", "#1234567", "red"] {
            let err = CreateTag::parse(&body(json!({ "name": "x", "color": color }))).unwrap_err();
            assert_eq!(
                err.public_message(),
                "color must be a valid hex like #AABBCC or #ABC"
            );
        }
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let err = CreateTag::parse(&body(json!({ "name": "   ", "color": "#fff" }))).unwrap_err();
        assert_eq!(err.public_message(), "name is invalid");
    }

    #[test]
    fn test_update_partial() {
        let err = UpdateTag::parse(&body(json!({}))).unwrap_err();
        assert_eq!(err.public_message(), "Nothing to update");

        let cmd = UpdateTag::parse(&body(json!({ "color": "ABC" }))).unwrap();
        assert_eq!(cmd.name, None);
        assert_eq!(cmd.color.as_deref(), Some("#ABC"));
    }
}
