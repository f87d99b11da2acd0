//! Authenticated user identity.

use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, UserId};

/// The identity returned by `GET /api/auth/me` and the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Account email address.
    pub email: Email,
    /// Marketplace role.
    pub role: Role,
    /// Avatar URL, if the user uploaded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl User {
    /// Initials for avatar placeholders (e.g., "Mara Quill" -> "MQ").
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Credential-exchange request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    /// Account email address.
    pub email: &'a str,
    /// Plain-text password, sent once over TLS.
    pub password: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_me_response() {
        let json = r#"{
            "id": 4,
            "name": "Mara Quill",
            "email": "mara@bazaar.example",
            "role": "seller",
            "profileImage": "https://cdn.example/mara.png"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::new(4).unwrap());
        assert_eq!(user.role, Role::Seller);
        assert_eq!(user.profile_image.as_deref(), Some("https://cdn.example/mara.png"));
    }

    #[test]
    fn test_profile_image_optional() {
        let json = r#"{"id": 1, "name": "Ada", "email": "ada@bazaar.example", "role": "buyer"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.profile_image.is_none());
    }

    #[test]
    fn test_initials() {
        let json = r#"{"id": 1, "name": "mara  quill reed", "email": "m@b.example", "role": "buyer"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.initials(), "MQ");
    }
}
