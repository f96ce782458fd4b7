//! Session Entities
//!
//! The signed-in user as stored by the client, and the session pairing it
//! with its auth token.

use serde::{Deserialize, Serialize};

use crate::role::Role;

mod string_or_number {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Str(String),
            Int(i64),
            Uint(u64),
        }

        match StringOrNum::deserialize(deserializer)? {
            StringOrNum::Str(s) if !s.trim().is_empty() => Ok(s),
            StringOrNum::Str(_) => Err(de::Error::custom("user id must not be empty")),
            StringOrNum::Int(n) => Ok(n.to_string()),
            StringOrNum::Uint(n) => Ok(n.to_string()),
        }
    }
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend user id (accepted as JSON string or number)
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub id: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Free-form role text as issued by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            role: None,
            first_name: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Raw role text. Older accounts carry the role in `displayName`, so
    /// that field is consulted when `role` is absent.
    pub fn role_text(&self) -> Option<&str> {
        self.role.as_deref().or(self.display_name.as_deref())
    }

    /// Parsed role; `None` when missing or unrecognized
    pub fn parsed_role(&self) -> Option<Role> {
        Role::parse(self.role_text())
    }

    /// Name to greet the user with
    pub fn greeting_name(&self) -> &str {
        self.first_name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or(&self.email)
    }
}

/// Authenticated session: a non-empty token plus the user it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    /// Build a session, refusing blank tokens
    pub fn new(token: impl Into<String>, user: User) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self { token, user })
    }

    pub fn role(&self) -> Option<Role> {
        self.user.parsed_role()
    }

    /// Raw role text as stored
    pub fn raw_role(&self) -> Option<&str> {
        self.user.role_text()
    }
}

/// Decode the stored user entry. Malformed JSON yields `None`.
pub fn decode_user(raw: &str) -> Option<User> {
    match serde_json::from_str::<User>(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed stored user");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_numeric_id() {
        let user: User = serde_json::from_str(
            r#"{"id": 42, "email": "t@example.com", "role": "Teacher", "firstName": "Ada"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.parsed_role(), Some(Role::Teacher));
    }

    #[test]
    fn test_user_ignores_extra_fields() {
        let user: User = serde_json::from_str(
            r#"{"id": "u1", "email": "s@example.com", "displayName": "publisher", "avatar": "x.png"}"#,
        )
        .unwrap();
        assert_eq!(user.display_name.as_deref(), Some("publisher"));
        assert_eq!(user.role, None);
        assert_eq!(user.parsed_role(), Some(Role::Scholar));
    }

    #[test]
    fn test_role_field_wins_over_display_name() {
        let user = User::new("1", "a@example.com")
            .with_display_name("Admin")
            .with_role("student");
        assert_eq!(user.parsed_role(), Some(Role::Student));
    }

    #[test]
    fn test_user_rejects_blank_id() {
        assert!(serde_json::from_str::<User>(r#"{"id": "", "email": "a@b.c"}"#).is_err());
    }

    #[test]
    fn test_decode_user_malformed() {
        assert!(decode_user("{not json").is_none());
        assert!(decode_user("null").is_none());
        assert!(decode_user(r#"{"email": "missing-id@example.com"}"#).is_none());
    }

    #[test]
    fn test_session_requires_token() {
        let user = User::new("1", "a@example.com");
        assert!(Session::new("", user.clone()).is_none());
        assert!(Session::new("   ", user.clone()).is_none());
        assert!(Session::new("abc", user).is_some());
    }

    #[test]
    fn test_greeting_name_fallbacks() {
        let user = User::new("1", "a@example.com");
        assert_eq!(user.greeting_name(), "a@example.com");
        let user = user.with_display_name("Dr. A");
        assert_eq!(user.greeting_name(), "Dr. A");
        let user = user.with_first_name("Ada");
        assert_eq!(user.greeting_name(), "Ada");
    }
}
