//! Wire DTOs for the remote pharmacy API.
//!
//! DESIGN
//! ======
//! The remote API is loosely typed: ids arrive as strings or numbers, Mongo
//! style `_id` shows up next to `id`, and list endpoints sometimes wrap their
//! payload in `{ data: [...] }`. The deserializers here absorb that so the
//! rest of the crate sees one shape.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ROLES
// =============================================================================

/// The closed set of roles the client knows how to route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    /// Pharmacy administrator.
    Admin,
    /// Marketplace administrator.
    SuperAdmin,
}

impl Role {
    /// Case-insensitive parse. Unknown roles yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            "superadmin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

/// Cached record of the authenticated principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    /// Kept verbatim; compare through [`User::normalized_role`].
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
}

impl User {
    /// Lowercased, trimmed role string.
    #[must_use]
    pub fn normalized_role(&self) -> String {
        self.role.trim().to_ascii_lowercase()
    }

    #[must_use]
    pub fn role_kind(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /users/login` response. A top-level `role` overrides `user.role`.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub role: Option<String>,
}

impl LoginResponse {
    /// The user record as it should be persisted.
    #[must_use]
    pub fn into_session_user(self) -> (String, User) {
        let mut user = self.user;
        if let Some(role) = self.role.filter(|r| !r.trim().is_empty()) {
            user.role = role;
        }
        (self.token, user)
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyResetCodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Fields accepted by `PUT /users/profile`; unset fields are left alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// True when no field would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Responses that either embed the user or are the user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl UserEnvelope {
    #[must_use]
    pub fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// A product or medicine listed by the catalog endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
}

/// List endpoints answer with a bare array or `{ data: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Accept ids as JSON strings or integers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or integer id, got {other}"))),
    }
}
