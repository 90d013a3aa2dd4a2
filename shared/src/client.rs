//! Auth API DTOs
//!
//! Request/response bodies for the login and registration endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Role, UserRecord};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Login response data
///
/// The backend only returns a token; the profile is fetched separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Registration request (backend `UserCreateDTO`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub age: u32,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub roles: Vec<Role>,
    pub active: bool,
}

/// Registration response
///
/// Depending on backend configuration the account is either signed in
/// straight away (`token`, sometimes `user`) or must log in afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub token: Option<String>,
    /// Embedded user; a record that does not parse is treated as absent
    #[serde(default, deserialize_with = "lenient_user")]
    pub user: Option<UserRecord>,
}

fn lenient_user<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<UserRecord>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
