//! User Model

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Role;

/// Cached identity of the signed-in user
///
/// Mirrors the backend's `UserProfile` DTO. `roles` keeps the order the
/// backend sent; which role counts as primary is decided by the client's
/// primary role policy, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_active() -> bool {
    true
}

/// Structural defects that make a stored user record unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidUserRecord {
    #[error("user record has no id")]
    MissingId,
    #[error("user record has no email")]
    MissingEmail,
    #[error("user record has no roles")]
    MissingRoles,
}

impl UserRecord {
    /// Check the fields every authenticated session relies on.
    pub fn validate(&self) -> Result<(), InvalidUserRecord> {
        if self.id <= 0 {
            return Err(InvalidUserRecord::MissingId);
        }
        if self.email.trim().is_empty() {
            return Err(InvalidUserRecord::MissingEmail);
        }
        if self.roles.is_empty() {
            return Err(InvalidUserRecord::MissingRoles);
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Update profile payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub age: u32,
    pub email: String,
    pub phone_number: String,
}

impl From<&UserRecord> for UpdateProfileRequest {
    fn from(user: &UserRecord) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            address: user.address.clone(),
            age: user.age,
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

/// Change password payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Activate / deactivate a user account (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub active: bool,
}
