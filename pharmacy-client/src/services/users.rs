//! User profile and account administration

use serde::Deserialize;
use shared::{ChangePasswordRequest, UpdateProfileRequest, UpdateUserStatusRequest, UserRecord};

use super::Caller;
use crate::error::{ClientResult, PolicyError};
use crate::http::{HttpClient, RequestContext};

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

pub struct UserService<'a, H: HttpClient> {
    http: &'a H,
    caller: Caller,
}

impl<'a, H: HttpClient> UserService<'a, H> {
    pub fn new(http: &'a H, caller: Caller) -> Self {
        Self { http, caller }
    }

    pub async fn profile(&self) -> ClientResult<UserRecord> {
        let token = self.caller.require_token()?;
        self.http
            .get(
                "users/profile",
                RequestContext::new(Some(token), "Failed to fetch user profile"),
            )
            .await
    }

    /// Save profile changes and return the updated record
    ///
    /// Does not touch the cached session; `PharmacyClient::update_profile`
    /// does that.
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ClientResult<UserRecord> {
        let token = self.caller.require_token()?;
        let user: UserRecord = self
            .http
            .put(
                "users/profile",
                RequestContext::new(Some(token), "Failed to update profile"),
                request,
            )
            .await?;
        tracing::info!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    /// Change the password; returns the backend's confirmation message
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> ClientResult<String> {
        let token = self.caller.require_token()?;
        if request.current_password.is_empty() || request.new_password.is_empty() {
            return Err(PolicyError::MissingFields.into());
        }
        if request.new_password != request.confirm_password {
            return Err(PolicyError::PasswordMismatch.into());
        }

        let response: Option<MessageResponse> = self
            .http
            .put(
                "users/change-password",
                RequestContext::new(Some(token), "Failed to change password"),
                request,
            )
            .await?;
        tracing::info!(target: "security", user_id = self.caller.user().map(|u| u.id), "Password changed");
        Ok(response
            .and_then(|r| r.message)
            .unwrap_or_else(|| "Password changed successfully".into()))
    }

    /// Every account (admin)
    pub async fn all(&self) -> ClientResult<Vec<UserRecord>> {
        let token = self.caller.require_admin("list users")?;
        let users: Option<Vec<UserRecord>> = self
            .http
            .get("users", RequestContext::new(Some(token), "Failed to fetch users"))
            .await?;
        Ok(users.unwrap_or_default())
    }

    /// Activate or deactivate an account (admin)
    pub async fn set_active(&self, user_id: i64, active: bool) -> ClientResult<UserRecord> {
        let token = self.caller.require_admin("update user status")?;
        let user: UserRecord = self
            .http
            .put(
                &format!("users/{user_id}/status"),
                RequestContext::new(Some(token), "Failed to update user status"),
                &UpdateUserStatusRequest { active },
            )
            .await?;
        tracing::info!(target: "security", user_id, active, "User status changed");
        Ok(user)
    }
}
