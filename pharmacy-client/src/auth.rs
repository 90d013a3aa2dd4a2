//! Login and registration
//!
//! Turns credentials into a [`Session`]. The profile endpoint is the
//! preferred identity source; when it fails the token's own claims are used.
//! Persisting the session is left to the caller.

use shared::client::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use shared::UserRecord;

use crate::claims::TokenClaims;
use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, RequestContext};
use crate::session::Session;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
const VALIDATION_FAILED: &str = "Validation failed. Please check your input.";
const PROFILE_FAILED: &str = "Failed to fetch user profile";

/// Outcome of a registration
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// The backend issued a token; the account is signed in
    SignedIn(Session),
    /// Account created, but the user must log in
    LoginRequired,
}

/// Authentication service
pub struct AuthService<'a, H: HttpClient> {
    http: &'a H,
}

impl<'a, H: HttpClient> AuthService<'a, H> {
    pub fn new(http: &'a H) -> Self {
        Self { http }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<Session> {
        let response: Option<LoginResponse> = self
            .http
            .post("login", RequestContext::anonymous(LOGIN_FAILED), credentials)
            .await
            .map_err(|e| {
                tracing::warn!(target: "security", email = %credentials.email, error = %e, "Login rejected");
                match e {
                    ClientError::Api { message, .. } => ClientError::Auth(message),
                    other => other,
                }
            })?;

        let token = response
            .and_then(|r| r.token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ClientError::Auth(LOGIN_FAILED.into()))?;

        let user = self.resolve_identity(&token, None).await?;
        tracing::info!(user_id = user.id, "Logged in");
        Ok(Session { token, user })
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<Registration> {
        let response: Option<RegisterResponse> = self
            .http
            .post("register", RequestContext::anonymous(REGISTRATION_FAILED), request)
            .await
            .map_err(registration_error)?;
        let response = response.unwrap_or_default();

        let Some(token) = response.token.filter(|t| !t.trim().is_empty()) else {
            tracing::info!(email = %request.email, "Registered, login required");
            return Ok(Registration::LoginRequired);
        };

        let user = match response.user.filter(|u| u.validate().is_ok()) {
            Some(user) => user,
            None => self.resolve_identity(&token, Some(request)).await?,
        };
        tracing::info!(user_id = user.id, "Registered and signed in");
        Ok(Registration::SignedIn(Session { token, user }))
    }

    /// Fetch the current user's profile
    pub async fn profile(&self, token: &str) -> ClientResult<UserRecord> {
        self.http
            .get("users/profile", RequestContext::new(Some(token), PROFILE_FAILED))
            .await
    }

    async fn resolve_identity(
        &self,
        token: &str,
        defaults: Option<&RegisterRequest>,
    ) -> ClientResult<UserRecord> {
        match self.profile(token).await {
            Ok(user) => match user.validate() {
                Ok(()) => return Ok(user),
                Err(e) => tracing::warn!(error = %e, "Profile is incomplete, using token claims"),
            },
            Err(e) => tracing::warn!(error = %e, "Profile fetch failed, using token claims"),
        }
        TokenClaims::decode(token)?.into_user(defaults)
    }
}

fn registration_error(e: ClientError) -> ClientError {
    let ClientError::Api { status, details, .. } = e else {
        return e;
    };
    let message = if status == 400 {
        details
            .validation_summary()
            .or_else(|| details.message().map(str::to_string))
            .unwrap_or_else(|| VALIDATION_FAILED.to_string())
    } else {
        details
            .message()
            .or_else(|| details.error())
            .unwrap_or(REGISTRATION_FAILED)
            .to_string()
    };
    ClientError::Auth(message)
}
