//! REST services
//!
//! Each service borrows the client's HTTP transport and carries a snapshot
//! of the session taken when the service was handed out. Role checks run
//! against that snapshot before any request is built.

pub mod cart;
pub mod medicines;
pub mod orders;
pub mod users;

pub use cart::{CartAddition, CartService, ItemSequencer, QuantityUpdate};
pub use medicines::MedicineService;
pub use orders::OrderService;
pub use users::UserService;

use shared::UserRecord;

use crate::error::{ClientError, ClientResult, PolicyError};
use crate::roles::{PrimaryRolePolicy, RoleResolver};
use crate::session::Session;

/// Identity a service call is made on behalf of
#[derive(Debug, Clone, Default)]
pub struct Caller {
    session: Option<Session>,
}

impl Caller {
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// Bearer token, if signed in
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// Bearer token, or [`ClientError::NotAuthenticated`]
    pub fn require_token(&self) -> ClientResult<&str> {
        self.token().ok_or(ClientError::NotAuthenticated)
    }

    fn resolver(&self) -> RoleResolver<'_> {
        RoleResolver::new(self.user(), PrimaryRolePolicy::default())
    }

    /// Token of a pharmacist or admin
    pub fn require_staff(&self, action: &str) -> ClientResult<&str> {
        self.require(action, self.resolver().is_staff(), PolicyError::StaffOnly)
    }

    /// Token of an admin
    pub fn require_admin(&self, action: &str) -> ClientResult<&str> {
        self.require(action, self.resolver().has_role("admin"), PolicyError::AdminOnly)
    }

    fn require(&self, action: &str, allowed: bool, denied: PolicyError) -> ClientResult<&str> {
        let Some(token) = self.token() else {
            tracing::warn!(target: "security", action, "Rejected anonymous staff action");
            return Err(PolicyError::NotAuthenticated.into());
        };
        if !allowed {
            tracing::warn!(
                target: "security",
                user_id = self.user().map(|u| u.id),
                action,
                "Rejected action for insufficient role"
            );
            return Err(denied.into());
        }
        Ok(token)
    }
}
