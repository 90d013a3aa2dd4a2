//! Route guard
//!
//! Decides whether a navigation may render, given the current identity and
//! the roles a route requires. Evaluated fresh on every call.

use shared::{Role, UserRecord};

use crate::roles::{PrimaryRolePolicy, RoleResolver};

/// Where a guarded navigation ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    AuthenticatedUnauthorized,
    Authorized,
}

/// A navigation to guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub path: String,
    /// Any one of these grants access; empty means any signed-in identity
    pub required_roles: Vec<Role>,
}

impl RouteRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_roles: Vec::new(),
        }
    }

    /// Require one of the named roles (names are case-insensitive)
    pub fn requiring<I, N>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        self.required_roles
            .extend(roles.into_iter().map(|name| Role::parse(name.as_ref())));
        self
    }
}

/// Outcome of [`RouteGuard::evaluate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// No session; `return_to` is the originally requested path
    RedirectToLogin { login_path: String, return_to: String },
    /// Signed in but lacking the route's roles
    RedirectToLanding { role: Option<Role>, path: String },
}

impl GuardDecision {
    pub fn state(&self) -> GuardState {
        match self {
            GuardDecision::Render => GuardState::Authorized,
            GuardDecision::RedirectToLogin { .. } => GuardState::Unauthenticated,
            GuardDecision::RedirectToLanding { .. } => GuardState::AuthenticatedUnauthorized,
        }
    }

    /// Path to navigate to, if this is a redirect
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            GuardDecision::Render => None,
            GuardDecision::RedirectToLogin { login_path, .. } => Some(login_path),
            GuardDecision::RedirectToLanding { path, .. } => Some(path),
        }
    }
}

/// Role-specific landing pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingRoutes {
    pub admin: String,
    pub pharmacist: String,
    /// Everyone else, including plain users
    pub customer: String,
    pub login: String,
}

impl Default for LandingRoutes {
    fn default() -> Self {
        Self {
            admin: "/admin/dashboard".into(),
            pharmacist: "/pharmacist/dashboard".into(),
            customer: "/customer/dashboard".into(),
            login: "/login".into(),
        }
    }
}

impl LandingRoutes {
    pub fn for_role(&self, role: Option<&Role>) -> &str {
        match role {
            Some(Role::Admin) => &self.admin,
            Some(Role::Pharmacist) => &self.pharmacist,
            _ => &self.customer,
        }
    }
}

/// Route guard
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    landing: LandingRoutes,
    policy: PrimaryRolePolicy,
}

impl RouteGuard {
    pub fn new(landing: LandingRoutes, policy: PrimaryRolePolicy) -> Self {
        Self { landing, policy }
    }

    pub fn landing(&self) -> &LandingRoutes {
        &self.landing
    }

    pub fn evaluate(&self, user: Option<&UserRecord>, request: &RouteRequest) -> GuardDecision {
        let Some(user) = user else {
            return GuardDecision::RedirectToLogin {
                login_path: self.landing.login.clone(),
                return_to: request.path.clone(),
            };
        };

        let resolver = RoleResolver::new(Some(user), self.policy);
        if request.required_roles.is_empty() || resolver.holds_any(&request.required_roles) {
            return GuardDecision::Render;
        }

        let role = resolver.primary_role().cloned();
        tracing::debug!(
            user_id = user.id,
            path = %request.path,
            primary_role = ?role,
            "Route denied, redirecting to landing"
        );
        GuardDecision::RedirectToLanding {
            path: self.landing.for_role(role.as_ref()).to_string(),
            role,
        }
    }

    /// Page to show after login or registration
    pub fn landing_for(&self, user: Option<&UserRecord>) -> &str {
        match user {
            Some(user) => {
                let resolver = RoleResolver::new(Some(user), self.policy);
                self.landing.for_role(resolver.primary_role())
            }
            None => &self.landing.login,
        }
    }
}
