//! Role resolution
//!
//! Pure functions of the cached [`UserRecord`]. All name comparisons are
//! case-insensitive.

use std::str::FromStr;

use shared::{Role, UserRecord};

/// How the primary role is chosen from a user's role list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryRolePolicy {
    /// First role in the order the backend listed them
    #[default]
    FirstListed,
    /// Most privileged role: admin, then pharmacist, then user
    HighestPrivilege,
}

impl PrimaryRolePolicy {
    pub fn select<'a>(&self, roles: &'a [Role]) -> Option<&'a Role> {
        match self {
            PrimaryRolePolicy::FirstListed => roles.first(),
            // max_by_key keeps the last maximum; rev() makes ties go to the earliest
            PrimaryRolePolicy::HighestPrivilege => roles.iter().rev().max_by_key(|r| r.privilege()),
        }
    }
}

impl FromStr for PrimaryRolePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-listed" => Ok(PrimaryRolePolicy::FirstListed),
            "highest" | "highest-privilege" => Ok(PrimaryRolePolicy::HighestPrivilege),
            other => Err(format!("unknown primary role policy: {other}")),
        }
    }
}

/// Role queries over the current identity (or its absence)
#[derive(Debug, Clone, Copy)]
pub struct RoleResolver<'a> {
    user: Option<&'a UserRecord>,
    policy: PrimaryRolePolicy,
}

impl<'a> RoleResolver<'a> {
    pub fn new(user: Option<&'a UserRecord>, policy: PrimaryRolePolicy) -> Self {
        Self { user, policy }
    }

    fn roles(&self) -> &'a [Role] {
        self.user.map(|u| u.roles.as_slice()).unwrap_or(&[])
    }

    /// Role used for default dashboard redirection; `None` without a session
    pub fn primary_role(&self) -> Option<&'a Role> {
        self.policy.select(self.roles())
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles().iter().any(|held| held.matches(name))
    }

    /// True iff any requested name matches any held role. Empty request: false.
    pub fn has_any_role<N: AsRef<str>>(&self, names: &[N]) -> bool {
        names.iter().any(|name| self.has_role(name.as_ref()))
    }

    /// Typed variant of [`has_any_role`](Self::has_any_role)
    pub fn holds_any(&self, wanted: &[Role]) -> bool {
        wanted.iter().any(|role| self.roles().contains(role))
    }

    pub fn is_staff(&self) -> bool {
        self.roles().iter().any(Role::is_staff)
    }
}
