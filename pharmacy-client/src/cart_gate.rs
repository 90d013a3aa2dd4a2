//! Cart eligibility
//!
//! Only plain customers may hold a cart or check out. Staff identities can
//! browse medicines read-only; their cart mutations are rejected here, before
//! any request is built.

use shared::{Role, UserRecord};

use crate::error::PolicyError;

const PHARMACIST_GUIDANCE: &str = "Please use your pharmacist dashboard to manage inventory.";
const ADMIN_GUIDANCE: &str = "Please use your admin dashboard to manage the system.";

/// Result of a cart eligibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEligibility {
    Eligible,
    NotAuthenticated,
    /// Holds a staff role; pharmacist is reported over admin
    StaffRole(Role),
    MissingUserRole,
}

impl CartEligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, CartEligibility::Eligible)
    }

    pub fn into_result(self) -> Result<(), PolicyError> {
        match self {
            CartEligibility::Eligible => Ok(()),
            CartEligibility::NotAuthenticated => Err(PolicyError::NotAuthenticated),
            CartEligibility::StaffRole(role) => {
                let guidance = if role == Role::Admin {
                    ADMIN_GUIDANCE
                } else {
                    PHARMACIST_GUIDANCE
                };
                Err(PolicyError::CartNotAllowed { role, guidance })
            }
            CartEligibility::MissingUserRole => Err(PolicyError::MissingUserRole),
        }
    }
}

/// Cart eligibility gate
pub struct CartGate;

impl CartGate {
    /// Eligible iff signed in, holding USER, and holding neither PHARMACIST nor ADMIN
    pub fn check(user: Option<&UserRecord>) -> CartEligibility {
        let Some(user) = user else {
            return CartEligibility::NotAuthenticated;
        };
        if user.roles.contains(&Role::Pharmacist) {
            return CartEligibility::StaffRole(Role::Pharmacist);
        }
        if user.roles.contains(&Role::Admin) {
            return CartEligibility::StaffRole(Role::Admin);
        }
        if !user.roles.contains(&Role::User) {
            return CartEligibility::MissingUserRole;
        }
        CartEligibility::Eligible
    }

    /// Check and convert a rejection into a [`PolicyError`]
    pub fn ensure(user: Option<&UserRecord>, action: &str) -> Result<(), PolicyError> {
        let eligibility = Self::check(user);
        if !eligibility.is_eligible() {
            tracing::warn!(
                target: "security",
                user_id = user.map(|u| u.id),
                action,
                ?eligibility,
                "Cart action rejected"
            );
        }
        eligibility.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(roles: &[&str]) -> UserRecord {
        UserRecord {
            id: 3,
            first_name: String::new(),
            last_name: String::new(),
            email: "c@example.com".into(),
            phone_number: String::new(),
            address: String::new(),
            age: 0,
            roles: roles.iter().map(|r| Role::parse(r)).collect(),
            active: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_plain_user_is_eligible() {
        assert!(CartGate::check(Some(&user_with(&["USER"]))).is_eligible());
        assert!(CartGate::check(Some(&user_with(&["user"]))).is_eligible());
        assert!(CartGate::ensure(Some(&user_with(&["User"])), "add").is_ok());
    }

    #[test]
    fn test_no_session() {
        assert_eq!(CartGate::check(None), CartEligibility::NotAuthenticated);
        assert_eq!(CartGate::ensure(None, "add"), Err(PolicyError::NotAuthenticated));
    }

    #[test]
    fn test_pharmacist_rejected_with_dashboard_guidance() {
        let err = CartGate::ensure(Some(&user_with(&["PHARMACIST"])), "add").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only users can use cart functionality. Please use your pharmacist dashboard to manage inventory."
        );
    }

    #[test]
    fn test_admin_rejected_even_with_user_role() {
        let eligibility = CartGate::check(Some(&user_with(&["USER", "ADMIN"])));
        assert_eq!(eligibility, CartEligibility::StaffRole(Role::Admin));
        assert_eq!(
            eligibility.into_result().unwrap_err().to_string(),
            "Only users can use cart functionality. Please use your admin dashboard to manage the system."
        );
    }

    #[test]
    fn test_pharmacist_reported_over_admin() {
        let eligibility = CartGate::check(Some(&user_with(&["ADMIN", "PHARMACIST"])));
        assert_eq!(eligibility, CartEligibility::StaffRole(Role::Pharmacist));
    }

    #[test]
    fn test_unknown_role_without_user_is_rejected() {
        assert_eq!(
            CartGate::check(Some(&user_with(&["courier"]))),
            CartEligibility::MissingUserRole
        );
    }
}
