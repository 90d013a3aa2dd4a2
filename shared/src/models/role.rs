//! Role Model
//!
//! Roles arrive from the backend as upper-case tags (`"USER"`, `"PHARMACIST"`,
//! `"ADMIN"`) but older records and token claims use other casings, so every
//! comparison goes through [`Role::matches`] or [`Role::parse`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Role held by an identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// Customer; the only role allowed to transact
    User,
    /// Inventory staff, read-only storefront access
    Pharmacist,
    /// System administrator, read-only storefront access
    Admin,
    /// Tag the client does not know about (stored lower-cased)
    Other(String),
}

impl Role {
    /// Parse a role tag, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let tag = raw.trim();
        if tag.eq_ignore_ascii_case("user") {
            Role::User
        } else if tag.eq_ignore_ascii_case("pharmacist") {
            Role::Pharmacist
        } else if tag.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Other(tag.to_ascii_lowercase())
        }
    }

    /// Wire tag as the backend spells it
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "USER",
            Role::Pharmacist => "PHARMACIST",
            Role::Admin => "ADMIN",
            Role::Other(tag) => tag,
        }
    }

    /// Case-insensitive comparison against a raw role name
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name.trim())
    }

    /// Pharmacist or admin
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Pharmacist | Role::Admin)
    }

    /// Rank used by the highest-privilege primary role policy
    pub fn privilege(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Pharmacist => 2,
            Role::User => 1,
            Role::Other(_) => 0,
        }
    }

    /// Human-readable label ("Admin", "Pharmacist", ...)
    pub fn label(&self) -> String {
        let lower = self.as_str().to_ascii_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::parse(s))
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::parse(value)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse(&raw))
    }
}
