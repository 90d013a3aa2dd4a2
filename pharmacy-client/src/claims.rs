//! Identity claims embedded in the bearer token
//!
//! The token is treated as opaque for authorization; its payload is read
//! (without signature verification) only to build a fallback identity when
//! the profile endpoint is unavailable.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer};
use shared::client::RegisterRequest;
use shared::{Role, UserRecord};

use crate::error::{ClientError, ClientResult};

/// Unverified JWT payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, alias = "userId")]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, alias = "role", deserialize_with = "roles_claim")]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub exp: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RolesRepr {
    One(String),
    Many(Vec<String>),
}

fn roles_claim<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Role>, D::Error> {
    let repr = Option::<RolesRepr>::deserialize(deserializer)?;
    Ok(match repr {
        Some(RolesRepr::One(role)) => vec![Role::parse(&role)],
        Some(RolesRepr::Many(roles)) => roles.iter().map(|r| Role::parse(r)).collect(),
        None => Vec::new(),
    })
}

impl TokenClaims {
    /// Decode the payload segment of a compact JWT.
    pub fn decode(token: &str) -> ClientResult<Self> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
            _ => return Err(ClientError::Token("not a JWT".into())),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClientError::Token(format!("payload is not base64url: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Token(format!("payload is not a claims object: {e}")))
    }

    /// True when `exp` is present and in the past
    pub fn is_expired(&self) -> bool {
        self.exp
            .is_some_and(|exp| exp <= chrono::Utc::now().timestamp())
    }

    /// Build a user record from the claims.
    ///
    /// Each field comes from the claims when present, then from the
    /// registration form (if this identity was just registered).
    pub fn into_user(self, defaults: Option<&RegisterRequest>) -> ClientResult<UserRecord> {
        let sub = self.sub.unwrap_or_default();
        let id = self
            .id
            .or_else(|| sub.parse::<i64>().ok())
            .ok_or_else(|| ClientError::Token("token carries no user id".into()))?;

        let sub_email = sub.contains('@').then_some(sub);
        let pick = |claim: Option<String>, default: fn(&RegisterRequest) -> &String| {
            claim
                .filter(|v| !v.trim().is_empty())
                .or_else(|| defaults.map(|d| default(d).clone()))
                .unwrap_or_default()
        };

        let email = pick(self.email.or(sub_email), |d| &d.email);
        let first_name = pick(self.first_name, |d| &d.first_name);
        let last_name = pick(self.last_name, |d| &d.last_name);
        let address = pick(self.address, |d| &d.address);
        let phone_number = pick(self.phone_number, |d| &d.phone_number);
        let age = self.age.or(defaults.map(|d| d.age)).unwrap_or_default();

        let roles = if self.roles.is_empty() {
            defaults.map(|d| d.roles.clone()).unwrap_or_default()
        } else {
            self.roles
        };
        if roles.is_empty() {
            return Err(ClientError::Token("token carries no roles".into()));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let user = UserRecord {
            id,
            first_name,
            last_name,
            email,
            phone_number,
            address,
            age,
            roles,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        };
        user.validate()
            .map_err(|e| ClientError::Token(e.to_string()))?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_for(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    fn registration() -> RegisterRequest {
        RegisterRequest {
            first_name: "Luis".into(),
            last_name: "Gomez".into(),
            address: "Av. Sol 3".into(),
            age: 41,
            email: "luis@example.com".into(),
            password: "Secret#123".into(),
            phone_number: "+34611111111".into(),
            roles: vec![Role::User],
            active: true,
        }
    }

    #[test]
    fn test_decode_claims() {
        let token = token_for(serde_json::json!({
            "sub": "12",
            "email": "eva@example.com",
            "firstName": "Eva",
            "roles": ["PHARMACIST"],
            "exp": 1_900_000_000
        }));
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("12"));
        assert_eq!(claims.roles, vec![Role::Pharmacist]);

        let user = claims.into_user(None).unwrap();
        assert_eq!(user.id, 12);
        assert_eq!(user.email, "eva@example.com");
        assert_eq!(user.first_name, "Eva");
        assert_eq!(user.roles, vec![Role::Pharmacist]);
    }

    #[test]
    fn test_single_role_claim_and_email_subject() {
        let token = token_for(serde_json::json!({
            "sub": "ops@example.com",
            "userId": 5,
            "role": "admin"
        }));
        let user = TokenClaims::decode(&token).unwrap().into_user(None).unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.email, "ops@example.com");
        assert_eq!(user.roles, vec![Role::Admin]);
    }

    #[test]
    fn test_registration_defaults_fill_gaps() {
        let token = token_for(serde_json::json!({ "sub": "31" }));
        let user = TokenClaims::decode(&token)
            .unwrap()
            .into_user(Some(&registration()))
            .unwrap();
        assert_eq!(user.id, 31);
        assert_eq!(user.first_name, "Luis");
        assert_eq!(user.email, "luis@example.com");
        assert_eq!(user.age, 41);
        assert_eq!(user.roles, vec![Role::User]);
    }

    #[test]
    fn test_claims_win_over_defaults() {
        let token = token_for(serde_json::json!({
            "sub": "31",
            "firstName": "Luisa",
            "roles": ["ADMIN"]
        }));
        let user = TokenClaims::decode(&token)
            .unwrap()
            .into_user(Some(&registration()))
            .unwrap();
        assert_eq!(user.first_name, "Luisa");
        assert_eq!(user.roles, vec![Role::Admin]);
    }

    #[test]
    fn test_missing_roles_or_id_fail() {
        let no_roles = token_for(serde_json::json!({ "sub": "4", "email": "x@y.z" }));
        assert!(TokenClaims::decode(&no_roles).unwrap().into_user(None).is_err());

        let no_id = token_for(serde_json::json!({ "sub": "x@y.z", "roles": ["USER"] }));
        assert!(TokenClaims::decode(&no_id).unwrap().into_user(None).is_err());
    }

    #[test]
    fn test_expiry() {
        let past = token_for(serde_json::json!({ "sub": "1", "exp": 1_000 }));
        assert!(TokenClaims::decode(&past).unwrap().is_expired());

        let future = token_for(serde_json::json!({ "sub": "1", "exp": 4_000_000_000i64 }));
        assert!(!TokenClaims::decode(&future).unwrap().is_expired());

        let none = token_for(serde_json::json!({ "sub": "1" }));
        assert!(!TokenClaims::decode(&none).unwrap().is_expired());
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(TokenClaims::decode("opaque-token").is_err());
        assert!(TokenClaims::decode("a..c").is_err());
        assert!(TokenClaims::decode("a.!!!.c").is_err());
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("hello"));
        assert!(TokenClaims::decode(&not_json).is_err());
    }
}
