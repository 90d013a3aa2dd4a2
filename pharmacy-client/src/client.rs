//! Client facade
//!
//! `PharmacyClient` owns the transport, the session store and the per-item
//! update sequencer. It is the single writer of the session: login,
//! registration, logout and profile updates go through `&mut self`, while
//! role queries and service handles only read.

use shared::client::{LoginRequest, RegisterRequest};
use shared::{Role, UpdateProfileRequest, UserRecord};

use crate::auth::{AuthService, Registration};
use crate::cart_gate::{CartEligibility, CartGate};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::guard::{GuardDecision, RouteGuard, RouteRequest};
use crate::http::{HttpClient, NetworkHttpClient};
use crate::roles::RoleResolver;
use crate::services::{
    CartService, Caller, ItemSequencer, MedicineService, OrderService, UserService,
};
use crate::session::{FileStorage, Session, SessionStorage, SessionStore};

/// Pharmacy API client
pub struct PharmacyClient<S: SessionStorage = FileStorage, H: HttpClient = NetworkHttpClient> {
    http: H,
    store: SessionStore<S>,
    sequencer: ItemSequencer,
    guard: RouteGuard,
    config: ClientConfig,
}

impl PharmacyClient {
    /// Client persisting its session under `config.storage_dir`
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let storage = FileStorage::new(&config.storage_dir);
        Self::with_storage(config, storage)
    }
}

impl<S: SessionStorage> PharmacyClient<S> {
    pub fn with_storage(config: ClientConfig, storage: S) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(&config)?;
        Ok(Self::with_transport(config, storage, http))
    }
}

impl<S: SessionStorage, H: HttpClient> PharmacyClient<S, H> {
    pub fn with_transport(config: ClientConfig, storage: S, http: H) -> Self {
        let guard = RouteGuard::new(config.landing.clone(), config.primary_role_policy);
        Self {
            http,
            store: SessionStore::new(storage),
            sequencer: ItemSequencer::new(),
            guard,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========== Session ==========

    /// Log in and persist the session
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<UserRecord> {
        let session = AuthService::new(&self.http)
            .login(&LoginRequest::new(email, password))
            .await?;
        self.store.save(&session.token, &session.user)?;
        Ok(session.user)
    }

    /// Register; persists the session when the backend signs the account in
    pub async fn register(&mut self, request: &RegisterRequest) -> ClientResult<Registration> {
        let registration = AuthService::new(&self.http).register(request).await?;
        if let Registration::SignedIn(session) = &registration {
            self.store.save(&session.token, &session.user)?;
        }
        Ok(registration)
    }

    /// Forget the session locally; the backend is not contacted
    pub fn logout(&mut self) -> ClientResult<()> {
        let user_id = self.store.user().map(|u| u.id);
        self.store.clear()?;
        tracing::info!(?user_id, "Logged out");
        Ok(())
    }

    /// Re-fetch the profile and refresh the cached user
    pub async fn refresh_profile(&mut self) -> ClientResult<UserRecord> {
        let user = self.users().profile().await?;
        self.cache_user(&user)?;
        Ok(user)
    }

    /// Save profile changes and refresh the cached user
    pub async fn update_profile(&mut self, request: &UpdateProfileRequest) -> ClientResult<UserRecord> {
        let user = self.users().update_profile(request).await?;
        self.cache_user(&user)?;
        Ok(user)
    }

    fn cache_user(&mut self, user: &UserRecord) -> ClientResult<()> {
        match self.store.token() {
            Some(token) => self.store.save(&token, user),
            None => Ok(()),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.store.snapshot()
    }

    /// Signed-in user; a cached record without a token does not count
    pub fn user(&self) -> Option<UserRecord> {
        self.store.snapshot().map(|session| session.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    // ========== Roles and navigation ==========

    pub fn primary_role(&self) -> Option<Role> {
        let user = self.user();
        RoleResolver::new(user.as_ref(), self.config.primary_role_policy)
            .primary_role()
            .cloned()
    }

    pub fn has_role(&self, name: &str) -> bool {
        let user = self.user();
        RoleResolver::new(user.as_ref(), self.config.primary_role_policy).has_role(name)
    }

    pub fn has_any_role<N: AsRef<str>>(&self, names: &[N]) -> bool {
        let user = self.user();
        RoleResolver::new(user.as_ref(), self.config.primary_role_policy).has_any_role(names)
    }

    /// Evaluate a navigation against the current session
    pub fn guard(&self, request: &RouteRequest) -> GuardDecision {
        let user = self.user();
        self.guard.evaluate(user.as_ref(), request)
    }

    /// Landing page for the current session (login page without one)
    pub fn landing_path(&self) -> String {
        let user = self.user();
        self.guard.landing_for(user.as_ref()).to_string()
    }

    pub fn cart_eligibility(&self) -> CartEligibility {
        CartGate::check(self.user().as_ref())
    }

    pub fn can_use_cart(&self) -> bool {
        self.cart_eligibility().is_eligible()
    }

    // ========== Services ==========

    fn caller(&self) -> Caller {
        Caller::new(self.store.snapshot())
    }

    pub fn medicines(&self) -> MedicineService<'_, H> {
        MedicineService::new(&self.http, self.caller())
    }

    pub fn cart(&self) -> CartService<'_, H> {
        CartService::new(&self.http, self.caller(), &self.sequencer)
    }

    pub fn orders(&self) -> OrderService<'_, H> {
        OrderService::new(&self.http, self.caller())
    }

    pub fn users(&self) -> UserService<'_, H> {
        UserService::new(&self.http, self.caller())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, PolicyError};
    use crate::guard::GuardState;
    use crate::roles::PrimaryRolePolicy;
    use crate::services::testing::{RecordingHttp, session_with};
    use crate::session::{MemoryStorage, TOKEN_KEY};

    fn client_with(
        roles: &[Role],
        reply: serde_json::Value,
    ) -> PharmacyClient<MemoryStorage, RecordingHttp> {
        let mut client = PharmacyClient::with_transport(
            ClientConfig::default(),
            MemoryStorage::new(),
            RecordingHttp::replying(reply),
        );
        let session = session_with(roles);
        client.store.save(&session.token, &session.user).unwrap();
        client
    }

    #[tokio::test]
    async fn test_pharmacist_cart_action_never_reaches_transport() {
        let client = client_with(&[Role::Pharmacist], serde_json::Value::Null);
        assert!(!client.can_use_cart());

        let err = client.cart().get_or_create().await.unwrap_err();
        assert!(matches!(err, ClientError::Policy(PolicyError::CartNotAllowed { .. })));
        assert!(client.http.calls().is_empty());
    }

    #[test]
    fn test_logout_clears_session_and_guard_follows() {
        let mut client = client_with(&[Role::Admin], serde_json::Value::Null);
        let admin_route = RouteRequest::new("/admin/dashboard").requiring(["admin"]);
        assert_eq!(client.guard(&admin_route), GuardDecision::Render);
        assert_eq!(client.landing_path(), "/admin/dashboard");

        client.logout().unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(client.guard(&admin_route).state(), GuardState::Unauthenticated);
        assert_eq!(client.landing_path(), "/login");
    }

    #[test]
    fn test_user_without_token_is_signed_out() {
        let client = client_with(&[Role::User], serde_json::Value::Null);
        let customer_route = RouteRequest::new("/customer/dashboard").requiring(["user"]);
        assert_eq!(client.guard(&customer_route), GuardDecision::Render);

        // a blank token is purged on read, leaving the user entry behind
        client.store.storage().write(TOKEN_KEY, "   ").unwrap();
        assert!(client.store.token().is_none());
        assert!(client.store.user().is_some());

        assert!(!client.is_authenticated());
        assert!(client.user().is_none());
        assert_eq!(client.guard(&customer_route).state(), GuardState::Unauthenticated);
        assert_eq!(client.landing_path(), "/login");
        assert!(!client.can_use_cart());
        assert_eq!(client.primary_role(), None);
        assert!(!client.has_role("user"));
    }

    #[test]
    fn test_role_queries_follow_configured_policy() {
        let mut client = PharmacyClient::with_transport(
            ClientConfig::default().with_primary_role_policy(PrimaryRolePolicy::HighestPrivilege),
            MemoryStorage::new(),
            RecordingHttp::replying(serde_json::Value::Null),
        );
        let session = session_with(&[Role::User, Role::Pharmacist]);
        client.store.save(&session.token, &session.user).unwrap();

        assert_eq!(client.primary_role(), Some(Role::Pharmacist));
        assert!(client.has_role("PHARMACIST"));
        assert!(client.has_any_role(&["admin", "user"]));
        assert!(!client.has_any_role::<&str>(&[]));
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_cache() {
        let reply = serde_json::json!({
            "id": 7, "firstName": "Ana María", "lastName": "Ruiz",
            "email": "ana@example.com", "roles": ["USER"]
        });
        let mut client = client_with(&[Role::User], reply);
        let request = UpdateProfileRequest::from(&client.user().unwrap());

        client.update_profile(&request).await.unwrap();
        assert_eq!(client.user().unwrap().first_name, "Ana María");
        assert_eq!(client.session().unwrap().token, "test-token");
    }
}
