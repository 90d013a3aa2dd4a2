//! Client configuration

use std::path::PathBuf;

use crate::guard::LandingRoutes;
use crate::roles::PrimaryRolePolicy;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Client configuration for connecting to the pharmacy API
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | PHARMACY_API_URL | http://localhost:8080/api | API base URL |
/// | PHARMACY_TIMEOUT_SECS | 30 | Request timeout |
/// | PHARMACY_STORAGE_DIR | ./.pharmacy | Session storage directory |
/// | PHARMACY_PRIMARY_ROLE | first | `first` or `highest` |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:8080/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory holding the persisted token and user record
    pub storage_dir: PathBuf,

    /// How the primary role is picked from a user's roles
    pub primary_role_policy: PrimaryRolePolicy,

    /// Where the route guard sends people
    pub landing: LandingRoutes,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            storage_dir: PathBuf::from("./.pharmacy"),
            primary_role_policy: PrimaryRolePolicy::default(),
            landing: LandingRoutes::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparseable variables fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("PHARMACY_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
        );
        if let Some(timeout) = std::env::var("PHARMACY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = timeout;
        }
        if let Ok(dir) = std::env::var("PHARMACY_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(policy) = std::env::var("PHARMACY_PRIMARY_ROLE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.primary_role_policy = policy;
        }
        config
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the session storage directory
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Set the primary role policy
    pub fn with_primary_role_policy(mut self, policy: PrimaryRolePolicy) -> Self {
        self.primary_role_policy = policy;
        self
    }

    /// Set the landing routes
    pub fn with_landing(mut self, landing: LandingRoutes) -> Self {
        self.landing = landing;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
