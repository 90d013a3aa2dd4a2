//! Pharmacy Client - role-aware client for the HealthHub pharmacy API
//!
//! Keeps the signed-in session on disk, resolves roles, guards navigation,
//! and gates cart and checkout actions before they reach the network.

pub mod auth;
pub mod cart_gate;
pub mod claims;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod roles;
pub mod services;
pub mod session;
pub mod stock;

pub use auth::{AuthService, Registration};
pub use cart_gate::{CartEligibility, CartGate};
pub use claims::TokenClaims;
pub use client::PharmacyClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, PolicyError};
pub use guard::{GuardDecision, GuardState, LandingRoutes, RouteGuard, RouteRequest};
pub use http::{HttpClient, NetworkHttpClient, RequestContext};
pub use roles::{PrimaryRolePolicy, RoleResolver};
pub use services::{CartAddition, QuantityUpdate};
pub use session::{FileStorage, MemoryStorage, Session, SessionStorage, SessionStore};
pub use stock::{QuantityCheck, StockError};

// Re-export shared types for convenience
pub use shared::client::{LoginRequest, RegisterRequest};
