//! Client error types

use shared::ApiErrorBody;
use shared::Role;
use thiserror::Error;

use crate::stock::StockError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, TLS, body read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the backend's when it sent one
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: ApiErrorBody,
    },

    /// Login or registration did not yield a usable identity
    #[error("{0}")]
    Auth(String),

    /// Rejected locally before any request was made
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Bearer token could not be decoded into an identity
    #[error("Invalid token: {0}")]
    Token(String),

    /// No session for an operation that needs one
    #[error("Authentication required")]
    NotAuthenticated,

    /// Resource not present in local state
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session persistence failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Short message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http(_) => "Unable to reach the pharmacy service. Please try again.".into(),
            ClientError::Storage(_) | ClientError::Serialization(_) => {
                "Something went wrong on this device. Please try again.".into()
            }
            other => other.to_string(),
        }
    }

    /// HTTP status of a backend rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for rejections made locally, which never reached the network
    pub fn is_policy(&self) -> bool {
        matches!(self, ClientError::Policy(_))
    }
}

/// Client-side policy rejections
///
/// These are the only errors that carry corrective guidance for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Please log in to continue.")]
    NotAuthenticated,

    #[error("Only users can use cart functionality. {guidance}")]
    CartNotAllowed { role: Role, guidance: &'static str },

    #[error("Only users can use cart functionality.")]
    MissingUserRole,

    #[error("Only pharmacists and admins can perform this action.")]
    StaffOnly,

    #[error("Only admins can perform this action.")]
    AdminOnly,

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error("Please fill in all required fields")]
    MissingFields,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("New password and confirmation do not match")]
    PasswordMismatch,
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
