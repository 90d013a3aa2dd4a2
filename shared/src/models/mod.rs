//! Data models
//!
//! Mirrors the pharmacy backend's JSON DTOs (camelCase on the wire).
//! All IDs are `i64`; money is `Decimal`.

pub mod cart;
pub mod medicine;
pub mod order;
pub mod role;
pub mod user;

// Re-exports
pub use cart::*;
pub use medicine::*;
pub use order::*;
pub use role::*;
pub use user::*;
