//! Shared types for the HealthHub pharmacy client
//!
//! Wire DTOs exchanged with the pharmacy REST API, the role model and the
//! backend error payload. Used by `pharmacy-client` and `pharmacy-cli`.

pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use error::ApiErrorBody;
pub use models::{
    AddItemToCartRequest, Cart, CartItem, ChangePasswordRequest, CreateOrderRequest, Medicine,
    MedicineRequest, Order, OrderItem, OrderStatus, Role, StockStatus, UpdateCartItemRequest,
    UpdateOrderStatusRequest, UpdateProfileRequest, UpdateUserStatusRequest, UserRecord,
};
pub use serde::{Deserialize, Serialize};
