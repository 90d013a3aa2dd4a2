//! Orders

use shared::{Cart, CreateOrderRequest, Order, OrderStatus, UpdateOrderStatusRequest};

use super::Caller;
use crate::cart_gate::CartGate;
use crate::error::{ClientResult, PolicyError};
use crate::http::{HttpClient, RequestContext};

pub struct OrderService<'a, H: HttpClient> {
    http: &'a H,
    caller: Caller,
}

impl<'a, H: HttpClient> OrderService<'a, H> {
    pub fn new(http: &'a H, caller: Caller) -> Self {
        Self { http, caller }
    }

    /// Place an order for the cart's contents, then empty the cart
    ///
    /// The order stands even if emptying the cart fails afterwards.
    pub async fn checkout(
        &self,
        cart: &Cart,
        delivery_address: &str,
        phone_number: &str,
    ) -> ClientResult<Order> {
        CartGate::ensure(self.caller.user(), "checkout")?;
        let token = self.caller.require_token()?;
        if delivery_address.trim().is_empty() || phone_number.trim().is_empty() {
            return Err(PolicyError::MissingFields.into());
        }
        if cart.is_empty() {
            return Err(PolicyError::EmptyCart.into());
        }

        let request = CreateOrderRequest {
            cart_id: cart.id,
            delivery_address: delivery_address.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
        };
        let order: Order = self
            .http
            .post(
                "orders",
                RequestContext::new(Some(token), "Failed to create order"),
                &request,
            )
            .await?;
        tracing::info!(order_id = order.id, cart_id = cart.id, total = %order.total_amount, "Order placed");

        let cleared: ClientResult<Option<serde_json::Value>> = self
            .http
            .delete(
                &format!("carts/{}/items", cart.id),
                RequestContext::new(Some(token), "Failed to clear cart"),
            )
            .await;
        if let Err(e) = cleared {
            tracing::warn!(order_id = order.id, cart_id = cart.id, error = %e, "Order placed but cart was not cleared");
        }
        Ok(order)
    }

    /// Orders of the signed-in user
    pub async fn mine(&self) -> ClientResult<Vec<Order>> {
        let token = self.caller.require_token()?;
        let orders: Option<Vec<Order>> = self
            .http
            .get("orders/user", RequestContext::new(Some(token), "Failed to fetch orders"))
            .await?;
        Ok(orders.unwrap_or_default())
    }

    pub async fn get(&self, order_id: i64) -> ClientResult<Order> {
        let token = self.caller.require_token()?;
        self.http
            .get(
                &format!("orders/{order_id}"),
                RequestContext::new(Some(token), "Failed to fetch order"),
            )
            .await
    }

    pub async fn cancel(&self, order_id: i64) -> ClientResult<Order> {
        let token = self.caller.require_token()?;
        let order: Order = self
            .http
            .put_empty(
                &format!("orders/{order_id}/cancel"),
                RequestContext::new(Some(token), "Failed to cancel order"),
            )
            .await?;
        tracing::info!(order_id, "Order cancelled");
        Ok(order)
    }

    /// Every order in the system (staff)
    pub async fn all(&self) -> ClientResult<Vec<Order>> {
        let token = self.caller.require_staff("list all orders")?;
        let orders: Option<Vec<Order>> = self
            .http
            .get("orders", RequestContext::new(Some(token), "Failed to fetch orders"))
            .await?;
        Ok(orders.unwrap_or_default())
    }

    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> ClientResult<Order> {
        let token = self.caller.require_staff("update order status")?;
        let order: Order = self
            .http
            .put(
                &format!("orders/{order_id}/status"),
                RequestContext::new(Some(token), "Failed to update order status"),
                &UpdateOrderStatusRequest { status },
            )
            .await?;
        tracing::info!(order_id, %status, "Order status updated");
        Ok(order)
    }
}
