//! Shopping cart
//!
//! Every operation passes the cart gate first, so staff identities are
//! turned away without a request being sent.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use shared::{AddItemToCartRequest, Cart, Medicine, UpdateCartItemRequest};

use super::Caller;
use crate::cart_gate::CartGate;
use crate::error::{ClientError, ClientResult, PolicyError};
use crate::http::{HttpClient, RequestContext};
use crate::stock;

/// Orders quantity updates per cart item
///
/// Every update takes a ticket before its request goes out. When the
/// response arrives, only the holder of the newest ticket for that item may
/// apply it; older responses are reported as superseded. An item's entry is
/// dropped once its newest ticket completes or the item leaves the cart.
#[derive(Debug, Default)]
pub struct ItemSequencer {
    counter: AtomicU64,
    latest: DashMap<i64, u64>,
}

impl ItemSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, item_id: i64) -> u64 {
        let ticket = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.latest
            .entry(item_id)
            .and_modify(|latest| *latest = (*latest).max(ticket))
            .or_insert(ticket);
        ticket
    }

    /// Retire a ticket; true when it was still the newest for its item.
    ///
    /// A missing entry means a newer ticket already completed or the item
    /// was removed, so the caller's response is stale.
    pub fn complete(&self, item_id: i64, ticket: u64) -> bool {
        self.latest
            .remove_if(&item_id, |_, latest| *latest == ticket)
            .is_some()
    }

    /// Drop an item's entry; in-flight updates for it become stale
    pub fn forget(&self, item_id: i64) {
        self.latest.remove(&item_id);
    }

    pub fn forget_all(&self) {
        self.latest.clear();
    }

    /// Items with an update in flight
    pub fn pending(&self) -> usize {
        self.latest.len()
    }
}

/// Result of adding a medicine
#[derive(Debug, Clone, PartialEq)]
pub struct CartAddition {
    pub cart: Cart,
    /// Units actually sent
    pub added: u32,
    /// True when the request was lowered to fit the stock
    pub clamped: bool,
}

/// Result of a quantity change
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityUpdate {
    Applied(Cart),
    /// A newer update for the same item was issued while this one was in flight
    Superseded,
}

pub struct CartService<'a, H: HttpClient> {
    http: &'a H,
    caller: Caller,
    sequencer: &'a ItemSequencer,
}

impl<'a, H: HttpClient> CartService<'a, H> {
    pub fn new(http: &'a H, caller: Caller, sequencer: &'a ItemSequencer) -> Self {
        Self {
            http,
            caller,
            sequencer,
        }
    }

    fn gate(&self, action: &str) -> ClientResult<&str> {
        CartGate::ensure(self.caller.user(), action)?;
        self.caller.require_token()
    }

    pub async fn get(&self, cart_id: i64) -> ClientResult<Cart> {
        let token = self.gate("view cart")?;
        self.http
            .get(
                &format!("carts/{cart_id}"),
                RequestContext::new(Some(token), "Failed to fetch cart"),
            )
            .await
    }

    pub async fn for_user(&self, user_id: i64) -> ClientResult<Cart> {
        let token = self.gate("view cart")?;
        self.http
            .get(
                &format!("carts/user/{user_id}"),
                RequestContext::new(Some(token), "Failed to fetch user cart"),
            )
            .await
    }

    pub async fn create_for_user(&self, user_id: i64) -> ClientResult<Cart> {
        let token = self.gate("create cart")?;
        let cart: Cart = self
            .http
            .post_empty(
                &format!("carts/user/{user_id}"),
                RequestContext::new(Some(token), "Failed to create cart"),
            )
            .await?;
        tracing::info!(user_id, cart_id = cart.id, "Cart created");
        Ok(cart)
    }

    /// Current user's cart, created on first use
    pub async fn get_or_create(&self) -> ClientResult<Cart> {
        self.gate("view cart")?;
        let user_id = self
            .caller
            .user()
            .map(|u| u.id)
            .ok_or(ClientError::NotAuthenticated)?;

        match self.for_user(user_id).await {
            Ok(cart) => Ok(cart),
            Err(ClientError::Api { status, .. }) => {
                tracing::debug!(user_id, status, "No cart yet, creating one");
                self.create_for_user(user_id).await
            }
            Err(e) => Err(e),
        }
    }

    /// Add a medicine, clamping the quantity to what stock allows
    pub async fn add_medicine(
        &self,
        cart: &Cart,
        medicine: &Medicine,
        quantity: u32,
    ) -> ClientResult<CartAddition> {
        let token = self.gate("add to cart")?;
        let check = stock::check_add(medicine, cart.quantity_of(medicine.id), quantity)
            .map_err(PolicyError::Stock)?;
        if check.clamped {
            tracing::debug!(
                medicine_id = medicine.id,
                requested = check.requested,
                sent = check.quantity,
                "Quantity clamped to stock"
            );
        }

        let request = AddItemToCartRequest {
            cart_id: cart.id,
            medicine_id: medicine.id,
            quantity: check.quantity,
        };
        let updated: Cart = self
            .http
            .post(
                "carts/items",
                RequestContext::new(Some(token), "Failed to add item to cart"),
                &request,
            )
            .await?;
        Ok(CartAddition {
            cart: updated,
            added: check.quantity,
            clamped: check.clamped,
        })
    }

    /// Set an item's quantity
    ///
    /// Returns [`QuantityUpdate::Superseded`] when a later update for the same
    /// item was issued before this response came back.
    pub async fn update_quantity(
        &self,
        cart: &Cart,
        item_id: i64,
        quantity: u32,
    ) -> ClientResult<QuantityUpdate> {
        let token = self.gate("update cart item")?;
        let item = cart
            .item(item_id)
            .ok_or_else(|| ClientError::NotFound("Item not found in cart".into()))?;
        stock::check_update(&item.medicine, quantity).map_err(PolicyError::Stock)?;

        let ticket = self.sequencer.issue(item_id);
        let result: ClientResult<Cart> = self
            .http
            .patch(
                &format!("carts/items/{item_id}"),
                RequestContext::new(Some(token), "Failed to update cart item"),
                &UpdateCartItemRequest { quantity },
            )
            .await;
        let current = self.sequencer.complete(item_id, ticket);
        let updated = result?;

        if !current {
            tracing::debug!(item_id, ticket, "Stale quantity response dropped");
            return Ok(QuantityUpdate::Superseded);
        }
        Ok(QuantityUpdate::Applied(updated))
    }

    pub async fn remove_item(&self, item_id: i64) -> ClientResult<Cart> {
        let token = self.gate("remove cart item")?;
        let cart = self
            .http
            .delete(
                &format!("carts/items/{item_id}"),
                RequestContext::new(Some(token), "Failed to remove item from cart"),
            )
            .await?;
        self.sequencer.forget(item_id);
        Ok(cart)
    }

    pub async fn clear(&self, cart_id: i64) -> ClientResult<Cart> {
        let token = self.gate("clear cart")?;
        let cart = self
            .http
            .delete(
                &format!("carts/{cart_id}/items"),
                RequestContext::new(Some(token), "Failed to clear cart"),
            )
            .await?;
        self.sequencer.forget_all();
        Ok(cart)
    }
}
