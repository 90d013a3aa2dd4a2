//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Medicine;

/// Shopping cart owned by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub item_list: Vec<CartItem>,
}

/// Cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub medicine: Medicine,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.medicine.price * Decimal::from(self.quantity)
    }
}

impl Cart {
    /// Quantity of a medicine already in the cart (0 if absent)
    pub fn quantity_of(&self, medicine_id: i64) -> u32 {
        self.item_list
            .iter()
            .filter(|item| item.medicine.id == medicine_id)
            .map(|item| item.quantity)
            .sum()
    }

    pub fn item(&self, item_id: i64) -> Option<&CartItem> {
        self.item_list.iter().find(|item| item.id == item_id)
    }

    pub fn total_items(&self) -> u32 {
        self.item_list.iter().map(|item| item.quantity).sum()
    }

    pub fn total_price(&self) -> Decimal {
        self.item_list.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_list.is_empty()
    }
}

/// Add item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemToCartRequest {
    pub cart_id: i64,
    pub medicine_id: i64,
    pub quantity: u32,
}

/// Update item quantity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}
