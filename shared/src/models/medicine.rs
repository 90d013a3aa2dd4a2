//! Medicine Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock level at or below which a medicine is shown as low stock
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Medicine entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock_quantity: u32,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default)]
    pub image: String,
}

/// Stock badge shown next to a medicine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl Medicine {
    pub fn stock_status(&self) -> StockStatus {
        match self.stock_quantity {
            0 => StockStatus::OutOfStock,
            n if n <= LOW_STOCK_THRESHOLD => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == 0
    }
}

/// Create / update medicine payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRequest {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock_quantity: u32,
    pub expiration_date: String,
    pub image: String,
}
