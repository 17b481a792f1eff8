//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the shopping cart
//! business domain.

use crate::catalog::models::{ProductDto, ProductRow};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct CartRow {
    pub cart_id: i64,
    pub user_id: i64,
    pub total_price: f64,
}

/// A cart line with the name of the product it refers to
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct CartLineRow {
    pub cart_item_id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub discount: f64,
    pub product_price: f64,
}

/// A full product row plus the quantity held in one cart
#[derive(Debug, Clone, FromRow)]
pub struct CartProductRow {
    #[sqlx(flatten)]
    pub product: ProductRow,
    pub cart_quantity: i64,
}

// =============================================================================
// Requests & responses
// =============================================================================

/// Returns the default quantity (1) for cart lines
fn default_quantity() -> i64 {
    1
}

/// One entry of the `POST /api/cart/create` body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: i64,

    /// Quantity of this product (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// A cart as returned to its owner. Each product carries the cart quantity
/// in its `quantity` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    pub cart_id: i64,
    pub total_price: f64,
    pub products: Vec<ProductDto>,
}
