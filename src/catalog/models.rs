//! Catalog Domain Models
//!
//! Rows as read from the store and the DTOs exposed at the API boundary.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct CategoryRow {
    pub category_id: i64,
    pub category_name: String,
}

/// A product joined with its category and (optional) seller
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ProductRow {
    pub product_id: i64,
    pub product_name: String,
    pub image: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub discount: f64,
    pub special_price: f64,
    pub category_id: i64,
    pub category_name: String,
    pub seller_id: Option<i64>,
    pub seller_username: Option<String>,
    pub seller_email: Option<String>,
}

/// Column list and joins producing a [`ProductRow`]
pub const PRODUCT_SELECT: &str = "SELECT p.product_id, p.product_name, p.image, p.description, \
     p.quantity, p.price, p.discount, p.special_price, p.category_id, c.category_name, \
     p.seller_id, u.username AS seller_username, u.email AS seller_email \
     FROM products p \
     JOIN categories c ON c.category_id = p.category_id \
     LEFT JOIN users u ON u.user_id = p.seller_id";

pub const PRODUCT_COUNT: &str = "SELECT COUNT(*) FROM products p \
     JOIN categories c ON c.category_id = p.category_id \
     LEFT JOIN users u ON u.user_id = p.seller_id";

/// Values written when creating a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub product_name: String,
    pub image: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub discount: f64,
    pub special_price: f64,
    pub category_id: i64,
    pub seller_id: i64,
}

// =============================================================================
// Requests
// =============================================================================

/// Body for creating or updating a product.
///
/// Missing fields fall back to their defaults so validation can report them
/// per field instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRequest {
    pub product_name: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub discount: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryRequest {
    pub category_name: String,
}

/// Query parameters accepted by `GET /api/public/products` besides paging
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilterParams {
    pub keyword: Option<String>,
    pub category: Option<String>,
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub category_id: i64,
    pub category_name: String,
}

impl From<CategoryRow> for CategoryDto {
    fn from(row: CategoryRow) -> Self {
        Self {
            category_id: row.category_id,
            category_name: row.category_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellerDto {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub product_id: i64,
    pub product_name: String,
    pub image: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub discount: f64,
    pub special_price: f64,
    pub category_id: i64,
    pub category_name: String,

    /// Only present for admins and for the product's own seller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<SellerDto>,
}
