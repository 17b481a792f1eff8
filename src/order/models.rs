//! Order Domain Models
//!
//! Persistence rows for orders, their items and payments, the request body
//! accepted when placing an order, and the response DTOs.

use crate::address::models::AddressDto;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PAYMENT_METHOD_COD: &str = "CASH_ON_DELIVERY";
pub const PAYMENT_STATUS_PENDING: &str = "PENDING";
pub const COD_RESPONSE_MESSAGE: &str = "Cash on Delivery - Payment will be collected upon delivery";
pub const ORDER_STATUS_ACCEPTED: &str = "Order Accepted !";

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct OrderRow {
    pub order_id: i64,
    pub email: String,
    pub order_date: NaiveDate,
    pub total_amount: f64,
    pub order_status: String,
    pub address_id: i64,
    pub payment_id: i64,
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct OrderItemRow {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub discount: f64,
    pub ordered_product_price: f64,
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct PaymentRow {
    pub payment_id: i64,
    pub payment_method: String,
    pub pg_payment_id: Option<String>,
    pub pg_status: Option<String>,
    pub pg_response_message: Option<String>,
    pub pg_name: Option<String>,
}

/// Payment details written when an order is placed
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub payment_method: String,
    pub pg_payment_id: String,
    pub pg_status: String,
    pub pg_response_message: String,
    pub pg_name: String,
}

impl NewPayment {
    /// A pending cash-on-delivery payment with a `COD_<millis>` reference
    pub fn cash_on_delivery(now_millis: i64) -> Self {
        Self {
            payment_method: PAYMENT_METHOD_COD.to_string(),
            pg_payment_id: format!("COD_{}", now_millis),
            pg_status: PAYMENT_STATUS_PENDING.to_string(),
            pg_response_message: COD_RESPONSE_MESSAGE.to_string(),
            pg_name: PAYMENT_METHOD_COD.to_string(),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Body of the order placement endpoints.
///
/// Only the address is read. Gateway fields sent by older clients
/// (`paymentMethod`, `pgName`, ...) are ignored since every order is settled
/// as cash on delivery.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRequest {
    pub address_id: Option<i64>,
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub order_item_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub discount: f64,
    pub ordered_product_price: f64,
}

impl From<OrderItemRow> for OrderItemDto {
    fn from(row: OrderItemRow) -> Self {
        Self {
            order_item_id: row.order_item_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            discount: row.discount,
            ordered_product_price: row.ordered_product_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub payment_id: i64,
    pub payment_method: String,
    pub pg_payment_id: Option<String>,
    pub pg_status: Option<String>,
    pub pg_response_message: Option<String>,
    pub pg_name: Option<String>,
}

impl From<PaymentRow> for PaymentDto {
    fn from(row: PaymentRow) -> Self {
        Self {
            payment_id: row.payment_id,
            payment_method: row.payment_method,
            pg_payment_id: row.pg_payment_id,
            pg_status: row.pg_status,
            pg_response_message: row.pg_response_message,
            pg_name: row.pg_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub order_id: i64,
    pub email: String,
    pub order_items: Vec<OrderItemDto>,
    pub order_date: NaiveDate,
    pub payment: Option<PaymentDto>,
    pub total_amount: f64,
    pub order_status: String,
    pub address_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_on_delivery_payment() {
        let payment = NewPayment::cash_on_delivery(1_700_000_000_123);
        assert_eq!(payment.payment_method, "CASH_ON_DELIVERY");
        assert_eq!(payment.pg_name, "CASH_ON_DELIVERY");
        assert_eq!(payment.pg_payment_id, "COD_1700000000123");
        assert_eq!(payment.pg_status, "PENDING");
    }

    #[test]
    fn test_order_request_accepts_partial_bodies() {
        let req: OrderRequest = serde_json::from_str(r#"{"addressId": 4}"#).unwrap();
        assert_eq!(req.address_id, Some(4));

        let req: OrderRequest = serde_json::from_str(
            r#"{"addressId": 9, "paymentMethod": "card", "pgName": "stripe", "pgStatus": "ok"}"#,
        )
        .unwrap();
        assert_eq!(req.address_id, Some(9));

        let req: OrderRequest = serde_json::from_str(r#"{"pgName": "stripe"}"#).unwrap();
        assert_eq!(req.address_id, None);
    }
}
