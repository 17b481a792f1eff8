//! Shopping Cart Business Logic Helpers
//!
//! This module contains helper functions for cart operations and formatting.

use super::models::{CartLineInput, CartLineRow};
use crate::error::{ApiError, ApiResult};

/// Merges `new_items` into `cart_items`, aggregating quantities for existing
/// entries and inserting brand new ones.
///
/// * If a line for the same product already exists, its `quantity` is
///   increased by the incoming quantity.
/// * Order of first appearance is preserved.
/// * Non-positive quantities and sums that overflow are rejected.
pub fn update_cart_with_new_items(
    cart_items: &mut Vec<CartLineInput>,
    new_items: Vec<CartLineInput>,
) -> ApiResult<()> {
    for incoming in new_items {
        if incoming.quantity <= 0 {
            return Err(ApiError::api("Quantity must be greater than zero"));
        }
        if let Some(existing) = cart_items
            .iter_mut()
            .find(|i| i.product_id == incoming.product_id)
        {
            existing.quantity = existing.quantity.checked_add(incoming.quantity).ok_or_else(|| {
                ApiError::api(format!("Quantity is too large for product {}", incoming.product_id))
            })?;
        } else {
            cart_items.push(incoming);
        }
    }
    Ok(())
}

/// Produces a human-readable one-line summary for a list of cart lines.
///
/// Example output: `"2x Apple, 1x Banana"`.
pub fn format_item_summary(items: &[CartLineRow]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.product_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks a requested quantity against the product's stock.
pub fn check_stock(product_name: &str, in_stock: i64, requested: i64) -> ApiResult<()> {
    if requested <= 0 {
        return Err(ApiError::api("Quantity must be greater than zero"));
    }
    if in_stock <= 0 {
        return Err(ApiError::api(format!("{} is not available", product_name)));
    }
    if requested > in_stock {
        return Err(ApiError::api(format!(
            "Please, make an order of the {} less than or equal to the quantity {}.",
            product_name, in_stock
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i64) -> CartLineInput {
        CartLineInput {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_aggregation() {
        let mut items = vec![line(1, 2)];
        update_cart_with_new_items(&mut items, vec![line(1, 3), line(2, 1)]).unwrap();

        assert_eq!(items, vec![line(1, 5), line(2, 1)]);
    }

    #[test]
    fn test_aggregation_overflow_is_rejected() {
        let mut items = Vec::new();
        let err = update_cart_with_new_items(&mut items, vec![line(7, i64::MAX), line(7, 1)]).unwrap_err();

        assert_eq!(err.to_string(), "Quantity is too large for product 7");
        assert_eq!(err.error_code(), "API_ERROR");
    }

    #[test]
    fn test_aggregation_rejects_non_positive_quantities() {
        let mut items = vec![line(1, 5)];
        let err = update_cart_with_new_items(&mut items, vec![line(1, -3)]).unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be greater than zero");

        assert!(update_cart_with_new_items(&mut items, vec![line(2, 0)]).is_err());
        assert_eq!(items, vec![line(1, 5)]);
    }

    #[test]
    fn test_summary() {
        let rows = vec![
            CartLineRow {
                cart_item_id: 1,
                cart_id: 1,
                product_id: 1,
                product_name: "Apple".into(),
                quantity: 2,
                discount: 0.0,
                product_price: 1.0,
            },
            CartLineRow {
                cart_item_id: 2,
                cart_id: 1,
                product_id: 2,
                product_name: "Banana".into(),
                quantity: 1,
                discount: 0.0,
                product_price: 0.5,
            },
        ];
        assert_eq!(format_item_summary(&rows), "2x Apple, 1x Banana");
        assert_eq!(format_item_summary(&[]), "");
    }

    #[test]
    fn test_check_stock() {
        assert!(check_stock("Pen", 10, 3).is_ok());
        assert_eq!(
            check_stock("Pen", 0, 1).unwrap_err().to_string(),
            "Pen is not available"
        );
        assert_eq!(
            check_stock("Pen", 2, 5).unwrap_err().to_string(),
            "Please, make an order of the Pen less than or equal to the quantity 2."
        );
        assert!(check_stock("Pen", 2, 0).is_err());
    }
}
