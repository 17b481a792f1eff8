//! Cart operations for the signed-in user.
//!
//! The cart total is always recomputed from its lines after a change, so it
//! equals Σ(product_price × quantity) whatever path modified it.

use super::{
    helpers::{check_stock, format_item_summary, update_cart_with_new_items},
    models::{CartDto, CartLineInput, CartRow},
    repository,
};
use crate::{
    auth::Principal,
    catalog::{helpers::to_product_dto, repository as products},
    db,
    error::{ApiError, ApiResult},
    state::AppState,
};
use sqlx::SqliteConnection;

/// Adds `quantity` units of a product to the caller's cart, creating the
/// cart on first use.
pub async fn add_product_to_cart(
    state: &AppState,
    caller: &Principal,
    product_id: i64,
    quantity: i64,
) -> ApiResult<CartDto> {
    let mut tx = db::begin_write(&state.db).await?;
    let cart = repository::get_or_create(&mut tx, caller.user_id).await?;

    let product = products::find_product(&mut *tx, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", "productId", product_id))?;

    if repository::find_line(&mut *tx, cart.cart_id, product_id).await?.is_some() {
        return Err(ApiError::api(format!(
            "Product {} already exists in the cart",
            product.product_name
        )));
    }
    check_stock(&product.product_name, product.quantity, quantity)?;

    repository::insert_line(
        &mut *tx,
        cart.cart_id,
        product_id,
        quantity,
        product.discount,
        product.special_price,
    )
    .await?;
    repository::recalculate_total(&mut *tx, cart.cart_id).await?;
    tx.commit().await?;

    tracing::info!(
        event = "cart.product_added",
        cart_id = cart.cart_id,
        product_id,
        quantity,
    );
    load_cart(state, cart, caller).await
}

/// Replaces the caller's cart content with `items`; duplicate product ids
/// are merged by summing their quantities.
pub async fn replace_cart(state: &AppState, caller: &Principal, items: Vec<CartLineInput>) -> ApiResult<String> {
    let mut merged = Vec::new();
    update_cart_with_new_items(&mut merged, items)?;

    let mut tx = db::begin_write(&state.db).await?;
    let cart = repository::get_or_create(&mut tx, caller.user_id).await?;
    repository::clear(&mut tx, cart.cart_id).await?;

    for item in &merged {
        let product = products::find_product(&mut *tx, item.product_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", "productId", item.product_id))?;
        check_stock(&product.product_name, product.quantity, item.quantity)?;
        repository::insert_line(
            &mut *tx,
            cart.cart_id,
            item.product_id,
            item.quantity,
            product.discount,
            product.special_price,
        )
        .await?;
    }
    repository::recalculate_total(&mut *tx, cart.cart_id).await?;
    let lines = repository::lines(&mut *tx, cart.cart_id).await?;
    tx.commit().await?;

    tracing::info!(
        event = "cart.replaced",
        cart_id = cart.cart_id,
        items = %format_item_summary(&lines),
    );
    Ok("Cart created/updated with the new items".to_string())
}

pub async fn get_cart(state: &AppState, caller: &Principal) -> ApiResult<CartDto> {
    let cart = repository::find_by_user(&state.db, caller.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart", "email", &caller.email))?;
    load_cart(state, cart, caller).await
}

/// Removes a product from one of the caller's carts.
pub async fn remove_from_cart(
    state: &AppState,
    caller: &Principal,
    cart_id: i64,
    product_id: i64,
) -> ApiResult<String> {
    let mut tx = db::begin_write(&state.db).await?;
    repository::find_owned(&mut *tx, cart_id, caller.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart", "cartId", cart_id))?;
    let message = delete_product_from_cart(&mut tx, cart_id, product_id).await?;
    tx.commit().await?;
    Ok(message)
}

/// Deletes the line for `product_id` and lowers the cart total accordingly.
///
/// Runs on the caller's connection so product deletion can reuse it inside
/// its own transaction.
pub async fn delete_product_from_cart(
    conn: &mut SqliteConnection,
    cart_id: i64,
    product_id: i64,
) -> ApiResult<String> {
    let line = repository::find_line(&mut *conn, cart_id, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", "productId", product_id))?;

    repository::delete_line(&mut *conn, cart_id, product_id).await?;
    repository::recalculate_total(&mut *conn, cart_id).await?;

    tracing::info!(event = "cart.product_removed", cart_id, product_id);
    Ok(format!("Product {} removed from the cart !!!", line.product_name))
}

async fn load_cart(state: &AppState, cart: CartRow, caller: &Principal) -> ApiResult<CartDto> {
    let (cart_id, total_price) = match repository::find_by_user(&state.db, cart.user_id).await? {
        Some(fresh) => (fresh.cart_id, fresh.total_price),
        None => (cart.cart_id, cart.total_price),
    };

    let products = repository::cart_products(&state.db, cart_id)
        .await?
        .into_iter()
        .map(|row| {
            let cart_quantity = row.cart_quantity;
            let mut dto = to_product_dto(row.product, &state.config.image_base_url, Some(caller));
            dto.quantity = cart_quantity;
            dto
        })
        .collect();

    Ok(CartDto {
        cart_id,
        total_price,
        products,
    })
}
