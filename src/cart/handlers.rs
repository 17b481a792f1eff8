//! REST API handlers for shopping cart operations
//!
//! Every endpoint acts on the cart of the signed-in caller.

use super::{models::*, service};
use crate::{
    auth::AuthUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    state::SharedState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/carts/products/:product_id/quantity/:quantity", post(add_product))
        .route("/cart/create", post(create_or_update_cart))
        .route("/carts/users/cart", get(get_cart))
        .route("/carts/:cart_id/product/:product_id", delete(remove_product))
}

/// Endpoint: POST /api/carts/products/:product_id/quantity/:quantity
async fn add_product(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath((product_id, quantity)): ApiPath<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    let cart = service::add_product_to_cart(&state, &caller, product_id, quantity).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Endpoint: POST /api/cart/create
/// Replaces the cart content with the posted `[{productId, quantity}]` list.
async fn create_or_update_cart(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiJson(items): ApiJson<Vec<CartLineInput>>,
) -> ApiResult<impl IntoResponse> {
    let message = service::replace_cart(&state, &caller, items).await?;
    Ok((StatusCode::CREATED, message))
}

/// Endpoint: GET /api/carts/users/cart
async fn get_cart(State(state): State<SharedState>, AuthUser(caller): AuthUser) -> ApiResult<Json<CartDto>> {
    Ok(Json(service::get_cart(&state, &caller).await?))
}

/// Endpoint: DELETE /api/carts/:cart_id/product/:product_id
async fn remove_product(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath((cart_id, product_id)): ApiPath<(i64, i64)>,
) -> ApiResult<String> {
    service::remove_from_cart(&state, &caller, cart_id, product_id).await
}
