//! REST API handlers for placing and listing orders

use super::{models::*, service};
use crate::{
    auth::AuthUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    pagination::{PageParams, PagedResponse},
    state::SharedState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

/// Creates routes for order operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/order/users/cod", post(place_cod_order))
        .route("/order/users/cod-full", post(place_cod_order))
        .route("/order/users/payments/:payment_method", post(place_order_with_method))
        .route("/user/orders", get(user_orders))
        .route("/user/orders/all", get(user_orders_list))
        .route("/user/orders/status/:status", get(user_orders_by_status))
        .route("/orders/user/:user_id", get(orders_by_user))
        .route("/orders/user/:user_id/all", get(orders_list_by_user))
        .route("/orders/user/:user_id/status/:status", get(orders_by_user_and_status))
}

/// Endpoint: POST /api/order/users/cod and /api/order/users/cod-full
async fn place_cod_order(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiJson(payload): ApiJson<OrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let order = service::place_order(&state, &caller, payload.address_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Endpoint: POST /api/order/users/payments/:payment_method
/// The requested method is recorded in the log only; payment is always COD.
async fn place_order_with_method(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(payment_method): ApiPath<String>,
    ApiJson(payload): ApiJson<OrderRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(
        event = "order.payment_method_redirected",
        requested = %payment_method,
        actual = PAYMENT_METHOD_COD,
    );
    let order = service::place_order(&state, &caller, payload.address_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Endpoint: GET /api/user/orders
async fn user_orders(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<OrderDto>>> {
    Ok(Json(service::user_orders(&state, &caller, &params).await?))
}

/// Endpoint: GET /api/user/orders/all
async fn user_orders_list(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<OrderDto>>> {
    Ok(Json(service::user_orders_list(&state, &caller).await?))
}

/// Endpoint: GET /api/user/orders/status/:status
async fn user_orders_by_status(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(status): ApiPath<String>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<OrderDto>>> {
    Ok(Json(
        service::user_orders_by_status(&state, &caller, &status, &params).await?,
    ))
}

/// Endpoint: GET /api/orders/user/:user_id
async fn orders_by_user(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<OrderDto>>> {
    Ok(Json(service::orders_by_user(&state, &caller, user_id, &params).await?))
}

/// Endpoint: GET /api/orders/user/:user_id/all
async fn orders_list_by_user(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<OrderDto>>> {
    Ok(Json(service::orders_list_by_user(&state, &caller, user_id).await?))
}

/// Endpoint: GET /api/orders/user/:user_id/status/:status
async fn orders_by_user_and_status(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath((user_id, status)): ApiPath<(i64, String)>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<OrderDto>>> {
    Ok(Json(
        service::orders_by_user_and_status(&state, &caller, user_id, &status, &params).await?,
    ))
}
