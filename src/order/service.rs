//! Order placement and order history.
//!
//! Placing an order converts the caller's cart in a single transaction:
//! payment, order, items, stock and cart clearing either all happen or
//! none do.

use super::{
    models::*,
    repository::{self, OrderOwner, OrderQuery},
};
use crate::{
    address::{models::AddressDto, repository as addresses},
    auth::Principal,
    cart::{self, helpers::format_item_summary},
    catalog::repository as products,
    db,
    error::{ApiError, ApiResult},
    pagination::{PageParams, PageRequest, PagedResponse, SortDirection, SortSpec},
    state::AppState,
};
use chrono::{Local, Utc};

pub const ORDER_SORT: SortSpec = SortSpec {
    fields: &[
        ("orderId", "o.order_id"),
        ("orderDate", "o.order_date"),
        ("totalAmount", "o.total_amount"),
        ("orderStatus", "o.order_status"),
        ("email", "o.email"),
    ],
    tiebreak: "o.order_id",
    default_field: "orderDate",
    default_direction: SortDirection::Desc,
    default_page_size: Some(10),
};

/// Turns the caller's cart into a cash-on-delivery order.
pub async fn place_order(state: &AppState, caller: &Principal, address_id: Option<i64>) -> ApiResult<OrderDto> {
    let address_id =
        address_id.ok_or_else(|| ApiError::api("Address ID is required for placing an order"))?;

    let mut tx = db::begin_write(&state.db).await?;

    let cart = cart::repository::find_by_user(&mut *tx, caller.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart", "email", &caller.email))?;

    addresses::find_owned(&mut *tx, address_id, caller.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Address", "addressId", address_id))?;

    let lines = cart::repository::lines(&mut *tx, cart.cart_id).await?;
    if lines.is_empty() {
        return Err(ApiError::api("Cart is empty"));
    }

    let payment = NewPayment::cash_on_delivery(Utc::now().timestamp_millis());
    let payment_id = repository::insert_payment(&mut *tx, &payment).await?;
    let order_id = repository::insert_order(
        &mut *tx,
        &caller.email,
        Local::now().date_naive(),
        cart.total_price,
        ORDER_STATUS_ACCEPTED,
        address_id,
        payment_id,
    )
    .await?;

    for line in &lines {
        repository::insert_item(&mut *tx, order_id, line).await?;
        if !products::decrement_stock(&mut *tx, line.product_id, line.quantity).await? {
            return Err(ApiError::api(format!(
                "Insufficient stock for product {}",
                line.product_name
            )));
        }
    }

    for line in &lines {
        cart::service::delete_product_from_cart(&mut tx, cart.cart_id, line.product_id).await?;
    }

    tx.commit().await?;

    tracing::info!(
        event = "order.placed",
        order_id,
        user_id = caller.user_id,
        total_amount = cart.total_price,
        items = %format_item_summary(&lines),
    );

    let order = repository::find_order(&state.db, order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", "orderId", order_id))?;
    to_order_dto(state, order, false).await
}

// =============================================================================
// Queries
// =============================================================================

async fn to_order_dto(state: &AppState, order: OrderRow, with_address: bool) -> ApiResult<OrderDto> {
    let items = repository::items_for(&state.db, order.order_id).await?;
    let payment = repository::find_payment(&state.db, order.payment_id).await?;
    let address = if with_address {
        addresses::find(&state.db, order.address_id)
            .await?
            .map(AddressDto::from)
    } else {
        None
    };

    Ok(OrderDto {
        order_id: order.order_id,
        email: order.email,
        order_items: items.into_iter().map(Into::into).collect(),
        order_date: order.order_date,
        payment: payment.map(Into::into),
        total_amount: order.total_amount,
        order_status: order.order_status,
        address_id: order.address_id,
        address,
    })
}

async fn to_order_dtos(state: &AppState, rows: Vec<OrderRow>, with_address: bool) -> ApiResult<Vec<OrderDto>> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(to_order_dto(state, row, with_address).await?);
    }
    Ok(orders)
}

async fn page_of(
    state: &AppState,
    query: &OrderQuery,
    params: &PageParams,
    with_address: bool,
) -> ApiResult<PagedResponse<OrderDto>> {
    let page = PageRequest::resolve(params, &ORDER_SORT, state.config.default_page_size)?;
    let (rows, total) = repository::fetch_page(&state.db, query, &page).await?;
    let content = to_order_dtos(state, rows, with_address).await?;
    Ok(PagedResponse::new(content, &page, total))
}

fn ensure_can_view(caller: &Principal, user_id: i64) -> ApiResult<()> {
    if caller.is_admin() || caller.user_id == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You are not authorised to view orders of this user".to_string(),
        ))
    }
}

fn own_orders(caller: &Principal) -> OrderQuery {
    OrderQuery::owned_by(OrderOwner::Email(caller.email.clone()))
}

pub async fn user_orders(state: &AppState, caller: &Principal, params: &PageParams) -> ApiResult<PagedResponse<OrderDto>> {
    page_of(state, &own_orders(caller), params, true).await
}

pub async fn user_orders_list(state: &AppState, caller: &Principal) -> ApiResult<Vec<OrderDto>> {
    let rows = repository::fetch_all(&state.db, &own_orders(caller)).await?;
    to_order_dtos(state, rows, true).await
}

pub async fn user_orders_by_status(
    state: &AppState,
    caller: &Principal,
    status: &str,
    params: &PageParams,
) -> ApiResult<PagedResponse<OrderDto>> {
    page_of(state, &own_orders(caller).with_status(status), params, true).await
}

pub async fn orders_by_user(
    state: &AppState,
    caller: &Principal,
    user_id: i64,
    params: &PageParams,
) -> ApiResult<PagedResponse<OrderDto>> {
    ensure_can_view(caller, user_id)?;
    page_of(state, &OrderQuery::owned_by(OrderOwner::UserId(user_id)), params, false).await
}

pub async fn orders_list_by_user(state: &AppState, caller: &Principal, user_id: i64) -> ApiResult<Vec<OrderDto>> {
    ensure_can_view(caller, user_id)?;
    let rows = repository::fetch_all(&state.db, &OrderQuery::owned_by(OrderOwner::UserId(user_id))).await?;
    to_order_dtos(state, rows, false).await
}

pub async fn orders_by_user_and_status(
    state: &AppState,
    caller: &Principal,
    user_id: i64,
    status: &str,
    params: &PageParams,
) -> ApiResult<PagedResponse<OrderDto>> {
    ensure_can_view(caller, user_id)?;
    let query = OrderQuery::owned_by(OrderOwner::UserId(user_id)).with_status(status);
    page_of(state, &query, params, false).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn principal(user_id: i64, roles: Vec<Role>) -> Principal {
        Principal {
            user_id,
            username: format!("user{}", user_id),
            email: format!("user{}@shop.io", user_id),
            roles,
        }
    }

    #[test]
    fn test_view_rules() {
        assert!(ensure_can_view(&principal(1, vec![Role::User]), 1).is_ok());
        assert!(ensure_can_view(&principal(2, vec![Role::User, Role::Admin]), 1).is_ok());

        let err = ensure_can_view(&principal(2, vec![Role::User]), 1).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_order_sort_defaults() {
        let req = PageRequest::resolve(&PageParams::default(), &ORDER_SORT, 50).unwrap();
        assert_eq!(req.page_size, 10);
        assert_eq!(req.order_clause(), "o.order_date DESC, o.order_id DESC");
    }
}
