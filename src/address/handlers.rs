//! REST API handlers for the caller's shipping addresses
//!
//! Addresses are only ever visible to their owner; someone else's id is
//! reported as not found.

use super::{helpers::validate_address, models::*, repository};
use crate::{
    auth::{AuthUser, Principal},
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    state::{AppState, SharedState},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/addresses", post(create_address))
        .route("/users/addresses", get(list_addresses))
        .route(
            "/addresses/:address_id",
            put(update_address).delete(delete_address),
        )
}

/// Endpoint: POST /api/addresses
async fn create_address(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiJson(payload): ApiJson<AddressRequest>,
) -> ApiResult<impl IntoResponse> {
    let errors = validate_address(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let address_id = repository::insert(&state.db, caller.user_id, &payload).await?;
    tracing::info!(event = "address.created", address_id, user_id = caller.user_id);

    let created = owned_or_404(&state, &caller, address_id).await?;
    Ok((StatusCode::CREATED, Json(AddressDto::from(created))))
}

/// Endpoint: GET /api/users/addresses
async fn list_addresses(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<AddressDto>>> {
    let rows = repository::list_for_user(&state.db, caller.user_id).await?;
    Ok(Json(rows.into_iter().map(AddressDto::from).collect()))
}

/// Endpoint: PUT /api/addresses/:address_id
async fn update_address(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(address_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<AddressRequest>,
) -> ApiResult<Json<AddressDto>> {
    let errors = validate_address(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    owned_or_404(&state, &caller, address_id).await?;
    repository::update(&state.db, address_id, &payload).await?;
    tracing::info!(event = "address.updated", address_id, user_id = caller.user_id);

    let updated = owned_or_404(&state, &caller, address_id).await?;
    Ok(Json(AddressDto::from(updated)))
}

/// Endpoint: DELETE /api/addresses/:address_id
async fn delete_address(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(address_id): ApiPath<i64>,
) -> ApiResult<String> {
    owned_or_404(&state, &caller, address_id).await?;
    if repository::is_referenced_by_orders(&state.db, address_id).await? {
        return Err(ApiError::api("Address is used by existing orders"));
    }

    repository::delete(&state.db, address_id).await?;
    tracing::info!(event = "address.deleted", address_id, user_id = caller.user_id);
    Ok(format!("Address deleted successfully with addressId: {}", address_id))
}

async fn owned_or_404(state: &AppState, caller: &Principal, address_id: i64) -> ApiResult<AddressRow> {
    repository::find_owned(&state.db, address_id, caller.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Address", "addressId", address_id))
}
