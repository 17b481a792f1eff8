//! Request extractors resolving the caller from the session table.

use super::{helpers::token_from_headers, models::Principal};
use crate::{error::ApiError, state::SharedState};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Any signed-in caller; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

/// A signed-in caller holding `ROLE_ADMIN`; 401 when anonymous, 403 otherwise
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

/// The caller if signed in; never rejects
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Principal>);

fn resolve(parts: &Parts, state: &SharedState) -> Option<Principal> {
    let token = token_from_headers(&parts.headers)?;
    let principal = state.principal_for(&token);
    if principal.is_none() {
        tracing::debug!(event = "auth.unknown_token");
    }
    principal
}

#[async_trait]
impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).map(AuthUser).ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let principal = resolve(parts, state).ok_or(ApiError::Unauthorized)?;
        if !principal.is_admin() {
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }
        Ok(AdminUser(principal))
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve(parts, state)))
    }
}
