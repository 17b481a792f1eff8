//! REST API handlers for sign-up, sign-in and session management

use super::{extract::AuthUser, helpers::*, models::*, repository};
use crate::{
    db,
    error::{ApiError, ApiResponse, ApiResult},
    extract::ApiJson,
    state::SharedState,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

/// Creates routes for account operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
        .route("/auth/user", get(current_user))
        .route("/user/test", get(auth_test))
}

/// Endpoint: POST /api/auth/signup
async fn signup(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let errors = validate_signup(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let roles = requested_roles(payload.role.as_deref()).map_err(ApiError::Api)?;

    let username = payload.username.trim();
    if repository::find_by_username(&state.db, username).await?.is_some() {
        return Err(ApiError::api("Error: Username is already taken!"));
    }
    if repository::email_taken(&state.db, &payload.email).await? {
        return Err(ApiError::api("Error: Email is already in use!"));
    }

    let hash = hash_password(&payload.password, state.config.password_hash_cost)?;
    let mut tx = db::begin_write(&state.db).await?;
    let user_id = repository::insert_user(&mut *tx, username, &payload.email, &hash).await?;
    for role in &roles {
        repository::insert_role(&mut *tx, user_id, *role).await?;
    }
    tx.commit().await?;

    tracing::info!(event = "auth.signup_completed", user_id, username = %username);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("User registered successfully!")),
    ))
}

/// Endpoint: POST /api/auth/signin
/// Issues a session token, returned in the body and as an HttpOnly cookie.
async fn signin(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<SigninRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = repository::find_by_username(&state.db, &payload.username)
        .await?
        .ok_or(ApiError::BadCredentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        tracing::warn!(event = "auth.signin_rejected", username = %payload.username);
        return Err(ApiError::BadCredentials);
    }

    let principal = Principal {
        user_id: user.user_id,
        username: user.username,
        email: user.email,
        roles: repository::roles_of(&state.db, user.user_id).await?,
    };

    let token = new_session_token();
    state.start_session(token.clone(), principal.clone());
    tracing::info!(event = "auth.signin_completed", user_id = principal.user_id);

    let mut response = Json(UserInfoResponse::from_principal(&principal, Some(token.clone()))).into_response();
    if let Ok(cookie) = HeaderValue::from_str(&session_cookie(&token)) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// Endpoint: POST /api/auth/signout
async fn signout(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = token_from_headers(&headers) {
        if let Some(principal) = state.end_session(&token) {
            tracing::info!(event = "auth.signout_completed", user_id = principal.user_id);
        }
    }

    let mut response = Json(ApiResponse::ok("You've been signed out!")).into_response();
    if let Ok(cookie) = HeaderValue::from_str(&expired_session_cookie()) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// Endpoint: GET /api/auth/user
async fn current_user(AuthUser(principal): AuthUser) -> Json<UserInfoResponse> {
    Json(UserInfoResponse::from_principal(&principal, None))
}

/// Endpoint: GET /api/user/test
async fn auth_test(AuthUser(principal): AuthUser) -> String {
    format!("Authenticated as: {}", principal.username)
}
