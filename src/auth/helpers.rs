//! Password hashing, session tokens and sign-up validation.

use super::models::{Role, SignupRequest};
use crate::error::{ApiResult, FieldErrors};
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "ecom_session";

/// Hashes a new password with bcrypt.
///
/// The returned string embeds the cost and a random salt, so it is all that
/// needs storing.
pub fn hash_password(password: &str, cost: u32) -> ApiResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Checks `password` against a stored bcrypt hash.
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(password, stored_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(event = "auth.stored_hash_invalid", error = %e);
            false
        }
    }
}

pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Pulls the session token from `Authorization: Bearer` or the session cookie.
pub fn token_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, token)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}

/// Role granted at sign-up; admins are never self-registered.
pub fn requested_roles(requested: Option<&str>) -> Result<Vec<Role>, String> {
    match requested.map(str::to_ascii_lowercase).as_deref() {
        None | Some("user") => Ok(vec![Role::User]),
        Some("seller") => Ok(vec![Role::User, Role::Seller]),
        Some(other) => Err(format!("Role '{}' cannot be requested", other)),
    }
}

pub fn validate_signup(req: &SignupRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if req.username.trim().chars().count() < 3 {
        errors.insert(
            "username".into(),
            "Username must contain at least 3 characters".into(),
        );
    }
    if !looks_like_email(&req.email) {
        errors.insert("email".into(), "Email must be a valid address".into());
    }
    if req.password.chars().count() < 6 {
        errors.insert(
            "password".into(),
            "Password must contain at least 6 characters".into(),
        );
    }
    errors
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    const TEST_COST: u32 = 4;

    #[test]
    fn test_password_round_trip_and_salting() {
        let hash = hash_password("hunter22", TEST_COST).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(!hash.contains("hunter22"));
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));

        let other = hash_password("hunter22", TEST_COST).unwrap();
        assert_ne!(hash, other);
        assert!(verify_password("hunter22", &other));
    }

    #[test]
    fn test_legacy_or_corrupt_hash_never_verifies() {
        let sha256_hex = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        assert!(!verify_password("test", sha256_hex));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_invalid_cost_is_a_server_error() {
        let err = hash_password("hunter22", 99).unwrap_err();
        assert_eq!(err.error_code(), "PASSWORD_HASH_ERROR");
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; ecom_session=tok42"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("tok42"));

        let empty = HeaderMap::new();
        assert_eq!(token_from_headers(&empty), None);
    }

    #[test]
    fn test_requested_roles() {
        assert_eq!(requested_roles(None).unwrap(), vec![Role::User]);
        assert_eq!(
            requested_roles(Some("Seller")).unwrap(),
            vec![Role::User, Role::Seller]
        );
        assert!(requested_roles(Some("admin")).is_err());
    }

    #[test]
    fn test_validate_signup() {
        let req = SignupRequest {
            username: "al".into(),
            email: "not-an-email".into(),
            password: "123".into(),
            role: None,
        };
        let errors = validate_signup(&req);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("email"));

        let ok = SignupRequest {
            username: "alice".into(),
            email: "alice@shop.test".into(),
            password: "secret1".into(),
            role: None,
        };
        assert!(validate_signup(&ok).is_empty());
    }
}
