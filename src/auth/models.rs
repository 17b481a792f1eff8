//! Account and session models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_SELLER")]
    Seller,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Seller => "ROLE_SELLER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ROLE_USER" => Some(Role::User),
            "ROLE_SELLER" => Some(Role::Seller),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The authenticated caller, as stored in the session table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Optional requested role; only `user` and `seller` are accepted
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    /// Session token to send back as `Authorization: Bearer <token>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_token: Option<String>,
}

impl UserInfoResponse {
    pub fn from_principal(principal: &Principal, token: Option<String>) -> Self {
        Self {
            id: principal.user_id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            roles: principal.roles.clone(),
            jwt_token: token,
        }
    }
}
