//! Accounts, roles and sessions
//!
//! - Domain models (Role, Principal, request/response bodies)
//! - Password hashing and token helpers
//! - Request extractors gating handlers by role
//! - REST API handlers

pub mod extract;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod repository;

pub use extract::{AdminUser, AuthUser, MaybeUser};
pub use handlers::routes;
pub use models::{Principal, Role};
