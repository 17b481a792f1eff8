//! Shipping addresses owned by users
//!
//! - Domain models and validation rules
//! - Persistence queries
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod repository;

pub use handlers::routes;
