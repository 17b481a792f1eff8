//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (cart rows, line inputs, responses)
//! - Business logic helpers (line aggregation, stock checks, formatting)
//! - Persistence queries
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types for convenience
pub use handlers::routes;
