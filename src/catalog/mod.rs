//! Product Catalog Domain Module
//!
//! Categories and products, including:
//! - Rows and DTOs (with seller details filtered by role)
//! - Composable product filters
//! - Pricing, validation and ownership helpers
//! - Image storage for uploads
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod images;
pub mod models;
pub mod query;
pub mod repository;
pub mod service;

pub use handlers::routes;
