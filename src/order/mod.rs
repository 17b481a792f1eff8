//! Orders Domain Module
//!
//! - Domain models (order, item and payment rows; DTOs)
//! - Cart-to-order conversion and order history queries
//! - REST API handlers

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::routes;
