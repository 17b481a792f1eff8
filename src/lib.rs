//! E-commerce Backend Library
//!
//! REST API for a product catalog, shopping carts, shipping addresses and
//! cash-on-delivery orders, backed by SQLite.

// Domain modules
pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;

// Shared building blocks
pub mod error;
pub mod extract;
pub mod pagination;

// Infrastructure
pub mod config;
pub mod db;
pub mod logging;
pub mod router;
pub mod state;
