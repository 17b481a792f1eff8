//! Routing module for the e-commerce API

use crate::state::SharedState;
use axum::{body::Body, extract::Request, middleware::Next, Router};
use std::time::Instant;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: Log requests
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let started = Instant::now();

        let res = next.run(req).await;

        let status = res.status();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status.is_server_error() {
            tracing::error!(event = "http.request", %method, %uri, status = status.as_u16(), elapsed_ms);
        } else if !status.is_success() {
            tracing::warn!(event = "http.request", %method, %uri, status = status.as_u16(), elapsed_ms);
        } else {
            tracing::info!(event = "http.request", %method, %uri, status = status.as_u16(), elapsed_ms);
        }
        res
    });

    // Middleware: CORS (Permissive for local dev)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let images = ServeDir::new(&state.config.upload_dir);

    // Routes
    let api = Router::new()
        .merge(crate::auth::routes())
        .merge(crate::catalog::routes())
        .merge(crate::address::routes())
        .merge(crate::cart::routes())
        .merge(crate::order::routes());

    Router::new()
        .nest("/api", api)
        .nest_service("/images", images)
        .layer(log_layer)
        .layer(cors_layer)
        .with_state(state)
}
