use ecommerce_backend::config::AppConfig;
use ecommerce_backend::router::create_app_router;
use ecommerce_backend::state::AppState;
use ecommerce_backend::{db, logging};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration [{}]: {}", e.error_code(), e);
            std::process::exit(1);
        }
    };

    logging::init_logging(config.log_json);

    if let Err(e) = run(config).await {
        tracing::error!(event = "server.failed", error = %e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize persistence
    let pool = db::connect(&config.database_url).await?;
    if let Some(admin) = &config.admin {
        db::bootstrap_admin(&pool, admin, config.password_hash_cost).await?;
    }

    // Build application router with all routes and middleware
    let addr = config.bind_addr.clone();
    let app = create_app_router(AppState::new(pool, config).shared());

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(event = "server.started", addr = %addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(event = "server.stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(event = "server.signal_failed", error = %e);
    }
}
