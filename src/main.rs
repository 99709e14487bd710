use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info};

use pedido_api::{
    config::Config,
    db::Database,
    handlers::{
        health_check, readiness_check,
        users::{create_user, list_users},
    },
    middleware::{apply_middleware, init_tracing},
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Build the connection pool (lazy; does not reach the database yet)
    let database = match Database::new(&config.database) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to create connection pool: {}", e);
            std::process::exit(1);
        }
    };

    // Create the Axum router with all endpoints
    let app = create_router(Arc::clone(&database));

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!(
                "Server listening on {} — DB={}@{}:{}/{}",
                addr,
                config.database.username,
                config.database.host,
                config.database.port,
                config.database.database
            );
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Ensure the schema once the listener is bound. A failure is logged but
    // never fatal: requests fail at query time until the database comes back.
    let schema_db = Arc::clone(&database);
    tokio::spawn(async move {
        if let Err(e) = schema_db.ensure_schema().await {
            error!("Schema initialization failed: {}", e);
        }
    });

    // Start the server with graceful shutdown handling
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Create the Axum router with all endpoints and middleware.
/// The user routes are registered twice, with and without the /api prefix,
/// so the service behaves the same whether or not an ingress rewrites the
/// prefix; both registrations share the same handler functions.
fn create_router(database: Arc<Database>) -> Router {
    let router = Router::new()
        // Probes
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // User endpoints, bare and /api-prefixed
        .route("/users", post(create_user).get(list_users))
        .route("/api/users", post(create_user).get(list_users))
        // Add shared state (database connection)
        .with_state(database);

    apply_middleware(router)
}

/// Graceful shutdown signal handler
/// Listens for SIGTERM and SIGINT signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
