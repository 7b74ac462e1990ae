//! # Snippetbox Server
//!
//! Entry point: loads configuration, opens the database, wires the session
//! store and serves the router built by `snippetbox::router`.

use snippetbox::{db, session, AppState, Config};
use tokio::signal;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired sessions are swept from the store
const SESSION_SWEEP_INTERVAL: tokio::time::Duration = tokio::time::Duration::from_secs(60);

/// Main application entry point
///
/// This function:
/// 1. Sets up logging
/// 2. Loads configuration from environment variables
/// 3. Opens and migrates the SQLite database
/// 4. Creates the session table and starts the expired-session sweep
/// 5. Builds the router and serves it until Ctrl-C / SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: info level for most crates, debug level for our app
    // Can be overridden with RUST_LOG environment variable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,snippetbox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let pool = db::connect(&config.database_url).await?;
    tracing::info!("Database ready");

    // Session rows live in the same database as users and snippets
    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;

    let deletion_task = tokio::task::spawn(
        session_store
            .clone()
            .continuously_delete_expired(SESSION_SWEEP_INTERVAL),
    );

    let state = AppState::new(config.clone(), pool)?;
    let app = snippetbox::router(state, session::session_layer(session_store, &config));

    let bind_addr = config.bind_address();
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    deletion_task.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
