use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use civictrack_location::{app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civictrack_location=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting CivicTrack location service");

    let state = AppState::new(config.clone()).context("Invalid radius configuration")?;
    info!(
        "Accepting search radii {}; default {} km",
        state.radius_policy.describe_range(),
        state.radius_policy.default_km()
    );

    // Log system notifications until the transport attaches its own listeners
    state.notifications.connect("civictrack-location");
    let notification_log = state.notifications.on_system_notification(|notification| {
        info!(
            "System notification {}: {}",
            notification.title, notification.message
        );
    });

    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Invalid listen address")?;
    info!("HTTP server listening on {}", addr);

    // Run the HTTP server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to start HTTP server")?;

    info!("Shutting down...");
    state.notifications.remove_listeners();
    drop(notification_log);
    state.notifications.disconnect();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
