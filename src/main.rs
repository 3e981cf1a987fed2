//! Fit Timer - A state-managed HTTP server hosting interval workout timers
//!
//! This is the main entry point for the fit-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use fit_timer::{
    api::create_router,
    config::Config,
    services::{InMemoryProfileStore, InMemorySessionStore},
    state::AppState,
    tasks::{identity_watch_task, reward_award_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("fit_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting fit-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, rewards={:?}",
        config.host,
        config.port,
        config.tick_ms,
        config.reward_policy()
    );

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.tick_period(),
        config.reward_policy(),
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(InMemorySessionStore::new()),
    ));

    // Background tasks subscribe before the first request can arrive
    let reward_task = tokio::spawn(reward_award_task(Arc::clone(&state)));
    let identity_task = tokio::spawn(identity_watch_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timer           - Create an EMOM or Tabata timer");
    info!("  GET    /timer           - Current timer state");
    info!("  POST   /timer/start     - Start or resume the timer");
    info!("  POST   /timer/pause     - Pause the timer");
    info!("  POST   /timer/reset     - Reset the timer");
    info!("  DELETE /timer           - Discard the timer");
    info!("  POST   /auth/sign-up    - Create a profile and sign in");
    info!("  POST   /auth/sign-in    - Sign in");
    info!("  POST   /auth/sign-out   - Sign out");
    info!("  GET    /profile         - Signed-in profile");
    info!("  PATCH  /profile         - Edit name, anime or class");
    info!("  GET    /coaches         - Coach accounts");
    info!("  POST   /sessions        - Coach publishes a session");
    info!("  GET    /sessions        - All sessions");
    info!("  GET    /sessions/live   - Sessions starting around now");
    info!("  GET    /sessions/mine   - Signed-in coach's sessions");
    info!("  POST   /sessions/:id/book - Student books a seat");
    info!("  POST   /runs            - Log a GPS run");
    info!("  GET    /leaderboard     - Ranked profiles");
    info!("  GET    /status          - Server status");
    info!("  GET    /health          - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Unsubscribe background tasks and stop any running timer
    identity_task.abort();
    reward_task.abort();
    if let Err(e) = state.discard_timer() {
        tracing::warn!("Failed to discard timer during shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
