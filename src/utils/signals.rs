//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Resolve on the first SIGTERM or SIGINT.
///
/// Falls back to tokio's Ctrl-C listener when the signal stream cannot be
/// registered.
pub async fn shutdown_signal() {
    let mut signals = match Signals::new([SIGTERM, SIGINT]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to register signal handler: {}, waiting for Ctrl-C", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            return;
        }
    };
    let handle = signals.handle();

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    handle.close();
}
