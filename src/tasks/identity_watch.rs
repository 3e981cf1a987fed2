//! Identity watch: reacts to sign-in and sign-out

use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;

/// Discard the active timer whenever the signed-in user goes away or changes.
///
/// Holds the only long-lived subscription to the auth context; aborting the
/// task unsubscribes.
pub async fn identity_watch_task(state: Arc<AppState>) {
    info!("Starting identity watch task");

    let mut identity_rx = state.auth.subscribe();
    let mut previous = identity_rx.borrow_and_update().clone();

    while identity_rx.changed().await.is_ok() {
        let current = identity_rx.borrow_and_update().clone();

        if let Some(old) = &previous {
            let same_user = current
                .as_ref()
                .is_some_and(|user| user.user_id == old.user_id);
            if !same_user {
                info!("{} left, discarding active timer", old.user_id);
                if let Err(e) = state.discard_timer() {
                    error!("Failed to discard timer on identity change: {}", e);
                }
            }
        }

        previous = current;
    }

    info!("Auth context closed, stopping identity watch task");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::{
        calc::RewardPolicy,
        error::AppError,
        services::{InMemoryProfileStore, InMemorySessionStore},
        state::SignedInUser,
        timer::TimerConfig,
    };

    #[tokio::test]
    async fn sign_out_discards_active_timer() {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Duration::from_secs(1),
            RewardPolicy::default(),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(InMemorySessionStore::new()),
        ));
        state.auth.sign_in(SignedInUser {
            user_id: "orihime".to_string(),
            display_name: "Orihime".to_string(),
        });
        let watcher = tokio::spawn(identity_watch_task(Arc::clone(&state)));
        tokio::task::yield_now().await;

        state.create_timer(TimerConfig::emom(60, 3).unwrap()).unwrap();
        state.auth.sign_out();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(matches!(state.timer_view(), Err(AppError::NoTimer)));
        watcher.abort();
    }
}
