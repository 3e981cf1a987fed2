//! Reward task: turns completed runs into persisted XP

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::state::{AppState, CompletionNotice, RewardOutcome};

/// Background task persisting XP for every completed run.
///
/// Failures are recorded on the run and logged. They never undo completion
/// and are not retried.
pub async fn reward_award_task(state: Arc<AppState>) {
    info!("Starting reward award task");

    let mut completion_rx = state.completion_tx.subscribe();

    loop {
        match completion_rx.recv().await {
            Ok(notice) => {
                award_completion(&state, notice).await;
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Reward task lagged, {} completions were not rewarded", missed);
            }
            Err(RecvError::Closed) => {
                info!("Completion channel closed, stopping reward award task");
                break;
            }
        }
    }
}

/// Compute and persist the reward for one completed run
pub async fn award_completion(state: &AppState, notice: CompletionNotice) -> RewardOutcome {
    let xp = state.reward_policy.xp_for(notice.kind, &notice.event);

    let outcome = if xp == 0 {
        info!("Run {} earns no XP", notice.run_id);
        RewardOutcome::NotEligible
    } else {
        match &notice.user_id {
            None => {
                error!("Run {} earned {} XP but nobody is signed in", notice.run_id, xp);
                RewardOutcome::Failed {
                    xp,
                    reason: "no user is signed in".to_string(),
                }
            }
            Some(user_id) => match state.store.award_xp(user_id, xp).await {
                Ok(profile) => {
                    info!(
                        "Run {} awarded {} XP to {} (total {}, level {})",
                        notice.run_id, xp, user_id, profile.xp_total, profile.level
                    );
                    RewardOutcome::Awarded {
                        xp,
                        xp_total: profile.xp_total,
                        level: profile.level,
                    }
                }
                Err(e) => {
                    error!("Failed to persist reward for run {}: {}", notice.run_id, e);
                    RewardOutcome::Failed {
                        xp,
                        reason: e.to_string(),
                    }
                }
            },
        }
    };

    if let Err(e) = state.set_reward_outcome(notice.run_id, outcome.clone()) {
        error!("Failed to record reward outcome: {}", e);
    }
    outcome
}
