//! Per-run task delivering ticks to the active timer

use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    state::AppState,
    timer::{TickSource, Transition},
};

/// Feed ticks from `ticks` to run `run_id` until it stops, finishes or is replaced.
///
/// Aborting this task is how the host pauses a timer: the tick source is
/// dropped with it, so nothing is queued for a later resume.
pub async fn tick_driver_task<T: TickSource>(state: Arc<AppState>, run_id: u64, mut ticks: T) {
    debug!("Tick driver started for run {}", run_id);

    while ticks.next_tick().await {
        match state.apply_tick(run_id) {
            Ok(Some(Transition::Completed(_))) => {
                debug!("Run {} completed, tick driver exiting", run_id);
                return;
            }
            Ok(Some(Transition::Counted { seconds_left })) => {
                debug!("Run {}: {}s left", run_id, seconds_left);
            }
            Ok(Some(transition)) => {
                debug!("Run {}: {:?}", run_id, transition);
            }
            Ok(None) => {
                debug!("Run {} no longer ticking, tick driver exiting", run_id);
                return;
            }
            Err(e) => {
                error!("Failed to apply tick to run {}: {}", run_id, e);
                return;
            }
        }
    }

    debug!("Tick source for run {} closed", run_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::{
        calc::RewardPolicy,
        services::{InMemoryProfileStore, InMemorySessionStore},
        timer::{ChannelTicks, IntervalTimer, TimerConfig},
    };

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Duration::from_secs(1),
            RewardPolicy::default(),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(InMemorySessionStore::new()),
        ))
    }

    /// Mark the active run as running without spawning a driver
    fn start_without_driver(state: &AppState) -> u64 {
        let mut slot = state.timer.lock().unwrap();
        let active = slot.as_mut().unwrap();
        active.timer.start();
        active.run_id
    }

    #[tokio::test]
    async fn drains_ticks_until_completion() {
        let state = state();
        state.create_timer(TimerConfig::emom(3, 2).unwrap()).unwrap();
        let run_id = start_without_driver(&state);

        let (tx, ticks) = ChannelTicks::new(32);
        for _ in 0..20 {
            tx.send(()).await.unwrap();
        }
        tick_driver_task(Arc::clone(&state), run_id, ticks).await;

        let view = state.timer_view().unwrap();
        assert!(view.snapshot.complete);
        assert_eq!(view.snapshot.current_round, 2);
    }

    #[tokio::test]
    async fn stops_when_source_closes() {
        let state = state();
        state.create_timer(TimerConfig::emom(60, 1).unwrap()).unwrap();
        let run_id = start_without_driver(&state);

        let (tx, ticks) = ChannelTicks::new(8);
        for _ in 0..7 {
            tx.send(()).await.unwrap();
        }
        drop(tx);
        tick_driver_task(Arc::clone(&state), run_id, ticks).await;

        assert_eq!(state.timer_view().unwrap().snapshot.seconds_left, 53);
    }

    #[tokio::test]
    async fn stops_when_run_is_replaced() {
        let state = state();
        state.create_timer(TimerConfig::emom(60, 1).unwrap()).unwrap();
        let stale = start_without_driver(&state);
        state.create_timer(TimerConfig::emom(30, 1).unwrap()).unwrap();

        let (tx, ticks) = ChannelTicks::new(8);
        tx.send(()).await.unwrap();
        tick_driver_task(Arc::clone(&state), stale, ticks).await;

        assert_eq!(state.timer_view().unwrap().snapshot.seconds_left, 30);
    }
}
