//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{ActiveTimer, AuthContext, CompletionNotice, RewardOutcome};
use crate::{
    calc::{format_clock, RewardPolicy},
    error::AppError,
    services::{ProfileStore, SessionStore},
    tasks::tick_driver_task,
    timer::{IntervalTicks, IntervalTimer, TickSource, TimerConfig, TimerSnapshot, Transition, WorkoutTimer},
};

/// What clients see of the active timer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub run_id: u64,
    pub clock: String,
    #[serde(flatten)]
    pub snapshot: TimerSnapshot,
    pub reward: RewardOutcome,
}

impl TimerView {
    fn of(active: &ActiveTimer) -> Self {
        let snapshot = active.timer.snapshot();
        Self {
            run_id: active.run_id,
            clock: format_clock(snapshot.seconds_left),
            snapshot,
            reward: active.reward.clone(),
        }
    }
}

/// Session host state shared by handlers and background tasks
pub struct AppState {
    /// At most one timer is live at a time
    pub timer: Arc<Mutex<Option<ActiveTimer>>>,
    next_run_id: AtomicU64,
    /// Delay between two ticks of a running timer
    pub tick_period: Duration,
    pub reward_policy: RewardPolicy,
    pub auth: AuthContext,
    /// External profile backend
    pub store: Arc<dyn ProfileStore>,
    /// External coaching session backend
    pub sessions: Arc<dyn SessionStore>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Completed runs, consumed by the reward task
    pub completion_tx: broadcast::Sender<CompletionNotice>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        tick_period: Duration,
        reward_policy: RewardPolicy,
        store: Arc<dyn ProfileStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let (completion_tx, _) = broadcast::channel(16);

        Self {
            timer: Arc::new(Mutex::new(None)),
            next_run_id: AtomicU64::new(1),
            tick_period,
            reward_policy,
            auth: AuthContext::new(),
            store,
            sessions,
            start_time: Instant::now(),
            port,
            host,
            completion_tx,
        }
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, Option<ActiveTimer>>, AppError> {
        self.timer.lock().map_err(|_| AppError::Poisoned("timer"))
    }

    fn allocate_run_id(&self) -> u64 {
        self.next_run_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Move `active` onto a new run id. Reward outcomes and ticks addressed
    /// to the old id are dropped from then on.
    fn renew_run(&self, active: &mut ActiveTimer) {
        let previous = active.run_id;
        active.run_id = self.allocate_run_id();
        active.reward = RewardOutcome::InProgress;
        debug!("Run {} continues as run {}", previous, active.run_id);
    }

    /// Replace the active timer with a fresh, stopped one
    pub fn create_timer(&self, config: TimerConfig) -> Result<TimerView, AppError> {
        let run_id = self.allocate_run_id();
        let active = ActiveTimer::new(run_id, WorkoutTimer::from_config(config));
        let view = TimerView::of(&active);

        let previous = self.lock_timer()?.replace(active);
        if let Some(previous) = previous {
            info!("Discarding run {} in favour of run {}", previous.run_id, run_id);
        }
        info!(
            "Created {} timer run {}: {} rounds of {}s, rest {}s",
            config.kind(),
            run_id,
            config.rounds(),
            config.round_duration(),
            config.rest_duration()
        );
        Ok(view)
    }

    /// Start or resume the active timer on the real-time tick source
    pub fn start_timer(self: &Arc<Self>) -> Result<TimerView, AppError> {
        self.start_timer_with(IntervalTicks::new(self.tick_period))
    }

    /// Start or resume the active timer, delivering ticks from `ticks`
    pub fn start_timer_with<T: TickSource>(self: &Arc<Self>, ticks: T) -> Result<TimerView, AppError> {
        let mut slot = self.lock_timer()?;
        let active = slot.as_mut().ok_or(AppError::NoTimer)?;

        if active.timer.is_complete() {
            active.cancel_driver();
            self.renew_run(active);
        }
        active.timer.start();

        if !active.has_live_driver() {
            let run_id = active.run_id;
            let handle = tokio::spawn(tick_driver_task(Arc::clone(self), run_id, ticks));
            active.attach_driver(handle);
            info!("Run {} started", run_id);
        }
        Ok(TimerView::of(active))
    }

    /// Pause the active timer; calling it again changes nothing
    pub fn pause_timer(&self) -> Result<TimerView, AppError> {
        let mut slot = self.lock_timer()?;
        let active = slot.as_mut().ok_or(AppError::NoTimer)?;

        active.cancel_driver();
        if active.timer.is_running() {
            info!("Run {} paused", active.run_id);
        }
        active.timer.pause();
        Ok(TimerView::of(active))
    }

    pub fn reset_timer(&self) -> Result<TimerView, AppError> {
        let mut slot = self.lock_timer()?;
        let active = slot.as_mut().ok_or(AppError::NoTimer)?;

        active.cancel_driver();
        active.timer.reset();
        self.renew_run(active);
        info!("Timer reset, now run {}", active.run_id);
        Ok(TimerView::of(active))
    }

    /// Drop the active timer, if any, and return its run id
    pub fn discard_timer(&self) -> Result<Option<u64>, AppError> {
        let discarded = self.lock_timer()?.take();
        Ok(discarded.map(|active| {
            info!("Run {} discarded", active.run_id);
            active.run_id
        }))
    }

    pub fn timer_view(&self) -> Result<TimerView, AppError> {
        let slot = self.lock_timer()?;
        slot.as_ref().map(TimerView::of).ok_or(AppError::NoTimer)
    }

    /// Apply one tick to run `run_id`.
    ///
    /// Returns `None` when that run is gone, paused or finished, which tells
    /// the driver to stop. Completion is published from here, under the lock,
    /// so it happens exactly once per run.
    pub fn apply_tick(&self, run_id: u64) -> Result<Option<Transition>, AppError> {
        let mut slot = self.lock_timer()?;
        let Some(active) = slot.as_mut().filter(|active| active.run_id == run_id) else {
            return Ok(None);
        };

        let transition = active.timer.tick();
        if let Some(Transition::Completed(event)) = transition {
            active.reward = RewardOutcome::Pending;
            let notice = CompletionNotice {
                run_id,
                kind: active.timer.kind(),
                event,
                user_id: self.auth.current().map(|user| user.user_id),
            };
            drop(slot);

            info!(
                "Run {} complete after {}s",
                run_id, event.total_elapsed_seconds
            );
            if let Err(e) = self.completion_tx.send(notice) {
                warn!("Failed to publish completion of run {}: {}", run_id, e);
            }
        }
        Ok(transition)
    }

    /// Record the reward result of `run_id` if it is still the active run
    pub fn set_reward_outcome(&self, run_id: u64, outcome: RewardOutcome) -> Result<(), AppError> {
        let mut slot = self.lock_timer()?;
        match slot.as_mut() {
            Some(active) if active.run_id == run_id => active.reward = outcome,
            _ => debug!("Run {} no longer active, dropping reward outcome", run_id),
        }
        Ok(())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
