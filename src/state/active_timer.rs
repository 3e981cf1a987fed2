//! The timer a host is currently running, plus its reward bookkeeping

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::timer::{CompletionEvent, TimerKind, WorkoutTimer};

/// Where the reward for a run stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RewardOutcome {
    /// The run has not completed yet
    InProgress,
    /// Completed; waiting for the backend
    Pending,
    /// The policy grants no XP for this run
    NotEligible,
    Awarded { xp: u32, xp_total: u32, level: u32 },
    /// Persisting failed. The run still counts as complete.
    Failed { xp: u32, reason: String },
}

/// Published once per completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub run_id: u64,
    pub kind: TimerKind,
    pub event: CompletionEvent,
    /// Who was signed in when the run finished
    pub user_id: Option<String>,
}

/// Slot content: one controller and the task ticking it
#[derive(Debug)]
pub struct ActiveTimer {
    pub run_id: u64,
    pub timer: WorkoutTimer,
    pub reward: RewardOutcome,
    driver: Option<JoinHandle<()>>,
}

impl ActiveTimer {
    pub fn new(run_id: u64, timer: WorkoutTimer) -> Self {
        Self {
            run_id,
            timer,
            reward: RewardOutcome::InProgress,
            driver: None,
        }
    }

    /// True while a driver task is still delivering ticks
    pub fn has_live_driver(&self) -> bool {
        self.driver.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn attach_driver(&mut self, handle: JoinHandle<()>) {
        self.cancel_driver();
        self.driver = Some(handle);
    }

    /// Drop the tick subscription; no tick reaches the timer afterwards
    pub fn cancel_driver(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
        }
    }
}

impl Drop for ActiveTimer {
    fn drop(&mut self) {
        self.cancel_driver();
    }
}
