//! Interval workout timers
//!
//! Two controllers share one shape: a [`CountdownEngine`] advanced once per
//! tick, wrapped by a repeat policy that decides what happens at each
//! boundary. EMOM repeats a single phase; Tabata alternates work and rest.
//!
//! Controllers assume a validated [`TimerConfig`] and never fail. They do not
//! own a clock: whoever drives them calls [`IntervalTimer::tick`] once per
//! [`TickSource`] tick, which keeps them deterministic under test.

pub mod clock;
pub mod config;
pub mod countdown;
pub mod emom;
pub mod snapshot;
pub mod tabata;

pub use clock::{ChannelTicks, IntervalTicks, TickSource};
pub use config::{ConfigError, TimerConfig, TimerKind};
pub use countdown::CountdownEngine;
pub use emom::EmomController;
pub use snapshot::{CompletionEvent, Phase, TimerSnapshot, Transition};
pub use tabata::TabataController;

/// Commands and tick handling common to both controllers
pub trait IntervalTimer {
    /// Begin or resume. A finished run starts over from round one.
    fn start(&mut self);
    /// Stop counting; idempotent
    fn pause(&mut self);
    /// Back to round one, first phase, stopped. Safe from any state.
    fn reset(&mut self);
    /// Apply one elapsed second. `None` when paused or complete.
    fn tick(&mut self) -> Option<Transition>;
    fn is_running(&self) -> bool;
    fn is_complete(&self) -> bool;
    fn snapshot(&self) -> TimerSnapshot;
}

/// The timer a session host can run
#[derive(Debug, Clone)]
pub enum WorkoutTimer {
    Emom(EmomController),
    Tabata(TabataController),
}

impl WorkoutTimer {
    /// Build the controller matching the configuration's kind
    pub fn from_config(config: TimerConfig) -> Self {
        match config.kind() {
            TimerKind::Emom => WorkoutTimer::Emom(EmomController::new(config)),
            TimerKind::Tabata => WorkoutTimer::Tabata(TabataController::new(config)),
        }
    }

    pub fn config(&self) -> &TimerConfig {
        match self {
            WorkoutTimer::Emom(timer) => timer.config(),
            WorkoutTimer::Tabata(timer) => timer.config(),
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.config().kind()
    }

    fn inner(&self) -> &dyn IntervalTimer {
        match self {
            WorkoutTimer::Emom(timer) => timer,
            WorkoutTimer::Tabata(timer) => timer,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn IntervalTimer {
        match self {
            WorkoutTimer::Emom(timer) => timer,
            WorkoutTimer::Tabata(timer) => timer,
        }
    }
}

impl IntervalTimer for WorkoutTimer {
    fn start(&mut self) {
        self.inner_mut().start()
    }

    fn pause(&mut self) {
        self.inner_mut().pause()
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn tick(&mut self) -> Option<Transition> {
        self.inner_mut().tick()
    }

    fn is_running(&self) -> bool {
        self.inner().is_running()
    }

    fn is_complete(&self) -> bool {
        self.inner().is_complete()
    }

    fn snapshot(&self) -> TimerSnapshot {
        self.inner().snapshot()
    }
}
