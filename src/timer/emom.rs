//! EMOM controller: equal rounds, one phase each

use tracing::debug;

use super::{
    config::TimerConfig,
    countdown::CountdownEngine,
    snapshot::{CompletionEvent, Phase, TimerSnapshot, Transition},
    IntervalTimer,
};

/// Ceiling of the cosmetic effort scale
pub const MAX_EFFORT: u32 = 9000;

/// Drives `rounds` rounds of `round_duration` seconds.
///
/// ```text
/// Idle -> Running -> (round boundary) Running | Complete
/// ```
#[derive(Debug, Clone)]
pub struct EmomController {
    config: TimerConfig,
    engine: CountdownEngine,
    current_round: u32,
    complete: bool,
}

impl EmomController {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            engine: CountdownEngine::new(config.round_duration()),
            config,
            current_round: 1,
            complete: false,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn seconds_left(&self) -> u32 {
        self.engine.seconds_left()
    }

    /// Seconds of work done so far in this run
    pub fn elapsed_seconds(&self) -> u64 {
        let round_duration = u64::from(self.config.round_duration());
        u64::from(self.current_round - 1) * round_duration
            + (round_duration - u64::from(self.engine.seconds_left()))
    }

    /// Power level: elapsed share of the run scaled to [`MAX_EFFORT`].
    /// Non-decreasing over a run, reaches the ceiling on completion.
    pub fn effort(&self) -> u32 {
        let total = self.config.total_seconds() as f64;
        let scaled = (self.elapsed_seconds() as f64 / total * f64::from(MAX_EFFORT)).round();
        (scaled as u32).min(MAX_EFFORT)
    }

    fn finish(&mut self) -> Transition {
        self.engine.halt();
        self.complete = true;
        let event = CompletionEvent {
            total_elapsed_seconds: self.config.total_seconds(),
        };
        debug!("EMOM complete after {} rounds", self.config.rounds());
        Transition::Completed(event)
    }
}

impl IntervalTimer for EmomController {
    fn start(&mut self) {
        if self.engine.is_running() {
            return;
        }
        if self.complete || self.engine.is_expired() {
            self.engine.restart(self.config.round_duration());
            self.current_round = 1;
            self.complete = false;
        }
        self.engine.resume();
    }

    fn pause(&mut self) {
        self.engine.halt();
    }

    fn reset(&mut self) {
        self.engine.halt();
        self.engine.restart(self.config.round_duration());
        self.current_round = 1;
        self.complete = false;
    }

    fn tick(&mut self) -> Option<Transition> {
        if !self.engine.is_running() || self.complete {
            return None;
        }

        self.engine.tick();
        if !self.engine.is_expired() {
            return Some(Transition::Counted {
                seconds_left: self.engine.seconds_left(),
            });
        }

        if self.current_round >= self.config.rounds() {
            return Some(self.finish());
        }

        self.current_round += 1;
        self.engine.restart(self.config.round_duration());
        debug!("EMOM round {}/{}", self.current_round, self.config.rounds());
        Some(Transition::RoundAdvanced {
            round: self.current_round,
        })
    }

    fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn snapshot(&self) -> TimerSnapshot {
        let effort = self.effort();
        TimerSnapshot {
            kind: self.config.kind(),
            seconds_left: self.engine.seconds_left(),
            current_round: self.current_round,
            rounds: self.config.rounds(),
            phase: Phase::Work,
            running: self.engine.is_running(),
            complete: self.complete,
            effort: Some(effort),
            progress_percent: f64::from(effort) / f64::from(MAX_EFFORT) * 100.0,
        }
    }
}
