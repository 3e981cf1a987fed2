//! Tabata controller: work and rest phases inside each round

use tracing::debug;

use super::{
    config::TimerConfig,
    countdown::CountdownEngine,
    snapshot::{CompletionEvent, Phase, TimerSnapshot, Transition},
    IntervalTimer,
};

/// Alternates work and rest; a round only advances once its rest is over.
///
/// ```text
/// Idle -> Working -> (rest > 0) Resting -> (round boundary) Working | Complete
/// ```
///
/// With a zero rest duration the end of work is the round boundary and the
/// `Rest` phase is never entered.
#[derive(Debug, Clone)]
pub struct TabataController {
    config: TimerConfig,
    engine: CountdownEngine,
    current_round: u32,
    phase: Phase,
    complete: bool,
}

impl TabataController {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            engine: CountdownEngine::new(config.round_duration()),
            config,
            current_round: 1,
            phase: Phase::Work,
            complete: false,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_left(&self) -> u32 {
        self.engine.seconds_left()
    }

    fn phase_duration(&self) -> u32 {
        match self.phase {
            Phase::Work => self.config.round_duration(),
            Phase::Rest => self.config.rest_duration(),
        }
    }

    /// Share of the current phase already done, in percent
    pub fn phase_percent(&self) -> f64 {
        let duration = f64::from(self.phase_duration());
        if duration == 0.0 {
            return 0.0;
        }
        (duration - f64::from(self.engine.seconds_left())) / duration * 100.0
    }

    fn round_boundary(&mut self) -> Transition {
        if self.current_round >= self.config.rounds() {
            self.engine.halt();
            self.complete = true;
            debug!("Tabata complete after {} rounds", self.config.rounds());
            return Transition::Completed(CompletionEvent {
                total_elapsed_seconds: self.config.total_seconds(),
            });
        }

        self.current_round += 1;
        self.phase = Phase::Work;
        self.engine.restart(self.config.round_duration());
        debug!("Tabata round {}/{}", self.current_round, self.config.rounds());
        Transition::RoundAdvanced {
            round: self.current_round,
        }
    }
}

impl IntervalTimer for TabataController {
    fn start(&mut self) {
        if self.engine.is_running() {
            return;
        }
        if self.complete || self.engine.is_expired() {
            self.engine.restart(self.config.round_duration());
            self.current_round = 1;
            self.phase = Phase::Work;
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
        self.phase = Phase::Work;
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

        match self.phase {
            Phase::Work if self.config.rest_duration() > 0 => {
                self.phase = Phase::Rest;
                self.engine.restart(self.config.rest_duration());
                debug!("Tabata round {} resting", self.current_round);
                Some(Transition::PhaseChanged {
                    phase: Phase::Rest,
                    round: self.current_round,
                })
            }
            Phase::Work | Phase::Rest => Some(self.round_boundary()),
        }
    }

    fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            kind: self.config.kind(),
            seconds_left: self.engine.seconds_left(),
            current_round: self.current_round,
            rounds: self.config.rounds(),
            phase: self.phase,
            running: self.engine.is_running(),
            complete: self.complete,
            effort: None,
            progress_percent: self.phase_percent(),
        }
    }
}
