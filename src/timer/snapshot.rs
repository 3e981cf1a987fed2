//! Observable timer state: phases, tick transitions, completion and snapshots

use serde::{Deserialize, Serialize};

use super::config::TimerKind;

/// Sub-interval of a round. EMOM timers stay in `Work` for their whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

/// Terminal signal emitted once per completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub total_elapsed_seconds: u64,
}

/// What a single applied tick did to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// The countdown moved but no boundary was crossed
    Counted { seconds_left: u32 },
    /// Work ended and rest began within the same round
    PhaseChanged { phase: Phase, round: u32 },
    /// A new round started in its work phase
    RoundAdvanced { round: u32 },
    /// The last round finished
    Completed(CompletionEvent),
}

/// Point-in-time view of a timer, used for display and the HTTP API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub kind: TimerKind,
    pub seconds_left: u32,
    pub current_round: u32,
    pub rounds: u32,
    pub phase: Phase,
    pub running: bool,
    pub complete: bool,
    /// EMOM power level in `0..=9000`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<u32>,
    pub progress_percent: f64,
}
