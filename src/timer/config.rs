//! Timer configuration and its validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which interval workout a timer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Every minute on the minute: equal rounds, single phase
    Emom,
    /// Alternating work and rest phases
    Tabata,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::Emom => write!(f, "emom"),
            TimerKind::Tabata => write!(f, "tabata"),
        }
    }
}

/// Rejected timer configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("round duration must be positive, got {0}s")]
    NonPositiveRoundDuration(i64),

    #[error("round count must be positive, got {0}")]
    NonPositiveRounds(i64),

    #[error("rest duration must not be negative, got {0}s")]
    NegativeRestDuration(i64),

    #[error("{field} is too large: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("EMOM timers have no rest phase, got rest duration {0}s")]
    RestNotSupported(i64),
}

/// Validated, immutable configuration for one timer run.
///
/// Fields are private so an instance can only come out of [`TimerConfig::emom`]
/// or [`TimerConfig::tabata`]; controllers built from it never re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerConfig {
    kind: TimerKind,
    round_duration: u32,
    rounds: u32,
    rest_duration: u32,
}

impl TimerConfig {
    /// EMOM configuration: `rounds` rounds of `round_duration` seconds
    pub fn emom(round_duration: i64, rounds: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            kind: TimerKind::Emom,
            round_duration: positive_seconds(round_duration)?,
            rounds: positive_rounds(rounds)?,
            rest_duration: 0,
        })
    }

    /// Tabata configuration: `rounds` cycles of `work` seconds then `rest` seconds
    pub fn tabata(work: i64, rest: i64, rounds: i64) -> Result<Self, ConfigError> {
        if rest < 0 {
            return Err(ConfigError::NegativeRestDuration(rest));
        }
        let rest_duration = u32::try_from(rest).map_err(|_| ConfigError::OutOfRange {
            field: "rest_duration",
            value: rest,
        })?;

        Ok(Self {
            kind: TimerKind::Tabata,
            round_duration: positive_seconds(work)?,
            rounds: positive_rounds(rounds)?,
            rest_duration,
        })
    }

    /// Build a configuration for `kind` from raw, unvalidated input
    pub fn from_raw(
        kind: TimerKind,
        round_duration: i64,
        rounds: i64,
        rest_duration: Option<i64>,
    ) -> Result<Self, ConfigError> {
        match kind {
            TimerKind::Emom => match rest_duration {
                Some(rest) if rest != 0 => Err(ConfigError::RestNotSupported(rest)),
                _ => Self::emom(round_duration, rounds),
            },
            TimerKind::Tabata => Self::tabata(round_duration, rest_duration.unwrap_or(0), rounds),
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Length of one round (the work phase for Tabata), in seconds
    pub fn round_duration(&self) -> u32 {
        self.round_duration
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Length of the rest phase in seconds, always 0 for EMOM
    pub fn rest_duration(&self) -> u32 {
        self.rest_duration
    }

    /// Seconds from start to completion when never paused
    pub fn total_seconds(&self) -> u64 {
        (u64::from(self.round_duration) + u64::from(self.rest_duration)) * u64::from(self.rounds)
    }
}

fn positive_seconds(value: i64) -> Result<u32, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositiveRoundDuration(value));
    }
    u32::try_from(value).map_err(|_| ConfigError::OutOfRange {
        field: "round_duration",
        value,
    })
}

fn positive_rounds(value: i64) -> Result<u32, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositiveRounds(value));
    }
    u32::try_from(value).map_err(|_| ConfigError::OutOfRange {
        field: "rounds",
        value,
    })
}
