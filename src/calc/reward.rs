//! XP reward policy for completed timer runs

use serde::{Deserialize, Serialize};

use crate::timer::{CompletionEvent, TimerKind};

/// How one kind of timer converts a completed run into XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardRule {
    /// One XP per full minute of workout
    PerMinuteFloor,
    /// One XP per minute, rounded to the nearest minute
    PerMinuteRound,
    /// Same XP for every completed run
    Fixed(u32),
    /// No XP
    Nothing,
}

impl RewardRule {
    pub fn xp_for(&self, total_seconds: u64) -> u32 {
        let xp = match self {
            RewardRule::PerMinuteFloor => total_seconds / 60,
            RewardRule::PerMinuteRound => (total_seconds + 30) / 60,
            RewardRule::Fixed(xp) => u64::from(*xp),
            RewardRule::Nothing => 0,
        };
        u32::try_from(xp).unwrap_or(u32::MAX)
    }
}

/// Reward rules per timer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    pub emom: RewardRule,
    pub tabata: RewardRule,
}

impl RewardPolicy {
    pub fn rule_for(&self, kind: TimerKind) -> RewardRule {
        match kind {
            TimerKind::Emom => self.emom,
            TimerKind::Tabata => self.tabata,
        }
    }

    /// XP earned by a completed run; 0 means nothing to persist
    pub fn xp_for(&self, kind: TimerKind, event: &CompletionEvent) -> u32 {
        self.rule_for(kind).xp_for(event.total_elapsed_seconds)
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            emom: RewardRule::PerMinuteFloor,
            tabata: RewardRule::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(total_elapsed_seconds: u64) -> CompletionEvent {
        CompletionEvent {
            total_elapsed_seconds,
        }
    }

    #[test]
    fn default_policy_floors_emom_minutes() {
        let policy = RewardPolicy::default();
        assert_eq!(policy.xp_for(TimerKind::Emom, &done(600)), 10);
        assert_eq!(policy.xp_for(TimerKind::Emom, &done(659)), 10);
        assert_eq!(policy.xp_for(TimerKind::Emom, &done(59)), 0);
        assert_eq!(policy.xp_for(TimerKind::Tabata, &done(240)), 0);
    }

    #[test]
    fn rounding_rule_rounds_half_up() {
        assert_eq!(RewardRule::PerMinuteRound.xp_for(89), 1);
        assert_eq!(RewardRule::PerMinuteRound.xp_for(90), 2);
    }

    #[test]
    fn fixed_rule_ignores_duration() {
        let policy = RewardPolicy {
            emom: RewardRule::PerMinuteFloor,
            tabata: RewardRule::Fixed(5),
        };
        assert_eq!(policy.xp_for(TimerKind::Tabata, &done(1)), 5);
        assert_eq!(policy.xp_for(TimerKind::Tabata, &done(10_000)), 5);
    }
}
