//! Levels, rank titles and display helpers

use serde::{Deserialize, Serialize};

pub const XP_PER_LEVEL: u32 = 100;

/// Student class chosen at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Class {
    Shinigami,
    Quincy,
}

/// Level reached with `xp_total` experience; everyone starts at 1
pub fn level_for_xp(xp_total: u32) -> u32 {
    1 + xp_total / XP_PER_LEVEL
}

/// Progress through the current level, in percent
pub fn xp_progress_percent(xp_total: u32) -> f64 {
    f64::from(xp_total % XP_PER_LEVEL) / f64::from(XP_PER_LEVEL) * 100.0
}

/// Title shown on the profile, by level
pub fn rank_for_level(class: Option<Class>, level: u32) -> &'static str {
    match class {
        Some(Class::Shinigami) => match level {
            0..=4 => "Academy Student",
            5..=14 => "Base Shinigami",
            15..=29 => "Division Member",
            _ => "Division Officer",
        },
        Some(Class::Quincy) => match level {
            0..=4 => "Gemischt",
            5..=14 => "Confirmed Quincy",
            _ => "Echt",
        },
        None => "Beginner",
    }
}

/// Short title shown on the leaderboard, by total XP
pub fn leaderboard_title(class: Option<Class>, xp_total: u32) -> &'static str {
    match class {
        Some(Class::Shinigami) => match xp_total {
            0..=29 => "Student",
            30..=84 => "Shinigami",
            85..=99 => "Division",
            _ => "Officer",
        },
        Some(Class::Quincy) => match xp_total {
            0..=4 => "Gemischt",
            5..=14 => "Confirmed",
            _ => "Echt",
        },
        None => "Beginner",
    }
}

/// `MM:SS`, minutes unbounded
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_step_every_hundred_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(1_250), 13);
        assert_eq!(xp_progress_percent(1_250), 50.0);
    }

    #[test]
    fn profile_ranks_by_class() {
        assert_eq!(rank_for_level(Some(Class::Shinigami), 1), "Academy Student");
        assert_eq!(rank_for_level(Some(Class::Shinigami), 15), "Division Member");
        assert_eq!(rank_for_level(Some(Class::Shinigami), 30), "Division Officer");
        assert_eq!(rank_for_level(Some(Class::Quincy), 14), "Confirmed Quincy");
        assert_eq!(rank_for_level(Some(Class::Quincy), 15), "Echt");
        assert_eq!(rank_for_level(None, 50), "Beginner");
    }

    #[test]
    fn leaderboard_titles_by_xp() {
        assert_eq!(leaderboard_title(Some(Class::Shinigami), 29), "Student");
        assert_eq!(leaderboard_title(Some(Class::Shinigami), 85), "Division");
        assert_eq!(leaderboard_title(Some(Class::Shinigami), 100), "Officer");
        assert_eq!(leaderboard_title(Some(Class::Quincy), 5), "Confirmed");
        assert_eq!(leaderboard_title(None, 0), "Beginner");
    }

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3_600), "60:00");
    }
}
