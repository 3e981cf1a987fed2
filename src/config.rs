//! Configuration and CLI argument handling

use std::time::Duration;
use clap::{Parser, ValueEnum};

use crate::calc::{RewardPolicy, RewardRule};

/// Rounding applied to EMOM minutes when awarding XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmomRounding {
    Floor,
    Round,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "fit-timer")]
#[command(about = "A state-managed HTTP server hosting EMOM and Tabata workout timers")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20553")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Milliseconds between two timer ticks
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// How EMOM minutes turn into XP
    #[arg(long, value_enum, default_value = "floor")]
    pub emom_reward: EmomRounding,

    /// XP granted for a completed Tabata (none when omitted)
    #[arg(long)]
    pub tabata_xp: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Reward policy assembled from the reward flags
    pub fn reward_policy(&self) -> RewardPolicy {
        RewardPolicy {
            emom: match self.emom_reward {
                EmomRounding::Floor => RewardRule::PerMinuteFloor,
                EmomRounding::Round => RewardRule::PerMinuteRound,
            },
            tabata: self.tabata_xp.map_or(RewardRule::Nothing, RewardRule::Fixed),
        }
    }
}
