//! Single-value countdown shared by both interval controllers

/// Counts one value down by a second per tick while running.
///
/// Knows nothing about rounds or phases: the owning controller decides what
/// expiry means and calls [`CountdownEngine::restart`] for the next interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownEngine {
    seconds_left: u32,
    running: bool,
}

impl CountdownEngine {
    /// Create a stopped countdown holding `duration` seconds
    pub fn new(duration: u32) -> Self {
        Self {
            seconds_left: duration,
            running: false,
        }
    }

    /// Consume one elapsed second. No effect while stopped or already at zero.
    pub fn tick(&mut self) {
        if self.running {
            self.seconds_left = self.seconds_left.saturating_sub(1);
        }
    }

    pub fn is_expired(&self) -> bool {
        self.seconds_left == 0
    }

    /// Load a fresh interval of `duration` seconds
    pub fn restart(&mut self, duration: u32) {
        self.seconds_left = duration;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn halt(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }
}
