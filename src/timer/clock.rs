//! Tick sources feeding a running timer

use std::{future::Future, time::Duration};
use tokio::{
    sync::mpsc,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};

/// Delivers one tick per elapsed period to the driver of a running timer.
///
/// Dropping the source cancels the subscription; nothing buffers ticks for a
/// paused timer.
pub trait TickSource: Send + 'static {
    /// Resolve at the next tick, or return `false` once the source is exhausted
    fn next_tick(&mut self) -> impl Future<Output = bool> + Send;
}

/// Real-time ticks from a tokio interval
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    /// First tick fires one full `period` after creation
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticks pushed by hand, one per message
#[derive(Debug)]
pub struct ChannelTicks {
    rx: mpsc::Receiver<()>,
}

impl ChannelTicks {
    /// Create a source together with the sender that drives it
    pub fn new(capacity: usize) -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

impl TickSource for ChannelTicks {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
