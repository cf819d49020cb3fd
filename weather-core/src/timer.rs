use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Drives the periodic refresh of the location controller.
#[async_trait]
pub trait RefreshTimer: Send {
    /// Resolves when the next refresh is due.
    async fn tick(&mut self);
}

/// Wall-clock timer; the first tick fires one full period after creation.
#[derive(Debug)]
pub struct IntervalTimer {
    interval: Interval,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl RefreshTimer for IntervalTimer {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
