//! The session clock.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::session::SharedSession;

/// Format elapsed seconds as `MM:SS`, or `H:MM:SS` from one hour on.
pub fn format_ticks(ticks: u64) -> String {
    let hours = ticks / 3600;
    let minutes = (ticks % 3600) / 60;
    let seconds = ticks % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Drives [`Session::tick`](crate::Session::tick) at a fixed interval.
///
/// The clock itself never stops; a paused session just ignores the ticks.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    interval: Duration,
}

impl Clock {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tick the session forever.
    pub async fn run(self, session: SharedSession) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        info!(interval_ms = self.interval.as_millis() as u64, "clock started");
        loop {
            ticker.tick().await;
            if let Some(tick) = session.write().await.tick() {
                debug!(tick, "tick");
            }
        }
    }

    /// Run on a background task.
    pub fn spawn(self, session: SharedSession) -> JoinHandle<()> {
        tokio::spawn(self.run(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::model::Model;
    use crate::session::Session;

    #[test]
    fn short_durations() {
        assert_eq!(format_ticks(0), "00:00");
        assert_eq!(format_ticks(7), "00:07");
        assert_eq!(format_ticks(65), "01:05");
        assert_eq!(format_ticks(3599), "59:59");
    }

    #[test]
    fn hours_are_unpadded() {
        assert_eq!(format_ticks(3600), "1:00:00");
        assert_eq!(format_ticks(3661), "1:01:01");
        assert_eq!(format_ticks(36_000 + 59), "10:00:59");
    }

    #[tokio::test]
    async fn clock_ticks_only_when_running() {
        let session = Session::in_memory(SessionConfig::default(), Model::default())
            .unwrap()
            .shared();
        let handle = Clock::new(Duration::from_millis(5)).spawn(session.clone());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(session.read().await.model().ticks(), 0);

        session.write().await.set_paused(false);
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert!(session.read().await.model().ticks() > 0);
    }
}
