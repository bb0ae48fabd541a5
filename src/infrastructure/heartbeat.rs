use crate::link::LinkId;
use crate::manager::ManagerEvent;
use crate::types::HEARTBEAT_INTERVAL;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// Periodic tick source for one open link.
///
/// The ticker never touches the link itself. Each tick is posted to the
/// manager's event queue tagged with the link it was armed for, and the
/// manager decides whether that link is still the active one.
pub struct HeartbeatTicker {
    interval: Duration,
    link_id: LinkId,
    events: mpsc::UnboundedSender<ManagerEvent>,
}

impl HeartbeatTicker {
    pub fn new(link_id: LinkId, events: mpsc::UnboundedSender<ManagerEvent>) -> Self {
        Self {
            interval: Duration::from_millis(HEARTBEAT_INTERVAL),
            link_id,
            events,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Tick loop. The first tick fires one full interval after the call.
    pub async fn run(self) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if self
                .events
                .send(ManagerEvent::HeartbeatTick(self.link_id))
                .is_err()
            {
                // Manager dropped, exit heartbeat task
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_after_each_full_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let link_id = LinkId::new(7);

        tokio::spawn(HeartbeatTicker::new(link_id, tx).run());

        for n in 1..=3u32 {
            let event = rx.recv().await;
            assert!(matches!(event, Some(ManagerEvent::HeartbeatTick(id)) if id == link_id));
            let expected = Duration::from_millis(HEARTBEAT_INTERVAL) * n;
            let elapsed = start.elapsed();
            assert!(elapsed >= expected && elapsed < expected + Duration::from_millis(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_manager_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let task = tokio::spawn(
            HeartbeatTicker::new(LinkId::new(1), tx)
                .with_interval(Duration::from_secs(1))
                .run(),
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(task.is_finished());
    }
}
