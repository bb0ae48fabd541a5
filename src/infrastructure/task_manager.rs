use std::future::Future;
use tokio::task::JoinHandle;

/// Holds at most one scheduled timer task.
///
/// Arming the slot aborts whatever was armed before, so the owner can never
/// end up with two live timers guarding the same state.
#[derive(Debug)]
pub struct TimerSlot {
    label: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            handle: None,
        }
    }

    /// Spawn `future` as the slot's timer, replacing any previous one
    pub fn arm<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.clear() {
            tracing::debug!("Replaced armed {} timer", self.label);
        }
        self.handle = Some(tokio::spawn(future));
    }

    /// Abort the armed timer. Returns whether one was armed.
    pub fn clear(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a timer is armed and has not run to completion
    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_arm_replaces_previous_timer() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut slot = TimerSlot::new("test");

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            slot.arm(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(slot.is_armed());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!slot.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_aborts_timer() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut slot = TimerSlot::new("test");

        let counter = Arc::clone(&fired);
        slot.arm(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(slot.clear());
        assert!(!slot.clear());
        assert!(!slot.is_armed());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
