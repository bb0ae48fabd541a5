use crate::infrastructure::{RetryPolicy, TimerSlot};
use crate::link::{LinkHandle, LinkId};
use std::fmt;

/// Lifecycle of the keepalive link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No link and no retry; only seen between transitions
    Idle,
    /// An open attempt is in flight
    Connecting,
    /// Link active, heartbeat running
    Open,
    /// Link gone, retry scheduled
    Disconnected,
    /// Manager shut down
    Stopped,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Disconnected => "disconnected",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running counters since the manager started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepaliveStats {
    pub open_attempts: u64,
    pub open_failures: u64,
    pub disconnects: u64,
    pub heartbeats_sent: u64,
    pub heartbeats_failed: u64,
}

/// Snapshot published after every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveStatus {
    pub state: LinkState,
    /// Link currently considered active
    pub link_id: Option<LinkId>,
    /// Whether a heartbeat timer is running
    pub heartbeat_armed: bool,
    /// Whether a retry is scheduled
    pub retry_pending: bool,
    pub stats: KeepaliveStats,
}

impl Default for KeepaliveStatus {
    fn default() -> Self {
        Self {
            state: LinkState::Idle,
            link_id: None,
            heartbeat_armed: false,
            retry_pending: false,
            stats: KeepaliveStats::default(),
        }
    }
}

/// Everything the event loop acts on. Timers and transports only ever post
/// these; they never touch manager state directly.
#[derive(Debug)]
pub enum ManagerEvent {
    /// Open a new link (initial start or a retry firing)
    Establish,
    /// Heartbeat interval elapsed for the given link
    HeartbeatTick(LinkId),
    /// Transport reported the given link severed
    Disconnected(LinkId),
    Shutdown,
}

/// Consolidated mutable state owned by the event loop
pub struct ManagerState {
    pub state: LinkState,
    /// Active link, present only while open
    pub link: Option<LinkHandle>,
    pub heartbeat: TimerSlot,
    pub retry: TimerSlot,
    pub retry_policy: RetryPolicy,
    pub stats: KeepaliveStats,
    next_link_id: u64,
}

impl ManagerState {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self {
            state: LinkState::Idle,
            link: None,
            heartbeat: TimerSlot::new("heartbeat"),
            retry: TimerSlot::new("retry"),
            retry_policy,
            stats: KeepaliveStats::default(),
            next_link_id: 0,
        }
    }

    /// Allocate the identity for the next open attempt
    pub fn make_link_id(&mut self) -> LinkId {
        self.next_link_id += 1;
        LinkId::new(self.next_link_id)
    }

    /// Whether `link_id` is the active link
    pub fn is_active(&self, link_id: LinkId) -> bool {
        self.link.as_ref().is_some_and(|link| link.id() == link_id)
    }

    pub fn status(&self) -> KeepaliveStatus {
        KeepaliveStatus {
            state: self.state,
            link_id: self.link.as_ref().map(LinkHandle::id),
            heartbeat_armed: self.heartbeat.is_armed(),
            retry_pending: self.retry.is_armed(),
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Timer;

    #[test]
    fn test_link_ids_are_sequential() {
        let mut state = ManagerState::new(RetryPolicy::new(Timer::fixed(1), Timer::fixed(2)));
        assert_eq!(state.make_link_id(), LinkId::new(1));
        assert_eq!(state.make_link_id(), LinkId::new(2));
    }

    #[test]
    fn test_only_stored_link_is_active() {
        let mut state = ManagerState::new(RetryPolicy::new(Timer::fixed(1), Timer::fixed(2)));
        let id = state.make_link_id();
        assert!(!state.is_active(id));

        let (handle, _rx) = LinkHandle::channel(id, "keepalive");
        state.link = Some(handle);
        assert!(state.is_active(id));
        assert!(!state.is_active(LinkId::new(99)));
        assert_eq!(state.status().link_id, Some(id));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LinkState::Disconnected.to_string(), "disconnected");
        assert_eq!(KeepaliveStatus::default().state, LinkState::Idle);
    }
}
