use super::constants::message_kinds;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A message sent on the keepalive link.
///
/// Serialized as `{"kind": "ping", "timestamp": 1700000000000}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkMessage {
    pub kind: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl LinkMessage {
    pub fn new(kind: impl Into<String>, timestamp: u64) -> Self {
        Self {
            kind: kind.into(),
            timestamp,
        }
    }

    /// Liveness message stamped with the current wall-clock time
    pub fn ping() -> Self {
        Self::new(message_kinds::PING, epoch_millis())
    }

    pub fn is_ping(&self) -> bool {
        self.kind == message_kinds::PING
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_message() {
        let message = LinkMessage::ping();
        assert_eq!(message.kind, "ping");
        assert!(message.is_ping());
        assert!(message.timestamp > 0);
    }

    #[test]
    fn test_ping_serialization_shape() {
        let message = LinkMessage::new("ping", 1_700_000_000_000);

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "ping", "timestamp": 1_700_000_000_000u64 })
        );
    }

    #[test]
    fn test_other_kinds_are_not_pings() {
        let message = LinkMessage::new("status", 1);
        assert!(!message.is_ping());
    }
}
