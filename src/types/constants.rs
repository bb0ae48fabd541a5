/// Message kinds carried on the link
pub mod message_kinds {
    pub const PING: &str = "ping";
}

/// Channel name used when none is configured
pub const DEFAULT_CHANNEL_NAME: &str = "keepalive";

/// Heartbeat interval (milliseconds)
pub const HEARTBEAT_INTERVAL: u64 = 20_000;

/// Delay before re-opening after the link was severed (milliseconds)
pub const RECONNECT_DELAY: u64 = 1_000;

/// Delay before re-opening after an open attempt failed (milliseconds)
pub const OPEN_FAILURE_DELAY: u64 = 2_000;

/// Default open timeout (milliseconds)
pub const DEFAULT_OPEN_TIMEOUT: u64 = 10_000;

/// Query parameter carrying the channel name on WebSocket endpoints
pub const CHANNEL_NAME_PARAM: &str = "name";

/// Environment variables read by `KeepaliveOptions::from_env`
pub mod env_vars {
    pub const CHANNEL: &str = "KEEPALIVE_CHANNEL";
    pub const HEARTBEAT_MS: &str = "KEEPALIVE_HEARTBEAT_MS";
    pub const RECONNECT_MS: &str = "KEEPALIVE_RECONNECT_MS";
    pub const OPEN_RETRY_MS: &str = "KEEPALIVE_OPEN_RETRY_MS";
}

/// WebSocket close codes
pub const WS_CLOSE_NORMAL: u16 = 1000;
