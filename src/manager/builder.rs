use super::KeepaliveManager;
use crate::infrastructure::{RetryPolicy, Timer};
use crate::link::Connector;
use crate::types::{
    DEFAULT_CHANNEL_NAME, DEFAULT_OPEN_TIMEOUT, HEARTBEAT_INTERVAL, LinkError, OPEN_FAILURE_DELAY,
    RECONNECT_DELAY, Result, env_vars,
};
use std::sync::Arc;
use std::time::Duration;

/// Keepalive manager configuration. Durations are in milliseconds; `None`
/// falls back to the built-in defaults.
#[derive(Debug, Clone)]
pub struct KeepaliveOptions {
    /// Name the channel is requested under
    pub channel_name: String,
    pub heartbeat_interval: Option<u64>,
    /// Delay before re-opening after a disconnect
    pub reconnect_delay: Option<u64>,
    /// Delay before re-opening after a failed open
    pub open_failure_delay: Option<u64>,
    /// Upper bound on a single open attempt; exceeding it counts as a failure
    pub timeout: Option<u64>,
    /// Stepped schedule replacing `reconnect_delay`
    pub reconnect_intervals: Option<Vec<u64>>,
    /// Stepped schedule replacing `open_failure_delay`
    pub open_failure_intervals: Option<Vec<u64>>,
}

impl Default for KeepaliveOptions {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            heartbeat_interval: None,
            reconnect_delay: None,
            open_failure_delay: None,
            timeout: None,
            reconnect_intervals: None,
            open_failure_intervals: None,
        }
    }
}

impl KeepaliveOptions {
    /// Read options from `KEEPALIVE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read options through `lookup`; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str| -> Result<Option<u64>> {
            match lookup(key) {
                Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|e| {
                    LinkError::Config(format!("{} must be milliseconds: {}", key, e))
                }),
                None => Ok(None),
            }
        };

        let mut options = Self {
            heartbeat_interval: millis(env_vars::HEARTBEAT_MS)?,
            reconnect_delay: millis(env_vars::RECONNECT_MS)?,
            open_failure_delay: millis(env_vars::OPEN_RETRY_MS)?,
            ..Self::default()
        };
        if let Some(name) = lookup(env_vars::CHANNEL) {
            options.channel_name = name;
        }
        Ok(options)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval.unwrap_or(HEARTBEAT_INTERVAL))
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout.unwrap_or(DEFAULT_OPEN_TIMEOUT))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let on_disconnect = match &self.reconnect_intervals {
            Some(intervals) => Timer::new(intervals.clone()),
            None => Timer::fixed(self.reconnect_delay.unwrap_or(RECONNECT_DELAY)),
        };
        let on_open_failure = match &self.open_failure_intervals {
            Some(intervals) => Timer::new(intervals.clone()),
            None => Timer::fixed(self.open_failure_delay.unwrap_or(OPEN_FAILURE_DELAY)),
        };
        RetryPolicy::new(on_disconnect, on_open_failure)
    }

    fn validate(&self) -> Result<()> {
        if self.channel_name.trim().is_empty() {
            return Err(LinkError::Config("channel name is required".to_string()));
        }
        if self.heartbeat_interval == Some(0) {
            return Err(LinkError::Config(
                "heartbeat interval must be non-zero".to_string(),
            ));
        }
        if self.timeout == Some(0) {
            return Err(LinkError::Config("open timeout must be non-zero".to_string()));
        }
        for (label, intervals) in [
            ("reconnect", &self.reconnect_intervals),
            ("open failure", &self.open_failure_intervals),
        ] {
            if intervals.as_ref().is_some_and(|i| i.is_empty()) {
                return Err(LinkError::Config(format!(
                    "{} intervals must not be empty",
                    label
                )));
            }
        }
        Ok(())
    }
}

/// Builder for KeepaliveManager that validates configuration
pub struct KeepaliveManagerBuilder {
    connector: Arc<dyn Connector>,
    options: KeepaliveOptions,
}

impl KeepaliveManagerBuilder {
    /// Create a new builder
    pub fn new(connector: impl Connector, options: KeepaliveOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            connector: Arc::new(connector),
            options,
        })
    }

    /// Build the manager. Nothing runs until it is spawned.
    pub fn build(self) -> KeepaliveManager {
        KeepaliveManager::from_parts(self.connector, self.options)
    }
}
