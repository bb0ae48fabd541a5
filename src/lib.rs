//! # keepalive-link
//!
//! Keeps a suspendable background context alive by holding a persistent link
//! to it and sending a heartbeat every 20 seconds. When the link drops the
//! manager reopens it after 1 second; when an open attempt fails it retries
//! after 2 seconds. The loop runs until it is shut down or the runtime goes
//! away.
//!
//! ## Example
//!
//! ```no_run
//! use keepalive_link::{KeepaliveManager, KeepaliveOptions, LinkState, WebSocketConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = WebSocketConnector::new("ws://127.0.0.1:4625")?;
//!     let handle = KeepaliveManager::start(connector, KeepaliveOptions::default())?;
//!
//!     handle.wait_for(LinkState::Open).await?;
//!     Ok(())
//! }
//! ```

pub mod infrastructure;
pub mod link;
pub mod manager;
pub mod types;

pub use link::{
    Connector, DisconnectObserver, LinkHandle, LinkId, MemoryConnector, MemoryPeer,
    WebSocketConnector,
};
pub use manager::{
    KeepaliveHandle, KeepaliveManager, KeepaliveManagerBuilder, KeepaliveOptions, KeepaliveStats,
    KeepaliveStatus, LinkState,
};
pub use types::{LinkError, LinkMessage, Result};
