// Link module - host platform boundary
mod connector;
mod handle;
pub mod memory;
pub mod websocket;

pub use connector::Connector;
pub use handle::{DisconnectObserver, LinkHandle, LinkId};
pub use memory::{MemoryConnector, MemoryPeer};
pub use websocket::WebSocketConnector;
