// Module declarations
mod builder;
mod core;
mod state;


// Public API exports
pub use builder::{KeepaliveManagerBuilder, KeepaliveOptions};
pub use self::core::{KeepaliveHandle, KeepaliveManager};
pub use state::{KeepaliveStats, KeepaliveStatus, LinkState};
pub(crate) use state::{ManagerEvent, ManagerState};
