// Infrastructure module - timers and background tickers
pub mod heartbeat;
pub mod task_manager;
pub mod timer;

pub use heartbeat::HeartbeatTicker;
pub use task_manager::TimerSlot;
pub use timer::{RetryPolicy, Timer};
