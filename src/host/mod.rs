//! Stand-in for the UI host: JSON lines over any async reader/writer pair

pub mod bridge;
pub mod protocol;

pub use bridge::HostBridge;
pub use protocol::{DashboardMsg, HostEvent};
