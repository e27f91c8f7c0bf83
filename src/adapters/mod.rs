//! Concrete transports for the `ports` traits.

pub mod memory;
pub mod udp;

pub use udp::{UdpReceiver, UdpSender};
