//! Socket ownership for the connection to the resource manager.
//!
//! A single TCP stream carries every request, reply and the final terminate
//! command. The stream is opened synchronously, waits for readability with a
//! one-byte peek and is shut down explicitly on teardown so any wait blocked
//! on it returns.

mod connection;
mod readiness;

pub use self::connection::{Connection, ShutdownHandle, connect};
pub use self::readiness::{Readiness, ReadinessTrigger};

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
