//! Receive-side protocol state machine.
//!
//! The session advances by exactly one record per readable event: a command
//! header while waiting for a reply, then one resource item at a time until
//! the item flagged as last. Granted nodes are accumulated in arrival order.

mod accumulator;
mod machine;
mod reader;
mod state;

pub use self::accumulator::NodeList;
pub use self::machine::{AllocationSession, SessionEvent};
pub(crate) use self::reader::read_record;
pub use self::state::ProtocolState;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");
