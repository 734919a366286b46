//! Client for the BarbequeRTRM resource manager.
//!
//! A parallel job launcher uses this crate to ask the resource manager for
//! compute nodes. The client sends the job's total process count, receives a
//! node list spread over one or more fixed-size records, and hands the
//! completed list to the launcher's [`JobSubsystem`].
//!
//! The work is split into layers:
//!
//! - [`protocol`] encodes and decodes the three wire records.
//! - [`transport`] owns the socket and the readiness wait.
//! - [`session`] is the two-state receive machine that assembles replies.
//! - [`AllocationClient`] ties them together and applies the completion
//!   policy.
//!
//! All state lives in the client value; several clients can coexist in one
//! process.
//!
//! ```no_run
//! use bbque_config::Config;
//! use bbque_ras::{AllocationClient, AppContext, InMemoryJobSubsystem, Job, JobId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_from_environment()?;
//! let mut client = AllocationClient::connect(&config, InMemoryJobSubsystem::new())?;
//! let job = Job::with_apps(JobId::new(42), [Some(AppContext::new(8))]);
//! let _ = client.request_allocation(job)?;
//! let allocation = client.run_until_allocated()?;
//! println!("{} nodes granted", allocation.nodes.len());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod component;
mod errors;
mod host;
mod orchestrator;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::AllocationClient;
pub use component::{COMPONENT_NAME, Selection};
pub use errors::AllocationError;
pub use host::{
    AllocatedNode, AppContext, InMemoryJobSubsystem, Job, JobSubsystem, NodeState, Oversubscribe,
};
pub use orchestrator::{Allocation, AllocationStatus};
pub use protocol::{Hostname, JobId};
pub use session::ProtocolState;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{Readiness, ShutdownHandle};

#[cfg(test)]
mod tests;
