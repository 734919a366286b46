//! Error taxonomy of the allocation client.

use std::io;

use bbque_config::EndpointError;
use thiserror::Error;

use crate::protocol::{CodecError, JobId};

/// Errors surfaced by the allocation client. None are retried.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A required endpoint value is missing or malformed; the allocation
    /// path is unavailable.
    #[error("resource manager is not configured: {source}")]
    Configuration {
        #[from]
        source: EndpointError,
    },
    /// The socket could not be created.
    #[error("failed to create resource manager socket: {source}")]
    SocketCreate {
        #[source]
        source: io::Error,
    },
    /// Connecting to the resource manager failed.
    #[error("failed to connect to resource manager at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// Fewer bytes arrived than the current record needs.
    #[error("protocol error: expected {expected} bytes of {record}, received {actual}")]
    Protocol {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Reading from the connection failed.
    #[error("failed to read {record} from resource manager: {source}")]
    Receive {
        record: &'static str,
        #[source]
        source: io::Error,
    },
    /// A header arrived with a kind the client does not accept here.
    #[error("resource manager sent unknown command {kind}")]
    UnknownCommand { kind: u8 },
    /// A record arrived intact but its content is malformed.
    #[error("malformed record from resource manager: {0}")]
    Codec(CodecError),
    /// Writing to the connection failed.
    #[error("failed to send {record} to resource manager: {source}")]
    Send {
        record: &'static str,
        #[source]
        source: io::Error,
    },
    /// A reply completed while no job was waiting for it.
    #[error("allocation for job {job_id} completed with no pending request")]
    NoPendingJob { job_id: JobId },
    /// The socket could not be duplicated into a cancellation handle.
    #[error("failed to create a cancellation handle for the connection: {source}")]
    CancelHandle {
        #[source]
        source: io::Error,
    },
    /// A readable event arrived while the client was suspended.
    #[error("allocation client is not registered for readable events")]
    NotArmed,
    /// The resource manager closed the connection.
    #[error("resource manager closed the connection")]
    PeerClosed,
    /// The client was already finalized.
    #[error("allocation client is finalized")]
    Closed,
}

impl From<CodecError> for AllocationError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::UnknownCommand(kind) => Self::UnknownCommand { kind },
            other => Self::Codec(other),
        }
    }
}

impl AllocationError {
    /// Whether the error means the allocation path is not applicable, as
    /// opposed to broken.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
