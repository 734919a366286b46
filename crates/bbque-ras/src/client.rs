//! Connection lifecycle and event dispatch for the allocation client.

use bbque_config::{Config, ResourceManagerEndpoint};
use tracing::{debug, info, warn};

use crate::errors::AllocationError;
use crate::host::JobSubsystem;
use crate::orchestrator::{Allocation, send_record};
use crate::protocol::{Command, CommandKind, JobId};
use crate::session::{AllocationSession, SessionEvent};
use crate::transport::{self, Connection, Readiness, ReadinessTrigger, ShutdownHandle};

pub(crate) const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");

/// Client side of the allocation protocol, bound to one connection.
///
/// The client owns the socket, the receive session and the launcher-side
/// [`JobSubsystem`] that completed allocations are handed to. Dropping the
/// client finalizes it.
#[derive(Debug)]
pub struct AllocationClient<H> {
    pub(crate) connection: Option<Connection>,
    pub(crate) session: AllocationSession,
    pub(crate) trigger: ReadinessTrigger,
    pub(crate) host: H,
    pub(crate) last_job: Option<JobId>,
}

impl<H> AllocationClient<H> {
    /// Connects to the resource manager named by `config`.
    ///
    /// Fails with [`AllocationError::Configuration`] when the address or
    /// port is missing, and with a connection error when the socket cannot
    /// be created or connected.
    pub fn connect(config: &Config, host: H) -> Result<Self, AllocationError> {
        let endpoint = config.endpoint()?;
        Self::connect_to(&endpoint, host)
    }

    /// Connects to an explicit endpoint.
    pub fn connect_to(endpoint: &ResourceManagerEndpoint, host: H) -> Result<Self, AllocationError> {
        let connection = transport::connect(endpoint)?;
        let mut trigger = ReadinessTrigger::default();
        trigger.arm();
        info!(
            target: CLIENT_TARGET,
            endpoint = %endpoint,
            "allocation client initialised"
        );
        Ok(Self {
            connection: Some(connection),
            session: AllocationSession::new(),
            trigger,
            host,
            last_job: None,
        })
    }

    /// Receive-side session state.
    #[must_use]
    pub const fn session(&self) -> &AllocationSession {
        &self.session
    }

    /// Launcher-side job subsystem.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the job subsystem.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Whether the next readable event will be handled.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.trigger.is_armed()
    }

    /// Stops handling readable events until [`Self::resume`] is called.
    ///
    /// Bytes already queued stay on the socket for the next handled event.
    pub const fn suspend(&mut self) {
        self.trigger.disarm();
    }

    /// Registers for readable events again. Has no effect once finalized.
    pub const fn resume(&mut self) {
        if self.connection.is_some() {
            self.trigger.arm();
        }
    }

    /// Whether the connection is still open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Handle that cancels any in-progress wait by closing the socket.
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle, AllocationError> {
        self.open_connection()?
            .shutdown_handle()
            .map_err(|source| AllocationError::CancelHandle { source })
    }

    /// Blocks until the connection is readable or closed.
    pub fn wait_readable(&self) -> Result<Readiness, AllocationError> {
        self.open_connection()?
            .wait_readable()
            .map_err(|source| AllocationError::Receive {
                record: "readiness probe",
                source,
            })
    }

    /// Sends the terminate command and closes the connection.
    ///
    /// Best effort: a failed terminate write is logged and returned for
    /// reporting, but the socket is closed regardless. Calling this again is
    /// a no-op.
    pub fn finalize(&mut self) -> Option<AllocationError> {
        let mut connection = self.connection.take()?;
        let job_id = self.last_job.unwrap_or_default();
        info!(
            target: CLIENT_TARGET,
            job_id = %job_id,
            "sending the terminate command to the resource manager"
        );
        let report = send_record(&mut connection, &Command::new(CommandKind::Terminate, job_id)).err();
        if let Some(error) = &report {
            warn!(
                target: CLIENT_TARGET,
                error = %error,
                "terminate command was not delivered"
            );
        }
        self.trigger.disarm();
        if let Some(job) = self.session.reset() {
            debug!(
                target: CLIENT_TARGET,
                job_id = %job.id(),
                "released pending job on finalize"
            );
        }
        connection.close();
        report
    }

    fn open_connection(&self) -> Result<&Connection, AllocationError> {
        self.connection.as_ref().ok_or(AllocationError::Closed)
    }
}

impl<H> AllocationClient<H>
where
    H: JobSubsystem,
{
    /// Handles one readable event.
    ///
    /// Consumes exactly one record and re-arms the readiness trigger before
    /// returning, whether or not the record was accepted. Returns the
    /// allocation when the event completed a reply. A suspended client reads
    /// nothing and fails with [`AllocationError::NotArmed`].
    pub fn on_readable(&mut self) -> Result<Option<Allocation>, AllocationError> {
        let connection = self.connection.as_mut().ok_or(AllocationError::Closed)?;
        if !self.trigger.fire() {
            debug!(
                target: CLIENT_TARGET,
                "readable event dropped, client is suspended"
            );
            return Err(AllocationError::NotArmed);
        }
        let outcome = self.session.handle_readable(connection);
        self.trigger.arm();
        match outcome? {
            SessionEvent::ReplyComplete { job_id, nodes } => {
                self.on_allocation_complete(job_id, nodes).map(Some)
            }
            SessionEvent::ReplyStarted { .. } | SessionEvent::NodeAccepted { .. } => Ok(None),
        }
    }

    /// Waits for one readable event and handles it.
    ///
    /// A suspended client fails with [`AllocationError::NotArmed`] without
    /// waiting.
    pub fn dispatch_once(&mut self) -> Result<Option<Allocation>, AllocationError> {
        self.open_connection()?;
        if !self.trigger.is_armed() {
            return Err(AllocationError::NotArmed);
        }
        match self.wait_readable()? {
            Readiness::Closed => Err(AllocationError::PeerClosed),
            Readiness::Readable => self.on_readable(),
        }
    }

    /// Dispatches readable events until a reply completes.
    ///
    /// Returns [`AllocationError::PeerClosed`] when the connection closes
    /// first, including when it was cancelled through a [`ShutdownHandle`].
    pub fn run_until_allocated(&mut self) -> Result<Allocation, AllocationError> {
        loop {
            if let Some(allocation) = self.dispatch_once()? {
                return Ok(allocation);
            }
        }
    }
}

impl<H> Drop for AllocationClient<H> {
    fn drop(&mut self) {
        drop(self.finalize());
    }
}
