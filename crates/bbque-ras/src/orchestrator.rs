//! Request issuing and allocation completion.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{AllocationClient, CLIENT_TARGET};
use crate::errors::AllocationError;
use crate::host::{AllocatedNode, Job, JobSubsystem};
use crate::protocol::{Command, CommandKind, JobId, JobRequest, WireRecord};

/// Result of issuing a request. Completion is always asynchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AllocationStatus {
    /// The request was sent; the reply arrives through readable events.
    Pending,
}

/// A completed allocation as handed to the job subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub job_id: JobId,
    pub nodes: Vec<AllocatedNode>,
}

impl<H> AllocationClient<H>
where
    H: JobSubsystem,
{
    /// Records `job` as pending and sends its node request.
    ///
    /// The requested slot count is the sum of the process counts of the
    /// job's present components. The job stays pending even when the send
    /// fails; re-request to retry.
    pub fn request_allocation(&mut self, job: Job) -> Result<AllocationStatus, AllocationError> {
        let connection = self.connection.as_mut().ok_or(AllocationError::Closed)?;
        let job_id = job.id();
        let request = JobRequest {
            job_id,
            slots_requested: job.slots_requested(),
        };
        if let Some(displaced) = self.session.begin(job) {
            warn!(
                target: CLIENT_TARGET,
                displaced = %displaced.id(),
                job_id = %job_id,
                "new request replaces a job that was still pending"
            );
        }
        self.last_job = Some(job_id);

        debug!(
            target: CLIENT_TARGET,
            job_id = %job_id,
            "sending the node request to the resource manager"
        );
        send_record(connection, &Command::new(CommandKind::NodesRequest, job_id))?;
        send_record(connection, &request)?;
        info!(
            target: CLIENT_TARGET,
            slots = request.slots_requested,
            job_id = %job_id,
            "requested slots for job"
        );
        Ok(AllocationStatus::Pending)
    }

    /// Hands a completed reply to the job subsystem.
    ///
    /// Unless the user chose an oversubscription directive, the mapping
    /// policy is forced to no-oversubscribe so no node receives more
    /// processes than the slots it was granted.
    pub(crate) fn on_allocation_complete(
        &mut self,
        reply_job: JobId,
        nodes: Vec<AllocatedNode>,
    ) -> Result<Allocation, AllocationError> {
        let job = self
            .session
            .take_pending()
            .ok_or(AllocationError::NoPendingJob { job_id: reply_job })?;
        let job_id = job.id();
        if reply_job != job_id {
            warn!(
                target: CLIENT_TARGET,
                pending = %job_id,
                reply = %reply_job,
                "reply job id differs from the pending job"
            );
        }

        self.host.insert_nodes(job_id, nodes.clone());
        if !self.host.oversubscription_given() {
            self.host.forbid_oversubscription();
        }
        self.host.mark_managed_allocation();
        self.host.allocation_complete(job_id);

        info!(
            target: CLIENT_TARGET,
            job_id = %job_id,
            nodes = nodes.len(),
            "job allocation complete"
        );
        Ok(Allocation { job_id, nodes })
    }
}

/// Writes one record and flushes it.
pub(crate) fn send_record<R, W>(stream: &mut W, record: &R) -> Result<(), AllocationError>
where
    R: WireRecord,
    W: Write + ?Sized,
{
    stream
        .write_all(&record.encode())
        .and_then(|()| stream.flush())
        .map_err(|source| AllocationError::Send {
            record: R::NAME,
            source,
        })
}
