//! Allocation session and its two-state receive logic.

use std::io::Read;

use tracing::{debug, warn};

use super::{NodeList, ProtocolState, SESSION_TARGET, read_record};
use crate::errors::AllocationError;
use crate::host::{AllocatedNode, Job};
use crate::protocol::{Command, CommandKind, JobId, ResourceItem};

/// Progress reported after one readable event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A reply header arrived; resource items follow.
    ReplyStarted { job_id: JobId },
    /// A non-terminal item was accumulated.
    NodeAccepted { received: usize },
    /// The terminal item arrived. `nodes` holds the whole reply.
    ReplyComplete {
        job_id: JobId,
        nodes: Vec<AllocatedNode>,
    },
}

/// State tying a pending request to its accumulating reply.
#[derive(Debug, Default)]
pub struct AllocationSession {
    pending_job: Option<Job>,
    nodes: NodeList,
    state: ProtocolState,
}

impl AllocationSession {
    /// Fresh session awaiting a command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What the session expects next.
    #[must_use]
    pub const fn state(&self) -> ProtocolState {
        self.state
    }

    /// Job waiting for its allocation, if any.
    #[must_use]
    pub const fn pending_job(&self) -> Option<&Job> {
        self.pending_job.as_ref()
    }

    /// Nodes accumulated in the reply currently being received.
    #[must_use]
    pub const fn nodes(&self) -> &NodeList {
        &self.nodes
    }

    /// Records `job` as pending, returning any job it displaces.
    pub fn begin(&mut self, job: Job) -> Option<Job> {
        self.pending_job.replace(job)
    }

    /// Removes and returns the pending job.
    pub fn take_pending(&mut self) -> Option<Job> {
        self.pending_job.take()
    }

    /// Drops all cycle state, returning the pending job if there was one.
    pub fn reset(&mut self) -> Option<Job> {
        self.abandon_cycle();
        self.pending_job.take()
    }

    /// Consumes exactly one record from `stream`.
    ///
    /// On error the partial reply is discarded and the session returns to
    /// [`ProtocolState::AwaitingCommand`]; the pending job stays pending.
    pub fn handle_readable<S>(&mut self, stream: &mut S) -> Result<SessionEvent, AllocationError>
    where
        S: Read + ?Sized,
    {
        let outcome = match self.state {
            ProtocolState::AwaitingCommand => self.receive_command(stream),
            ProtocolState::AwaitingNodeItems => self.receive_item(stream),
        };
        if let Err(error) = &outcome {
            warn!(
                target: SESSION_TARGET,
                error = %error,
                state = ?self.state,
                "abandoning allocation cycle"
            );
            self.abandon_cycle();
        }
        outcome
    }

    fn receive_command<S>(&mut self, stream: &mut S) -> Result<SessionEvent, AllocationError>
    where
        S: Read + ?Sized,
    {
        let command: Command = read_record(stream)?;
        match command.kind {
            CommandKind::NodesReply => {
                debug!(
                    target: SESSION_TARGET,
                    job_id = %command.job_id,
                    "resource manager sent nodes reply, expecting node data"
                );
                self.state = ProtocolState::AwaitingNodeItems;
                Ok(SessionEvent::ReplyStarted {
                    job_id: command.job_id,
                })
            }
            other => Err(AllocationError::UnknownCommand {
                kind: other.as_u8(),
            }),
        }
    }

    fn receive_item<S>(&mut self, stream: &mut S) -> Result<SessionEvent, AllocationError>
    where
        S: Read + ?Sized,
    {
        let item: ResourceItem = read_record(stream)?;
        let job_id = item.job_id;
        let last = item.is_last();
        debug!(
            target: SESSION_TARGET,
            job_id = %job_id,
            hostname = %item.hostname,
            slots = item.slots_available,
            last,
            "received resource item"
        );
        self.nodes.push(item);
        if last {
            self.state = ProtocolState::AwaitingCommand;
            return Ok(SessionEvent::ReplyComplete {
                job_id,
                nodes: self.nodes.take(),
            });
        }
        Ok(SessionEvent::NodeAccepted {
            received: self.nodes.len(),
        })
    }

    fn abandon_cycle(&mut self) {
        self.state = ProtocolState::AwaitingCommand;
        self.nodes.clear();
    }
}
