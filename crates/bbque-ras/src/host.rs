//! Boundary with the launcher's job and node bookkeeping.
//!
//! The allocation engine only needs a job descriptor to size the request and
//! somewhere to hand the granted nodes. [`JobSubsystem`] is that somewhere;
//! [`InMemoryJobSubsystem`] is a self-contained implementation used by the
//! command-line tool and the tests.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::protocol::{Hostname, JobId};

/// One application component of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppContext {
    /// Processes requested for this component.
    pub num_procs: u32,
}

impl AppContext {
    /// Component asking for `num_procs` processes.
    #[must_use]
    pub const fn new(num_procs: u32) -> Self {
        Self { num_procs }
    }
}

/// Job descriptor as seen by the allocation engine.
///
/// Components live in a slot array that may contain holes; empty slots are
/// skipped when sizing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    apps: Vec<Option<AppContext>>,
}

impl Job {
    /// Job without any components.
    #[must_use]
    pub const fn new(id: JobId) -> Self {
        Self {
            id,
            apps: Vec::new(),
        }
    }

    /// Job built from a slot array of components.
    pub fn with_apps(id: JobId, apps: impl IntoIterator<Item = Option<AppContext>>) -> Self {
        Self {
            id,
            apps: apps.into_iter().collect(),
        }
    }

    /// Appends a component.
    pub fn push_app(&mut self, app: AppContext) {
        self.apps.push(Some(app));
    }

    /// Job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Component slots, holes included.
    #[must_use]
    pub fn apps(&self) -> &[Option<AppContext>] {
        &self.apps
    }

    /// Total processes requested across the present components.
    #[must_use]
    pub fn slots_requested(&self) -> u32 {
        self.apps
            .iter()
            .flatten()
            .fold(0_u32, |total, app| total.saturating_add(app.num_procs))
    }
}

/// Lifecycle state of a node handed to the launcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    #[default]
    Unknown,
    Up,
}

/// A node granted by the resource manager, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocatedNode {
    pub name: Hostname,
    pub slots: i32,
    pub slots_inuse: i32,
    pub slots_max: i32,
    pub state: NodeState,
}

impl AllocatedNode {
    /// Fresh node record: up, nothing placed yet, no hard slot ceiling.
    #[must_use]
    pub const fn granted(name: Hostname, slots: i32) -> Self {
        Self {
            name,
            slots,
            slots_inuse: 0,
            slots_max: 0,
            state: NodeState::Up,
        }
    }
}

/// Oversubscription directive of the launcher's mapping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Oversubscribe {
    Allowed,
    Forbidden,
}

/// Launcher-side consumer of completed allocations.
#[cfg_attr(test, mockall::automock)]
pub trait JobSubsystem {
    /// Inserts the granted nodes as the job's allocation, in arrival order.
    fn insert_nodes(&mut self, job: JobId, nodes: Vec<AllocatedNode>);

    /// Whether the user explicitly chose an oversubscription directive.
    fn oversubscription_given(&self) -> bool;

    /// Forces the no-oversubscribe directive.
    fn forbid_oversubscription(&mut self);

    /// Flags the allocation as managed by an external resource manager.
    fn mark_managed_allocation(&mut self);

    /// Signals that allocation for `job` is complete.
    fn allocation_complete(&mut self, job: JobId);
}

impl<T> JobSubsystem for &mut T
where
    T: JobSubsystem + ?Sized,
{
    fn insert_nodes(&mut self, job: JobId, nodes: Vec<AllocatedNode>) {
        (**self).insert_nodes(job, nodes);
    }

    fn oversubscription_given(&self) -> bool {
        (**self).oversubscription_given()
    }

    fn forbid_oversubscription(&mut self) {
        (**self).forbid_oversubscription();
    }

    fn mark_managed_allocation(&mut self) {
        (**self).mark_managed_allocation();
    }

    fn allocation_complete(&mut self, job: JobId) {
        (**self).allocation_complete(job);
    }
}

/// Job subsystem that keeps everything in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryJobSubsystem {
    allocations: BTreeMap<JobId, Vec<AllocatedNode>>,
    oversubscribe: Option<Oversubscribe>,
    managed: bool,
    completed: Vec<JobId>,
}

impl InMemoryJobSubsystem {
    /// Subsystem with no directive set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subsystem where the user already chose an oversubscription directive.
    #[must_use]
    pub fn with_oversubscribe(directive: Oversubscribe) -> Self {
        Self {
            oversubscribe: Some(directive),
            ..Self::default()
        }
    }

    /// Nodes inserted for `job`.
    #[must_use]
    pub fn nodes(&self, job: JobId) -> Option<&[AllocatedNode]> {
        self.allocations.get(&job).map(Vec::as_slice)
    }

    /// Current oversubscription directive, if any.
    #[must_use]
    pub const fn oversubscribe(&self) -> Option<Oversubscribe> {
        self.oversubscribe
    }

    /// Whether the allocation was flagged as externally managed.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.managed
    }

    /// Jobs whose allocation completed, in completion order.
    #[must_use]
    pub fn completed(&self) -> &[JobId] {
        &self.completed
    }
}

impl JobSubsystem for InMemoryJobSubsystem {
    fn insert_nodes(&mut self, job: JobId, nodes: Vec<AllocatedNode>) {
        self.allocations.entry(job).or_default().extend(nodes);
    }

    fn oversubscription_given(&self) -> bool {
        self.oversubscribe.is_some()
    }

    fn forbid_oversubscription(&mut self) {
        self.oversubscribe = Some(Oversubscribe::Forbidden);
    }

    fn mark_managed_allocation(&mut self) {
        self.managed = true;
    }

    fn allocation_complete(&mut self, job: JobId) {
        self.completed.push(job);
    }
}
