//! Shared helpers for the client test suites.

use crate::testing::{FakeResourceManager, ServerStep};
use crate::{AllocationClient, AppContext, Job, JobId};

/// Job whose components request the given process counts.
pub(crate) fn job(id: u32, procs: &[u32]) -> Job {
    Job::with_apps(
        JobId::new(id),
        procs.iter().map(|count| Some(AppContext::new(*count))),
    )
}

/// Node names `nodeA`, `nodeB`, ... paired with `slots`.
pub(crate) fn lettered_nodes(count: usize, slots: i32) -> Vec<(String, i32)> {
    (b'A'..=b'Z')
        .take(count)
        .map(|letter| (format!("node{}", char::from(letter)), slots))
        .collect()
}

/// Script that reads one request and grants `nodes` to `job`.
pub(crate) fn granting(job: u32, nodes: &[(String, i32)]) -> Vec<ServerStep> {
    let borrowed: Vec<(&str, i32)> = nodes
        .iter()
        .map(|(name, slots)| (name.as_str(), *slots))
        .collect();
    vec![ServerStep::ExpectRequest, ServerStep::reply(job, &borrowed)]
}

/// Starts a fake resource manager playing `steps`.
pub(crate) fn serve(steps: Vec<ServerStep>) -> FakeResourceManager {
    FakeResourceManager::spawn(steps).expect("start fake resource manager")
}

/// Connects a client with `host` to `server`.
pub(crate) fn connect<H>(server: &FakeResourceManager, host: H) -> AllocationClient<H> {
    AllocationClient::connect(&server.config(), host).expect("connect to fake resource manager")
}
