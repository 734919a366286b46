//! Behavioural tests for a full allocation cycle against a fake resource
//! manager.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{connect, granting, job, lettered_nodes, serve};
use crate::protocol::{Command, CommandKind, ResourceItem, WireRecord};
use crate::testing::{FakeResourceManager, ServerStep, Transcript};
use crate::{
    Allocation, AllocationClient, AllocationError, InMemoryJobSubsystem, JobId, Oversubscribe,
    ProtocolState,
};

#[derive(Default)]
struct AllocationWorld {
    client: Option<AllocationClient<InMemoryJobSubsystem>>,
    server: Option<FakeResourceManager>,
    allocation: Option<Allocation>,
    error: Option<AllocationError>,
    transcript: Option<Transcript>,
}

impl AllocationWorld {
    fn start_server(&mut self, steps: Vec<ServerStep>) {
        self.server = Some(serve(steps));
    }

    fn client(&mut self) -> &mut AllocationClient<InMemoryJobSubsystem> {
        if self.client.is_none() {
            let server = self.server.as_ref().expect("server should be running");
            self.client = Some(connect(server, InMemoryJobSubsystem::new()));
        }
        self.client.as_mut().expect("client connected above")
    }

    fn record(&mut self, outcome: Result<Option<Allocation>, AllocationError>) {
        match outcome {
            Ok(allocation) => {
                self.allocation = allocation;
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
    }

    /// Finalizes the client and collects what the server saw.
    fn transcript(&mut self) -> &Transcript {
        if self.transcript.is_none() {
            if let Some(client) = self.client.as_mut() {
                drop(client.finalize());
            }
            let server = self.server.take().expect("server should be running");
            self.transcript = Some(server.finish().expect("server transcript"));
        }
        self.transcript.as_ref().expect("transcript collected above")
    }
}

impl Drop for AllocationWorld {
    fn drop(&mut self) {
        if let Some(mut client) = self.client.take() {
            drop(client.finalize());
        }
        self.server = None;
    }
}

#[fixture]
fn world() -> RefCell<AllocationWorld> {
    RefCell::new(AllocationWorld::default())
}

#[given("a resource manager granting {count} nodes of {slots} slots to job {job}")]
fn given_granting_manager(world: &RefCell<AllocationWorld>, count: usize, slots: i32, job: u32) {
    world
        .borrow_mut()
        .start_server(granting(job, &lettered_nodes(count, slots)));
}

#[given("a resource manager answering with command kind {kind}")]
fn given_unknown_command(world: &RefCell<AllocationWorld>, kind: u8) {
    world
        .borrow_mut()
        .start_server(vec![ServerStep::ExpectRequest, ServerStep::command(kind, 0)]);
}

#[given("a resource manager truncating the first resource item")]
fn given_truncating_manager(world: &RefCell<AllocationWorld>) {
    let mut bytes = Command::new(CommandKind::NodesReply, JobId::new(42)).encode();
    bytes.extend_from_slice(&[0_u8; ResourceItem::SIZE - 10]);
    world.borrow_mut().start_server(vec![
        ServerStep::ExpectRequest,
        ServerStep::Send(bytes),
        ServerStep::Disconnect,
    ]);
}

#[when("the launcher requests processes {first} and {second} for job {id}")]
fn when_launcher_requests(world: &RefCell<AllocationWorld>, first: u32, second: u32, id: u32) {
    let mut world = world.borrow_mut();
    let _ = world
        .client()
        .request_allocation(job(id, &[first, second]))
        .expect("send request");
}

#[when("the launcher waits for the allocation")]
fn when_launcher_waits(world: &RefCell<AllocationWorld>) {
    let mut world = world.borrow_mut();
    let outcome = world.client().run_until_allocated().map(Some);
    world.record(outcome);
}

#[when("the launcher handles one readable event")]
fn when_launcher_handles_event(world: &RefCell<AllocationWorld>) {
    let mut world = world.borrow_mut();
    let outcome = world.client().dispatch_once();
    world.record(outcome);
}

#[when("the launcher suspends readable events")]
fn when_launcher_suspends(world: &RefCell<AllocationWorld>) {
    world.borrow_mut().client().suspend();
}

#[when("the launcher resumes readable events")]
fn when_launcher_resumes(world: &RefCell<AllocationWorld>) {
    world.borrow_mut().client().resume();
}

#[then("the allocation fails because the client is suspended")]
fn then_fails_suspended(world: &RefCell<AllocationWorld>) {
    let world = world.borrow();
    assert!(
        matches!(world.error, Some(AllocationError::NotArmed)),
        "unexpected outcome: {:?}",
        world.error
    );
}

#[then("the allocation lists {count} nodes of {slots} slots")]
fn then_allocation_lists(world: &RefCell<AllocationWorld>, count: usize, slots: i32) {
    let world = world.borrow();
    assert!(world.error.is_none(), "unexpected error: {:?}", world.error);
    let allocation = world.allocation.as_ref().expect("allocation should complete");
    assert_eq!(allocation.nodes.len(), count);
    assert!(allocation.nodes.iter().all(|node| node.slots == slots));
    let names: Vec<String> = allocation
        .nodes
        .iter()
        .map(|node| node.name.to_string())
        .collect();
    let expected: Vec<String> = lettered_nodes(count, slots)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, expected);
}

#[then("oversubscription is forbidden for the managed allocation")]
fn then_oversubscription_forbidden(world: &RefCell<AllocationWorld>) {
    let world = world.borrow();
    let host = world.client.as_ref().expect("client connected").host();
    assert_eq!(host.oversubscribe(), Some(Oversubscribe::Forbidden));
    assert!(host.is_managed());
}

#[then("the resource manager saw a request for {slots} slots for job {id}")]
fn then_manager_saw_request(world: &RefCell<AllocationWorld>, slots: u32, id: u32) {
    let mut world = world.borrow_mut();
    let transcript = world.transcript();
    let [(command, request)] = transcript.requests.as_slice() else {
        panic!("expected one request, got {:?}", transcript.requests);
    };
    assert_eq!(*command, Command::new(CommandKind::NodesRequest, JobId::new(id)));
    assert_eq!(request.job_id, JobId::new(id));
    assert_eq!(request.slots_requested, slots);
}

#[then("the resource manager saw a terminate for job {id}")]
fn then_manager_saw_terminate(world: &RefCell<AllocationWorld>, id: u32) {
    let mut world = world.borrow_mut();
    assert_eq!(
        world.transcript().trailing_commands,
        [Command::new(CommandKind::Terminate, JobId::new(id))]
    );
}

#[then("the allocation fails with an unknown command {kind}")]
fn then_fails_unknown_command(world: &RefCell<AllocationWorld>, kind: u8) {
    let world = world.borrow();
    assert!(
        matches!(
            world.error,
            Some(AllocationError::UnknownCommand { kind: seen }) if seen == kind
        ),
        "unexpected outcome: {:?}",
        world.error
    );
}

#[then("the allocation fails with a short read of {actual} bytes")]
fn then_fails_short_read(world: &RefCell<AllocationWorld>, actual: usize) {
    let world = world.borrow();
    assert!(
        matches!(
            world.error,
            Some(AllocationError::Protocol { expected, actual: seen, .. })
                if expected == ResourceItem::SIZE && seen == actual
        ),
        "unexpected outcome: {:?}",
        world.error
    );
}

#[then("the session is awaiting a command")]
fn then_session_awaiting_command(world: &RefCell<AllocationWorld>) {
    let world = world.borrow();
    let client = world.client.as_ref().expect("client connected");
    assert_eq!(client.session().state(), ProtocolState::AwaitingCommand);
    assert!(client.session().nodes().is_empty());
}

#[then("the launcher is still registered for readable events")]
fn then_launcher_still_registered(world: &RefCell<AllocationWorld>) {
    let world = world.borrow();
    assert!(world.client.as_ref().expect("client connected").is_armed());
}

#[then("job {id} is still pending")]
fn then_job_still_pending(world: &RefCell<AllocationWorld>, id: u32) {
    let world = world.borrow();
    let client = world.client.as_ref().expect("client connected");
    assert_eq!(
        client.session().pending_job().map(crate::Job::id),
        Some(JobId::new(id))
    );
}

#[scenario(
    path = "tests/features/allocation_cycle.feature",
    name = "A two-node reply completes the pending job"
)]
fn two_node_reply(world: RefCell<AllocationWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/allocation_cycle.feature",
    name = "A single-item reply completes immediately"
)]
fn single_item_reply(world: RefCell<AllocationWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/allocation_cycle.feature",
    name = "A suspended launcher does not consume the reply"
)]
fn suspended_launcher(world: RefCell<AllocationWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/allocation_cycle.feature",
    name = "An unknown command is rejected"
)]
fn unknown_command(world: RefCell<AllocationWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/allocation_cycle.feature",
    name = "A truncated resource item is a protocol error"
)]
fn truncated_item(world: RefCell<AllocationWorld>) {
    drop(world);
}
