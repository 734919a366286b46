//! Integration tests for the `bbque-alloc` binary entry point.

use assert_cmd::cargo::cargo_bin_cmd;
use bbque_ras::testing::{FakeResourceManager, ServerStep};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn missing_endpoint_exits_with_status_two() {
    let mut command = cargo_bin_cmd!("bbque-alloc");
    command
        .env_remove("BBQUE_IP")
        .env_remove("BBQUE_PORT")
        .args(["--job-id", "1", "--np", "1"]);
    command
        .assert()
        .code(2)
        .stderr(contains("not configured"));
}

#[test]
fn missing_np_is_a_usage_error() {
    let mut command = cargo_bin_cmd!("bbque-alloc");
    command.args(["--job-id", "1"]);
    command.assert().failure().stderr(contains("--np"));
}

#[test]
fn allocates_against_a_resource_manager() -> anyhow::Result<()> {
    let server = FakeResourceManager::spawn(vec![
        ServerStep::ExpectRequest,
        ServerStep::reply(42, &[("nodeA", 4), ("nodeB", 4)]),
    ])?;
    let endpoint = server.endpoint();

    let mut command = cargo_bin_cmd!("bbque-alloc");
    command
        .env("BBQUE_IP", endpoint.ip().to_string())
        .env("BBQUE_PORT", endpoint.port().to_string())
        .env("BBQUE_LOG_FILTER", "off")
        .args(["--job-id", "42", "--np", "4", "--np", "4"]);
    command
        .assert()
        .success()
        .stdout(contains("\"nodeA\"").and(contains("\"nodeB\"")));

    let transcript = server.finish()?;
    assert_eq!(transcript.requests.len(), 1);
    Ok(())
}
