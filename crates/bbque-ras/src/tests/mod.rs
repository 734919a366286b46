//! Test suites for the allocation client.

mod allocation_behaviour;
mod support;
