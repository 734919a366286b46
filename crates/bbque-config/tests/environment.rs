//! Environment layering for the resource manager endpoint.

use std::ffi::OsString;
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard};

use bbque_config::{Config, ENV_IP, ENV_PORT, EndpointError};
use once_cell::sync::Lazy;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Holds the environment lock and restores the touched variables on drop.
struct EnvScope {
    saved: Vec<(&'static str, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvScope {
    fn new() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self {
            saved: Vec::new(),
            _guard: guard,
        }
    }

    fn set(&mut self, key: &'static str, value: &str) {
        self.remember(key);
        // Environment mutation is unsafe in edition 2024; the mutex keeps
        // these tests from racing each other.
        unsafe { std::env::set_var(key, value) };
    }

    fn remove(&mut self, key: &'static str) {
        self.remember(key);
        unsafe { std::env::remove_var(key) };
    }

    fn remember(&mut self, key: &'static str) {
        if self.saved.iter().all(|(saved, _)| *saved != key) {
            self.saved.push((key, std::env::var_os(key)));
        }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            match previous {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

#[test]
fn endpoint_is_read_from_bbque_variables() {
    let mut env = EnvScope::new();
    env.set(ENV_IP, "127.0.0.1");
    env.set(ENV_PORT, "6543");

    let config = Config::load_from_environment().expect("configuration should load");
    let endpoint = config.endpoint().expect("endpoint should resolve");

    assert!(config.is_available());
    assert_eq!(endpoint.ip(), Ipv4Addr::LOCALHOST);
    assert_eq!(endpoint.port(), 6543);
}

#[test]
fn missing_port_disables_the_endpoint() {
    let mut env = EnvScope::new();
    env.set(ENV_IP, "127.0.0.1");
    env.remove(ENV_PORT);

    let config = Config::load_from_environment().expect("configuration should load");

    assert!(!config.is_available());
    assert_eq!(
        config.endpoint(),
        Err(EndpointError::MissingValue { name: ENV_PORT })
    );
}

#[test]
fn priority_override_is_honoured() {
    let mut env = EnvScope::new();
    env.set("BBQUE_PRIORITY", "40");

    let config = Config::load_from_environment().expect("configuration should load");

    assert_eq!(config.priority(), 40);
}
