//! Shared configuration for the bbque resource allocation client.
//!
//! Values are layered by [`ortho_config`]: defaults, configuration files,
//! `BBQUE_*` environment variables and finally command-line flags. The two
//! values the client cannot work without, `BBQUE_IP` and `BBQUE_PORT`, have no
//! defaults; [`Config::endpoint`] reports their absence so callers can treat
//! the allocation path as not applicable rather than broken.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod defaults;
mod endpoint;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PRIORITY, ENV_IP, ENV_PORT, default_log_format,
};
pub use endpoint::{EndpointError, ResourceManagerEndpoint};
pub use logging::{LogFormat, LogFormatParseError};

/// Configuration consumed by the allocation client and its tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "BBQUE")]
pub struct Config {
    /// IPv4 address of the resource manager.
    pub ip: Option<String>,
    /// TCP port of the resource manager.
    pub port: Option<u16>,
    /// Selection priority advertised when the resource manager is configured.
    pub priority: Option<i32>,
    /// `tracing` filter expression.
    pub log_filter: Option<String>,
    /// Log output format.
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Loads configuration from files and the environment only.
    ///
    /// The host process owns its command line, so only the program name is
    /// handed to the loader.
    pub fn load_from_environment() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter([OsString::from(env!("CARGO_PKG_NAME"))])
    }

    /// Resolves the resource manager endpoint, failing when either required
    /// value is missing or malformed.
    pub fn endpoint(&self) -> Result<ResourceManagerEndpoint, EndpointError> {
        ResourceManagerEndpoint::from_parts(self.ip.as_deref(), self.port)
    }

    /// Whether both endpoint values were supplied.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.ip.is_some() && self.port.is_some()
    }

    /// Selection priority, defaulting to [`DEFAULT_PRIORITY`].
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    /// Filter expression for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Output format for the tracing subscriber.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Builds a configuration pointing at an explicit endpoint.
    #[must_use]
    pub fn for_endpoint(endpoint: ResourceManagerEndpoint) -> Self {
        Self {
            ip: Some(endpoint.ip().to_string()),
            port: Some(endpoint.port()),
            ..Self::default()
        }
    }
}
