//! Log output for the allocation client.
//!
//! The client runs inside a launcher process that owns stdout, so events are
//! always written to stderr. The global subscriber is installed at most once
//! per process; later calls report the format that won.

use std::io::{self, IsTerminal};

use bbque_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, debug, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use crate::component::COMPONENT_NAME;

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that a subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format of the installed subscriber.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },
    /// Another subscriber was installed outside this module.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the stderr subscriber described by `config`.
///
/// Only the first successful call installs anything. Later calls, whatever
/// their configuration, return a handle describing the subscriber already in
/// place.
///
/// # Examples
///
/// ```rust
/// use bbque_config::{Config, LogFormat};
/// use bbque_ras::telemetry;
///
/// # fn main() -> Result<(), bbque_ras::TelemetryError> {
/// let compact = Config {
///     log_format: Some(LogFormat::Compact),
///     log_filter: Some("bbque_ras=debug".to_owned()),
///     ..Config::default()
/// };
/// let handle = telemetry::initialise(&compact)?;
/// assert_eq!(handle.format(), LogFormat::Compact);
///
/// // The launcher asking again with defaults keeps the compact subscriber.
/// let again = telemetry::initialise(&Config::default())?;
/// assert_eq!(again.format(), LogFormat::Compact);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let format = INSTALLED_FORMAT.get_or_try_init(|| {
        let subscriber = build_subscriber(config)?;
        tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
        debug!(
            target: TELEMETRY_TARGET,
            component = COMPONENT_NAME,
            format = %config.log_format(),
            filter = config.log_filter(),
            "telemetry initialised"
        );
        Ok::<_, TelemetryError>(config.log_format())
    })?;
    Ok(TelemetryHandle { format: *format })
}

fn parse_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter {
        filter: expression.to_owned(),
        message: error.to_string(),
    })
}

fn build_subscriber(config: &Config) -> Result<BoxedSubscriber, TelemetryError> {
    let base = fmt::Subscriber::builder()
        .with_env_filter(parse_filter(config.log_filter())?)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().with_target(true).finish()),
    })
}
