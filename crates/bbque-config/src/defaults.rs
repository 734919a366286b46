use crate::logging::LogFormat;

/// Environment variable carrying the resource manager's IPv4 address.
pub const ENV_IP: &str = "BBQUE_IP";

/// Environment variable carrying the resource manager's TCP port.
pub const ENV_PORT: &str = "BBQUE_PORT";

/// Selection priority reported when the resource manager is reachable.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
