use std::fmt;
use std::net::{AddrParseError, Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{ENV_IP, ENV_PORT};

const TCP_SCHEME: &str = "tcp://";

/// Address of the resource manager the allocation client connects to.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResourceManagerEndpoint {
    ip: Ipv4Addr,
    port: u16,
}

impl ResourceManagerEndpoint {
    /// Builds an endpoint from an address and a non-zero port.
    pub const fn new(ip: Ipv4Addr, port: u16) -> Result<Self, EndpointError> {
        if port == 0 {
            return Err(EndpointError::ZeroPort);
        }
        Ok(Self { ip, port })
    }

    /// Resolves the endpoint from the raw configuration values.
    ///
    /// A port of zero is treated as absent, matching how the launcher has
    /// always interpreted an unusable `BBQUE_PORT`.
    pub fn from_parts(ip: Option<&str>, port: Option<u16>) -> Result<Self, EndpointError> {
        let port = port
            .filter(|value| *value != 0)
            .ok_or(EndpointError::MissingValue { name: ENV_PORT })?;
        let raw_ip = ip
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(EndpointError::MissingValue { name: ENV_IP })?;
        let parsed = raw_ip
            .parse::<Ipv4Addr>()
            .map_err(|source| EndpointError::InvalidAddress {
                value: raw_ip.to_owned(),
                source,
            })?;
        Self::new(parsed, port)
    }

    /// IPv4 address of the resource manager.
    #[must_use]
    pub const fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// TCP port of the resource manager.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Socket address suitable for connecting.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.port)
    }
}

impl From<SocketAddrV4> for ResourceManagerEndpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Self {
            ip: *addr.ip(),
            port: addr.port(),
        }
    }
}

impl fmt::Display for ResourceManagerEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{TCP_SCHEME}{}:{}", self.ip, self.port)
    }
}

impl FromStr for ResourceManagerEndpoint {
    type Err = EndpointError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let Some(address) = input.strip_prefix(TCP_SCHEME) else {
            return Err(EndpointError::UnsupportedScheme(input.to_owned()));
        };
        let parsed = address
            .parse::<SocketAddrV4>()
            .map_err(|source| EndpointError::InvalidAddress {
                value: address.to_owned(),
                source,
            })?;
        Self::new(*parsed.ip(), parsed.port())
    }
}

/// Errors raised while resolving the resource manager endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// A required configuration value was not provided.
    #[error("required configuration value {name} is not set")]
    MissingValue {
        /// Name of the environment variable that was expected.
        name: &'static str,
    },
    /// The address could not be parsed as IPv4.
    #[error("invalid resource manager address '{value}': {source}")]
    InvalidAddress {
        /// Text that failed to parse.
        value: String,
        /// Parser diagnostic.
        #[source]
        source: AddrParseError,
    },
    /// Port zero cannot be connected to.
    #[error("resource manager port must be non-zero")]
    ZeroPort,
    /// Only `tcp://` endpoints are understood.
    #[error("unsupported endpoint scheme in '{0}'")]
    UnsupportedScheme(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn display_uses_tcp_scheme() {
        let endpoint = ResourceManagerEndpoint::new(Ipv4Addr::LOCALHOST, 9000)
            .expect("non-zero port should build");
        assert_eq!(endpoint.to_string(), "tcp://127.0.0.1:9000");
    }

    #[test]
    fn parses_display_form() {
        let endpoint: ResourceManagerEndpoint =
            "tcp://10.0.0.7:4242".parse().expect("endpoint should parse");
        assert_eq!(endpoint.ip(), Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(endpoint.port(), 4242);
    }

    #[rstest]
    #[case(None, Some(9000), ENV_IP)]
    #[case(Some("   "), Some(9000), ENV_IP)]
    #[case(Some("127.0.0.1"), None, ENV_PORT)]
    #[case(Some("127.0.0.1"), Some(0), ENV_PORT)]
    fn missing_parts_name_the_variable(
        #[case] ip: Option<&str>,
        #[case] port: Option<u16>,
        #[case] expected: &'static str,
    ) {
        let error = ResourceManagerEndpoint::from_parts(ip, port)
            .expect_err("incomplete endpoint must be rejected");
        assert_eq!(error, EndpointError::MissingValue { name: expected });
    }

    #[test]
    fn rejects_hostnames_in_place_of_ipv4() {
        let error = ResourceManagerEndpoint::from_parts(Some("bbque.local"), Some(9000))
            .expect_err("hostnames are not addresses");
        assert!(matches!(error, EndpointError::InvalidAddress { .. }));
    }

    #[test]
    fn rejects_unix_scheme() {
        let error = "unix:///tmp/bbque.sock"
            .parse::<ResourceManagerEndpoint>()
            .expect_err("unix endpoints are unsupported");
        assert!(matches!(error, EndpointError::UnsupportedScheme(_)));
    }
}
