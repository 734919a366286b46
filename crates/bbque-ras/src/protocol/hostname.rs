//! Bounded hostname carried in resource items.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CodecError;

/// Size of the hostname field on the wire, terminator included.
pub const HOSTNAME_CAPACITY: usize = 256;

/// Longest hostname that still leaves room for the terminator.
pub const MAX_HOSTNAME_LEN: usize = HOSTNAME_CAPACITY - 1;

/// Hostname guaranteed to fit the fixed wire field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hostname(String);

impl Hostname {
    /// Validates `name` against the wire limits.
    pub fn new(name: impl Into<String>) -> Result<Self, CodecError> {
        let name = name.into();
        if name.len() > MAX_HOSTNAME_LEN {
            return Err(CodecError::HostnameTooLong {
                len: name.len(),
                max: MAX_HOSTNAME_LEN,
            });
        }
        if name.as_bytes().contains(&0) {
            return Err(CodecError::HostnameContainsNul);
        }
        Ok(Self(name))
    }

    /// Reads the NUL-terminated name out of a wire field.
    pub(crate) fn from_field(field: &[u8; HOSTNAME_CAPACITY]) -> Result<Self, CodecError> {
        let end = field
            .iter()
            .position(|byte| *byte == 0)
            .ok_or(CodecError::UnterminatedHostname)?;
        let (name, _) = field.split_at(end);
        let text = std::str::from_utf8(name).map_err(|_| CodecError::InvalidHostname)?;
        Ok(Self(text.to_owned()))
    }

    /// Writes the name followed by zero padding up to the field capacity.
    pub(crate) fn write_field(&self, buffer: &mut Vec<u8>) {
        let bytes = self.0.as_bytes();
        buffer.extend_from_slice(bytes);
        buffer.resize(buffer.len() + HOSTNAME_CAPACITY - bytes.len(), 0);
    }

    /// The hostname text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for Hostname {
    type Err = CodecError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::new(input)
    }
}

impl TryFrom<String> for Hostname {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Hostname> for String {
    fn from(value: Hostname) -> Self {
        value.0
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
