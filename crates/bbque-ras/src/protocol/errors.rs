//! Codec failures.

use thiserror::Error;

/// Errors produced while encoding or decoding wire records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer length does not match the record's fixed size.
    #[error("{record} record must be {expected} bytes, got {actual}")]
    Length {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Ran out of bytes while reading a field.
    #[error("record ended before all fields were read")]
    Truncated,
    /// The command header carried a kind outside the protocol.
    #[error("unknown command kind {0}")]
    UnknownCommand(u8),
    /// The hostname field filled its capacity without a terminator.
    #[error("hostname field is not NUL terminated")]
    UnterminatedHostname,
    /// The hostname bytes were not valid UTF-8.
    #[error("hostname is not valid UTF-8")]
    InvalidHostname,
    /// A hostname longer than the wire field allows.
    #[error("hostname of {len} bytes exceeds the {max} byte limit")]
    HostnameTooLong { len: usize, max: usize },
    /// A hostname with an embedded NUL byte.
    #[error("hostname contains a NUL byte")]
    HostnameContainsNul,
}
