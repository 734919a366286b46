//! Fixed-size binary records exchanged with the resource manager.
//!
//! Every message starts with a [`Command`] header whose kind decides what
//! follows: a [`JobRequest`] after `NodesRequest`, a run of [`ResourceItem`]
//! records after `NodesReply`, nothing after `Terminate`.
//!
//! Records are packed field by field with no padding and integers keep the
//! host's native byte order; both peers run on the same representation.

mod command;
mod errors;
mod hostname;
mod records;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::command::{Command, CommandKind};
pub use self::errors::CodecError;
pub use self::hostname::{HOSTNAME_CAPACITY, Hostname, MAX_HOSTNAME_LEN};
pub use self::records::{JobRequest, ResourceItem};

/// Identifier of the job a message refers to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct JobId(u32);

impl JobId {
    /// Wraps a raw job identifier.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw identifier as carried on the wire.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for JobId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A record with a fixed on-wire size.
pub trait WireRecord: Sized {
    /// Exact encoded length in bytes.
    const SIZE: usize;
    /// Human readable record name used in diagnostics.
    const NAME: &'static str;

    /// Appends the encoded record to `buffer`.
    fn encode_into(&self, buffer: &mut Vec<u8>);

    /// Decodes a record from a buffer of exactly [`Self::SIZE`] bytes.
    fn decode(bytes: &[u8]) -> Result<Self, CodecError>;

    /// Encodes the record into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::SIZE);
        self.encode_into(&mut buffer);
        buffer
    }
}

/// Sequential reader over a record buffer.
pub(crate) struct FieldReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Checks the buffer length against `R::SIZE` before reading.
    pub(crate) fn for_record<R: WireRecord>(bytes: &'a [u8]) -> Result<Self, CodecError> {
        if bytes.len() != R::SIZE {
            return Err(CodecError::Length {
                record: R::NAME,
                expected: R::SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let (head, tail) = self
            .bytes
            .split_first_chunk::<N>()
            .ok_or(CodecError::Truncated)?;
        self.bytes = tail;
        Ok(*head)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, CodecError> {
        self.array::<1>().map(|[byte]| byte)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CodecError> {
        self.array::<4>().map(u32::from_ne_bytes)
    }

    pub(crate) fn i32(&mut self) -> Result<i32, CodecError> {
        self.array::<4>().map(i32::from_ne_bytes)
    }
}
