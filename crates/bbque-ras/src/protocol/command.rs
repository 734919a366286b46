//! Message header.

use super::{CodecError, FieldReader, JobId, WireRecord};

/// Kinds of command understood by the protocol.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Client asks for nodes; a [`super::JobRequest`] follows.
    NodesRequest = 0,
    /// Server grants nodes; resource items follow.
    NodesReply = 1,
    /// Client is shutting down; nothing follows.
    Terminate = 2,
}

impl CommandKind {
    /// Wire value of the kind.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CommandKind {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NodesRequest),
            1 => Ok(Self::NodesReply),
            2 => Ok(Self::Terminate),
            other => Err(CodecError::UnknownCommand(other)),
        }
    }
}

/// Header sent before every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub job_id: JobId,
    pub kind: CommandKind,
    /// Reserved; always zero when sent.
    pub flags: u8,
}

impl Command {
    /// Builds a header with cleared flags.
    #[must_use]
    pub const fn new(kind: CommandKind, job_id: JobId) -> Self {
        Self {
            job_id,
            kind,
            flags: 0,
        }
    }
}

impl WireRecord for Command {
    const SIZE: usize = 6;
    const NAME: &'static str = "command";

    fn encode_into(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.job_id.get().to_ne_bytes());
        buffer.push(self.kind.as_u8());
        buffer.push(self.flags);
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = FieldReader::for_record::<Self>(bytes)?;
        let job_id = JobId::new(reader.u32()?);
        let kind = CommandKind::try_from(reader.u8()?)?;
        let flags = reader.u8()?;
        Ok(Self {
            job_id,
            kind,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CommandKind::NodesRequest)]
    #[case(CommandKind::NodesReply)]
    #[case(CommandKind::Terminate)]
    fn round_trips_every_kind(#[case] kind: CommandKind) {
        let command = Command::new(kind, JobId::new(42));
        let bytes = command.encode();
        assert_eq!(bytes.len(), Command::SIZE);
        assert_eq!(Command::decode(&bytes), Ok(command));
    }

    #[test]
    fn layout_is_packed_in_field_order() {
        let bytes = Command::new(CommandKind::NodesReply, JobId::new(7)).encode();
        let mut expected = 7_u32.to_ne_bytes().to_vec();
        expected.extend_from_slice(&[1, 0]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn unknown_kind_is_reported_with_its_value() {
        let mut bytes = Command::new(CommandKind::NodesReply, JobId::new(1)).encode();
        bytes[4] = 99;
        assert_eq!(Command::decode(&bytes), Err(CodecError::UnknownCommand(99)));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let error = Command::decode(&[0, 0, 0]).expect_err("three bytes cannot hold a command");
        assert_eq!(
            error,
            CodecError::Length {
                record: "command",
                expected: 6,
                actual: 3
            }
        );
    }
}
