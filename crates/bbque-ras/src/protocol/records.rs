//! Request and reply bodies.

use super::{CodecError, FieldReader, HOSTNAME_CAPACITY, Hostname, JobId, WireRecord};

/// Allocation request sent after a `NodesRequest` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRequest {
    pub job_id: JobId,
    pub slots_requested: u32,
}

impl WireRecord for JobRequest {
    const SIZE: usize = 8;
    const NAME: &'static str = "job request";

    fn encode_into(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.job_id.get().to_ne_bytes());
        buffer.extend_from_slice(&self.slots_requested.to_ne_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = FieldReader::for_record::<Self>(bytes)?;
        Ok(Self {
            job_id: JobId::new(reader.u32()?),
            slots_requested: reader.u32()?,
        })
    }
}

/// One granted host, streamed after a `NodesReply` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceItem {
    pub job_id: JobId,
    pub hostname: Hostname,
    pub slots_available: i32,
    /// False on the last item of a reply.
    pub more_items: bool,
}

impl ResourceItem {
    /// Whether this item closes the reply sequence.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        !self.more_items
    }
}

impl WireRecord for ResourceItem {
    const SIZE: usize = 4 + HOSTNAME_CAPACITY + 4 + 1;
    const NAME: &'static str = "resource item";

    fn encode_into(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.job_id.get().to_ne_bytes());
        self.hostname.write_field(buffer);
        buffer.extend_from_slice(&self.slots_available.to_ne_bytes());
        buffer.push(u8::from(self.more_items));
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = FieldReader::for_record::<Self>(bytes)?;
        let job_id = JobId::new(reader.u32()?);
        let hostname = Hostname::from_field(&reader.array::<HOSTNAME_CAPACITY>()?)?;
        let slots_available = reader.i32()?;
        let more_items = reader.u8()? != 0;
        Ok(Self {
            job_id,
            hostname,
            slots_available,
            more_items,
        })
    }
}
