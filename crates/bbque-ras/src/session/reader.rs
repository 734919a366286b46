//! Exact-size record reads.

use std::io::{self, Read};

use crate::errors::AllocationError;
use crate::protocol::WireRecord;

/// Reads exactly one `R` from `stream`, waiting for all of its bytes.
///
/// End of stream before the record is complete is a protocol violation and
/// is not retried.
pub(crate) fn read_record<R, S>(stream: &mut S) -> Result<R, AllocationError>
where
    R: WireRecord,
    S: Read + ?Sized,
{
    let mut buffer = vec![0_u8; R::SIZE];
    let filled = fill_buffer(stream, &mut buffer).map_err(|source| AllocationError::Receive {
        record: R::NAME,
        source,
    })?;
    if filled != R::SIZE {
        return Err(AllocationError::Protocol {
            record: R::NAME,
            expected: R::SIZE,
            actual: filled,
        });
    }
    R::decode(&buffer).map_err(AllocationError::from)
}

fn fill_buffer<S: Read + ?Sized>(stream: &mut S, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(remaining) = buffer.get_mut(filled..).filter(|rest| !rest.is_empty()) {
        match stream.read(remaining) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}
