/*!
 The optional byte count and version that precede a record body.

 On the wire a header is a big-endian `u32` byte count with [`K_BYTE_COUNT_MASK`] set,
 followed by a `u16` version. The count covers the version field and everything after it,
 but not the count field itself.
*/

use tracing::warn;

use crate::{
    error::{cursor::CursorError, record::RecordError},
    util::{
        constants::{K_BYTE_COUNT_MASK, K_STREAMED_MEMBERWISE},
        context::Context,
        cursor::Cursor,
    },
};

/// Size of the byte count field
const NUM_BYTES_SIZE: usize = 4;
/// Size of the version field, which the byte count includes
const VERSION_SIZE: usize = 2;
/// Strings at least this long need the 4-byte length form
const LONG_LENGTH: usize = 255;

/// A decoded record header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Number of bytes after the count field, if a count was present
    pub num_bytes: Option<u32>,
    /// The record version, with the memberwise bit removed
    pub version: u16,
    /// Whether the members were streamed memberwise
    pub is_memberwise: bool,
}

/// Read the byte count (if present) and version at the cursor
pub fn read_numbytes_version(cursor: &mut Cursor<'_>) -> Result<Header, CursorError> {
    // A version-only header may sit within 4 bytes of the end of the chunk
    let num_bytes = match cursor.peek_field::<u32>() {
        Ok(count) if count & K_BYTE_COUNT_MASK != 0 => {
            cursor.skip(NUM_BYTES_SIZE);
            Some(count & !K_BYTE_COUNT_MASK)
        }
        _ => None,
    };

    let mut version = cursor.field::<u16>()?;
    let is_memberwise = version & K_STREAMED_MEMBERWISE != 0;
    if is_memberwise {
        version &= !K_STREAMED_MEMBERWISE;
    }

    Ok(Header {
        num_bytes,
        version,
        is_memberwise,
    })
}

/// Verify that a record spanning `start..stop` consumed exactly the bytes its header declared
///
/// When [`Context::check_num_bytes`] is off, a mismatch is logged and tolerated.
pub fn check_num_bytes(
    start: usize,
    stop: usize,
    num_bytes: Option<u32>,
    class: &str,
    ctx: &Context,
) -> Result<(), RecordError> {
    let Some(num_bytes) = num_bytes else {
        return Ok(());
    };

    let expected = num_bytes as usize + NUM_BYTES_SIZE;
    let observed = stop.saturating_sub(start);
    if observed == expected {
        return Ok(());
    }

    if ctx.check_num_bytes {
        return Err(RecordError::NumBytesMismatch {
            class: class.to_string(),
            expected,
            observed,
            offset: start,
            source: ctx.source.clone(),
        });
    }

    warn!(
        class,
        offset = start,
        expected,
        observed,
        source = %ctx.source,
        "Byte count mismatch ignored"
    );
    Ok(())
}

/// Encode a header for a body of `num_bytes` bytes
pub fn numbytes_version(num_bytes: usize, version: u16, class: &str) -> Result<[u8; 6], RecordError> {
    let count = u32::try_from(num_bytes + VERSION_SIZE)
        .ok()
        .filter(|count| count & K_BYTE_COUNT_MASK == 0)
        .ok_or_else(|| RecordError::TooLarge(class.to_string(), num_bytes))?;

    let mut header = [0; NUM_BYTES_SIZE + VERSION_SIZE];
    header[..NUM_BYTES_SIZE].copy_from_slice(&(count | K_BYTE_COUNT_MASK).to_be_bytes());
    header[NUM_BYTES_SIZE..].copy_from_slice(&version.to_be_bytes());
    Ok(header)
}

/// Insert a header in front of everything written to `out` since `start`
pub fn insert_header(
    out: &mut Vec<u8>,
    start: usize,
    version: u16,
    class: &str,
) -> Result<(), RecordError> {
    let header = numbytes_version(out.len() - start, version, class)?;
    out.splice(start..start, header);
    Ok(())
}

/// Write a byte string with the framing [`Cursor::bytestring`] reads
pub fn serialize_bytestring(out: &mut Vec<u8>, data: &[u8]) -> Result<(), RecordError> {
    if data.len() < LONG_LENGTH {
        out.push(data.len() as u8);
    } else {
        let length = i32::try_from(data.len())
            .map_err(|_| RecordError::TooLarge("TString".to_string(), data.len()))?;
        out.push(LONG_LENGTH as u8);
        out.extend_from_slice(&length.to_be_bytes());
    }
    out.extend_from_slice(data);
    Ok(())
}

/// Write a string with the framing [`Cursor::string`] reads
pub fn serialize_string(out: &mut Vec<u8>, data: &str) -> Result<(), RecordError> {
    serialize_bytestring(out, data.as_bytes())
}
