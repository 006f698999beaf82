/*!
 Byte-level access to serialized records.

 A [`Chunk`] owns a contiguous run of bytes taken from some larger source, remembering the
 global offset of its first byte. A [`Cursor`] walks a [`Chunk`], decoding big-endian
 fixed-width fields, length-prefixed strings, and null-terminated class names.

 The cursor also carries the table of already-seen classes and objects that
 [`read_object_any`](crate::models::any::read_object_any) consults when the stream
 refers back to something it has already emitted.
*/

use std::collections::HashMap;

use crate::{error::cursor::CursorError, models::record::Record};

/// Length bytes equal to this value are followed by a 4-byte length
const LONG_LENGTH: u8 = 255;
/// Number of bytes rendered on each line of [`Cursor::debug`]
const DEBUG_LINE_WIDTH: usize = 20;
/// Characters [`Cursor::debug`] renders literally; everything else is shown as `---`
const PRINTABLE: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ ";

/// An immutable buffer of bytes from a source, addressed by global offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Global offset of the first byte in `data`
    start: usize,
    data: Vec<u8>,
}

impl Chunk {
    pub fn new(start: usize, data: Vec<u8>) -> Self {
        Self { start, data }
    }

    /// Global offset of the first byte in this chunk
    pub fn start(&self) -> usize {
        self.start
    }

    /// Global offset one past the last byte in this chunk
    pub fn stop(&self) -> usize {
        self.start + self.data.len()
    }

    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Get the bytes between two global offsets, if the range is within this chunk
    pub fn get(&self, start: usize, stop: usize) -> Result<&[u8], CursorError> {
        if start < self.start || stop < start || stop > self.stop() {
            return Err(CursorError::OutOfBounds(stop, self.stop()));
        }
        Ok(&self.data[start - self.start..stop - self.start])
    }

    /// Get everything from a global offset to the end of this chunk
    pub fn remainder(&self, start: usize) -> Result<&[u8], CursorError> {
        self.get(start, self.stop())
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(data: Vec<u8>) -> Self {
        Self::new(0, data)
    }
}

impl From<&[u8]> for Chunk {
    fn from(data: &[u8]) -> Self {
        Self::new(0, data.to_vec())
    }
}

/// A fixed-width, big-endian value that can be read with [`Cursor::field`]
pub trait Field: Sized {
    /// Number of bytes the value occupies in the stream
    const SIZE: usize;

    fn from_be_slice(bytes: &[u8]) -> Result<Self, CursorError>;
}

macro_rules! impl_field {
    ($($kind:ty),*) => {
        $(
            impl Field for $kind {
                const SIZE: usize = std::mem::size_of::<$kind>();

                fn from_be_slice(bytes: &[u8]) -> Result<Self, CursorError> {
                    Ok(<$kind>::from_be_bytes(
                        bytes.try_into().map_err(CursorError::SliceError)?,
                    ))
                }
            }
        )*
    };
}

impl_field!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

/// Something already read from the stream that later bytes may refer back to
#[derive(Debug, Clone)]
pub enum Reference {
    /// A class name introduced by a new-class tag
    Class(String),
    /// A fully decoded object
    Object(Box<dyn Record>),
}

/// A read position in a [`Chunk`]
#[derive(Debug)]
pub struct Cursor<'a> {
    chunk: &'a Chunk,
    /// The global offset of the next byte to read
    index: usize,
    /// Zero point for the keys of `refs`
    origin: i64,
    /// Classes and objects already read, keyed by their displacement from `origin`
    refs: HashMap<i64, Reference>,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the first byte of `chunk`
    pub fn new(chunk: &'a Chunk) -> Self {
        Self::with_origin(chunk, chunk.start(), 0)
    }

    /// Create a cursor at `index` whose reference keys are measured from `origin`
    pub fn with_origin(chunk: &'a Chunk, index: usize, origin: i64) -> Self {
        Self {
            chunk,
            index,
            origin,
            refs: HashMap::new(),
        }
    }

    pub fn chunk(&self) -> &'a Chunk {
        self.chunk
    }

    /// The global offset of the next byte to read
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn origin(&self) -> i64 {
        self.origin
    }

    /// Number of bytes between the current position and [`Cursor::origin`]
    pub fn displacement(&self) -> i64 {
        self.index as i64 - self.origin
    }

    pub fn move_to(&mut self, index: usize) {
        self.index = index;
    }

    pub fn skip(&mut self, num_bytes: usize) {
        self.index += num_bytes;
    }

    pub fn refs(&self) -> &HashMap<i64, Reference> {
        &self.refs
    }

    pub(crate) fn refs_mut(&mut self) -> &mut HashMap<i64, Reference> {
        &mut self.refs
    }

    /// Read a fixed-width, big-endian value and advance past it
    pub fn field<T: Field>(&mut self) -> Result<T, CursorError> {
        let value = self.peek_field()?;
        self.index += T::SIZE;
        Ok(value)
    }

    /// Read a fixed-width, big-endian value without moving
    pub fn peek_field<T: Field>(&self) -> Result<T, CursorError> {
        T::from_be_slice(self.chunk.get(self.index, self.index + T::SIZE)?)
    }

    /// Read exactly `n` bytes
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
        let chunk: &'a Chunk = self.chunk;
        let bytes = chunk.get(self.index, self.index + n)?;
        self.index += n;
        Ok(bytes)
    }

    /// Read a length-prefixed byte string
    ///
    /// The first byte is the length of the data that follows, unless it is `255`, in which
    /// case the next 4 bytes hold the length as a big-endian [`i32`].
    pub fn bytestring(&mut self) -> Result<Vec<u8>, CursorError> {
        let start = self.index;
        let mut length = self.field::<u8>()? as usize;
        if length == LONG_LENGTH as usize {
            let long = self.field::<i32>()?;
            length = usize::try_from(long).map_err(|_| CursorError::NegativeLength(start, long))?;
        }
        Ok(self.bytes(length)?.to_vec())
    }

    /// Read a length-prefixed UTF-8 string, framed like [`Cursor::bytestring`]
    pub fn string(&mut self) -> Result<String, CursorError> {
        String::from_utf8(self.bytestring()?)
            .map_err(|why| CursorError::StringParseError(why.utf8_error()))
    }

    /// Read a null-terminated UTF-8 string, as used for class names
    pub fn classname(&mut self) -> Result<String, CursorError> {
        let remainder = self.chunk.remainder(self.index)?;
        let length = remainder
            .iter()
            .position(|byte| *byte == 0)
            .ok_or(CursorError::MissingTerminator(self.index))?;
        let name = std::str::from_utf8(&remainder[..length])
            .map_err(CursorError::StringParseError)?
            .to_string();
        self.index += length + 1;
        Ok(name)
    }

    /// Render the upcoming bytes for inspection, without moving
    ///
    /// Each line of 20 bytes is shown as a separator, the decimal byte values, and the
    /// printable ASCII characters (or `---`):
    ///
    /// ```txt
    /// --+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+-
    ///  64   0   0  14   0   1   0   1   0   0   0   0   3   0   0   0   2 104  49   0
    ///   @ --- --- --- --- --- --- --- --- --- --- --- --- --- --- --- ---   h   1 ---
    /// ```
    pub fn debug(&self, limit_bytes: Option<usize>) -> Result<String, CursorError> {
        let mut data = self.chunk.remainder(self.index)?;
        if let Some(limit) = limit_bytes {
            data = &data[..limit.min(data.len())];
        }

        let mut out = String::new();
        for line in data.chunks(DEBUG_LINE_WIDTH) {
            out.push_str(&"--+-".repeat(DEBUG_LINE_WIDTH));
            out.push('\n');
            out.push_str(
                &line
                    .iter()
                    .map(|byte| format!("{byte:3}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            out.push('\n');
            out.push_str(
                &line
                    .iter()
                    .map(|byte| {
                        let character = char::from(*byte);
                        if PRINTABLE.contains(character) {
                            format!("{character:>3}")
                        } else {
                            "---".to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            out.push('\n');
        }
        Ok(out)
    }
}
