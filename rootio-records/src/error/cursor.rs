/*!
 Errors that can happen when reading primitive values out of a [`Chunk`](crate::util::cursor::Chunk).
*/

use std::{
    array::TryFromSliceError,
    error::Error,
    fmt::{Display, Formatter, Result},
    str::Utf8Error,
};

/// Errors that can happen when reading bytes with a [`Cursor`](crate::util::cursor::Cursor)
#[derive(Debug, Clone)]
pub enum CursorError {
    OutOfBounds(usize, usize),
    SliceError(TryFromSliceError),
    StringParseError(Utf8Error),
    MissingTerminator(usize),
    NegativeLength(usize, i32),
}

impl Display for CursorError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            CursorError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of range {len:x}!")
            }
            CursorError::SliceError(why) => {
                write!(fmt, "Unable to slice source chunk: {why}")
            }
            CursorError::StringParseError(why) => write!(fmt, "Failed to parse string: {why}"),
            CursorError::MissingTerminator(idx) => {
                write!(fmt, "C-style string starting at {idx:x} has no null terminator!")
            }
            CursorError::NegativeLength(idx, length) => {
                write!(fmt, "Byte string at {idx:x} declares negative length {length}")
            }
        }
    }
}

impl Error for CursorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CursorError::SliceError(why) => Some(why),
            CursorError::StringParseError(why) => Some(why),
            _ => None,
        }
    }
}
