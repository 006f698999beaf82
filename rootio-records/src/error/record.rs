/*!
 Errors that can happen when reading or writing a versioned object record.
*/

use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
};

use crate::error::cursor::CursorError;

/// Errors that can happen when decoding or encoding a [`Record`](crate::models::record::Record)
///
/// Every variant aborts the enclosing decode or encode; no partially populated record
/// is ever handed back to the caller.
#[derive(Debug, Clone)]
pub enum RecordError {
    /// Reading a primitive value failed
    Cursor(CursorError),
    /// The record was stored in memberwise mode, which is not supported: `(class, source)`
    UnsupportedMode(String, String),
    /// A type discriminator names a class that is not registered
    UnresolvedType {
        tag: String,
        offset: usize,
        source: String,
    },
    /// An element index outside of `[0, len)`
    IndexOutOfRange {
        class: String,
        index: usize,
        len: usize,
    },
    /// Declared and actual element counts disagree
    InconsistentLength {
        class: String,
        declared: i64,
        actual: usize,
    },
    /// A byte count header disagrees with the number of bytes actually consumed
    NumBytesMismatch {
        class: String,
        expected: usize,
        observed: usize,
        offset: usize,
        source: String,
    },
    /// An object reference points at the object currently being read: `(offset, source)`
    SelfReference(usize, String),
    /// A container element decoded to a null pointer
    NullElement {
        class: String,
        index: usize,
        offset: usize,
    },
    /// Objects are nested deeper than [`Context::max_depth`](crate::util::context::Context::max_depth)
    TooDeep { depth: usize, trail: String },
    /// A value does not fit in its fixed-width wire field: `(class, num_bytes)`
    TooLarge(String, usize),
}

impl Display for RecordError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            RecordError::Cursor(why) => write!(fmt, "{why}"),
            RecordError::UnsupportedMode(class, source) => {
                write!(fmt, "memberwise serialization of {class} in {source} is not supported")
            }
            RecordError::UnresolvedType {
                tag,
                offset,
                source,
            } => write!(
                fmt,
                "unknown class {tag} at byte {offset} of {source}"
            ),
            RecordError::IndexOutOfRange { class, index, len } => {
                write!(fmt, "can't access index {index} on {class} of length {len}")
            }
            RecordError::InconsistentLength {
                class,
                declared,
                actual,
            } => write!(
                fmt,
                "{class} declares {declared} elements but has {actual}"
            ),
            RecordError::NumBytesMismatch {
                class,
                expected,
                observed,
                offset,
                source,
            } => write!(
                fmt,
                "expected {expected} bytes for {class} at byte {offset} of {source}, but the cursor moved by {observed}"
            ),
            RecordError::SelfReference(offset, source) => {
                write!(fmt, "object at byte {offset} of {source} references itself")
            }
            RecordError::NullElement {
                class,
                index,
                offset,
            } => write!(
                fmt,
                "element {index} of {class} at byte {offset} is a null pointer"
            ),
            RecordError::TooDeep { depth, trail } => {
                write!(fmt, "objects nested deeper than {depth} levels: {trail}")
            }
            RecordError::TooLarge(class, num_bytes) => {
                write!(fmt, "{class} of {num_bytes} bytes is too large to serialize")
            }
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecordError::Cursor(why) => Some(why),
            _ => None,
        }
    }
}

impl From<CursorError> for RecordError {
    fn from(why: CursorError) -> Self {
        RecordError::Cursor(why)
    }
}
