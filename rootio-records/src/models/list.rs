/*!
 An ordered, heterogeneous container of records.

 Each element is a polymorphic object resolved through the [`Registry`](crate::models::registry::Registry),
 followed by a length-prefixed option byte string. While decoding, the list remembers the
 byte range every element occupied in the source buffer, so callers can re-slice the
 original bytes instead of decoding them again.
*/

use std::{
    any::Any,
    fmt::{Display, Formatter, Result as FmtResult},
};

use json::{array, object, JsonValue};
use tracing::debug;

use crate::{
    error::record::RecordError,
    models::{
        any::{read_object_any, serialize_object_any},
        object::TObject,
        record::{reject_memberwise, Instance, ReadRecord, Record},
    },
    util::{
        context::Context,
        cursor::Cursor,
        header::{insert_header, serialize_bytestring, serialize_string},
    },
};

/// Header version written for lists
pub const TLIST_VERSION: u16 = 5;
/// Upper bound on the capacity reserved up front from an untrusted element count
const MAX_PREALLOCATED: usize = 1024;

/// The bytes one element spanned in the buffer it was decoded from
///
/// `start` is where the element's object began, `stop` is where its option byte string ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub stop: usize,
}

/// One element and its option bytes; the two are always stored together
#[derive(Debug, Clone)]
struct Entry {
    object: Box<dyn Record>,
    option: Vec<u8>,
}

/// A list of polymorphic records
///
/// Layout: `[TObject][length-prefixed name][i32 count]`, then `count` times
/// `[object][length-prefixed option]`.
#[derive(Debug, Clone, Default)]
pub struct TList {
    instance: Instance,
    base: TObject,
    name: String,
    entries: Vec<Entry>,
    /// Source byte ranges, one per entry; empty when the list was not decoded from a buffer
    ranges: Vec<ByteRange>,
}

impl TList {
    /// Create an empty list to fill with [`TList::push`]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a list from separate element and option sequences, which must be the same length
    pub fn from_parts(
        name: impl Into<String>,
        elements: Vec<Box<dyn Record>>,
        options: Vec<Vec<u8>>,
    ) -> Result<Self, RecordError> {
        if elements.len() != options.len() {
            return Err(RecordError::InconsistentLength {
                class: "TList".to_string(),
                declared: options.len() as i64,
                actual: elements.len(),
            });
        }

        let mut list = Self::new(name);
        list.entries = elements
            .into_iter()
            .zip(options)
            .map(|(object, option)| Entry { object, option })
            .collect();
        Ok(list)
    }

    /// Copy the elements and options of this list into a list ready to be written
    ///
    /// Byte ranges are not copied: they describe offsets in a buffer the new list was
    /// never part of.
    pub fn to_writable(&self) -> Self {
        Self {
            instance: self.instance,
            base: self.base.clone(),
            name: self.name.clone(),
            entries: self.entries.clone(),
            ranges: vec![],
        }
    }

    /// Append an element; any source byte ranges no longer apply and are dropped
    pub fn push(&mut self, object: Box<dyn Record>, option: Vec<u8>) {
        self.ranges.clear();
        self.entries.push(Entry { object, option });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &TObject {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the element at `index`
    pub fn get(&self, index: usize) -> Result<&dyn Record, RecordError> {
        self.entry(index).map(|entry| entry.object.as_ref())
    }

    /// Get the option bytes of the element at `index`
    pub fn option(&self, index: usize) -> Result<&[u8], RecordError> {
        self.entry(index).map(|entry| entry.option.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Record> {
        self.entries.iter().map(|entry| entry.object.as_ref())
    }

    pub fn options(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|entry| entry.option.as_slice())
    }

    /// The `[start, stop)` range each element occupied in the source buffer
    ///
    /// Empty for lists that were built or copied for writing rather than decoded.
    pub fn byte_ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    fn entry(&self, index: usize) -> Result<&Entry, RecordError> {
        self.entries
            .get(index)
            .ok_or_else(|| RecordError::IndexOutOfRange {
                class: self.class_name().to_string(),
                index,
                len: self.entries.len(),
            })
    }
}

impl Record for TList {
    fn class_name(&self) -> &str {
        "TList"
    }

    fn instance(&self) -> &Instance {
        &self.instance
    }

    fn bases(&self) -> Vec<&dyn Record> {
        vec![&self.base]
    }

    fn read_members(&mut self, cursor: &mut Cursor<'_>, ctx: &mut Context) -> Result<(), RecordError> {
        reject_memberwise(&*self, ctx)?;

        self.base = TObject::read(cursor, ctx, false)?;
        self.name = cursor.string()?;

        let size = cursor.field::<i32>()?;
        let count = usize::try_from(size).map_err(|_| RecordError::InconsistentLength {
            class: self.class_name().to_string(),
            declared: size.into(),
            actual: 0,
        })?;

        self.entries = Vec::with_capacity(count.min(MAX_PREALLOCATED));
        self.ranges = Vec::with_capacity(count.min(MAX_PREALLOCATED));
        for index in 0..count {
            let start = cursor.index();
            let object = read_object_any(cursor, ctx)?.ok_or_else(|| RecordError::NullElement {
                class: self.class_name().to_string(),
                index,
                offset: start,
            })?;
            let option = cursor.bytestring()?;
            let stop = cursor.index();

            self.entries.push(Entry { object, option });
            self.ranges.push(ByteRange { start, stop });
        }

        debug!(name = %self.name, size, offset = self.instance.start, "Read list");
        Ok(())
    }

    fn serialize(
        &self,
        out: &mut Vec<u8>,
        header: bool,
        _name: Option<&str>,
        flags: u32,
    ) -> Result<(), RecordError> {
        let size = i32::try_from(self.entries.len())
            .map_err(|_| RecordError::TooLarge(self.class_name().to_string(), self.entries.len()))?;

        let start = out.len();
        for base in self.bases() {
            base.serialize(out, true, None, flags)?;
        }
        serialize_string(out, &self.name)?;
        out.extend_from_slice(&size.to_be_bytes());

        for entry in &self.entries {
            serialize_object_any(out, Some(entry.object.as_ref()), None)?;
            serialize_bytestring(out, &entry.option)?;
        }

        if header {
            insert_header(out, start, TLIST_VERSION, self.class_name())?;
        }
        debug!(name = %self.name, size, num_bytes = out.len() - start, "Wrote list");
        Ok(())
    }

    /// Options are deliberately absent from this projection; `opt` is always empty
    fn to_exchange_form(&self) -> JsonValue {
        let items: Vec<JsonValue> = self
            .iter()
            .map(|object| object.to_exchange_form())
            .collect();
        object! {
            "_typename": "TList",
            "name": "TList",
            "arr": JsonValue::Array(items),
            "opt": array![],
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_record(&self) -> Box<dyn Record> {
        Box::new(self.clone())
    }
}

impl ReadRecord for TList {
    fn instance_mut(&mut self) -> &mut Instance {
        &mut self.instance
    }
}

impl Display for TList {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "<TList of {} items>", self.len())
    }
}
