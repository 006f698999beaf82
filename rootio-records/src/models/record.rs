/*!
 The contract every versioned object record fulfils.

 A record is read in one call: the dispatcher constructs an empty value of the right kind,
 the optional [`Header`](crate::util::header::Header) is consumed, then
 [`Record::read_members`] pulls the base records followed by the record's own fields.
 Writing mirrors reading exactly: bases first, then fields in the same order, then an
 optional header computed from the bytes actually emitted.
*/

use std::{any::Any, fmt::Debug};

use json::JsonValue;

use crate::{
    error::record::RecordError,
    util::{
        context::Context,
        cursor::Cursor,
        header::{check_num_bytes, read_numbytes_version, Header},
    },
};

/// Per-instance state read from the stream alongside a record's members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instance {
    /// Global offset the record started at
    pub start: usize,
    /// Byte count from the header, if one was present
    pub num_bytes: Option<u32>,
    /// Version written in the header
    pub instance_version: u16,
    /// Whether the members were streamed memberwise
    pub is_memberwise: bool,
    /// `true` for the object a tag in the stream introduced, `false` for the base records
    /// embedded in it
    pub concrete: bool,
}

/// A versioned, self-describing class instance
///
/// Decoded graphs own all of their data, so they can be handed between threads.
pub trait Record: Debug + Send + Sync {
    /// Name of the class this record represents on the wire
    fn class_name(&self) -> &str;

    /// Version of the class layout this kind decodes, or [`None`] if it decodes every version
    fn class_version(&self) -> Option<u16> {
        None
    }

    fn instance(&self) -> &Instance;

    /// Base records in the order they are read and written
    fn bases(&self) -> Vec<&dyn Record> {
        vec![]
    }

    /// Read the bases and then the fields of this record
    fn read_members(&mut self, cursor: &mut Cursor<'_>, ctx: &mut Context) -> Result<(), RecordError>;

    /// Append this record to `out`
    ///
    /// - `header`: prepend a byte count and version computed from the bytes written
    /// - `name`: write this name instead of the stored one, for kinds that carry a name
    /// - `flags`: object-identity bits to set on the base record
    fn serialize(
        &self,
        out: &mut Vec<u8>,
        header: bool,
        name: Option<&str>,
        flags: u32,
    ) -> Result<(), RecordError>;

    /// One-way structural projection of this record
    fn to_exchange_form(&self) -> JsonValue;

    fn as_any(&self) -> &dyn Any;

    fn clone_record(&self) -> Box<dyn Record>;
}

impl dyn Record + '_ {
    /// Get the concrete record kind, if this record is a `T`
    pub fn downcast_ref<T: Record + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Record + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl Clone for Box<dyn Record> {
    fn clone(&self) -> Self {
        self.clone_record()
    }
}

/// A record kind that can be constructed empty and populated from a cursor
pub trait ReadRecord: Record + Default + 'static {
    /// Whether a byte count and version precede the members of this kind
    const HAS_HEADER: bool = true;

    fn instance_mut(&mut self) -> &mut Instance;

    /// Construct and fully populate a record of this kind
    ///
    /// Base records are read with `concrete` set to `false`.
    fn read(cursor: &mut Cursor<'_>, ctx: &mut Context, concrete: bool) -> Result<Self, RecordError> {
        let mut record = Self::default();
        ctx.enter(record.class_name())?;
        let result = record.read_instance(cursor, ctx, concrete);
        ctx.leave();
        result.map(|_| record)
    }

    /// Read the header, the members, and verify the byte count
    fn read_instance(
        &mut self,
        cursor: &mut Cursor<'_>,
        ctx: &mut Context,
        concrete: bool,
    ) -> Result<(), RecordError> {
        let start = cursor.index();
        let header = if Self::HAS_HEADER {
            read_numbytes_version(cursor)?
        } else {
            Header::default()
        };

        *self.instance_mut() = Instance {
            start,
            num_bytes: header.num_bytes,
            instance_version: header.version,
            is_memberwise: header.is_memberwise,
            concrete,
        };

        self.read_members(cursor, ctx)?;
        check_num_bytes(start, cursor.index(), header.num_bytes, self.class_name(), ctx)
    }
}

/// Fail if the record was streamed memberwise, before any member is read
pub(crate) fn reject_memberwise(record: &dyn Record, ctx: &Context) -> Result<(), RecordError> {
    if record.instance().is_memberwise {
        return Err(RecordError::UnsupportedMode(
            record.class_name().to_string(),
            ctx.source.clone(),
        ));
    }
    Ok(())
}

/// Build an exchange form from the members of every base, then `members`, then `_typename`
pub(crate) fn merge_exchange_form(record: &dyn Record, members: JsonValue) -> JsonValue {
    let mut out = JsonValue::new_object();
    for base in record.bases() {
        if let JsonValue::Object(fields) = base.to_exchange_form() {
            for (key, value) in fields.iter() {
                out[key] = value.clone();
            }
        }
    }
    if let JsonValue::Object(fields) = members {
        for (key, value) in fields.iter() {
            out[key] = value.clone();
        }
    }
    out["_typename"] = record.class_name().into();
    out
}
