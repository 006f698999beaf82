/*!
 The object-identity record every named record and container chains through.
*/

use std::any::Any;

use json::{object, JsonValue};

use crate::{
    error::{cursor::CursorError, record::RecordError},
    models::record::{reject_memberwise, Instance, ReadRecord, Record},
    util::{
        constants::{K_BYTE_COUNT_V_MASK, K_IS_REFERENCED},
        context::Context,
        cursor::Cursor,
    },
};

/// Version written for freshly built identity records
const TOBJECT_VERSION: i16 = 1;

/// Object identity: a unique id and a word of status bits
///
/// Unlike other records, `TObject` never has a byte count header; its version is the first
/// member it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TObject {
    instance: Instance,
    version: i16,
    /// Bytes that followed a version with [`K_BYTE_COUNT_V_MASK`] set
    extended: Option<[u8; 4]>,
    unique_id: u32,
    bits: u32,
    /// Process id, present only when the referenced bit is set
    pidf: Option<u16>,
}

impl Default for TObject {
    fn default() -> Self {
        Self {
            instance: Instance::default(),
            version: TOBJECT_VERSION,
            extended: None,
            unique_id: 0,
            bits: 0,
            pidf: None,
        }
    }
}

impl TObject {
    pub fn new(unique_id: u32, bits: u32) -> Self {
        Self {
            unique_id,
            bits,
            ..Self::default()
        }
    }

    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn pidf(&self) -> Option<u16> {
        self.pidf
    }
}

impl Record for TObject {
    fn class_name(&self) -> &str {
        "TObject"
    }

    fn instance(&self) -> &Instance {
        &self.instance
    }

    fn read_members(&mut self, cursor: &mut Cursor<'_>, ctx: &mut Context) -> Result<(), RecordError> {
        reject_memberwise(&*self, ctx)?;

        self.version = cursor.field::<i16>()?;
        self.instance.instance_version = self.version as u16;
        if self.version as u16 & K_BYTE_COUNT_V_MASK != 0 {
            let extended: [u8; 4] = cursor
                .bytes(4)?
                .try_into()
                .map_err(CursorError::SliceError)?;
            self.extended = Some(extended);
        }

        self.unique_id = cursor.field::<u32>()?;
        self.bits = cursor.field::<u32>()?;
        if self.bits & K_IS_REFERENCED != 0 {
            self.pidf = Some(cursor.field::<u16>()?);
        }
        Ok(())
    }

    fn serialize(
        &self,
        out: &mut Vec<u8>,
        _header: bool,
        _name: Option<&str>,
        flags: u32,
    ) -> Result<(), RecordError> {
        out.extend_from_slice(&self.version.to_be_bytes());
        if let Some(extended) = self.extended {
            out.extend_from_slice(&extended);
        }
        out.extend_from_slice(&self.unique_id.to_be_bytes());
        let bits = match self.pidf {
            Some(_) => self.bits | flags,
            // The referenced bit promises a process id that would not be written
            None => (self.bits | flags) & !K_IS_REFERENCED,
        };
        out.extend_from_slice(&bits.to_be_bytes());
        if let Some(pidf) = self.pidf {
            out.extend_from_slice(&pidf.to_be_bytes());
        }
        Ok(())
    }

    fn to_exchange_form(&self) -> JsonValue {
        object! {
            "_typename": "TObject",
            "fUniqueID": self.unique_id,
            "fBits": self.bits,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_record(&self) -> Box<dyn Record> {
        Box::new(self.clone())
    }
}

impl ReadRecord for TObject {
    const HAS_HEADER: bool = false;

    fn instance_mut(&mut self) -> &mut Instance {
        &mut self.instance
    }
}
