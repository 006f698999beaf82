/*!
 A record with an object identity, a name, and a title.
*/

use std::{
    any::Any,
    fmt::{Display, Formatter, Result as FmtResult},
};

use json::{object, JsonValue};

use crate::{
    error::record::RecordError,
    models::{
        object::TObject,
        record::{merge_exchange_form, reject_memberwise, Instance, ReadRecord, Record},
    },
    util::{
        constants::{K_IS_ON_HEAP, K_NOT_DELETED},
        context::Context,
        cursor::Cursor,
        header::{insert_header, serialize_string},
    },
};

/// Header version written for named records
pub const TNAMED_VERSION: u16 = 1;

/// The simplest record with fields of its own
///
/// Layout: `[TObject][length-prefixed name][length-prefixed title]`. An empty title is
/// stored as an empty string; there is no separate notion of a missing title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TNamed {
    instance: Instance,
    base: TObject,
    name: String,
    title: String,
}

impl TNamed {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn base(&self) -> &TObject {
        &self.base
    }
}

impl Record for TNamed {
    fn class_name(&self) -> &str {
        "TNamed"
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
        self.title = cursor.string()?;
        Ok(())
    }

    fn serialize(
        &self,
        out: &mut Vec<u8>,
        header: bool,
        name: Option<&str>,
        flags: u32,
    ) -> Result<(), RecordError> {
        let start = out.len();
        self.base
            .serialize(out, true, name, flags | K_IS_ON_HEAP | K_NOT_DELETED)?;
        serialize_string(out, name.unwrap_or(&self.name))?;
        serialize_string(out, &self.title)?;

        if header {
            insert_header(out, start, TNAMED_VERSION, self.class_name())?;
        }
        Ok(())
    }

    fn to_exchange_form(&self) -> JsonValue {
        merge_exchange_form(
            self,
            object! {
                "fName": self.name.as_str(),
                "fTitle": self.title.as_str(),
            },
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_record(&self) -> Box<dyn Record> {
        Box::new(self.clone())
    }
}

impl ReadRecord for TNamed {
    fn instance_mut(&mut self) -> &mut Instance {
        &mut self.instance
    }
}

impl Display for TNamed {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "<TNamed {:?}", self.name)?;
        if !self.title.is_empty() {
            write!(fmt, " title={:?}", self.title)?;
        }
        write!(fmt, ">")
    }
}
