/*!
 The table that maps class names found in the stream to the record kinds that decode them.
*/

use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
};

use crate::{
    error::record::RecordError,
    models::{
        list::TList,
        named::TNamed,
        object::TObject,
        record::{ReadRecord, Record},
    },
    util::{context::Context, cursor::Cursor},
};

/// Constructs and fully reads one record at the cursor
pub type Factory = fn(&mut Cursor<'_>, &mut Context) -> Result<Box<dyn Record>, RecordError>;

/// Class name to [`Factory`] table
///
/// Populate it once, then share it (see [`Context::with_registry`]); it is never modified
/// during a decode. [`Registry::default`] knows the built-in kinds, [`Registry::new`] knows none.
#[derive(Clone)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl Registry {
    /// Create a registry without any record kinds
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Decode `class_name` with the record kind `T`
    pub fn register<T: ReadRecord>(&mut self, class_name: &str) -> &mut Self {
        self.register_factory(class_name, read_boxed::<T>)
    }

    /// Decode `class_name` with a custom constructor
    pub fn register_factory(&mut self, class_name: &str, factory: Factory) -> &mut Self {
        self.factories.insert(class_name.to_string(), factory);
        self
    }

    pub fn get(&self, class_name: &str) -> Option<Factory> {
        self.factories.get(class_name).copied()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Registered class names, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register::<TObject>("TObject")
            .register::<TNamed>("TNamed")
            .register::<TList>("TList");
        registry
    }
}

impl Debug for Registry {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("Registry")
            .field("classes", &self.class_names())
            .finish()
    }
}

fn read_boxed<T: ReadRecord>(
    cursor: &mut Cursor<'_>,
    ctx: &mut Context,
) -> Result<Box<dyn Record>, RecordError> {
    Ok(Box::new(T::read(cursor, ctx, true)?))
}
