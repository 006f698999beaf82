/*!
 Per-decode configuration and state passed down the recursive descent.
*/

use std::sync::Arc;

use crate::{error::record::RecordError, models::registry::Registry};

/// Source identity used when the caller does not provide one
const DEFAULT_SOURCE: &str = "<memory>";
/// Nesting limit used when the caller does not provide one
const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration and bookkeeping for a single decode
///
/// A context belongs to exactly one decode: the breadcrumb trail is mutated while records
/// are read. Independent decodes each build their own context; the [`Registry`] inside is
/// shared and read-only, so it can be cloned across threads cheaply.
#[derive(Debug, Clone)]
pub struct Context {
    /// Identity of the bytes being decoded, i.e. a file path, named in error messages
    pub source: String,
    /// Verify header byte counts against the bytes each record consumed
    pub check_num_bytes: bool,
    /// Maximum depth of nested records, including base records
    pub max_depth: usize,
    /// Class name to constructor table used to resolve nested objects
    registry: Arc<Registry>,
    /// Class names of the records currently being read, outermost first
    breadcrumbs: Vec<String>,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            source: DEFAULT_SOURCE.to_string(),
            check_num_bytes: true,
            max_depth: DEFAULT_MAX_DEPTH,
            registry: Arc::new(Registry::default()),
            breadcrumbs: vec![],
        }
    }
}

impl Context {
    /// Create a context with the default settings and the built-in record kinds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source identity (builder pattern)
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Enable or disable byte count verification (builder pattern)
    pub fn with_num_bytes_check(mut self, check: bool) -> Self {
        self.check_num_bytes = check;
        self
    }

    /// Set the nesting limit (builder pattern)
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Use a different set of record kinds (builder pattern)
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    /// The breadcrumbs rendered as `TList > TNamed > TObject`
    pub fn trail(&self) -> String {
        self.breadcrumbs.join(" > ")
    }

    /// Record that a record of `class` is being entered
    pub(crate) fn enter(&mut self, class: &str) -> Result<(), RecordError> {
        if self.breadcrumbs.len() >= self.max_depth {
            return Err(RecordError::TooDeep {
                depth: self.max_depth,
                trail: format!("{} > {class}", self.trail()),
            });
        }
        self.breadcrumbs.push(class.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.breadcrumbs.pop();
    }
}
