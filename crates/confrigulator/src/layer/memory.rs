use super::{Layer, LayerError};
use std::ffi::OsString;
use crate::path::PathResolver;
use crate::value::Value;

/// A layer over a document that lives in memory only
///
/// Used for documents assembled in code and for the environment. Never writable.
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    name: String,
    document: Value,
    dirty: bool,
    resolver: PathResolver,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            document,
            dirty: false,
            resolver: PathResolver::default(),
        }
    }

    /// A layer holding all environment variables starting with `prefix` and `separator`
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    /// See [super::document_from_vars], including its panics.
    pub fn from_env(name: impl Into<String>, prefix: &str, separator: &str) -> Self {
        Self::new(
            name,
            super::document_from_vars(prefix, separator, unicode_vars(std::env::vars_os())),
        )
    }

    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }
}

fn unicode_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                let key = key.unwrap_or_else(|key| key.to_string_lossy().into_owned());
                tracing::warn!(%key, "skipping environment variable that is not unicode");
                None
            }
        })
}

impl Layer for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn document(&self) -> &Value {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Value {
        &mut self.document
    }

    fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn write(&mut self) -> Result<(), LayerError> {
        Err(LayerError::not_writable(self))
    }

    fn load(&mut self, document: Value) {
        self.document = document;
        self.dirty = false;
    }
}
