//! configuration layers
//!
//! A layer binds one document to a name. Every source of documents implements [Layer] by
//! exposing its document and resolver; lookups and mutations are shared provided methods,
//! so all sources resolve paths the same way and only differ in how documents are
//! loaded and written back.
//!
//! Sources:
//! - [MemoryLayer]: a document built in code or taken from the environment, never writable
//! - [FileLayer]: a yaml or json file, optionally writable
mod env;
mod file;
mod memory;

pub use env::document_from_vars;
pub use file::FileLayer;
pub use memory::MemoryLayer;

use crate::format::LoadError;
use crate::path::{PathError, PathResolver};
use crate::value::Value;

pub trait Layer: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn document(&self) -> &Value;

    /// Raw access; changes made through this are not tracked by the dirty flag
    fn document_mut(&mut self) -> &mut Value;

    fn resolver(&self) -> &PathResolver;

    fn is_dirty(&self) -> bool;

    fn set_dirty(&mut self, dirty: bool);

    fn is_writable(&self) -> bool;

    /// Persists the document to its origin
    ///
    /// Must fail with [LayerError::NotWritable] unless [Layer::is_writable].
    fn write(&mut self) -> Result<(), LayerError>;

    /// Replaces the document and clears the dirty flag
    fn load(&mut self, document: Value);

    /// Looks up `path`, both kinds of [PathError] are returned
    fn query(&self, path: &str) -> Result<&Value, PathError> {
        self.resolver().get(path, self.document())
    }

    /// Like [Layer::query] but falls back to `default` when the key does not exist
    ///
    /// Malformed paths are still an error.
    fn get(&self, path: &str, default: Value) -> Result<Value, PathError> {
        match self.query(path) {
            Ok(value) => Ok(value.clone()),
            Err(e) if e.is_not_found() => Ok(default),
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.query(path).is_ok()
    }

    /// Sets `path` to `value`, see [PathResolver::set]
    ///
    /// Returns `false` instead of [PathError::KeyNotFound].
    fn set(&mut self, path: &str, value: Value, create: bool) -> Result<bool, PathError> {
        let resolver = self.resolver().clone();
        match resolver.set(path, value, self.document_mut(), create) {
            Ok(_) => {
                tracing::debug!(layer = self.name(), path, "value set");
                self.set_dirty(true);
                Ok(true)
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(layer = self.name(), error = %e, "value not set");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes `path`, returns `false` instead of [PathError::KeyNotFound]
    fn remove(&mut self, path: &str) -> Result<bool, PathError> {
        let resolver = self.resolver().clone();
        match resolver.remove(path, self.document_mut()) {
            Ok(removed) => {
                tracing::debug!(layer = self.name(), path, "value removed");
                self.set_dirty(true);
                Ok(removed)
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(layer = self.name(), error = %e, "nothing to remove");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LayerError {
    #[error("layer {layer:?} is not writable")]
    NotWritable { layer: String },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to load document")]
    Load(#[from] LoadError),
}

impl LayerError {
    pub(crate) fn not_writable(layer: &dyn Layer) -> Self {
        LayerError::NotWritable {
            layer: layer.name().to_string(),
        }
    }
}
