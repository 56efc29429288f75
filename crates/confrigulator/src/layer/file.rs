use super::{Layer, LayerError};
use crate::format::Format;
use crate::path::PathResolver;
use crate::value::Value;
use std::path::{Path, PathBuf};

/// A layer backed by a yaml or json file
///
/// The layer is named after the file unless renamed with [FileLayer::named].
#[derive(Debug, Clone)]
pub struct FileLayer {
    name: String,
    path: PathBuf,
    format: Format,
    document: Value,
    dirty: bool,
    writable: bool,
    resolver: PathResolver,
}

impl FileLayer {
    /// Loads `file_path`, picking the format from its extension
    pub fn open(file_path: &Path, writable: bool) -> Result<Self, LayerError> {
        let format = Format::from_path(file_path)?;
        let document = read_document(file_path, format)?;

        Ok(Self {
            name: file_path.display().to_string(),
            path: file_path.to_owned(),
            format,
            document,
            dirty: false,
            writable,
            resolver: PathResolver::default(),
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Re-reads the file, dropping unwritten changes
    pub fn reload(&mut self) -> Result<(), LayerError> {
        let document = read_document(&self.path, self.format)?;
        self.load(document);
        Ok(())
    }
}

fn read_document(file_path: &Path, format: Format) -> Result<Value, LayerError> {
    tracing::info!(path=%file_path.display(), %format, "loading file");

    let file_contents = std::fs::read_to_string(file_path)?;
    Ok(format.load(&file_contents)?)
}

impl Layer for FileLayer {
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
        self.writable
    }

    fn write(&mut self) -> Result<(), LayerError> {
        if !self.writable {
            return Err(LayerError::not_writable(self));
        }

        tracing::info!(path=%self.path.display(), format=%self.format, "writing file");
        let contents = self.format.dump(&self.document)?;
        std::fs::write(&self.path, contents)?;
        self.dirty = false;
        Ok(())
    }

    fn load(&mut self, document: Value) {
        self.document = document;
        self.dirty = false;
    }
}
