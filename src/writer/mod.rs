//! Document writers providing a plugin architecture for output formats.
//!
//! A [`DocumentWriter`] turns an assembled [`ExportDocument`] into bytes.
//! The binary word-processor writer lives outside this crate and plugs in
//! through the same trait; the registry dispatches on file extension.
//!
//! # Example
//!
//! ```no_run
//! use pageflow::writer::{save_as, WriterRegistry};
//! use pageflow::model::{ExportDocument, NumberingDefinition, PageSetup};
//! use std::path::Path;
//!
//! fn main() -> pageflow::Result<()> {
//!     let doc = ExportDocument::new(PageSetup::default(), NumberingDefinition::standard(9));
//!     let registry = WriterRegistry::with_defaults();
//!     let bytes = registry.write(&doc, "json")?;
//!     save_as(&bytes, Path::new("out.json"))?;
//!     Ok(())
//! }
//! ```

mod json;
mod text;

pub use json::{JsonFormat, JsonWriter};
pub use text::TextWriter;

use crate::error::{Error, Result};
use crate::model::ExportDocument;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Trait for document writers.
///
/// Implement this trait to add support for a new output format.
pub trait DocumentWriter: Send + Sync {
    /// Get the name of this writer.
    fn name(&self) -> &str;

    /// Get the file extensions this writer produces.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["docx"]`).
    fn extensions(&self) -> &[&str];

    /// MIME type of the output.
    fn mime_type(&self) -> &str {
        "application/octet-stream"
    }

    /// Serialize the document.
    fn write(&self, doc: &ExportDocument) -> Result<Vec<u8>>;

    /// Check if this writer produces the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document writers.
///
/// The registry maps file extensions and names to writers.
pub struct WriterRegistry {
    writers: HashMap<String, Arc<dyn DocumentWriter>>,
    by_name: HashMap<String, Arc<dyn DocumentWriter>>,
}

impl WriterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            writers: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in writers (JSON, plain text).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonWriter::new(JsonFormat::Pretty)));
        registry.register(Arc::new(TextWriter::new()));
        registry
    }

    /// Register a writer for all its extensions. A later registration for
    /// the same extension replaces the earlier one.
    pub fn register(&mut self, writer: Arc<dyn DocumentWriter>) {
        for ext in writer.extensions() {
            self.writers.insert(ext.to_lowercase(), writer.clone());
        }
        self.by_name.insert(writer.name().to_lowercase(), writer);
    }

    /// Get a writer by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentWriter>> {
        self.writers.get(&ext.to_lowercase()).cloned()
    }

    /// Get a writer by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentWriter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.writers.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.writers.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Serialize `doc` with the writer registered for `ext`.
    pub fn write(&self, doc: &ExportDocument, ext: &str) -> Result<Vec<u8>> {
        let writer = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnknownFormat(ext.to_string()))?;
        let bytes = writer.write(doc)?;
        debug!("{} writer produced {} bytes", writer.name(), bytes.len());
        Ok(bytes)
    }

    /// Serialize `doc` with the writer matching the extension of `path` and
    /// save the result there.
    pub fn write_to_path(&self, doc: &ExportDocument, path: &Path) -> Result<usize> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))?;
        let bytes = self.write(doc, ext)?;
        save_as(&bytes, path)?;
        Ok(bytes.len())
    }
}

impl Default for WriterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Save exported bytes as a file, creating parent directories as needed.
pub fn save_as(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    debug!("saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
