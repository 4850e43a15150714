//! JSON writer for export documents.

use super::DocumentWriter;
use crate::error::Result;
use crate::model::ExportDocument;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serializes the whole export model as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter {
    format: JsonFormat,
}

impl JsonWriter {
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }

    /// Convert a document to a JSON string.
    pub fn to_string(&self, doc: &ExportDocument) -> Result<String> {
        let json = match self.format {
            JsonFormat::Pretty => serde_json::to_string_pretty(doc)?,
            JsonFormat::Compact => serde_json::to_string(doc)?,
        };
        Ok(json)
    }
}

impl DocumentWriter for JsonWriter {
    fn name(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn write(&self, doc: &ExportDocument) -> Result<Vec<u8>> {
        self.to_string(doc).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, NumberingDefinition, PageSetup, Paragraph};

    fn sample() -> ExportDocument {
        let mut doc = ExportDocument::new(PageSetup::default(), NumberingDefinition::standard(2));
        doc.metadata.title = Some("Test".to_string());
        doc.blocks.push(Block::Paragraph(Paragraph::with_text("Hello")));
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = JsonWriter::new(JsonFormat::Pretty).to_string(&sample()).unwrap();
        assert!(json.contains("\"title\""));
        assert!(json.contains("\"type\": \"paragraph\""));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact_round_trips() {
        let doc = sample();
        let bytes = JsonWriter::new(JsonFormat::Compact).write(&doc).unwrap();
        assert!(!bytes.contains(&b'\n')); // Compact has no newlines
        let back: ExportDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, doc);
    }
}
