//! Integration tests for the writer registry.

use std::sync::Arc;

use pageflow::error::{Error, Result};
use pageflow::model::{Block, ExportDocument, NumberingDefinition, PageSetup, Paragraph};
use pageflow::writer::{save_as, DocumentWriter, JsonWriter, TextWriter, WriterRegistry};
use pageflow::JsonFormat;

/// Mock binary writer standing in for a word-processor package writer.
struct MockWriter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockWriter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentWriter for MockWriter {
    fn name(&self) -> &str {
        self.name
    }

    fn extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn mime_type(&self) -> &str {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    }

    fn write(&self, doc: &ExportDocument) -> Result<Vec<u8>> {
        let mut bytes = b"PK\x03\x04".to_vec();
        bytes.extend_from_slice(doc.plain_text().as_bytes());
        Ok(bytes)
    }
}

fn sample() -> ExportDocument {
    let mut doc = ExportDocument::new(PageSetup::default(), NumberingDefinition::standard(9));
    doc.blocks.push(Block::Paragraph(Paragraph::with_text("Hello")));
    doc.blocks.push(Block::Paragraph(Paragraph::with_text("World")));
    doc
}

#[test]
fn test_registry_with_mock_writer() {
    let mut registry = WriterRegistry::with_defaults();
    registry.register(Arc::new(MockWriter::new(vec!["docx"], "mock-docx")));

    assert!(registry.supports("DOCX"));
    assert_eq!(
        registry.supported_extensions(),
        vec!["docx", "json", "text", "txt"]
    );

    let writer = registry.get_by_name("mock-docx").unwrap();
    assert!(writer.supports_extension("docx"));
    assert!(writer.mime_type().contains("wordprocessingml"));

    let bytes = registry.write(&sample(), "docx").unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert!(bytes.ends_with(b"Hello\nWorld"));
}

#[test]
fn test_later_registration_wins() {
    let mut registry = WriterRegistry::new();
    registry.register(Arc::new(MockWriter::new(vec!["docx"], "first")));
    registry.register(Arc::new(MockWriter::new(vec!["docx"], "second")));

    assert_eq!(registry.get_by_extension("docx").unwrap().name(), "second");
}

#[test]
fn test_save_as_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("out.bin");

    save_as(b"bytes", &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
}

#[test]
fn test_write_to_path_picks_writer_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let registry = WriterRegistry::with_defaults();
    let doc = sample();

    let txt = dir.path().join("out.txt");
    let written = registry.write_to_path(&doc, &txt).unwrap();
    let text = std::fs::read_to_string(&txt).unwrap();
    assert_eq!(text, TextWriter::new().render(&doc));
    assert_eq!(written, text.len());

    let json = dir.path().join("out.json");
    registry.write_to_path(&doc, &json).unwrap();
    let round: ExportDocument =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(round, doc);

    let docx = dir.path().join("out.docx");
    assert!(matches!(
        registry.write_to_path(&doc, &docx),
        Err(Error::UnknownFormat(_))
    ));
    assert!(!docx.exists());
}

#[test]
fn test_compact_json_is_single_line() {
    let json = JsonWriter::new(JsonFormat::Compact).to_string(&sample()).unwrap();
    assert!(!json.contains('\n'));
    assert!(json.contains("\"Hello\""));
}
