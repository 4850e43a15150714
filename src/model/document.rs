//! Document-level types.

use super::{Block, NumberingDefinition, PageSetup, Paragraph};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An assembled word-processor document.
///
/// Built once per export and not modified afterwards; writers only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Document metadata
    pub metadata: Metadata,

    /// Physical page size and margins
    pub page_setup: PageSetup,

    /// Numbering definitions referenced by list paragraphs
    pub numbering: Vec<NumberingDefinition>,

    /// Content blocks in order
    pub blocks: Vec<Block>,
}

impl ExportDocument {
    /// Create an empty document.
    pub fn new(page_setup: PageSetup, numbering: Vec<NumberingDefinition>) -> Self {
        Self {
            metadata: Metadata::default(),
            page_setup,
            numbering,
            blocks: Vec::new(),
        }
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Top-level paragraphs, skipping tables.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Numbering definition by reference.
    pub fn numbering_definition(&self, reference: &str) -> Option<&NumberingDefinition> {
        self.numbering.iter().find(|d| d.reference == reference)
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Number of source blocks the export read
    pub source_blocks: usize,
}

impl Metadata {
    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        if let Some(ref creator) = self.creator {
            lines.push(format!("creator: \"{}\"", escape_yaml(creator)));
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        lines.push(format!("blocks: {}", self.source_blocks));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = ExportDocument::new(PageSetup::default(), NumberingDefinition::standard(9));
        assert!(doc.is_empty());
        assert!(doc.numbering_definition("bullet").is_some());
        assert!(doc.numbering_definition("roman").is_none());
    }

    #[test]
    fn test_metadata_frontmatter() {
        let metadata = Metadata {
            title: Some("Quarterly \"Report\"".to_string()),
            creator: Some("pageflow".to_string()),
            source_blocks: 12,
            ..Default::default()
        };

        let yaml = metadata.to_yaml_frontmatter();
        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("title: \"Quarterly \\\"Report\\\"\""));
        assert!(yaml.contains("creator: \"pageflow\""));
        assert!(yaml.contains("blocks: 12"));
    }
}
