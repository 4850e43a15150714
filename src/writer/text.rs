//! Plain text writer for export documents.

use super::DocumentWriter;
use crate::error::Result;
use crate::model::{Block, ExportDocument, Paragraph};
use std::collections::HashMap;

/// Marker line written where the document breaks to a new page.
pub const PAGE_BREAK_MARKER: &str = "[page break]";

/// Writes one line per exported paragraph, with list markers, tab-separated
/// table cells and page break markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter {
    frontmatter: bool,
}

impl TextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix the output with YAML frontmatter from the metadata.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.frontmatter = include;
        self
    }

    /// Render a document as text.
    pub fn render(&self, doc: &ExportDocument) -> String {
        let mut lines = Vec::new();
        let mut counters = ListCounters::default();

        for block in &doc.blocks {
            match block {
                Block::Paragraph(p) => {
                    if p.style.page_break_before {
                        lines.push(PAGE_BREAK_MARKER.to_string());
                    }
                    lines.push(counters.line(doc, p));
                    if p.style.page_break_after {
                        lines.push(PAGE_BREAK_MARKER.to_string());
                    }
                }
                Block::Table(t) => {
                    for row in &t.rows {
                        if row.page_break_before {
                            lines.push(PAGE_BREAK_MARKER.to_string());
                        }
                        lines.push(row.plain_text());
                    }
                }
            }
        }

        let mut out = String::new();
        if self.frontmatter {
            out.push_str(&doc.metadata.to_yaml_frontmatter());
        }
        out.push_str(&lines.join("\n"));
        out.push('\n');
        out
    }
}

impl DocumentWriter for TextWriter {
    fn name(&self) -> &str {
        "text"
    }

    fn extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    fn write(&self, doc: &ExportDocument) -> Result<Vec<u8>> {
        Ok(self.render(doc).into_bytes())
    }
}

/// Item counters per list instance and level.
#[derive(Default)]
struct ListCounters {
    counts: HashMap<(u32, u8), u32>,
}

impl ListCounters {
    fn line(&mut self, doc: &ExportDocument, p: &Paragraph) -> String {
        let text = p.plain_text();
        let Some(numbering) = &p.style.numbering else {
            return text;
        };

        let indent = "  ".repeat(usize::from(numbering.level));
        let level = doc
            .numbering_definition(&numbering.reference)
            .and_then(|def| def.level(numbering.level));
        let marker = match level {
            Some(level) if !level.text.is_empty() => {
                let count = self
                    .counts
                    .entry((numbering.instance, numbering.level))
                    .or_insert(0);
                *count += 1;
                level.marker(*count)
            }
            _ => return format!("{}  {}", indent, text),
        };
        format!("{}{} {}", indent, marker, text)
    }
}
