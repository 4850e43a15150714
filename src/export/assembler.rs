//! Document assembly.

use log::{debug, warn};

use super::elements::{default_parsers, ElementParser};
use super::{ExportContext, ExportOptions};
use crate::error::Result;
use crate::measure::MeasurementOracle;
use crate::model::{Block, ExportDocument, Metadata, NumberingDefinition};
use crate::tree::Document;

/// Builds an [`ExportDocument`] from a document snapshot.
///
/// Top-level blocks are dispatched to the first registered
/// [`ElementParser`] that matches. Blocks nobody claims are logged and
/// skipped. A spacer at the top level ends the preceding paragraph with a
/// page break.
pub struct DocumentAssembler {
    parsers: Vec<Box<dyn ElementParser + Send + Sync>>,
    options: ExportOptions,
}

impl DocumentAssembler {
    /// Create an assembler with no parsers.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            parsers: Vec::new(),
            options,
        }
    }

    /// Create an assembler with the built-in parsers.
    pub fn with_defaults(options: ExportOptions) -> Self {
        Self {
            parsers: default_parsers(),
            options,
        }
    }

    /// Append a parser. Parsers registered earlier take priority.
    pub fn register(&mut self, parser: Box<dyn ElementParser + Send + Sync>) {
        self.parsers.push(parser);
    }

    /// Names of the registered parsers in priority order.
    pub fn parser_names(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Assemble `doc`, measuring line wraps with `oracle`.
    pub fn assemble(
        &self,
        doc: &Document,
        oracle: &mut dyn MeasurementOracle,
    ) -> Result<ExportDocument> {
        self.options.validate()?;

        let mut export = ExportDocument::new(
            self.options.page_setup,
            NumberingDefinition::standard(self.options.max_nesting_depth),
        );
        export.metadata = Metadata {
            title: self.options.title.clone(),
            creator: Some(format!("pageflow {}", crate::VERSION)),
            created: self.options.created,
            source_blocks: doc.blocks.iter().filter(|b| !b.is_spacer()).count(),
        };

        let mut ctx = ExportContext::new(doc, oracle, &self.options);
        let mut break_pending = false;
        let mut skipped = 0;

        for (idx, node) in doc.blocks.iter().enumerate() {
            if node.is_spacer() {
                match export.blocks.last_mut().and_then(Block::as_paragraph_mut) {
                    Some(last) => last.style.page_break_after = true,
                    None => break_pending = true,
                }
                continue;
            }

            let Some(parser) = self.parsers.iter().find(|p| p.matches(node)) else {
                warn!("no element parser for <{}> {}; skipped", node.kind.tag(), node.id);
                skipped += 1;
                continue;
            };

            let mut blocks = parser.parse(&mut ctx, &[idx])?;
            if std::mem::take(&mut break_pending) {
                mark_page_break_before(&mut blocks);
            }
            export.blocks.append(&mut blocks);
        }

        debug!(
            "assembled {} blocks from {} source blocks ({} skipped, {} list instances)",
            export.block_count(),
            export.metadata.source_blocks,
            skipped,
            ctx.list_instances()
        );
        Ok(export)
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::with_defaults(ExportOptions::default())
    }
}

fn mark_page_break_before(blocks: &mut [Block]) {
    match blocks.first_mut() {
        Some(Block::Paragraph(p)) => p.style.page_break_before = true,
        Some(Block::Table(t)) => {
            if let Some(row) = t.rows.first_mut() {
                row.page_break_before = true;
            }
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{FnOracle, StyleProfile};
    use crate::tree::{DocumentNode, InlineNode, NodeId, NodeKind};

    fn one_line() -> FnOracle<impl FnMut(&str, &StyleProfile) -> f64> {
        FnOracle::new(|text: &str, p: &StyleProfile| {
            if text.is_empty() {
                0.0
            } else {
                p.line_height
            }
        })
    }

    fn para(id: u64, text: &str) -> DocumentNode {
        DocumentNode::paragraph(NodeId::new(id), vec![InlineNode::text(text)])
    }

    #[test]
    fn test_unknown_block_is_skipped() {
        let doc = Document::new(vec![
            para(1, "before"),
            DocumentNode::new(NodeId::new(2), NodeKind::Unknown { tag: "hr".into() }),
            para(3, "after"),
        ]);
        let export = DocumentAssembler::default()
            .assemble(&doc, &mut one_line())
            .unwrap();

        assert_eq!(export.block_count(), 2);
        assert_eq!(export.plain_text(), "before\nafter");
        assert_eq!(export.metadata.source_blocks, 3);
    }

    #[test]
    fn test_top_level_spacer_breaks_previous_paragraph() {
        let doc = Document::new(vec![
            para(1, "one"),
            DocumentNode::spacer(NodeId::new(2), 200.0),
            para(3, "two"),
        ]);
        let export = DocumentAssembler::default()
            .assemble(&doc, &mut one_line())
            .unwrap();

        let ps: Vec<_> = export.paragraphs().collect();
        assert_eq!(ps.len(), 2);
        assert!(ps[0].style.page_break_after);
        assert!(!ps[1].style.page_break_before);
    }

    #[test]
    fn test_leading_spacer_breaks_before_first_block() {
        let doc = Document::new(vec![DocumentNode::spacer(NodeId::new(1), 50.0), para(2, "x")]);
        let export = DocumentAssembler::default()
            .assemble(&doc, &mut one_line())
            .unwrap();
        assert!(export.paragraphs().next().unwrap().style.page_break_before);
    }

    #[test]
    fn test_empty_registry_exports_nothing() {
        let doc = Document::new(vec![para(1, "x")]);
        let assembler = DocumentAssembler::new(ExportOptions::default());
        assert!(assembler.parser_names().is_empty());
        let export = assembler.assemble(&doc, &mut one_line()).unwrap();
        assert!(export.is_empty());
        assert_eq!(export.numbering.len(), 3);
    }
}
