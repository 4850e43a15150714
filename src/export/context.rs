//! Per-invocation export state.

use super::ExportOptions;
use crate::error::{Error, Result};
use crate::measure::MeasurementOracle;
use crate::model::{LineRule, Paragraph, ParagraphSpacing, ParagraphStyle, TextRun, TextStyle};
use crate::segment::{LineSegment, ParagraphSegmenter};
use crate::tree::{Document, DocumentNode, NodeKind};
use crate::units::{px_to_half_points, px_to_twips, word_font_for};

/// State of one export call.
///
/// Created fresh by every [`DocumentAssembler::assemble`](super::DocumentAssembler::assemble)
/// call and dropped when it returns, so list instances never leak between
/// exports.
pub struct ExportContext<'a> {
    doc: &'a Document,
    oracle: &'a mut dyn MeasurementOracle,
    options: &'a ExportOptions,
    list_instances: u32,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        doc: &'a Document,
        oracle: &'a mut dyn MeasurementOracle,
        options: &'a ExportOptions,
    ) -> Self {
        Self {
            doc,
            oracle,
            options,
            list_instances: 0,
        }
    }

    /// The snapshot being exported.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn options(&self) -> &'a ExportOptions {
        self.options
    }

    /// Node at `path`, or a lookup error naming the path.
    pub fn node(&self, path: &[usize]) -> Result<&'a DocumentNode> {
        self.doc
            .node_at(path)
            .ok_or_else(|| Error::PathNotFound(path.to_vec()))
    }

    /// Hand out the next list instance. The first call returns 1.
    pub fn next_list_instance(&mut self) -> u32 {
        self.list_instances += 1;
        self.list_instances
    }

    /// Number of list instances handed out so far.
    pub fn list_instances(&self) -> u32 {
        self.list_instances
    }

    /// Segment the text block at `path` into visual lines.
    pub fn segment(&mut self, path: &[usize]) -> Result<Vec<LineSegment>> {
        ParagraphSegmenter::new(&mut *self.oracle).segment_at(self.doc, path)
    }

    /// Segment the text block at `path` and turn every line into a paragraph.
    pub fn paragraphs(&mut self, path: &[usize]) -> Result<Vec<Paragraph>> {
        let node = self.node(path)?;
        let segments = self.segment(path)?;
        Ok(segments
            .iter()
            .map(|segment| self.paragraph_for(node, segment))
            .collect())
    }

    /// Build the export paragraph for one segment of `node`.
    pub fn paragraph_for(&self, node: &DocumentNode, segment: &LineSegment) -> Paragraph {
        let font = self.font_for(node);
        let size = px_to_half_points(node.style.font_size);

        let runs = segment
            .pieces
            .iter()
            .map(|piece| TextRun {
                text: piece.text.clone(),
                style: TextStyle {
                    bold: piece.bold,
                    italic: piece.italic,
                    underline: piece.underline,
                    strike: piece.strike,
                    font: Some(font.clone()),
                    size_half_points: Some(size),
                },
            })
            .collect();

        let heading_level = match node.kind {
            NodeKind::Heading { level } => Some(level),
            _ => None,
        };

        Paragraph {
            runs,
            style: ParagraphStyle {
                heading_level,
                spacing: ParagraphSpacing {
                    line: px_to_twips(segment.spacing.line()),
                    line_rule: LineRule::AtLeast,
                    before: 0,
                    after: px_to_twips(segment.spacing.after()),
                },
                ..Default::default()
            },
        }
    }

    fn font_for(&self, node: &DocumentNode) -> String {
        if node.style.font_family.trim().is_empty() {
            self.options.font_fallback.clone()
        } else {
            word_font_for(&node.style.font_family)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{FnOracle, StyleProfile};
    use crate::segment::{Spacing, StyledPiece};
    use crate::tree::{InlineNode, NodeId};

    fn one_line() -> FnOracle<impl FnMut(&str, &StyleProfile) -> f64> {
        FnOracle::new(|text: &str, p: &StyleProfile| {
            if text.is_empty() {
                0.0
            } else {
                p.line_height
            }
        })
    }

    #[test]
    fn test_instances_count_from_one() {
        let doc = Document::default();
        let mut oracle = one_line();
        let options = ExportOptions::default();
        let mut ctx = ExportContext::new(&doc, &mut oracle, &options);
        assert_eq!(ctx.next_list_instance(), 1);
        assert_eq!(ctx.next_list_instance(), 2);
        assert_eq!(ctx.list_instances(), 2);
    }

    #[test]
    fn test_missing_path_is_a_lookup_error() {
        let doc = Document::new(vec![DocumentNode::paragraph(NodeId::new(1), vec![])]);
        let mut oracle = one_line();
        let options = ExportOptions::default();
        let mut ctx = ExportContext::new(&doc, &mut oracle, &options);

        assert!(ctx.node(&[0]).is_ok());
        assert!(matches!(ctx.node(&[3]), Err(Error::PathNotFound(p)) if p == vec![3]));
        assert!(matches!(ctx.segment(&[0, 1]), Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_paragraph_units() {
        let node = DocumentNode::heading(NodeId::new(1), 2, vec![InlineNode::text("Title")]);
        let doc = Document::new(vec![node.clone()]);
        let mut oracle = one_line();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&doc, &mut oracle, &options);

        let segment = LineSegment {
            line: 0,
            start: 0,
            text: "Title".into(),
            pieces: vec![StyledPiece {
                text: "Title".into(),
                bold: true,
                italic: false,
                underline: false,
                strike: false,
            }],
            spacing: Spacing::LineAndAfter {
                line: 24.0,
                after: 32.0,
            },
        };
        let p = ctx.paragraph_for(&node, &segment);

        assert_eq!(p.style.heading_level, Some(2));
        assert_eq!(p.style.spacing.line, 360);
        assert_eq!(p.style.spacing.after, 480);
        assert_eq!(p.runs[0].style.size_half_points, Some(24));
        assert_eq!(p.runs[0].style.font.as_deref(), Some("Times New Roman"));
        assert!(p.runs[0].style.bold);
    }
}
