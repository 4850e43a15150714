//! Element parsers for top-level blocks.
//!
//! Each parser claims the blocks it understands and turns one of them into
//! zero or more export blocks. The assembler asks its parsers in order and
//! the first one that matches wins.

use super::{ExportContext, ListFlowHandler, TableHandler};
use crate::error::Result;
use crate::model::Block;
use crate::tree::{DocumentNode, NodeKind};

/// Converts one kind of top-level block.
pub trait ElementParser {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Whether this parser handles `node`.
    fn matches(&self, node: &DocumentNode) -> bool;

    /// Convert the block at `path`.
    fn parse(&self, ctx: &mut ExportContext<'_>, path: &[usize]) -> Result<Vec<Block>>;
}

/// Body paragraphs: one export paragraph per visual line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphParser;

impl ElementParser for ParagraphParser {
    fn name(&self) -> &str {
        "paragraph"
    }

    fn matches(&self, node: &DocumentNode) -> bool {
        node.kind == NodeKind::Paragraph
    }

    fn parse(&self, ctx: &mut ExportContext<'_>, path: &[usize]) -> Result<Vec<Block>> {
        Ok(ctx
            .paragraphs(path)?
            .into_iter()
            .map(Block::Paragraph)
            .collect())
    }
}

/// Headings 1-3.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingParser;

impl ElementParser for HeadingParser {
    fn name(&self) -> &str {
        "heading"
    }

    fn matches(&self, node: &DocumentNode) -> bool {
        matches!(node.kind, NodeKind::Heading { .. })
    }

    fn parse(&self, ctx: &mut ExportContext<'_>, path: &[usize]) -> Result<Vec<Block>> {
        Ok(ctx
            .paragraphs(path)?
            .into_iter()
            .map(Block::Paragraph)
            .collect())
    }
}

/// Ordered or bullet lists, each starting a new numbering instance.
#[derive(Debug, Clone, Copy)]
pub struct ListParser {
    ordered: bool,
}

impl ListParser {
    /// Parser for numbered lists.
    pub fn ordered() -> Self {
        Self { ordered: true }
    }

    /// Parser for bullet lists.
    pub fn bullet() -> Self {
        Self { ordered: false }
    }
}

impl ElementParser for ListParser {
    fn name(&self) -> &str {
        if self.ordered {
            "ordered-list"
        } else {
            "bullet-list"
        }
    }

    fn matches(&self, node: &DocumentNode) -> bool {
        match node.kind {
            NodeKind::OrderedList => self.ordered,
            NodeKind::BulletList => !self.ordered,
            _ => false,
        }
    }

    fn parse(&self, ctx: &mut ExportContext<'_>, path: &[usize]) -> Result<Vec<Block>> {
        let kind = ctx.node(path)?.kind.clone();
        let instance = ctx.next_list_instance();
        ListFlowHandler::new(&kind, 0, instance).handle(ctx, path)
    }
}

/// Tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableParser;

impl ElementParser for TableParser {
    fn name(&self) -> &str {
        "table"
    }

    fn matches(&self, node: &DocumentNode) -> bool {
        node.kind == NodeKind::Table
    }

    fn parse(&self, ctx: &mut ExportContext<'_>, path: &[usize]) -> Result<Vec<Block>> {
        let table = TableHandler::new().handle(ctx, path)?;
        Ok(vec![Block::Table(table)])
    }
}

/// The built-in parsers in priority order.
pub fn default_parsers() -> Vec<Box<dyn ElementParser + Send + Sync>> {
    vec![
        Box::new(ParagraphParser),
        Box::new(HeadingParser),
        Box::new(ListParser::ordered()),
        Box::new(TableParser),
        Box::new(ListParser::bullet()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeId;

    #[test]
    fn test_default_order() {
        let names: Vec<String> = default_parsers().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["paragraph", "heading", "ordered-list", "table", "bullet-list"]
        );
    }

    #[test]
    fn test_matching() {
        let ol = DocumentNode::container(NodeId::new(1), NodeKind::OrderedList, vec![]);
        let ul = DocumentNode::container(NodeId::new(2), NodeKind::BulletList, vec![]);
        let hr = DocumentNode::new(NodeId::new(3), NodeKind::Unknown { tag: "hr".into() });

        assert!(ListParser::ordered().matches(&ol));
        assert!(!ListParser::ordered().matches(&ul));
        assert!(ListParser::bullet().matches(&ul));
        assert!(default_parsers().iter().all(|p| !p.matches(&hr)));
    }
}
