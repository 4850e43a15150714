//! Pagination output.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

/// A block found straddling a page boundary in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingElement {
    /// Crossing node
    pub node_id: NodeId,
    /// Document positions the node occupies
    pub range: Range<usize>,
    /// Page of the node's top edge
    pub start_page: i64,
    /// Page of the node's bottom edge
    pub end_page: i64,
    /// Spacing that moves the node to the next page's content area
    pub margin_to_fix: f64,
    /// The node's own top margin
    pub margin_top: f64,
    /// First characters of the node's text
    pub preview: String,
}

/// One injected spacer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBreak {
    pub node_id: NodeId,
    pub margin_px: f64,
}

impl PageBreak {
    pub fn new(node_id: NodeId, margin_px: f64) -> Self {
        Self { node_id, margin_px }
    }
}

/// The full set of spacers for one pass, in document order.
///
/// A set replaces its predecessor wholesale; nothing carries over between
/// passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecorationSet {
    breaks: Vec<PageBreak>,
}

impl DecorationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spacer. A second entry for the same node is ignored.
    pub fn push(&mut self, page_break: PageBreak) {
        if !self.highlighted(page_break.node_id) {
            self.breaks.push(page_break);
        }
    }

    /// Height of the spacer rendered before `id`.
    pub fn spacer_before(&self, id: NodeId) -> Option<f64> {
        self.breaks
            .iter()
            .find(|b| b.node_id == id)
            .map(|b| b.margin_px)
    }

    /// Whether `id` is drawn as a crossing block.
    pub fn highlighted(&self, id: NodeId) -> bool {
        self.breaks.iter().any(|b| b.node_id == id)
    }

    /// All spacers in document order.
    pub fn page_breaks(&self) -> &[PageBreak] {
        &self.breaks
    }

    /// Total injected height.
    pub fn total_margin(&self) -> f64 {
        self.breaks.iter().map(|b| b.margin_px).sum()
    }

    pub fn len(&self) -> usize {
        self.breaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breaks.is_empty()
    }
}

impl FromIterator<PageBreak> for DecorationSet {
    fn from_iter<I: IntoIterator<Item = PageBreak>>(iter: I) -> Self {
        let mut set = Self::new();
        for page_break in iter {
            set.push(page_break);
        }
        set
    }
}

impl From<&[CrossingElement]> for DecorationSet {
    fn from(crossings: &[CrossingElement]) -> Self {
        crossings
            .iter()
            .map(|c| PageBreak::new(c.node_id, c.margin_to_fix))
            .collect()
    }
}
