//! The page-flow pass.

use std::collections::HashSet;
use std::ops::ControlFlow;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::decoration::{CrossingElement, DecorationSet};
use super::geometry::PageGeometry;
use super::view::RenderedView;
use crate::error::Result;
use crate::tree::{Document, DocumentNode, NodeId, NodeKind};

/// Result of a completed pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    /// Crossing blocks, in document order
    pub crossings: Vec<CrossingElement>,
    /// Spacers to render; replaces any previous set
    pub decorations: DecorationSet,
    /// Blocks whose extent was tested
    pub visited: usize,
    /// Blocks skipped for missing geometry
    pub stale: usize,
    /// Net correction carried at the end of the walk
    pub correction: f64,
}

/// What a pass produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// The walk finished; apply the decorations.
    Complete(FlowReport),
    /// An oversize block was split and the walk stopped. The tree has
    /// changed, so geometry is stale until the next pass.
    TreeChanged {
        /// The block that was split; it keeps the first half
        split: NodeId,
        /// The new block holding the second half
        created: NodeId,
    },
}

impl FlowOutcome {
    /// Whether another pass is needed.
    pub fn needs_rerun(&self) -> bool {
        matches!(self, FlowOutcome::TreeChanged { .. })
    }

    /// The report of a completed pass.
    pub fn report(&self) -> Option<&FlowReport> {
        match self {
            FlowOutcome::Complete(report) => Some(report),
            FlowOutcome::TreeChanged { .. } => None,
        }
    }
}

/// Finds blocks crossing page boundaries and computes the spacing that
/// pushes each one onto the next page.
#[derive(Debug, Clone, Default)]
pub struct PageFlowAnalyzer {
    geometry: PageGeometry,
}

/// A split the walk asked for.
struct SplitRequest {
    id: NodeId,
    at: usize,
    resume: usize,
}

impl PageFlowAnalyzer {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Run one pass over `doc` as rendered in `view`.
    ///
    /// `doc` is the tree as the renderer shows it, spacers from the previous
    /// pass included. An oversize paragraph or heading is split in place and
    /// the pass stops with [`FlowOutcome::TreeChanged`].
    pub fn analyze<V: RenderedView + ?Sized>(&self, doc: &mut Document, view: &V) -> Result<FlowOutcome> {
        self.geometry.validate()?;

        let mut walk = Walk::new(&self.geometry, view);
        let flow = walk.nodes(&doc.blocks, 0);

        if let ControlFlow::Break(request) = flow {
            if let Some(created) = doc.split_block(request.id, request.at, request.resume)? {
                debug!("split oversize block {} (new block {}); rerun needed", request.id, created);
                return Ok(FlowOutcome::TreeChanged {
                    split: request.id,
                    created,
                });
            }
            warn!("oversize block {} could not be split; left as is", request.id);
        }

        let decorations = DecorationSet::from(walk.crossings.as_slice());
        debug!(
            "flow pass: {} blocks, {} stale, {} crossings, correction {}px",
            walk.visited,
            walk.stale,
            walk.crossings.len(),
            walk.correction
        );
        Ok(FlowOutcome::Complete(FlowReport {
            crossings: walk.crossings,
            decorations,
            visited: walk.visited,
            stale: walk.stale,
            correction: walk.correction,
        }))
    }
}

struct Walk<'a, V: ?Sized> {
    geometry: &'a PageGeometry,
    view: &'a V,
    correction: f64,
    seen_tops: HashSet<i64>,
    crossings: Vec<CrossingElement>,
    visited: usize,
    stale: usize,
}

impl<'a, V: RenderedView + ?Sized> Walk<'a, V> {
    fn new(geometry: &'a PageGeometry, view: &'a V) -> Self {
        Self {
            geometry,
            view,
            correction: 0.0,
            seen_tops: HashSet::new(),
            crossings: Vec::new(),
            visited: 0,
            stale: 0,
        }
    }

    /// Visit a sibling list whose first node starts at document position `pos`.
    fn nodes(&mut self, nodes: &[DocumentNode], mut pos: usize) -> ControlFlow<SplitRequest> {
        for (idx, node) in nodes.iter().enumerate() {
            let size = node.node_size();
            if !node.is_spacer() {
                let previous = idx.checked_sub(1).map(|i| &nodes[i]);
                self.node(node, previous, pos)?;
            }
            pos += size;
        }
        ControlFlow::Continue(())
    }

    fn node(
        &mut self,
        node: &DocumentNode,
        previous: Option<&DocumentNode>,
        pos: usize,
    ) -> ControlFlow<SplitRequest> {
        if node.kind.is_flow_container() {
            return self.nodes(&node.children, pos + 1);
        }

        let Some(geometry) = self.view.geometry(node.id) else {
            self.stale += 1;
            return ControlFlow::Continue(());
        };

        if let Some(spacer) = previous.filter(|p| p.is_spacer()) {
            self.correction -= self.spacer_height(spacer);
        }

        let is_row = node.kind == NodeKind::TableRow;
        let margin_top = geometry.margin_top.ceil();
        let margin_bottom = geometry.margin_bottom;
        let (top, bottom, height) = if is_row {
            let top = (geometry.rect_top + self.correction).ceil();
            (top, top + geometry.rect_height, geometry.rect_height)
        } else {
            let top = (geometry.offset_top + self.correction).ceil();
            let height = geometry.offset_height + margin_top + margin_bottom;
            (top, top + height, height)
        };
        self.visited += 1;

        if height > self.geometry.usable_height() {
            if node.kind.is_textblock() {
                if let Some((at, resume)) = split_point(&node.text_content()) {
                    return ControlFlow::Break(SplitRequest {
                        id: node.id,
                        at,
                        resume,
                    });
                }
            }
            warn!(
                "{} <{}> is taller than a page ({}px) and cannot be split",
                node.id,
                node.kind.tag(),
                height
            );
            return self.nodes(&node.children, pos + 1);
        }

        let span = self.geometry.span(top, bottom);
        if span.crossing {
            let target = self.geometry.content_start(span.start_page + 1) + margin_top;
            let margin_to_fix = (target - top).ceil();
            if self.seen_tops.insert(top as i64) {
                self.correction += margin_to_fix;
            }
            self.crossings.push(CrossingElement {
                node_id: node.id,
                range: pos..pos + node.node_size(),
                start_page: span.start_page,
                end_page: span.end_page,
                margin_to_fix,
                margin_top,
                preview: node.text_content().chars().take(10).collect(),
            });
            return ControlFlow::Continue(());
        }

        if is_row {
            return ControlFlow::Continue(());
        }
        self.nodes(&node.children, pos + 1)
    }

    fn spacer_height(&self, spacer: &DocumentNode) -> f64 {
        match (self.view.geometry(spacer.id), &spacer.kind) {
            (Some(g), _) => g.offset_height,
            (None, NodeKind::Spacer { height }) => *height,
            (None, _) => 0.0,
        }
    }
}

/// Character offsets for splitting `text` in two: the whitespace nearest
/// the middle, ties going left. The whitespace itself is dropped.
pub fn split_point(text: &str) -> Option<(usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return None;
    }
    let mid = chars.len() / 2;

    chars
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .filter(|&i| i > 0 && i + 1 < chars.len())
        .min_by_key(|&i| (i.abs_diff(mid), i))
        .map(|i| (i, i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::view::{BoxGeometry, StaticView};
    use crate::tree::InlineNode;

    fn para(id: u64, text: &str) -> DocumentNode {
        DocumentNode::paragraph(NodeId::new(id), vec![InlineNode::text(text)])
    }

    #[test]
    fn test_split_point() {
        assert_eq!(split_point("aaaa bbbb"), Some((4, 5)));
        // Spaces at 2 and 6, middle 4: tie goes left.
        assert_eq!(split_point("aa bbb cc"), Some((2, 3)));
        assert_eq!(split_point("nowhitespace"), None);
        assert_eq!(split_point(" x"), None);
    }

    #[test]
    fn test_block_ending_at_content_end_is_not_crossing() {
        let analyzer = PageFlowAnalyzer::default();
        let mut doc = Document::new(vec![para(1, "a"), para(2, "b")]);
        let view = StaticView::new()
            .with(NodeId::new(1), BoxGeometry::at(96.0, 830.0))
            .with(NodeId::new(2), BoxGeometry::at(926.0, 100.0));

        let outcome = analyzer.analyze(&mut doc, &view).unwrap();
        assert!(outcome.report().unwrap().crossings.is_empty());

        let view = view.with(NodeId::new(2), BoxGeometry::at(926.0, 101.0));
        let outcome = analyzer.analyze(&mut doc, &view).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.crossings.len(), 1);
        assert_eq!(report.crossings[0].margin_to_fix, 1198.0 + 96.0 - 926.0);
    }

    #[test]
    fn test_correction_shifts_later_blocks() {
        let analyzer = PageFlowAnalyzer::default();
        let mut doc = Document::new(vec![para(1, "a"), para(2, "b"), para(3, "c")]);
        let view = StaticView::new()
            .with(NodeId::new(1), BoxGeometry::at(96.0, 900.0))
            .with(NodeId::new(2), BoxGeometry::at(996.0, 100.0))
            // Crosses unshifted; the correction moves it onto page 1.
            .with(NodeId::new(3), BoxGeometry::at(1096.0, 50.0));

        let outcome = analyzer.analyze(&mut doc, &view).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.crossings.len(), 1);
        assert_eq!(report.crossings[0].node_id, NodeId::new(2));
        assert_eq!(report.correction, 298.0);
    }

    #[test]
    fn test_missing_geometry_is_stale() {
        let analyzer = PageFlowAnalyzer::default();
        let mut doc = Document::new(vec![para(1, "a")]);
        let outcome = analyzer.analyze(&mut doc, &StaticView::new()).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.stale, 1);
        assert_eq!(report.visited, 0);
    }

    #[test]
    fn test_oversize_paragraph_is_split() {
        let analyzer = PageFlowAnalyzer::default();
        let mut doc = Document::new(vec![para(1, "first half second half")]);
        let view = StaticView::new().with(NodeId::new(1), BoxGeometry::at(96.0, 2000.0));

        let outcome = analyzer.analyze(&mut doc, &view).unwrap();
        assert!(outcome.needs_rerun());
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].text_content(), "first half");
        assert_eq!(doc.blocks[1].text_content(), "second half");
    }

    #[test]
    fn test_oversize_without_whitespace_is_left() {
        let analyzer = PageFlowAnalyzer::default();
        let mut doc = Document::new(vec![para(1, "unbreakable")]);
        let view = StaticView::new().with(NodeId::new(1), BoxGeometry::at(96.0, 2000.0));

        let outcome = analyzer.analyze(&mut doc, &view).unwrap();
        let report = outcome.report().unwrap();
        assert!(report.crossings.is_empty());
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_shared_top_counted_once() {
        let analyzer = PageFlowAnalyzer::default();
        let mut doc = Document::new(vec![para(1, "a"), para(2, "b")]);
        let view = StaticView::new()
            .with(NodeId::new(1), BoxGeometry::at(1000.0, 100.0))
            .with(NodeId::new(2), BoxGeometry::at(706.0, 100.0));

        // With node 1's correction applied, node 2 starts at the same top.
        let outcome = analyzer.analyze(&mut doc, &view).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.crossings.len(), 2);
        assert_eq!(report.crossings[1].margin_to_fix, 294.0);
        assert_eq!(report.correction, 294.0);
    }
}
