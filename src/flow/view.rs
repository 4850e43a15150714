//! Rendered geometry of the live document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geometry::PageGeometry;
use crate::error::Result;
use crate::measure::{MeasureSession, MeasurementOracle, StyleProfile};
use crate::segment::extract;
use crate::tree::{inline, Document, DocumentNode, NodeId, NodeKind};

/// Layout box of one node, relative to the top of the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    /// Top of the border box in layout flow
    pub offset_top: f64,
    /// Border box height
    pub offset_height: f64,
    /// Computed top margin
    pub margin_top: f64,
    /// Computed bottom margin
    pub margin_bottom: f64,
    /// Top of the bounding rectangle
    pub rect_top: f64,
    /// Bounding rectangle height
    pub rect_height: f64,
}

impl BoxGeometry {
    /// Geometry of a box with no margins, where flow and rectangle agree.
    pub fn at(top: f64, height: f64) -> Self {
        Self {
            offset_top: top,
            offset_height: height,
            margin_top: 0.0,
            margin_bottom: 0.0,
            rect_top: top,
            rect_height: height,
        }
    }

    /// Set the margins.
    pub fn with_margins(mut self, top: f64, bottom: f64) -> Self {
        self.margin_top = top;
        self.margin_bottom = bottom;
        self
    }
}

/// Read access to the geometry a renderer produced for the document.
///
/// Returns `None` for nodes not yet laid out; callers treat that as stale
/// geometry, not as an error.
pub trait RenderedView {
    fn geometry(&self, id: NodeId) -> Option<BoxGeometry>;

    /// Total rendered height of the document.
    fn document_height(&self) -> f64;
}

/// Geometry supplied up front, keyed by node id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticView {
    boxes: HashMap<NodeId, BoxGeometry>,
    height: f64,
}

impl StaticView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the box of `id`.
    pub fn insert(&mut self, id: NodeId, geometry: BoxGeometry) {
        let bottom = geometry.offset_top + geometry.offset_height + geometry.margin_bottom;
        self.height = self.height.max(bottom);
        self.boxes.insert(id, geometry);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, id: NodeId, geometry: BoxGeometry) -> Self {
        self.insert(id, geometry);
        self
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl RenderedView for StaticView {
    fn geometry(&self, id: NodeId) -> Option<BoxGeometry> {
        self.boxes.get(&id).copied()
    }

    fn document_height(&self) -> f64 {
        self.height
    }
}

/// Block layout computed without a renderer.
///
/// Blocks stack top to bottom from the first page's margin. Adjacent sibling
/// margins collapse to the larger of the two, and list wrappers, which have
/// no padding, let the margins of their first and last children collapse
/// through them. Text blocks are as tall as the oracle measures each hard
/// line, with at least one line box per line. Table rows are as tall as
/// their tallest cell.
#[derive(Debug, Clone, Default)]
pub struct HeadlessView {
    boxes: HashMap<NodeId, BoxGeometry>,
    height: f64,
}

impl HeadlessView {
    /// Lay out `doc`.
    pub fn layout<O: MeasurementOracle + ?Sized>(
        doc: &Document,
        oracle: &mut O,
        geometry: &PageGeometry,
    ) -> Result<Self> {
        let mut view = Self::default();
        let (bottom, _) = view.stack(&doc.blocks, geometry.page_margin_px, None, oracle)?;
        view.height = bottom + geometry.page_margin_px;
        Ok(view)
    }

    /// Place `nodes` one below the other starting at `top`. `pending` is the
    /// margin already advanced above `top` that the first node's top margin
    /// collapses with.
    ///
    /// Returns the bottom edge including the trailing margin, and that
    /// margin.
    fn stack<O: MeasurementOracle + ?Sized>(
        &mut self,
        nodes: &[DocumentNode],
        top: f64,
        pending: Option<f64>,
        oracle: &mut O,
    ) -> Result<(f64, Option<f64>)> {
        let mut y = top;
        let mut prev_margin = pending;

        for node in nodes {
            // Margins collapse across a spacer as if it were absent.
            if let NodeKind::Spacer { height } = node.kind {
                self.boxes.insert(node.id, BoxGeometry::at(y, height));
                y += height;
                continue;
            }

            let (mt, mb) = margins(node);
            let (gap, advanced) = match prev_margin {
                Some(prev) => (prev.max(mt) - prev, prev.max(mt)),
                None => (mt, mt),
            };
            let box_top = y + gap;

            if collapses_through(node) {
                let (end, trailing) = self.stack(&node.children, box_top, Some(advanced), oracle)?;
                let trailing = trailing.unwrap_or(advanced);
                let inner_bottom = node
                    .children
                    .iter()
                    .filter_map(|child| self.boxes.get(&child.id))
                    .map(|g| g.offset_top + g.offset_height)
                    .fold(box_top, f64::max);
                self.boxes.insert(
                    node.id,
                    BoxGeometry::at(box_top, inner_bottom - box_top).with_margins(mt, mb),
                );
                // `end` already includes `trailing`, which may be the margin
                // handed in when the wrapper is empty.
                let out = trailing.max(mb);
                y = end + out - trailing;
                prev_margin = Some(out);
                continue;
            }

            let height = self.place(node, box_top, oracle)?;
            self.boxes.insert(
                node.id,
                BoxGeometry::at(box_top, height).with_margins(mt, mb),
            );
            y = box_top + height + mb;
            prev_margin = Some(mb);
        }

        Ok((y, prev_margin))
    }

    /// Lay out the inside of `node` at `top`; returns its border-box height.
    fn place<O: MeasurementOracle + ?Sized>(
        &mut self,
        node: &DocumentNode,
        top: f64,
        oracle: &mut O,
    ) -> Result<f64> {
        match &node.kind {
            NodeKind::Spacer { height } => Ok(*height),
            NodeKind::Paragraph | NodeKind::Heading { .. } => text_height(node, oracle),
            NodeKind::TableRow => {
                let mut tallest: f64 = 0.0;
                for cell in &node.children {
                    let (mt, mb) = margins(cell);
                    let inner = self.place(cell, top + mt, oracle)?;
                    self.boxes
                        .insert(cell.id, BoxGeometry::at(top + mt, inner).with_margins(mt, mb));
                    tallest = tallest.max(mt + inner + mb);
                }
                Ok(tallest)
            }
            _ => Ok(self.stack(&node.children, top, None, oracle)?.0 - top),
        }
    }
}

/// Wrappers without padding or borders, whose children's margins meet the
/// margins outside them.
fn collapses_through(node: &DocumentNode) -> bool {
    matches!(
        node.kind,
        NodeKind::OrderedList | NodeKind::BulletList | NodeKind::ListItem
    )
}

fn margins(node: &DocumentNode) -> (f64, f64) {
    if node.is_spacer() {
        (0.0, 0.0)
    } else {
        (node.style.margin_top, node.style.margin_bottom)
    }
}

fn text_height<O: MeasurementOracle + ?Sized>(node: &DocumentNode, oracle: &mut O) -> Result<f64> {
    let mut content = node.inline.clone();
    inline::strip_trailing_breaks(&mut content);

    let mut session = MeasureSession::open(oracle, StyleProfile::from_style(&node.style))?;
    let mut height = 0.0;
    for line in inline::split_lines(&content) {
        let text = extract(&line).text;
        height += session.height(&text)?.max(node.style.line_height);
    }
    Ok(height)
}

impl RenderedView for HeadlessView {
    fn geometry(&self, id: NodeId) -> Option<BoxGeometry> {
        self.boxes.get(&id).copied()
    }

    fn document_height(&self) -> f64 {
        self.height
    }
}
