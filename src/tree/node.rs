//! Block-level node types of the live document tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::inline::{self, InlineNode};

/// Stable node identifier.
///
/// Assigned once when a node is created and kept across edits, so decorations
/// computed in one pass can still be matched against the tree in the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Create an id from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw id value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The structural type of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// A paragraph of inline content
    Paragraph,
    /// A heading (level 1-3)
    Heading {
        /// Heading level
        level: u8,
    },
    /// A numbered list
    OrderedList,
    /// A bulleted list
    BulletList,
    /// A list item holding paragraphs and nested lists
    ListItem,
    /// A table
    Table,
    /// A table row
    TableRow,
    /// A table cell
    TableCell {
        /// Whether the cell is a header cell
        header: bool,
    },
    /// Blank region injected by pagination before a crossing block
    Spacer {
        /// Spacer height in pixels
        height: f64,
    },
    /// A block the tree does not model
    Unknown {
        /// Source tag name
        tag: String,
    },
}

impl NodeKind {
    /// Create a heading kind, clamping the level to 1-3.
    pub fn heading(level: u8) -> Self {
        NodeKind::Heading {
            level: level.clamp(1, 3),
        }
    }

    /// HTML tag name for this kind.
    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Paragraph => "p",
            NodeKind::Heading { level: 1 } => "h1",
            NodeKind::Heading { level: 2 } => "h2",
            NodeKind::Heading { .. } => "h3",
            NodeKind::OrderedList => "ol",
            NodeKind::BulletList => "ul",
            NodeKind::ListItem => "li",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tr",
            NodeKind::TableCell { header: true } => "th",
            NodeKind::TableCell { header: false } => "td",
            NodeKind::Spacer { .. } => "div",
            NodeKind::Unknown { tag } => tag,
        }
    }

    /// Whether this node holds inline content directly.
    pub fn is_textblock(&self) -> bool {
        matches!(self, NodeKind::Paragraph | NodeKind::Heading { .. })
    }

    /// Whether this node is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, NodeKind::OrderedList | NodeKind::BulletList)
    }

    /// Structural wrappers that pagination walks into instead of decorating.
    pub fn is_flow_container(&self) -> bool {
        matches!(
            self,
            NodeKind::OrderedList | NodeKind::BulletList | NodeKind::ListItem | NodeKind::Table
        )
    }
}

/// Style attributes resolved for a node, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    /// Font size
    pub font_size: f64,
    /// CSS font-family list
    pub font_family: String,
    /// Top margin
    pub margin_top: f64,
    /// Bottom margin
    pub margin_bottom: f64,
    /// Line height
    pub line_height: f64,
    /// Width of the content box
    pub width: f64,
    /// Horizontal padding on each side
    pub padding_left: f64,
}

impl ResolvedStyle {
    /// Body text defaults: 16px serif, 1em vertical margins, 1.5 line height,
    /// inside an A4 page with 1in side margins.
    pub fn body() -> Self {
        Self {
            font_size: 16.0,
            font_family: "serif".to_string(),
            margin_top: 16.0,
            margin_bottom: 16.0,
            line_height: 24.0,
            width: 643.0,
            padding_left: 0.0,
        }
    }

    /// Copy with both vertical margins replaced.
    pub fn with_margins(mut self, top: f64, bottom: f64) -> Self {
        self.margin_top = top;
        self.margin_bottom = bottom;
        self
    }

    /// Copy with a new font size; line height keeps its ratio.
    pub fn with_font_size(mut self, size: f64) -> Self {
        if self.font_size > 0.0 {
            self.line_height *= size / self.font_size;
        }
        self.font_size = size;
        self
    }

    /// Copy with a new content width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Copy with no vertical margins.
    pub fn without_margins(self) -> Self {
        self.with_margins(0.0, 0.0)
    }
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self::body()
    }
}

/// A node of the live document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Stable id
    pub id: NodeId,

    /// Structural type
    pub kind: NodeKind,

    /// Resolved style
    #[serde(default)]
    pub style: ResolvedStyle,

    /// Block children (lists, items, rows, cells)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,

    /// Inline content (text blocks only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline: Vec<InlineNode>,
}

impl DocumentNode {
    /// Create a node with default style and no content.
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            style: ResolvedStyle::default(),
            children: Vec::new(),
            inline: Vec::new(),
        }
    }

    /// Create a paragraph holding inline content.
    pub fn paragraph(id: NodeId, inline: Vec<InlineNode>) -> Self {
        Self {
            inline,
            ..Self::new(id, NodeKind::Paragraph)
        }
    }

    /// Create a heading holding inline content.
    pub fn heading(id: NodeId, level: u8, inline: Vec<InlineNode>) -> Self {
        Self {
            inline,
            ..Self::new(id, NodeKind::heading(level))
        }
    }

    /// Create a structural node with block children. Structural nodes
    /// carry no vertical margins of their own.
    pub fn container(id: NodeId, kind: NodeKind, children: Vec<DocumentNode>) -> Self {
        Self {
            children,
            style: ResolvedStyle::default().without_margins(),
            ..Self::new(id, kind)
        }
    }

    /// Create a spacer of the given height.
    pub fn spacer(id: NodeId, height: f64) -> Self {
        Self {
            style: ResolvedStyle::default().without_margins(),
            ..Self::new(id, NodeKind::Spacer { height })
        }
    }

    /// Replace the style and return self.
    pub fn styled(mut self, style: ResolvedStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether this node is a pagination spacer.
    pub fn is_spacer(&self) -> bool {
        matches!(self.kind, NodeKind::Spacer { .. })
    }

    /// Text content of the node and its descendants. Hard breaks contribute
    /// nothing.
    pub fn text_content(&self) -> String {
        let mut out = inline::text_content(&self.inline);
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Depth-first search for a node by id, including self.
    pub fn find(&self, id: NodeId) -> Option<&DocumentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// First paragraph among the descendants of this node (not self).
    pub fn first_descendant_paragraph(&self) -> Option<&DocumentNode> {
        for child in &self.children {
            if child.kind == NodeKind::Paragraph {
                return Some(child);
            }
            if let Some(found) = child.first_descendant_paragraph() {
                return Some(found);
            }
        }
        None
    }

    /// Size of this node in document positions: one token each for open and
    /// close, one per character or hard break of content. Spacers are not
    /// part of the content and take no positions.
    pub fn node_size(&self) -> usize {
        if self.is_spacer() {
            return 0;
        }
        2 + self.children.iter().map(|c| c.node_size()).sum::<usize>()
            + inline::position_len(&self.inline)
    }

    /// Largest id in this subtree.
    pub fn max_id(&self) -> u64 {
        self.children
            .iter()
            .map(|c| c.max_id())
            .fold(self.id.value(), u64::max)
    }
}
