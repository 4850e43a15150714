//! Inline markup inside text blocks.
//!
//! Inline content is a small tree: text leaves, hard breaks and formatting
//! wrappers. The helpers here cut that tree apart without losing formatting:
//! a wrapper that spans a cut is cloned onto both sides, each clone keeping
//! only the nodes on its side.

use serde::{Deserialize, Serialize};

/// Inline wrapper tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineTag {
    /// `<strong>`
    Strong,
    /// `<b>`
    B,
    /// `<em>`
    Em,
    /// `<i>`
    I,
    /// `<u>`
    U,
    /// `<s>`
    S,
    /// `<strike>`
    Strike,
    /// `<del>`
    Del,
    /// `<span>`
    Span,
    /// Any other inline tag; carries no formatting
    Other(String),
}

impl InlineTag {
    /// Resolve a tag name (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "strong" => InlineTag::Strong,
            "b" => InlineTag::B,
            "em" => InlineTag::Em,
            "i" => InlineTag::I,
            "u" => InlineTag::U,
            "s" => InlineTag::S,
            "strike" => InlineTag::Strike,
            "del" => InlineTag::Del,
            "span" => InlineTag::Span,
            other => InlineTag::Other(other.to_string()),
        }
    }

    /// Tag name.
    pub fn name(&self) -> &str {
        match self {
            InlineTag::Strong => "strong",
            InlineTag::B => "b",
            InlineTag::Em => "em",
            InlineTag::I => "i",
            InlineTag::U => "u",
            InlineTag::S => "s",
            InlineTag::Strike => "strike",
            InlineTag::Del => "del",
            InlineTag::Span => "span",
            InlineTag::Other(name) => name,
        }
    }
}

/// An inline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineNode {
    /// Plain text
    Text {
        /// The text
        text: String,
    },

    /// A hard line break
    Break {
        /// Editor artifact that only keeps an empty last line visible
        #[serde(default)]
        trailing: bool,
    },

    /// A formatting wrapper
    Element {
        /// Wrapper tag
        tag: InlineTag,
        /// Wrapped nodes
        children: Vec<InlineNode>,
    },
}

impl InlineNode {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text { text: text.into() }
    }

    /// Create a hard break.
    pub fn hard_break() -> Self {
        InlineNode::Break { trailing: false }
    }

    /// Create a trailing-artifact break.
    pub fn trailing_break() -> Self {
        InlineNode::Break { trailing: true }
    }

    /// Create a wrapper element.
    pub fn element(tag: InlineTag, children: Vec<InlineNode>) -> Self {
        InlineNode::Element { tag, children }
    }

    /// Wrap text in `<strong>`.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::element(InlineTag::Strong, vec![Self::text(text)])
    }

    /// Wrap text in `<em>`.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::element(InlineTag::Em, vec![Self::text(text)])
    }

    /// Number of characters this node contributes to the flattened text.
    pub fn char_len(&self) -> usize {
        match self {
            InlineNode::Text { text } => text.chars().count(),
            InlineNode::Break { .. } => 0,
            InlineNode::Element { children, .. } => children.iter().map(|c| c.char_len()).sum(),
        }
    }
}

/// Flattened text of an inline sequence. Breaks contribute nothing.
pub fn text_content(nodes: &[InlineNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            InlineNode::Text { text } => out.push_str(text),
            InlineNode::Break { .. } => {}
            InlineNode::Element { children, .. } => out.push_str(&text_content(children)),
        }
    }
    out
}

/// Number of document positions an inline sequence occupies: one per
/// character and one per hard break.
pub fn position_len(nodes: &[InlineNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            InlineNode::Text { text } => text.chars().count(),
            InlineNode::Break { .. } => 1,
            InlineNode::Element { children, .. } => position_len(children),
        })
        .sum()
}

/// Remove trailing-artifact breaks that are the last child of their parent.
pub fn strip_trailing_breaks(nodes: &mut Vec<InlineNode>) {
    for node in nodes.iter_mut() {
        if let InlineNode::Element { children, .. } = node {
            strip_trailing_breaks(children);
        }
    }
    if matches!(nodes.last(), Some(InlineNode::Break { trailing: true })) {
        nodes.pop();
    }
}

/// Split an inline sequence on hard breaks into lines.
///
/// Wrappers spanning a break are cloned per resulting line. There is always
/// at least one (possibly empty) line.
pub fn split_lines(nodes: &[InlineNode]) -> Vec<Vec<InlineNode>> {
    let mut lines: Vec<Vec<InlineNode>> = vec![Vec::new()];

    for node in nodes {
        match node {
            InlineNode::Break { .. } => lines.push(Vec::new()),
            InlineNode::Text { .. } => push_current(&mut lines, node.clone()),
            InlineNode::Element { tag, children } => {
                for (idx, child_line) in split_lines(children).into_iter().enumerate() {
                    let wrapper = InlineNode::element(tag.clone(), child_line);
                    if idx == 0 {
                        push_current(&mut lines, wrapper);
                    } else {
                        lines.push(vec![wrapper]);
                    }
                }
            }
        }
    }

    lines
}

fn push_current(lines: &mut [Vec<InlineNode>], node: InlineNode) {
    if let Some(line) = lines.last_mut() {
        line.push(node);
    }
}

/// Split an inline sequence at a character offset of its flattened text.
///
/// Zero-width nodes sitting exactly on the offset stay on the left. Empty
/// wrappers produced by the cut are dropped.
pub fn split_at(nodes: &[InlineNode], offset: usize) -> (Vec<InlineNode>, Vec<InlineNode>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;

    for node in nodes {
        let len = node.char_len();
        if pos + len <= offset {
            left.push(node.clone());
        } else if pos >= offset {
            right.push(node.clone());
        } else {
            let local = offset - pos;
            match node {
                InlineNode::Text { text } => {
                    let head: String = text.chars().take(local).collect();
                    let tail: String = text.chars().skip(local).collect();
                    left.push(InlineNode::text(head));
                    right.push(InlineNode::text(tail));
                }
                InlineNode::Element { tag, children } => {
                    let (l, r) = split_at(children, local);
                    left.push(InlineNode::element(tag.clone(), l));
                    right.push(InlineNode::element(tag.clone(), r));
                }
                InlineNode::Break { .. } => left.push(node.clone()),
            }
        }
        pos += len;
    }

    (prune(left), prune(right))
}

/// Drop empty text nodes and wrappers left without content.
pub(crate) fn prune(nodes: Vec<InlineNode>) -> Vec<InlineNode> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            InlineNode::Text { ref text } if text.is_empty() => None,
            InlineNode::Element { tag, children } => {
                let children = prune(children);
                if children.is_empty() {
                    None
                } else {
                    Some(InlineNode::Element { tag, children })
                }
            }
            other => Some(other),
        })
        .collect()
}
