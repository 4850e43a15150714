//! The live document: an ordered list of top-level blocks.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::inline;
use super::node::{DocumentNode, NodeId};
use crate::error::{Error, Result};
use crate::flow::DecorationSet;

/// Index path from the document root to a node.
pub type NodePath = Vec<usize>;

/// A live rich-text document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level blocks in document order
    pub blocks: Vec<DocumentNode>,

    #[serde(default)]
    next_id: u64,
}

impl Document {
    /// Create a document from blocks whose ids are already assigned.
    pub fn new(blocks: Vec<DocumentNode>) -> Self {
        let mut doc = Self { blocks, next_id: 0 };
        doc.next_id = doc.max_id() + 1;
        doc
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Document = serde_json::from_str(json)?;
        Ok(Self::new(doc.blocks))
    }

    /// Hand out a fresh id, unique within this document.
    pub fn allocate_id(&mut self) -> NodeId {
        self.next_id = self.next_id.max(self.max_id() + 1);
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn max_id(&self) -> u64 {
        self.blocks.iter().map(|b| b.max_id()).max().unwrap_or(0)
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Plain text of the document, one block per paragraph.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| !b.is_spacer())
            .map(|b| b.text_content())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Find a node by id anywhere in the tree.
    pub fn find(&self, id: NodeId) -> Option<&DocumentNode> {
        self.blocks.iter().find_map(|b| b.find(id))
    }

    /// Path of a node by id.
    pub fn path_of(&self, id: NodeId) -> Option<NodePath> {
        fn search(nodes: &[DocumentNode], id: NodeId, path: &mut NodePath) -> bool {
            for (i, node) in nodes.iter().enumerate() {
                path.push(i);
                if node.id == id || search(&node.children, id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.blocks, id, &mut path).then_some(path)
    }

    /// Node at a path.
    pub fn node_at(&self, path: &[usize]) -> Option<&DocumentNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.blocks.get(*first)?;
        for idx in rest {
            node = node.children.get(*idx)?;
        }
        Some(node)
    }

    /// Sibling list containing the node at `path`.
    fn siblings(&self, path: &[usize]) -> Option<&[DocumentNode]> {
        match path.split_last() {
            Some((_, [])) => Some(&self.blocks),
            Some((_, parent)) => self.node_at(parent).map(|p| p.children.as_slice()),
            None => None,
        }
    }

    fn siblings_mut(&mut self, path: &[usize]) -> Option<&mut Vec<DocumentNode>> {
        let (_, parent) = path.split_last()?;
        let mut list = &mut self.blocks;
        for idx in parent {
            list = &mut list.get_mut(*idx)?.children;
        }
        Some(list)
    }

    /// The sibling immediately before the node at `path`.
    pub fn previous_sibling(&self, path: &[usize]) -> Option<&DocumentNode> {
        let idx = *path.last()?;
        if idx == 0 {
            return None;
        }
        self.siblings(path)?.get(idx - 1)
    }

    /// The sibling immediately after the node at `path`.
    pub fn next_sibling(&self, path: &[usize]) -> Option<&DocumentNode> {
        let idx = *path.last()?;
        self.siblings(path)?.get(idx + 1)
    }

    /// The block that follows the node at `path` in document order.
    ///
    /// Climbs through ancestors until one has a next sibling that is not a
    /// spacer, then returns that sibling's first paragraph, or the sibling
    /// itself. Stops at the document root.
    pub fn next_block_after(&self, path: &[usize]) -> Option<&DocumentNode> {
        let mut cursor = path.to_vec();
        while let Some(&idx) = cursor.last() {
            let next = self
                .siblings(&cursor)
                .and_then(|siblings| siblings.get(idx + 1..))
                .and_then(|rest| rest.iter().find(|n| !n.is_spacer()));
            if let Some(next) = next {
                return Some(next.first_descendant_paragraph().unwrap_or(next));
            }
            cursor.pop();
        }
        None
    }

    /// Split a paragraph or heading into two sibling blocks of the same
    /// type. The first half keeps `id` and ends at character `at`; the second
    /// half gets a fresh id and starts at character `resume`.
    ///
    /// Returns the id of the second half, or `None` when the node is not a
    /// text block or either half would be empty.
    pub fn split_block(&mut self, id: NodeId, at: usize, resume: usize) -> Result<Option<NodeId>> {
        let path = self.path_of(id).ok_or(Error::NodeNotFound(id))?;
        let node = self.node_at(&path).ok_or(Error::NodeNotFound(id))?;

        if !node.kind.is_textblock() {
            warn!("refusing to split non-text block {} <{}>", id, node.kind.tag());
            return Ok(None);
        }

        let (head, _) = inline::split_at(&node.inline, at);
        let (_, tail) = inline::split_at(&node.inline, resume);
        if inline::text_content(&head).trim().is_empty()
            || inline::text_content(&tail).trim().is_empty()
        {
            return Ok(None);
        }

        let mut first = node.clone();
        first.inline = head;
        let mut second = node.clone();
        second.inline = tail;
        second.id = self.allocate_id();
        let second_id = second.id;

        let idx = path[path.len() - 1];
        let siblings = self.siblings_mut(&path).ok_or(Error::NodeNotFound(id))?;
        siblings.splice(idx..=idx, [first, second]);

        debug!("split block {} at char {}; new block {}", id, at, second_id);
        Ok(Some(second_id))
    }

    /// Copy of the document with every spacer removed.
    pub fn without_spacers(&self) -> Document {
        fn strip(nodes: &[DocumentNode]) -> Vec<DocumentNode> {
            nodes
                .iter()
                .filter(|n| !n.is_spacer())
                .map(|n| DocumentNode {
                    children: strip(&n.children),
                    ..n.clone()
                })
                .collect()
        }

        Document {
            blocks: strip(&self.blocks),
            next_id: self.next_id,
        }
    }

    /// Copy of the document as the presentation layer renders it: previous
    /// spacers removed, then one spacer inserted before each decorated node.
    pub fn with_spacers(&self, decorations: &DecorationSet) -> Document {
        fn insert(nodes: Vec<DocumentNode>, decorations: &DecorationSet, next: &mut u64) -> Vec<DocumentNode> {
            let mut out = Vec::with_capacity(nodes.len());
            for mut node in nodes {
                node.children = insert(std::mem::take(&mut node.children), decorations, next);
                if let Some(margin) = decorations.spacer_before(node.id) {
                    out.push(DocumentNode::spacer(NodeId::new(*next), margin));
                    *next += 1;
                }
                out.push(node);
            }
            out
        }

        let mut doc = self.without_spacers();
        let mut next = doc.next_id.max(doc.max_id() + 1);
        doc.blocks = insert(std::mem::take(&mut doc.blocks), decorations, &mut next);
        doc.next_id = next;
        doc
    }

    /// Count spacers anywhere in the tree.
    pub fn spacer_count(&self) -> usize {
        fn count(nodes: &[DocumentNode]) -> usize {
            nodes
                .iter()
                .map(|n| usize::from(n.is_spacer()) + count(&n.children))
                .sum()
        }
        count(&self.blocks)
    }
}

impl From<Vec<DocumentNode>> for Document {
    fn from(blocks: Vec<DocumentNode>) -> Self {
        Self::new(blocks)
    }
}
