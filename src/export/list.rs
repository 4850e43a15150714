//! List export.

use log::{debug, warn};

use super::ExportContext;
use crate::error::Result;
use crate::model::numbering::{BULLET, NUMBERED, UNNUMBERED};
use crate::model::{Block, NumberingRef};
use crate::tree::{NodeKind, NodePath};

/// Turns one list, and recursively its sublists, into numbered paragraphs.
///
/// The first paragraph of every item carries the list's marker; later
/// paragraphs of the same item continue it indented without a marker. A
/// spacer among the items or inside an item makes the next paragraph start a
/// new page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFlowHandler {
    reference: &'static str,
    depth: u8,
    instance: u32,
}

impl ListFlowHandler {
    /// Handler for a list of `kind` at nesting `depth`, numbering as
    /// `instance`.
    pub fn new(kind: &NodeKind, depth: u8, instance: u32) -> Self {
        let reference = match kind {
            NodeKind::OrderedList => NUMBERED,
            _ => BULLET,
        };
        Self {
            reference,
            depth,
            instance,
        }
    }

    /// Numbering definition the item markers refer to.
    pub fn reference(&self) -> &'static str {
        self.reference
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn instance(&self) -> u32 {
        self.instance
    }

    /// Export the list at `path`.
    pub fn handle(&self, ctx: &mut ExportContext<'_>, path: &[usize]) -> Result<Vec<Block>> {
        let list = ctx.node(path)?;
        let level = self.depth.min(ctx.options().max_level());
        let mut blocks = Vec::new();
        let mut break_pending = false;

        for (item_idx, item) in list.children.iter().enumerate() {
            let item_path = child_path(path, item_idx);
            match item.kind {
                NodeKind::Spacer { .. } => {
                    break_pending = true;
                    continue;
                }
                NodeKind::ListItem => {}
                _ => {
                    warn!("skipping <{}> {} directly inside a list", item.kind.tag(), item.id);
                    continue;
                }
            }

            let mut marked = false;
            for (idx, child) in item.children.iter().enumerate() {
                let child_path = child_path(&item_path, idx);
                match &child.kind {
                    NodeKind::Spacer { .. } => break_pending = true,
                    kind if kind.is_textblock() => {
                        for mut paragraph in ctx.paragraphs(&child_path)? {
                            let reference = if marked { UNNUMBERED } else { self.reference };
                            marked = true;
                            paragraph.style.numbering = Some(NumberingRef {
                                reference: reference.to_string(),
                                level,
                                instance: self.instance,
                            });
                            if break_pending {
                                paragraph.style.page_break_before = true;
                                break_pending = false;
                            }
                            blocks.push(Block::Paragraph(paragraph));
                        }
                    }
                    kind if kind.is_list() => {
                        let nested = ListFlowHandler::new(
                            kind,
                            self.depth.saturating_add(1),
                            ctx.next_list_instance(),
                        );
                        blocks.extend(nested.handle(ctx, &child_path)?);
                    }
                    _ => warn!(
                        "skipping <{}> {} inside list item {}",
                        child.kind.tag(),
                        child.id,
                        item.id
                    ),
                }
            }
        }

        debug!(
            "list {} ({}, depth {}, instance {}): {} paragraphs",
            list.id,
            self.reference,
            self.depth,
            self.instance,
            blocks.len()
        );
        Ok(blocks)
    }
}

fn child_path(parent: &[usize], idx: usize) -> NodePath {
    let mut path = parent.to_vec();
    path.push(idx);
    path
}
