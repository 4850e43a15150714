//! Table export.

use log::{debug, warn};

use super::ExportContext;
use crate::error::Result;
use crate::model::{Paragraph, Table, TableCell, TableRow};
use crate::tree::{DocumentNode, NodeKind};

/// Maps a table row by row and cell by cell, segmenting cell text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableHandler;

impl TableHandler {
    pub fn new() -> Self {
        Self
    }

    /// Export the table at `path`.
    pub fn handle(&self, ctx: &mut ExportContext<'_>, path: &[usize]) -> Result<Table> {
        let node = ctx.node(path)?;
        let mut table = Table::new();
        let mut break_pending = false;

        for (row_idx, row) in node.children.iter().enumerate() {
            match row.kind {
                NodeKind::Spacer { .. } => {
                    break_pending = true;
                    continue;
                }
                NodeKind::TableRow => {}
                _ => {
                    warn!("skipping <{}> {} directly inside a table", row.kind.tag(), row.id);
                    continue;
                }
            }

            let row_path = extend(path, row_idx);
            let mut cells = Vec::with_capacity(row.children.len());
            for (cell_idx, cell) in row.children.iter().enumerate() {
                let header = matches!(cell.kind, NodeKind::TableCell { header: true });
                let content = self.cell_content(ctx, cell, &extend(&row_path, cell_idx))?;
                cells.push(if header {
                    TableCell::header(content)
                } else {
                    TableCell::new(content)
                });
            }

            let mut out = TableRow::new(cells);
            out.page_break_before = std::mem::take(&mut break_pending);
            table.add_row(out);
        }

        debug!(
            "table {}: {} rows x {} columns",
            node.id,
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }

    fn cell_content(
        &self,
        ctx: &mut ExportContext<'_>,
        cell: &DocumentNode,
        path: &[usize],
    ) -> Result<Vec<Paragraph>> {
        // A cell holding inline content directly is segmented as one block.
        if cell.children.is_empty() {
            return if cell.inline.is_empty() {
                Ok(Vec::new())
            } else {
                ctx.paragraphs(path)
            };
        }

        let mut content = Vec::new();
        for (idx, child) in cell.children.iter().enumerate() {
            if child.kind.is_textblock() {
                content.extend(ctx.paragraphs(&extend(path, idx))?);
            } else if !child.is_spacer() {
                warn!("skipping <{}> {} inside table cell {}", child.kind.tag(), child.id, cell.id);
            }
        }
        Ok(content)
    }
}

fn extend(parent: &[usize], idx: usize) -> Vec<usize> {
    let mut path = parent.to_vec();
    path.push(idx);
    path
}
