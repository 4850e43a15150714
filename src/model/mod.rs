//! Export document model.
//!
//! The format-agnostic representation handed to document writers: ordered
//! paragraphs and tables with word-processor units already applied (twips
//! for spacing and page setup, half-points for font sizes), plus the
//! numbering definitions list paragraphs refer to.

mod document;
pub mod numbering;
mod page;
mod paragraph;
mod table;

pub use document::{ExportDocument, Metadata};
pub use numbering::{NumberFormat, NumberingDefinition, NumberingLevel};
pub use page::{Block, PageSetup};
pub use paragraph::{
    LineRule, NumberingRef, Paragraph, ParagraphSpacing, ParagraphStyle, TextRun, TextStyle,
};
pub use table::{Table, TableCell, TableRow};
