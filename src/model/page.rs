//! Page setup and block types.

use super::{Paragraph, Table};
use crate::units::inches_to_twips;
use serde::{Deserialize, Serialize};

/// A top-level block of the exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

impl Block {
    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::Table(t) => t.plain_text(),
        }
    }

    /// The paragraph, if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    /// Mutable access to the paragraph, if this block is one.
    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }
}

/// Physical page size and margins, in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSetup {
    /// Page width
    pub width: u32,
    /// Page height
    pub height: u32,
    /// Top margin
    pub margin_top: u32,
    /// Right margin
    pub margin_right: u32,
    /// Bottom margin
    pub margin_bottom: u32,
    /// Left margin
    pub margin_left: u32,
}

impl Default for PageSetup {
    /// 8.7in x 11.69in with 1in margins.
    fn default() -> Self {
        let inch = inches_to_twips(1.0);
        Self {
            width: inches_to_twips(8.7),
            height: inches_to_twips(11.69),
            margin_top: inch,
            margin_right: inch,
            margin_bottom: inch,
            margin_left: inch,
        }
    }
}

impl PageSetup {
    /// Page setup from inches.
    pub fn from_inches(width: f64, height: f64, margin: f64) -> Self {
        let m = inches_to_twips(margin);
        Self {
            width: inches_to_twips(width),
            height: inches_to_twips(height),
            margin_top: m,
            margin_right: m,
            margin_bottom: m,
            margin_left: m,
        }
    }

    /// Width available to text.
    pub fn content_width(&self) -> u32 {
        self.width
            .saturating_sub(self.margin_left)
            .saturating_sub(self.margin_right)
    }
}
