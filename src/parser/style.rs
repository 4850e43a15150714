//! Default block styles for parsed HTML.

use serde::{Deserialize, Serialize};

use crate::tree::{NodeKind, ResolvedStyle};

/// Font size and vertical margins of one block type, in em of the body size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Font size relative to the body
    pub font_scale: f64,
    /// Top margin relative to the block's own font size
    pub margin_top_em: f64,
    /// Bottom margin relative to the block's own font size
    pub margin_bottom_em: f64,
}

impl BlockStyle {
    pub const fn new(font_scale: f64, margin_top_em: f64, margin_bottom_em: f64) -> Self {
        Self {
            font_scale,
            margin_top_em,
            margin_bottom_em,
        }
    }
}

/// Styles the editor's stylesheet gives each block type.
///
/// Only what pagination and export read is modelled: font, vertical margins,
/// line height and the horizontal space lists and table cells take away from
/// the content width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    /// Body font size in pixels
    pub font_size: f64,
    /// CSS font-family list
    pub font_family: String,
    /// Line height as a multiple of the font size
    pub line_height: f64,
    /// Width of the page content area in pixels
    pub content_width: f64,
    /// Left padding of a list
    pub list_indent: f64,
    /// Horizontal padding inside a table cell, per side
    pub cell_padding: f64,
    /// Paragraphs
    pub paragraph: BlockStyle,
    /// Headings 1-3
    pub headings: [BlockStyle; 3],
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_family: "serif".to_string(),
            line_height: 1.5,
            content_width: 643.0,
            list_indent: 40.0,
            cell_padding: 8.0,
            paragraph: BlockStyle::new(1.0, 1.0, 1.0),
            headings: [
                BlockStyle::new(2.0, 0.67, 0.67),
                BlockStyle::new(1.5, 0.83, 0.83),
                BlockStyle::new(1.17, 1.0, 1.0),
            ],
        }
    }
}

impl StyleSheet {
    /// Builder-style setter for the body font.
    pub fn with_font(mut self, size: f64, family: impl Into<String>) -> Self {
        self.font_size = size;
        self.font_family = family.into();
        self
    }

    /// Builder-style setter for the content width.
    pub fn with_content_width(mut self, width: f64) -> Self {
        self.content_width = width;
        self
    }

    /// Resolved style of a `kind` block laid out `width` pixels wide.
    /// Structural nodes get no margins.
    pub fn resolve(&self, kind: &NodeKind, width: f64) -> ResolvedStyle {
        let block = match kind {
            NodeKind::Paragraph => Some(self.paragraph),
            NodeKind::Heading { level } => {
                let idx = usize::from((*level).clamp(1, 3) - 1);
                Some(self.headings[idx])
            }
            _ => None,
        };

        let (size, top, bottom) = match block {
            Some(b) => {
                let size = self.font_size * b.font_scale;
                (size, b.margin_top_em * size, b.margin_bottom_em * size)
            }
            None => (self.font_size, 0.0, 0.0),
        };

        ResolvedStyle {
            font_size: size,
            font_family: self.font_family.clone(),
            margin_top: top,
            margin_bottom: bottom,
            line_height: size * self.line_height,
            width: width.max(0.0),
            padding_left: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_matches_body_defaults() {
        let sheet = StyleSheet::default();
        assert_eq!(sheet.resolve(&NodeKind::Paragraph, 643.0), ResolvedStyle::body());
    }

    #[test]
    fn test_heading_scales() {
        let sheet = StyleSheet::default();
        let h1 = sheet.resolve(&NodeKind::heading(1), 600.0);
        assert_eq!(h1.font_size, 32.0);
        assert_eq!(h1.line_height, 48.0);
        assert!((h1.margin_top - 21.44).abs() < 1e-9);
        assert_eq!(h1.width, 600.0);

        let list = sheet.resolve(&NodeKind::OrderedList, 600.0);
        assert_eq!(list.margin_top, 0.0);
    }
}
