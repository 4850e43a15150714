//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

/// An exported paragraph: one visual line of the source block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in the paragraph
    pub runs: Vec<TextRun>,

    /// Paragraph style
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(TextRun::new(text));
        p
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        self.style.heading_level.is_some()
    }

    /// Check if this paragraph belongs to a list.
    pub fn is_list_item(&self) -> bool {
        self.style.numbering.is_some()
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle {
                bold: true,
                ..Default::default()
            },
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Run properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Single underline
    pub underline: bool,

    /// Strikethrough text
    pub strike: bool,

    /// Font name as the word processor knows it
    pub font: Option<String>,

    /// Font size in half-points
    pub size_half_points: Option<u32>,
}

impl TextStyle {
    /// Check if any inline formatting is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline || self.strike
    }
}

/// How the line height value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRule {
    /// The line is at least this tall
    #[default]
    AtLeast,
    /// The line is exactly this tall
    Exact,
}

/// Paragraph spacing in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphSpacing {
    /// Line height
    pub line: u32,

    /// Line height rule
    pub line_rule: LineRule,

    /// Space before the paragraph
    pub before: u32,

    /// Space after the paragraph
    pub after: u32,
}

/// Reference from a paragraph to a numbering definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    /// Definition reference name
    pub reference: String,

    /// Level within the definition (0 = top level)
    pub level: u8,

    /// List instance; paragraphs sharing one restart numbering together
    pub instance: u32,
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Heading level (1-3) or None for body text
    pub heading_level: Option<u8>,

    /// Spacing
    pub spacing: ParagraphSpacing,

    /// List numbering, if the paragraph belongs to a list
    pub numbering: Option<NumberingRef>,

    /// Start the paragraph on a new page
    pub page_break_before: bool,

    /// End the paragraph with a page break
    pub page_break_after: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::new("Hello "));
        p.add_run(TextRun::bold("world"));
        p.add_run(TextRun::new("!"));

        assert_eq!(p.plain_text(), "Hello world!");
        assert!(!p.is_heading());
        assert!(!p.is_list_item());
    }

    #[test]
    fn test_text_style() {
        assert!(!TextStyle::default().has_styling());
        assert!(TextRun::bold("x").style.has_styling());
    }

    #[test]
    fn test_empty() {
        assert!(Paragraph::new().is_empty());
        assert!(Paragraph::with_text("  ").is_empty());
        assert!(!Paragraph::with_text("x").is_empty());
    }
}
