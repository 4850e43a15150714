//! HTML parsing module.
//!
//! Reads the HTML the editing surface serializes into a [`Document`], with
//! every block styled from a [`StyleSheet`].

mod html;
mod options;
mod style;

pub use html::HtmlParser;
pub use options::{ErrorMode, ParseOptions};
pub use style::{BlockStyle, StyleSheet};

use crate::error::Result;
use crate::tree::{Document, InlineNode};

/// Parse editor HTML into a document.
pub fn parse_html(html: &str, options: &ParseOptions) -> Result<Document> {
    HtmlParser::new(options.clone())?.parse(html)
}

/// Parse an inline HTML fragment.
pub fn parse_inline(html: &str) -> Result<Vec<InlineNode>> {
    HtmlParser::new(ParseOptions::default())?.parse_inline(html)
}
