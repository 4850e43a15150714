//! Line segmentation and inline formatting reconstruction.
//!
//! A text block is cut into hard lines on explicit breaks, each line is
//! flattened into plain text plus style ranges, and wrap points inside each
//! line are found by measurement. Every resulting [`LineSegment`] carries
//! styled pieces rebuilt from the ranges and a spacing descriptor.

mod formatting;
mod segmenter;

pub use formatting::{
    extract, Formatting, FormattingRange, FormattingRangeExtractor, Run, StyleFlag, StyleFlags,
    StyledPiece,
};
pub use segmenter::{after_spacing, LineSegment, ParagraphSegmenter, Spacing};
