//! Page flow: making a continuous document look like fixed-size pages.
//!
//! Each pass walks the rendered document, finds blocks whose extent leaves a
//! page's content area and computes the spacer that pushes each of them to
//! the top of the next page. Passes are full recomputations; their output
//! replaces the previous decorations.

mod analyzer;
mod decoration;
mod geometry;
mod scheduler;
mod view;

pub use analyzer::{split_point, FlowOutcome, FlowReport, PageFlowAnalyzer};
pub use decoration::{CrossingElement, DecorationSet, PageBreak};
pub use geometry::{
    min_document_height, page_count_for_height, PageGeometry, PageSpan, A4_HEIGHT_PX,
};
pub use scheduler::{FlowScheduler, Trigger, DEFAULT_THROTTLE};
pub use view::{BoxGeometry, HeadlessView, RenderedView, StaticView};
