//! Live document tree.
//!
//! This is the input side of the pipeline: the structure the editing surface
//! maintains, with a stable id and resolved style on every block. Pagination
//! reads it alongside rendered geometry; export reads a snapshot of it.

mod document;
pub mod inline;
mod node;

pub use document::{Document, NodePath};
pub use inline::{InlineNode, InlineTag};
pub use node::{DocumentNode, NodeId, NodeKind, ResolvedStyle};
