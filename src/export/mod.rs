//! Export of a document snapshot to the word-processor model.
//!
//! The [`DocumentAssembler`] walks the top-level blocks of a snapshot and
//! hands each to the first matching [`ElementParser`]. Text blocks become one
//! paragraph per measured visual line, lists go through the recursive
//! [`ListFlowHandler`], and tables map row by row.
//!
//! # Example
//!
//! ```no_run
//! use pageflow::export::{DocumentAssembler, ExportOptions};
//! use pageflow::measure::MetricsOracle;
//! use pageflow::parser::{parse_html, ParseOptions};
//!
//! fn main() -> pageflow::Result<()> {
//!     let doc = parse_html("<p>Hello</p>", &ParseOptions::default())?;
//!     let assembler = DocumentAssembler::with_defaults(ExportOptions::default());
//!     let export = assembler.assemble(&doc, &mut MetricsOracle::new())?;
//!     println!("{} blocks", export.block_count());
//!     Ok(())
//! }
//! ```

mod assembler;
mod context;
pub mod elements;
mod list;
mod options;
mod table;

pub use assembler::DocumentAssembler;
pub use context::ExportContext;
pub use elements::{ElementParser, HeadingParser, ListParser, ParagraphParser, TableParser};
pub use list::ListFlowHandler;
pub use options::{ExportOptions, DEFAULT_MAX_NESTING_DEPTH};
pub use table::TableHandler;
