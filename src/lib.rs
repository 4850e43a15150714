//! # pageflow
//!
//! Measurement-driven pagination and word-processor export for live
//! rich-text documents.
//!
//! An editing surface renders one continuous column of blocks. This library
//! makes that column behave like fixed-size pages: every pass finds the
//! blocks that straddle a page boundary and computes the spacer that pushes
//! each one to the next page. Exporting walks the same document, cuts every
//! text block into its visual lines by measurement and emits one paragraph
//! per line, so the exported pages break where the screen does.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pageflow::Pageflow;
//!
//! fn main() -> pageflow::Result<()> {
//!     let html = std::fs::read_to_string("letter.html")?;
//!
//!     let result = Pageflow::new().lenient().load(&html)?;
//!     println!("{} pages", result.page_count()?);
//!
//!     let mut result = result;
//!     std::fs::write("letter.json", result.to_json()?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Page flow**: spacer computation with oversize-block splitting
//! - **Pluggable measurement**: live render surfaces or headless glyph metrics
//! - **Line-faithful export**: one paragraph per rendered line, inline styles kept
//! - **Lists and tables**: nested numbering, header cells, page-break rows
//! - **Writers**: JSON and plain text built in, more through [`writer::DocumentWriter`]

pub mod error;
pub mod export;
pub mod flow;
pub mod measure;
pub mod model;
pub mod parser;
pub mod segment;
pub mod session;
pub mod tree;
pub mod units;
pub mod writer;

// Re-export commonly used types
pub use error::{Error, Result};
pub use export::{DocumentAssembler, ExportOptions};
pub use flow::{
    DecorationSet, FlowOutcome, FlowReport, HeadlessView, PageBreak, PageFlowAnalyzer,
    PageGeometry, RenderedView,
};
pub use measure::{FnOracle, MeasurementOracle, MetricsOracle, StyleProfile};
pub use model::{Block, ExportDocument, Paragraph, Table, TextRun};
pub use parser::{ErrorMode, ParseOptions, StyleSheet};
pub use session::{EditorSession, ExportTicket};
pub use tree::{Document, DocumentNode, InlineNode, NodeId, NodeKind};
pub use writer::{DocumentWriter, JsonFormat, WriterRegistry};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Library version, as recorded in exported metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse editor HTML into a document.
///
/// # Example
///
/// ```no_run
/// use pageflow::parse_html;
///
/// let doc = parse_html("<p>Hello <strong>world</strong></p>").unwrap();
/// assert_eq!(doc.blocks.len(), 1);
/// ```
pub fn parse_html(html: &str) -> Result<Document> {
    parser::parse_html(html, &ParseOptions::default())
}

/// Paginate `doc` headlessly with glyph metrics.
///
/// Oversize blocks are split until every pass completes; the returned
/// document is the split content and the set holds its page breaks.
pub fn paginate(doc: Document, geometry: PageGeometry) -> Result<(Document, DecorationSet)> {
    let mut session = EditorSession::new(doc, geometry);
    session.bind_oracle(MetricsOracle::new());
    let report = session.settle(Instant::now())?;
    Ok((session.document().clone(), report.decorations))
}

/// Paginate and export editor HTML with default settings.
///
/// # Example
///
/// ```no_run
/// use pageflow::export_html;
///
/// let export = export_html("<ol><li>one</li><li>two</li></ol>").unwrap();
/// println!("{}", export.plain_text());
/// ```
pub fn export_html(html: &str) -> Result<ExportDocument> {
    Pageflow::new().load(html)?.export()
}

/// Paginate editor HTML and write the export to `path`, choosing the
/// writer from its extension.
pub fn export_html_to_path<P: AsRef<Path>>(html: &str, path: P) -> Result<usize> {
    let doc = export_html(html)?;
    WriterRegistry::with_defaults().write_to_path(&doc, path.as_ref())
}

/// Builder for paginating and exporting editor HTML headlessly.
///
/// # Example
///
/// ```no_run
/// use pageflow::{ExportOptions, PageGeometry, Pageflow};
///
/// let text = Pageflow::new()
///     .lenient()
///     .with_geometry(PageGeometry::default().with_margin(72.0))
///     .with_export_options(ExportOptions::default().with_title("Minutes"))
///     .load("<h1>Minutes</h1><p>Attendees</p>")?
///     .to_text()?;
/// # Ok::<(), pageflow::Error>(())
/// ```
pub struct Pageflow {
    parse_options: ParseOptions,
    geometry: PageGeometry,
    export_options: ExportOptions,
    font: Option<PathBuf>,
}

impl Pageflow {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            geometry: PageGeometry::default(),
            export_options: ExportOptions::default(),
            font: None,
        }
    }

    /// Recover from malformed markup instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Set the stylesheet blocks are styled from.
    pub fn with_stylesheet(mut self, stylesheet: StyleSheet) -> Self {
        self.parse_options = self.parse_options.with_stylesheet(stylesheet);
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set export options.
    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    /// Measure text with the font in `path` instead of a detected one.
    pub fn with_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.font = Some(path.into());
        self
    }

    /// Parse `html` and paginate it until stable.
    pub fn load(self, html: &str) -> Result<PageflowResult> {
        self.geometry.validate()?;
        self.export_options.validate()?;

        let doc = parser::parse_html(html, &self.parse_options)?;
        let mut session =
            EditorSession::new(doc, self.geometry).with_export_options(self.export_options);
        let oracle = match &self.font {
            Some(path) => MetricsOracle::from_font_file(path)?,
            None => MetricsOracle::detect(),
        };
        session.bind_oracle(oracle);
        session.settle(Instant::now())?;
        Ok(PageflowResult { session })
    }
}

impl Default for Pageflow {
    fn default() -> Self {
        Self::new()
    }
}

/// A paginated document, ready for export.
pub struct PageflowResult {
    session: EditorSession<MetricsOracle>,
}

impl PageflowResult {
    /// The paginated content, without spacers.
    pub fn document(&self) -> &Document {
        self.session.document()
    }

    /// Page breaks of the final pass.
    pub fn decorations(&self) -> &DecorationSet {
        self.session.decorations()
    }

    /// Number of pages the laid-out document spans.
    pub fn page_count(&self) -> Result<u32> {
        self.session.page_count()
    }

    /// Assemble the export document.
    pub fn export(&mut self) -> Result<ExportDocument> {
        self.session.export()
    }

    /// Export as JSON.
    pub fn to_json(&mut self) -> Result<String> {
        let doc = self.export()?;
        writer::JsonWriter::new(JsonFormat::Pretty).to_string(&doc)
    }

    /// Export as plain text, one line per exported paragraph.
    pub fn to_text(&mut self) -> Result<String> {
        let doc = self.export()?;
        Ok(writer::TextWriter::new().render(&doc))
    }

    /// Export with the writer matching the extension of `path` and save it.
    pub fn write_to<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let doc = self.export()?;
        WriterRegistry::with_defaults().write_to_path(&doc, path.as_ref())
    }

    /// Give back the underlying session.
    pub fn into_session(self) -> EditorSession<MetricsOracle> {
        self.session
    }
}
