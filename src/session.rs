//! Editor session: one live document with its view, oracle and pagination.
//!
//! The session owns the document content and the decoration set of the last
//! completed pass. The host binds a [`RenderedView`] of what it currently
//! shows (or asks for a headless layout), reports height changes, and polls
//! for throttled reruns. Export reads the document as rendered, spacers
//! included, so every on-screen page break becomes a page-break control.

use std::time::Instant;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::export::{DocumentAssembler, ExportOptions};
use crate::flow::{
    page_count_for_height, DecorationSet, FlowOutcome, FlowScheduler, HeadlessView,
    FlowReport, PageFlowAnalyzer, PageGeometry, RenderedView, Trigger,
};
use crate::measure::MeasurementOracle;
use crate::model::ExportDocument;
use crate::tree::Document;

/// Upper bound on headless passes in [`EditorSession::settle`].
pub const MAX_SETTLE_PASSES: usize = 256;

/// A snapshot taken by [`EditorSession::start_export`].
///
/// Holding a ticket blocks further exports until it is passed to
/// [`EditorSession::finish_export`].
#[derive(Debug)]
pub struct ExportTicket {
    snapshot: Document,
}

impl ExportTicket {
    /// The document as it was rendered when the export started.
    pub fn snapshot(&self) -> &Document {
        &self.snapshot
    }
}

/// A live document bound to a renderer.
pub struct EditorSession<O: MeasurementOracle> {
    document: Document,
    decorations: DecorationSet,
    analyzer: PageFlowAnalyzer,
    scheduler: FlowScheduler,
    assembler: DocumentAssembler,
    oracle: Option<O>,
    view: Option<Box<dyn RenderedView>>,
    exporting: bool,
}

impl<O: MeasurementOracle> EditorSession<O> {
    /// Create a session over `document` with no view or oracle bound yet.
    pub fn new(document: Document, geometry: PageGeometry) -> Self {
        Self {
            document: document.without_spacers(),
            decorations: DecorationSet::new(),
            analyzer: PageFlowAnalyzer::new(geometry),
            scheduler: FlowScheduler::default(),
            assembler: DocumentAssembler::default(),
            oracle: None,
            view: None,
            exporting: false,
        }
    }

    /// Use `options` for exports.
    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.assembler = DocumentAssembler::with_defaults(options);
        self
    }

    /// Use a custom throttle.
    pub fn with_scheduler(mut self, scheduler: FlowScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Bind the measurement oracle.
    pub fn bind_oracle(&mut self, oracle: O) {
        self.oracle = Some(oracle);
    }

    /// Bind the geometry of what the host currently renders.
    pub fn bind_view(&mut self, view: impl RenderedView + 'static) {
        self.view = Some(Box::new(view));
    }

    /// Drop the bound view, e.g. while the host re-renders.
    pub fn unbind_view(&mut self) {
        self.view = None;
    }

    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }

    /// Document content, without spacers.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the document content. The current view becomes stale.
    pub fn set_document(&mut self, document: Document) {
        self.document = document.without_spacers();
        self.view = None;
    }

    /// Decorations of the last completed pass.
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn geometry(&self) -> &PageGeometry {
        self.analyzer.geometry()
    }

    /// The document as the presentation layer renders it.
    pub fn rendered(&self) -> Document {
        self.document.with_spacers(&self.decorations)
    }

    /// Lay the rendered document out with the oracle and bind the result as
    /// the view.
    pub fn layout_headless(&mut self) -> Result<()> {
        let rendered = self.rendered();
        let oracle = self.oracle.as_mut().ok_or(Error::ViewUnavailable)?;
        let view = HeadlessView::layout(&rendered, oracle, self.analyzer.geometry())?;
        self.view = Some(Box::new(view));
        Ok(())
    }

    /// Run one flow pass against the bound view.
    ///
    /// A completed pass replaces the decorations. A pass that split a block
    /// updates the content, drops the now stale view and schedules a rerun.
    pub fn repaginate(&mut self, now: Instant) -> Result<FlowOutcome> {
        let view = self.view.as_deref().ok_or(Error::ViewUnavailable)?;
        let mut rendered = self.rendered();
        let outcome = self.analyzer.analyze(&mut rendered, view)?;

        match &outcome {
            FlowOutcome::Complete(report) => {
                self.decorations = report.decorations.clone();
            }
            FlowOutcome::TreeChanged { split, created } => {
                debug!("block {} split into {}; rerun scheduled", split, created);
                self.document = rendered.without_spacers();
                self.view = None;
                self.scheduler.request_rerun(now);
            }
        }
        Ok(outcome)
    }

    /// Lay out headlessly and repaginate until a pass completes without
    /// splitting anything.
    pub fn settle(&mut self, now: Instant) -> Result<FlowReport> {
        for pass in 1..=MAX_SETTLE_PASSES {
            self.layout_headless()?;
            if let FlowOutcome::Complete(report) = self.repaginate(now)? {
                debug!(
                    "settled after {} pass(es): {} page break(s)",
                    pass,
                    report.decorations.len()
                );
                return Ok(report);
            }
        }

        warn!("pagination did not settle after {} passes", MAX_SETTLE_PASSES);
        self.layout_headless()?;
        let outcome = self.repaginate(now)?;
        Ok(outcome.report().cloned().unwrap_or_default())
    }

    /// Report a content-height change. Runs a pass when the throttle allows.
    pub fn height_changed(&mut self, height: f64, now: Instant) -> Result<Option<FlowOutcome>> {
        match self.scheduler.height_changed(height, now) {
            Trigger::RunNow => self.repaginate(now).map(Some),
            _ => Ok(None),
        }
    }

    /// Run the pending pass if it is due.
    pub fn tick(&mut self, now: Instant) -> Result<Option<FlowOutcome>> {
        if !self.scheduler.poll(now) {
            return Ok(None);
        }
        if self.view.is_none() && self.oracle.is_some() {
            self.layout_headless()?;
        }
        self.repaginate(now).map(Some)
    }

    /// Instant at which a pending pass becomes due.
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Number of pages the bound view spans.
    pub fn page_count(&self) -> Result<u32> {
        let view = self.view.as_deref().ok_or(Error::ViewUnavailable)?;
        Ok(page_count_for_height(
            self.analyzer.geometry(),
            view.document_height(),
        ))
    }

    /// Snapshot the rendered document for export.
    pub fn start_export(&mut self) -> Result<ExportTicket> {
        if self.exporting {
            return Err(Error::ExportInProgress);
        }
        if self.oracle.is_none() {
            return Err(Error::ViewUnavailable);
        }
        self.exporting = true;
        Ok(ExportTicket {
            snapshot: self.rendered(),
        })
    }

    /// Assemble the snapshot of `ticket`. Ends the export whether or not
    /// assembly succeeds.
    pub fn finish_export(&mut self, ticket: ExportTicket) -> Result<ExportDocument> {
        self.exporting = false;
        let oracle = self.oracle.as_mut().ok_or(Error::ViewUnavailable)?;
        self.assembler.assemble(&ticket.snapshot, oracle)
    }

    /// Export the document as currently rendered.
    pub fn export(&mut self) -> Result<ExportDocument> {
        let ticket = self.start_export()?;
        self.finish_export(ticket)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }
}
