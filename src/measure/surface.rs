//! Oracle backed by a renderer-provided measurement box.

use log::trace;

use super::{MeasurementOracle, StyleProfile};
use crate::error::{Error, Result};

/// A hidden, style-matched box on a live rendering surface.
///
/// Implemented by the host. The oracle attaches the box once per measured
/// block, replaces its text for every candidate and detaches it when done.
pub trait RenderSurface {
    /// Create and attach the box, styled from `profile`.
    fn attach(&mut self, profile: &StyleProfile) -> Result<()>;

    /// Replace the box's text content.
    fn set_text(&mut self, text: &str) -> Result<()>;

    /// Current rendered height of the box in pixels.
    fn offset_height(&self) -> f64;

    /// Remove the box.
    fn detach(&mut self);
}

/// [`MeasurementOracle`] that measures through a [`RenderSurface`].
///
/// At most one box is attached at a time; a second `begin` without an
/// intervening `end` fails with [`Error::SurfaceBusy`].
pub struct SurfaceOracle<S> {
    surface: S,
    attached: bool,
}

impl<S: RenderSurface> SurfaceOracle<S> {
    /// Wrap a surface.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            attached: false,
        }
    }

    /// Whether a measurement box is currently attached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Unwrap the surface.
    pub fn into_inner(self) -> S {
        self.surface
    }
}

impl<S: RenderSurface> MeasurementOracle for SurfaceOracle<S> {
    fn name(&self) -> &str {
        "surface"
    }

    fn begin(&mut self, profile: &StyleProfile) -> Result<()> {
        if self.attached {
            return Err(Error::SurfaceBusy);
        }
        self.surface.attach(profile)?;
        self.attached = true;
        trace!("measurement box attached (width {}px)", profile.width);
        Ok(())
    }

    fn measure(&mut self, text: &str, _profile: &StyleProfile) -> Result<f64> {
        if !self.attached {
            return Err(Error::Measurement(
                "measurement box is not attached".to_string(),
            ));
        }
        self.surface.set_text(text)?;
        Ok(self.surface.offset_height())
    }

    fn end(&mut self) {
        if self.attached {
            self.surface.detach();
            self.attached = false;
            trace!("measurement box detached");
        }
    }
}
