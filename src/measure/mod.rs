//! Measurement oracles.
//!
//! Wrap points are discovered by asking something that can actually lay text
//! out how tall a candidate string renders in a box styled like the block
//! being segmented. The segmentation algorithm only ever talks to the
//! [`MeasurementOracle`] trait:
//!
//! - [`SurfaceOracle`] drives a hidden box attached to a live renderer
//!   through the [`RenderSurface`] trait the host implements.
//! - [`MetricsOracle`] lays text out headlessly from static glyph-advance
//!   tables.
//! - [`FnOracle`] adapts a closure, for hosts with their own measuring hook.
//!
//! Measurements happen inside a [`MeasureSession`], which acquires the
//! oracle's surface on creation and releases it on drop, including on early
//! return through `?`.

mod metrics;
mod surface;

pub use metrics::{FontMetrics, GlyphMetrics, MetricsOracle, FONT_ENV};
pub use surface::{RenderSurface, SurfaceOracle};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::ResolvedStyle;

/// The style parameters a measurement box must mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Content width in pixels
    pub width: f64,
    /// Horizontal padding in pixels
    pub padding_left: f64,
    /// Font size in pixels
    pub font_size: f64,
    /// CSS font-family list
    pub font_family: String,
    /// Line height in pixels
    pub line_height: f64,
}

impl StyleProfile {
    /// Profile for a block with the given resolved style.
    pub fn from_style(style: &ResolvedStyle) -> Self {
        Self {
            width: style.width,
            padding_left: style.padding_left,
            font_size: style.font_size,
            font_family: style.font_family.clone(),
            line_height: style.line_height,
        }
    }
}

impl From<&ResolvedStyle> for StyleProfile {
    fn from(style: &ResolvedStyle) -> Self {
        Self::from_style(style)
    }
}

/// Something that can report how tall text renders.
pub trait MeasurementOracle {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Acquire whatever the oracle measures with, configured for `profile`.
    fn begin(&mut self, profile: &StyleProfile) -> Result<()> {
        let _ = profile;
        Ok(())
    }

    /// Rendered height of `text` inside a box matching `profile`.
    /// Empty text has no line box and measures zero.
    fn measure(&mut self, text: &str, profile: &StyleProfile) -> Result<f64>;

    /// Release what [`begin`](Self::begin) acquired. Must not fail.
    fn end(&mut self) {}
}

impl<O: MeasurementOracle + ?Sized> MeasurementOracle for &mut O {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn begin(&mut self, profile: &StyleProfile) -> Result<()> {
        (**self).begin(profile)
    }

    fn measure(&mut self, text: &str, profile: &StyleProfile) -> Result<f64> {
        (**self).measure(text, profile)
    }

    fn end(&mut self) {
        (**self).end()
    }
}

impl MeasurementOracle for Box<dyn MeasurementOracle> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn begin(&mut self, profile: &StyleProfile) -> Result<()> {
        (**self).begin(profile)
    }

    fn measure(&mut self, text: &str, profile: &StyleProfile) -> Result<f64> {
        (**self).measure(text, profile)
    }

    fn end(&mut self) {
        (**self).end()
    }
}

/// Scoped use of an oracle for one profile.
///
/// Tracks the last measured height so callers can grow a candidate one
/// character at a time and ask whether that character made it wrap.
pub struct MeasureSession<'a, O: MeasurementOracle + ?Sized> {
    oracle: &'a mut O,
    profile: StyleProfile,
    last_height: f64,
    measurements: usize,
}

impl<'a, O: MeasurementOracle + ?Sized> MeasureSession<'a, O> {
    /// Acquire the oracle for `profile`.
    pub fn open(oracle: &'a mut O, profile: StyleProfile) -> Result<Self> {
        oracle.begin(&profile)?;
        Ok(Self {
            oracle,
            profile,
            last_height: 0.0,
            measurements: 0,
        })
    }

    /// Height of `text`.
    pub fn height(&mut self, text: &str) -> Result<f64> {
        self.measurements += 1;
        self.oracle.measure(text, &self.profile)
    }

    /// Measure `candidate` and report whether it renders taller than the
    /// previous candidate. The first measurement after a reset never wraps.
    pub fn wraps(&mut self, candidate: &str) -> Result<bool> {
        let height = self.height(candidate)?;
        let wrapped = self.last_height > 0.0 && height > self.last_height;
        self.last_height = height;
        Ok(wrapped)
    }

    /// Forget the previous height, after a break starts a fresh candidate.
    pub fn reset(&mut self) {
        self.last_height = 0.0;
    }

    /// Profile this session measures with.
    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    /// Name of the underlying oracle.
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Number of oracle queries made so far.
    pub fn measurements(&self) -> usize {
        self.measurements
    }
}

impl<O: MeasurementOracle + ?Sized> Drop for MeasureSession<'_, O> {
    fn drop(&mut self) {
        self.oracle.end();
    }
}

/// Oracle backed by a closure returning the rendered height.
pub struct FnOracle<F> {
    measure: F,
}

impl<F> FnOracle<F>
where
    F: FnMut(&str, &StyleProfile) -> f64,
{
    /// Wrap a measuring closure.
    pub fn new(measure: F) -> Self {
        Self { measure }
    }
}

impl<F> MeasurementOracle for FnOracle<F>
where
    F: FnMut(&str, &StyleProfile) -> f64,
{
    fn name(&self) -> &str {
        "fn"
    }

    fn measure(&mut self, text: &str, profile: &StyleProfile) -> Result<f64> {
        Ok((self.measure)(text, profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting<'a> {
        open: &'a Cell<i32>,
    }

    impl MeasurementOracle for Counting<'_> {
        fn name(&self) -> &str {
            "counting"
        }

        fn begin(&mut self, _profile: &StyleProfile) -> Result<()> {
            self.open.set(self.open.get() + 1);
            Ok(())
        }

        fn measure(&mut self, text: &str, _profile: &StyleProfile) -> Result<f64> {
            if text == "boom" {
                return Err(crate::Error::Measurement("boom".into()));
            }
            Ok(if text.len() > 4 { 48.0 } else { 24.0 })
        }

        fn end(&mut self) {
            self.open.set(self.open.get() - 1);
        }
    }

    fn profile() -> StyleProfile {
        StyleProfile::from_style(&ResolvedStyle::body())
    }

    #[test]
    fn test_session_detects_height_growth() {
        let open = Cell::new(0);
        let mut oracle = Counting { open: &open };
        let mut session = MeasureSession::open(&mut oracle, profile()).unwrap();

        assert!(!session.wraps("a").unwrap());
        assert!(!session.wraps("abcd").unwrap());
        assert!(session.wraps("abcde").unwrap());
        session.reset();
        assert!(!session.wraps("abcdef").unwrap());
        assert_eq!(session.measurements(), 4);
    }

    #[test]
    fn test_session_releases_on_error() {
        let open = Cell::new(0);
        let mut oracle = Counting { open: &open };

        let result: Result<bool> = (|| {
            let mut session = MeasureSession::open(&mut oracle, profile())?;
            assert_eq!(open.get(), 1);
            session.wraps("boom")
        })();

        assert!(result.is_err());
        assert_eq!(open.get(), 0);
    }

    #[test]
    fn test_fn_oracle() {
        let mut oracle = FnOracle::new(|text: &str, p: &StyleProfile| {
            if text.is_empty() {
                0.0
            } else {
                p.line_height
            }
        });
        assert_eq!(oracle.measure("x", &profile()).unwrap(), 24.0);
        assert_eq!(oracle.measure("", &profile()).unwrap(), 0.0);
    }
}
