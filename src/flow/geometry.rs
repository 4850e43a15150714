//! Page geometry and the crossing test.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A4 height at 96 dpi.
pub const A4_HEIGHT_PX: f64 = 1122.0;

/// Fixed page size and spacing of the on-screen pages, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Height of one page
    pub page_height_px: f64,

    /// Blank band at the top and bottom of every page
    pub page_margin_px: f64,

    /// Gap drawn between consecutive pages
    pub page_gap_px: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_height_px: A4_HEIGHT_PX,
            page_margin_px: 96.0,
            page_gap_px: 76.0,
        }
    }
}

impl PageGeometry {
    /// Create geometry with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page height.
    pub fn with_page_height(mut self, px: f64) -> Self {
        self.page_height_px = px;
        self
    }

    /// Set the page margin.
    pub fn with_margin(mut self, px: f64) -> Self {
        self.page_margin_px = px;
        self
    }

    /// Set the gap between pages.
    pub fn with_gap(mut self, px: f64) -> Self {
        self.page_gap_px = px;
        self
    }

    /// Reject geometry that leaves no room for content.
    pub fn validate(&self) -> Result<()> {
        if self.page_height_px.is_nan() || self.page_height_px <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "page height must be positive, got {}",
                self.page_height_px
            )));
        }
        if self.page_margin_px < 0.0 || self.page_gap_px < 0.0 {
            return Err(Error::InvalidConfig(
                "page margin and gap must not be negative".to_string(),
            ));
        }
        if 2.0 * self.page_margin_px >= self.page_height_px {
            return Err(Error::InvalidConfig(format!(
                "margins of {}px leave no content area on a {}px page",
                self.page_margin_px, self.page_height_px
            )));
        }
        Ok(())
    }

    /// Height available to content on one page.
    pub fn usable_height(&self) -> f64 {
        self.page_height_px - 2.0 * self.page_margin_px
    }

    /// Distance from the top of one page to the top of the next.
    pub fn pitch(&self) -> f64 {
        self.page_height_px + self.page_gap_px
    }

    /// Page index an offset falls on.
    pub fn page_of(&self, offset: f64) -> i64 {
        (offset / self.pitch()).floor() as i64
    }

    /// Last offset usable by content on `page`.
    pub fn content_end(&self, page: i64) -> f64 {
        page as f64 * self.pitch() + self.page_height_px - self.page_margin_px
    }

    /// First offset usable by content on `page`.
    pub fn content_start(&self, page: i64) -> f64 {
        page as f64 * self.pitch() + self.page_margin_px
    }

    /// Test a vertical extent against the page boundaries.
    pub fn span(&self, top: f64, bottom: f64) -> PageSpan {
        let start_page = self.page_of(top);
        let end_page = self.page_of(bottom);
        let content_end = self.content_end(start_page);
        PageSpan {
            start_page,
            end_page,
            crossing: start_page != end_page || top > content_end || bottom > content_end,
        }
    }

    /// Number of pages needed to show a document of `height` pixels.
    pub fn page_count_for_height(&self, height: f64) -> u32 {
        let pages = ((height.round() + self.page_gap_px) / self.pitch()).ceil();
        pages.max(1.0) as u32
    }

    /// Minimum editor height that shows `pages` whole pages and the gaps
    /// between them.
    pub fn min_document_height(&self, pages: u32) -> f64 {
        let pages = f64::from(pages.max(1));
        pages * self.page_height_px + (pages - 1.0) * self.page_gap_px
    }
}

/// Pages a vertical extent touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    /// Page of the top edge
    pub start_page: i64,
    /// Page of the bottom edge
    pub end_page: i64,
    /// Whether the extent leaves the start page's content area
    pub crossing: bool,
}

/// Number of pages for a document height under `geometry`.
pub fn page_count_for_height(geometry: &PageGeometry, height: f64) -> u32 {
    geometry.page_count_for_height(height)
}

/// Backdrop height for `pages` pages under `geometry`.
pub fn min_document_height(geometry: &PageGeometry, pages: u32) -> f64 {
    geometry.min_document_height(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let g = PageGeometry::default();
        assert_eq!(g.page_height_px, (11.69_f64 * 96.0).round());
        assert_eq!(g.usable_height(), 930.0);
        assert_eq!(g.pitch(), 1198.0);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(PageGeometry::new().with_page_height(0.0).validate().is_err());
        assert!(PageGeometry::new().with_margin(561.0).validate().is_err());
        assert!(PageGeometry::new().with_gap(-1.0).validate().is_err());
    }

    #[test]
    fn test_span_boundary() {
        let g = PageGeometry::default();
        // Content on page 0 ends at 1026.
        assert!(!g.span(900.0, 1026.0).crossing);
        assert!(g.span(900.0, 1027.0).crossing);

        let across = g.span(996.0, 1246.0);
        assert!(across.crossing);
        assert_eq!((across.start_page, across.end_page), (0, 1));

        // Second page content area.
        assert!(!g.span(1294.0, 2224.0).crossing);
        assert!(g.span(1294.0, 2225.0).crossing);
    }

    #[test]
    fn test_page_count() {
        let g = PageGeometry::default();
        assert_eq!(g.page_count_for_height(0.0), 1);
        assert_eq!(g.page_count_for_height(1122.0), 1);
        assert_eq!(g.page_count_for_height(1123.0), 2);
        assert_eq!(g.min_document_height(1), 1122.0);
        assert_eq!(g.min_document_height(2), 2.0 * 1122.0 + 76.0);
    }
}
