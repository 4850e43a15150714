//! Export options and configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::PageSetup;

/// Default number of list nesting levels the numbering definitions carry.
pub const DEFAULT_MAX_NESTING_DEPTH: u8 = 9;

/// Options for assembling an export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Number of numbering levels; deeper lists reuse the deepest level
    pub max_nesting_depth: u8,

    /// Physical page size and margins
    pub page_setup: PageSetup,

    /// Font name used when a block has no font family
    pub font_fallback: String,

    /// Document title written to the metadata
    pub title: Option<String>,

    /// Creation timestamp written to the metadata
    pub created: Option<DateTime<Utc>>,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn with_max_nesting_depth(mut self, depth: u8) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the page setup.
    pub fn with_page_setup(mut self, page_setup: PageSetup) -> Self {
        self.page_setup = page_setup;
        self
    }

    /// Set the fallback font.
    pub fn with_font_fallback(mut self, font: impl Into<String>) -> Self {
        self.font_fallback = font.into();
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the creation timestamp.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Deepest numbering level index a list can use.
    pub fn max_level(&self) -> u8 {
        self.max_nesting_depth.saturating_sub(1)
    }

    /// Check that the options describe a usable export.
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(Error::InvalidConfig(
                "max_nesting_depth must be at least 1".into(),
            ));
        }
        let setup = &self.page_setup;
        if setup.width == 0 || setup.height == 0 {
            return Err(Error::InvalidConfig("page size must be positive".into()));
        }
        if setup.content_width() == 0
            || setup.margin_top.saturating_add(setup.margin_bottom) >= setup.height
        {
            return Err(Error::InvalidConfig(
                "page margins leave no room for content".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            page_setup: PageSetup::default(),
            font_fallback: "Times New Roman".to_string(),
            title: None,
            created: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::new()
            .with_max_nesting_depth(4)
            .with_font_fallback("Arial")
            .with_title("Minutes");

        assert_eq!(options.max_nesting_depth, 4);
        assert_eq!(options.max_level(), 3);
        assert_eq!(options.font_fallback, "Arial");
        assert_eq!(options.title.as_deref(), Some("Minutes"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_depth = ExportOptions::new().with_max_nesting_depth(0);
        assert!(matches!(zero_depth.validate(), Err(Error::InvalidConfig(_))));

        let cramped = ExportOptions::new().with_page_setup(PageSetup::from_inches(2.0, 2.0, 1.0));
        assert!(matches!(cramped.validate(), Err(Error::InvalidConfig(_))));
    }
}
