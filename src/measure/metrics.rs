//! Headless measurement from font glyph advances.
//!
//! With a font loaded, advances come from its glyph metrics through
//! `fontdue`. Without one, static tables stand in: widths in thousandths of
//! an em for printable ASCII (0x20..=0x7E), taken from the standard Times,
//! Helvetica and Courier metrics. Other characters fall back on their
//! terminal cell width: wide (CJK) glyphs count as a full em, narrow ones
//! as the table's average advance and combining marks as nothing.
//!
//! Line breaking follows CSS `white-space: normal`: breaks happen after
//! spaces, hyphens and question marks, trailing spaces hang past the line
//! end, and a single word wider than the line breaks between characters.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use log::debug;
use unicode_width::UnicodeWidthChar;

use super::{MeasurementOracle, StyleProfile};
use crate::error::{Error, Result};
use crate::units::word_font_for;

/// Environment variable naming a font file for headless measurement.
pub const FONT_ENV: &str = "PAGEFLOW_FONT";

/// Fonts tried by [`MetricsOracle::detect`] when [`FONT_ENV`] is unset.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "/Library/Fonts/Times New Roman.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
];

/// Pixel size glyph metrics are read at before scaling to em.
const UNITS_PX: f32 = 1000.0;

/// Static advance-width table for one font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Font name
    pub name: &'static str,
    /// Advance per ASCII character 0x20..=0x7E, in 1/1000 em
    widths: &'static [u16; 95],
    /// Advance used for narrow characters outside the table, in 1/1000 em
    average: u16,
}

#[rustfmt::skip]
static TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

static COURIER_WIDTHS: [u16; 95] = [600; 95];

impl FontMetrics {
    /// Times Roman.
    pub const SERIF: FontMetrics = FontMetrics {
        name: "Times New Roman",
        widths: &TIMES_WIDTHS,
        average: 450,
    };

    /// Helvetica / Arial.
    pub const SANS: FontMetrics = FontMetrics {
        name: "Arial",
        widths: &HELVETICA_WIDTHS,
        average: 500,
    };

    /// Courier.
    pub const MONO: FontMetrics = FontMetrics {
        name: "Courier New",
        widths: &COURIER_WIDTHS,
        average: 600,
    };

    /// Pick the closest table for a CSS `font-family` list.
    pub fn for_family(css_family: &str) -> &'static FontMetrics {
        let font = word_font_for(css_family).to_ascii_lowercase();
        if font.contains("courier") || font.contains("mono") || font.contains("consol") {
            &Self::MONO
        } else if font.contains("times")
            || font.contains("georgia")
            || font.contains("garamond")
            || font.contains("serif")
        {
            &Self::SERIF
        } else {
            &Self::SANS
        }
    }

    /// Advance of one character in em.
    pub fn advance_em(&self, c: char) -> f64 {
        let code = c as u32;
        if (0x20..=0x7E).contains(&code) {
            return f64::from(self.widths[(code - 0x20) as usize]) / 1000.0;
        }
        match c.width() {
            Some(0) | None => 0.0,
            Some(1) => f64::from(self.average) / 1000.0,
            Some(_) => 1.0,
        }
    }

    /// Width of a string in pixels at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.advance_em(c)).sum::<f64>() * font_size
    }
}

/// Advances read from a loaded font.
pub struct GlyphMetrics {
    name: String,
    font: Font,
    fallback: &'static FontMetrics,
}

impl GlyphMetrics {
    /// Load a TrueType or OpenType font from memory.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self::new(name, font))
    }

    /// Load a font file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| "font".to_string(), |s| s.to_string_lossy().into_owned());
        Self::from_bytes(name, &bytes)
    }

    /// Wrap an already parsed font.
    pub fn new(name: impl Into<String>, font: Font) -> Self {
        Self {
            name: name.into(),
            font,
            fallback: &FontMetrics::SERIF,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advance of one character in em. Characters the font has no glyph
    /// for are measured from the fallback table.
    pub fn advance_em(&self, c: char) -> f64 {
        if self.font.lookup_glyph_index(c) == 0 {
            return self.fallback.advance_em(c);
        }
        f64::from(self.font.metrics(c, UNITS_PX).advance_width / UNITS_PX)
    }
}

impl fmt::Debug for GlyphMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphMetrics").field("name", &self.name).finish()
    }
}

/// Where advances come from for one measurement.
#[derive(Clone, Copy)]
enum Advances<'a> {
    Table(&'static FontMetrics),
    Glyphs(&'a GlyphMetrics),
}

impl Advances<'_> {
    fn advance_em(&self, c: char) -> f64 {
        match self {
            Advances::Table(metrics) => metrics.advance_em(c),
            Advances::Glyphs(glyphs) => glyphs.advance_em(c),
        }
    }

    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.advance_em(c)).sum::<f64>() * font_size
    }
}

const EPSILON: f64 = 1e-6;

/// A word plus its break character, followed by a run of spaces.
struct Token<'a> {
    word: &'a str,
    spaces: &'a str,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let word_end = rest
            .char_indices()
            .find_map(|(i, c)| match c {
                ' ' => Some(i),
                '-' | '?' => Some(i + 1),
                _ => None,
            })
            .unwrap_or(rest.len());
        let after = &rest[word_end..];
        let spaces_len = after.len() - after.trim_start_matches(' ').len();
        tokens.push(Token {
            word: &rest[..word_end],
            spaces: &after[..spaces_len],
        });
        rest = &after[spaces_len..];
    }

    tokens
}

/// Headless [`MeasurementOracle`].
///
/// Measures with a loaded font when one is set, otherwise with the
/// [`FontMetrics`] table closest to each profile's font family.
#[derive(Debug, Clone, Default)]
pub struct MetricsOracle {
    metrics: Option<&'static FontMetrics>,
    glyphs: Option<Arc<GlyphMetrics>>,
}

impl MetricsOracle {
    /// Create a table-backed oracle that picks a table from each profile's
    /// font family.
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure with the glyph advances of `font`.
    pub fn with_font(font: Font) -> Self {
        Self::with_glyphs(GlyphMetrics::new("font", font))
    }

    /// Measure with already loaded glyph metrics.
    pub fn with_glyphs(glyphs: GlyphMetrics) -> Self {
        Self {
            metrics: None,
            glyphs: Some(Arc::new(glyphs)),
        }
    }

    /// Measure with the font in `path`.
    pub fn from_font_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_glyphs(GlyphMetrics::from_file(path.as_ref())?))
    }

    /// Use the font named by [`FONT_ENV`], else the first common system
    /// serif font found, else the static tables.
    pub fn detect() -> Self {
        let candidates = std::env::var_os(FONT_ENV)
            .map(PathBuf::from)
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::from_font_file(&path) {
                Ok(oracle) => {
                    debug!("measuring with {}", path.display());
                    return oracle;
                }
                Err(e) => debug!("skipping font {}: {}", path.display(), e),
            }
        }
        debug!("no font file found; measuring with static tables");
        Self::new()
    }

    /// Always measure with `metrics`, whatever the profile says.
    pub fn with_metrics(mut self, metrics: &'static FontMetrics) -> Self {
        self.metrics = Some(metrics);
        self.glyphs = None;
        self
    }

    /// Whether a font file backs this oracle.
    pub fn has_font(&self) -> bool {
        self.glyphs.is_some()
    }

    fn advances_for(&self, profile: &StyleProfile) -> Advances<'_> {
        if let Some(glyphs) = &self.glyphs {
            return Advances::Glyphs(glyphs);
        }
        Advances::Table(
            self.metrics
                .unwrap_or_else(|| FontMetrics::for_family(&profile.font_family)),
        )
    }

    /// Number of line boxes `text` occupies. Empty text has none.
    pub fn line_count(&self, text: &str, profile: &StyleProfile) -> usize {
        if text.is_empty() {
            return 0;
        }

        let metrics = self.advances_for(profile);
        let size = profile.font_size;
        let limit = profile.width + EPSILON;

        let mut lines = 1;
        let mut line_width = 0.0;
        let mut pending_space = 0.0;

        for token in tokenize(text) {
            let word = metrics.text_width(token.word, size);

            if line_width + pending_space + word <= limit {
                line_width += pending_space + word;
            } else if word <= limit {
                if line_width > 0.0 {
                    lines += 1;
                }
                line_width = word;
            } else {
                // A word wider than the line breaks between characters.
                if line_width > 0.0 {
                    lines += 1;
                }
                line_width = 0.0;
                for c in token.word.chars() {
                    let advance = metrics.advance_em(c) * size;
                    if line_width > 0.0 && line_width + advance > limit {
                        lines += 1;
                        line_width = 0.0;
                    }
                    line_width += advance;
                }
            }

            pending_space = metrics.text_width(token.spaces, size);
        }

        lines
    }
}

impl MeasurementOracle for MetricsOracle {
    fn name(&self) -> &str {
        match &self.glyphs {
            Some(glyphs) => glyphs.name(),
            None => "metrics",
        }
    }

    fn begin(&mut self, profile: &StyleProfile) -> Result<()> {
        if profile.width <= 0.0 || profile.font_size <= 0.0 {
            return Err(Error::Measurement(format!(
                "cannot lay out text in a {}px box at {}px",
                profile.width, profile.font_size
            )));
        }
        Ok(())
    }

    fn measure(&mut self, text: &str, profile: &StyleProfile) -> Result<f64> {
        Ok(self.line_count(text, profile) as f64 * profile.line_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ResolvedStyle;

    fn mono(width: f64) -> StyleProfile {
        // 10px Courier: every character is 6px wide.
        StyleProfile {
            width,
            padding_left: 0.0,
            font_size: 10.0,
            font_family: "monospace".to_string(),
            line_height: 12.0,
        }
    }

    #[test]
    fn test_for_family() {
        assert_eq!(FontMetrics::for_family("monospace").name, "Courier New");
        assert_eq!(FontMetrics::for_family("Georgia, serif").name, "Times New Roman");
        assert_eq!(FontMetrics::for_family("Inter, sans-serif").name, "Arial");
        assert_eq!(FontMetrics::for_family("sans-serif").name, "Arial");
    }

    #[test]
    fn test_advance() {
        assert_eq!(FontMetrics::MONO.advance_em('x'), 0.6);
        assert_eq!(FontMetrics::SANS.advance_em('i'), 0.222);
        assert_eq!(FontMetrics::SERIF.advance_em('中'), 1.0);
        assert_eq!(FontMetrics::SERIF.advance_em('\u{301}'), 0.0);
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("one  two-three? x");
        let parts: Vec<(&str, &str)> = tokens.iter().map(|t| (t.word, t.spaces)).collect();
        assert_eq!(
            parts,
            vec![("one", "  "), ("two-", ""), ("three?", " "), ("x", "")]
        );
    }

    #[test]
    fn test_line_count_wraps_at_words() {
        let oracle = MetricsOracle::new();
        // 10 chars per line.
        let profile = mono(60.0);
        assert_eq!(oracle.line_count("", &profile), 0);
        assert_eq!(oracle.line_count("aaaa bbbb", &profile), 1);
        assert_eq!(oracle.line_count("aaaa bbbbbb", &profile), 2);
        assert_eq!(oracle.line_count("aaaa bbbb cccc", &profile), 2);
    }

    #[test]
    fn test_trailing_spaces_hang() {
        let oracle = MetricsOracle::new();
        let profile = mono(60.0);
        assert_eq!(oracle.line_count("aaaaaaaaaa", &profile), 1);
        assert_eq!(oracle.line_count("aaaaaaaaaa   ", &profile), 1);
    }

    #[test]
    fn test_long_word_breaks_anywhere() {
        let oracle = MetricsOracle::new();
        let profile = mono(60.0);
        assert_eq!(oracle.line_count("aaaaaaaaaaaaaaaaaaaaaaaaa", &profile), 3);
        assert_eq!(oracle.line_count("x aaaaaaaaaaaaaaa", &profile), 3);
    }

    #[test]
    fn test_measure_uses_line_height() {
        let mut oracle = MetricsOracle::new().with_metrics(&FontMetrics::MONO);
        let profile = StyleProfile::from_style(&ResolvedStyle::body().with_width(96.0));
        // 16px Courier: 9.6px per char, 10 chars per line.
        assert_eq!(oracle.measure("aaaa bbbb", &profile).unwrap(), 24.0);
        assert_eq!(oracle.measure("aaaa bbbb cccc", &profile).unwrap(), 48.0);
    }

    #[test]
    fn test_bad_font_bytes_are_rejected() {
        let err = GlyphMetrics::from_bytes("junk", b"not a font").unwrap_err();
        assert!(matches!(err, Error::Font(_)));
        assert!(matches!(
            MetricsOracle::from_font_file("/no/such/font.ttf"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_system_font_measures_like_tables() {
        let oracle = MetricsOracle::detect();
        if !oracle.has_font() {
            assert_eq!(oracle.name(), "metrics");
            return;
        }
        let profile = StyleProfile::from_style(&ResolvedStyle::body().with_width(200.0));
        assert_eq!(oracle.line_count("", &profile), 0);
        assert_eq!(oracle.line_count("a b", &profile), 1);
        assert!(oracle.line_count(&"word ".repeat(40), &profile) > 1);
    }

    #[test]
    fn test_begin_rejects_degenerate_box() {
        let mut oracle = MetricsOracle::new();
        assert!(oracle.begin(&mono(0.0)).is_err());
    }
}
