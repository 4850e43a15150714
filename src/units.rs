//! Unit conversions between screen pixels and word-processor units.
//!
//! Screen geometry is measured in CSS pixels (96 per inch). Word-processor
//! documents use points (72 per inch), half-points for font sizes and twips
//! (1/20 of a point) for spacing, indentation and page setup.

/// CSS pixels per inch.
pub const PX_PER_INCH: f64 = 96.0;

/// Twips per inch.
pub const TWIPS_PER_INCH: f64 = 1440.0;

/// Convert CSS pixels to points.
pub fn px_to_pt(px: f64) -> f64 {
    px * 72.0 / PX_PER_INCH
}

/// Convert CSS pixels to twips, rounded to the nearest whole twip.
pub fn px_to_twips(px: f64) -> u32 {
    (px_to_pt(px) * 20.0).round().max(0.0) as u32
}

/// Convert CSS pixels to a font size in half-points.
pub fn px_to_half_points(px: f64) -> u32 {
    (px_to_pt(px) * 2.0).round().max(0.0) as u32
}

/// Convert inches to twips.
pub fn inches_to_twips(inches: f64) -> u32 {
    (inches * TWIPS_PER_INCH).round().max(0.0) as u32
}

/// Map a CSS `font-family` list to the font name a word processor knows.
///
/// The first family in the list wins. Generic families map to the usual
/// desktop defaults; named families pass through without their quotes.
pub fn word_font_for(css_family: &str) -> String {
    let first = css_family
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .find(|f| !f.is_empty())
        .unwrap_or("serif");

    match first.to_ascii_lowercase().as_str() {
        "serif" | "ui-serif" => "Times New Roman".to_string(),
        "sans-serif" | "ui-sans-serif" | "system-ui" | "-apple-system" => "Arial".to_string(),
        "monospace" | "ui-monospace" => "Courier New".to_string(),
        "cursive" => "Comic Sans MS".to_string(),
        _ => first.to_string(),
    }
}
