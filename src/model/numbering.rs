//! List numbering definitions.

use serde::{Deserialize, Serialize};

/// Reference of the numbered-list definition.
pub const NUMBERED: &str = "numbered";
/// Reference of the continuation definition: indented, no marker.
pub const UNNUMBERED: &str = "unnumbered";
/// Reference of the bullet-list definition.
pub const BULLET: &str = "bullet";

/// Indent step per nesting level, in twips.
pub const INDENT_STEP_TWIPS: u32 = 720;
/// Hanging indent of the marker, in twips.
pub const HANGING_TWIPS: u32 = 360;

const BULLET_MARKERS: [&str; 3] = ["\u{25CF}", "\u{25CB}", "\u{25A0}"];

/// Marker format of one numbering level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberFormat {
    /// 1, 2, 3, ...
    Decimal,
    /// a, b, c, ...
    LowerLetter,
    /// i, ii, iii, ...
    LowerRoman,
    /// A fixed symbol
    Bullet,
    /// No marker
    None,
}

/// One level of a numbering definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingLevel {
    /// Level index (0 = top level)
    pub level: u8,
    /// Marker format
    pub format: NumberFormat,
    /// Marker template, `%N` standing for the counter of level N
    pub text: String,
    /// Left indent in twips
    pub indent_twips: u32,
    /// Hanging indent in twips
    pub hanging_twips: u32,
}

impl NumberingLevel {
    fn new(level: u8, format: NumberFormat, text: String) -> Self {
        Self {
            level,
            format,
            text,
            indent_twips: INDENT_STEP_TWIPS * (u32::from(level) + 1),
            hanging_twips: HANGING_TWIPS,
        }
    }

    /// Render the marker for the `n`th item (1-based) at this level.
    pub fn marker(&self, n: u32) -> String {
        let counter = match self.format {
            NumberFormat::Decimal => n.to_string(),
            NumberFormat::LowerLetter => lower_letter(n),
            NumberFormat::LowerRoman => lower_roman(n),
            NumberFormat::Bullet | NumberFormat::None => return self.text.clone(),
        };
        self.text.replace(&format!("%{}", self.level + 1), &counter)
    }
}

/// A numbering definition referenced by paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingDefinition {
    /// Reference name
    pub reference: String,
    /// Levels, index = nesting depth
    pub levels: Vec<NumberingLevel>,
}

impl NumberingDefinition {
    /// Decimal, lower-letter and lower-roman markers cycling per level.
    pub fn numbered(depth: u8) -> Self {
        let levels = (0..depth)
            .map(|level| {
                let format = match level % 3 {
                    0 => NumberFormat::Decimal,
                    1 => NumberFormat::LowerLetter,
                    _ => NumberFormat::LowerRoman,
                };
                NumberingLevel::new(level, format, format!("%{}.", level + 1))
            })
            .collect();
        Self {
            reference: NUMBERED.to_string(),
            levels,
        }
    }

    /// Indented levels without markers.
    pub fn unnumbered(depth: u8) -> Self {
        let levels = (0..depth)
            .map(|level| NumberingLevel::new(level, NumberFormat::None, String::new()))
            .collect();
        Self {
            reference: UNNUMBERED.to_string(),
            levels,
        }
    }

    /// Filled circle, hollow circle and square bullets cycling per level.
    pub fn bullet(depth: u8) -> Self {
        let levels = (0..depth)
            .map(|level| {
                let marker = BULLET_MARKERS[usize::from(level) % BULLET_MARKERS.len()];
                NumberingLevel::new(level, NumberFormat::Bullet, marker.to_string())
            })
            .collect();
        Self {
            reference: BULLET.to_string(),
            levels,
        }
    }

    /// The three definitions every export carries.
    pub fn standard(depth: u8) -> Vec<Self> {
        vec![Self::numbered(depth), Self::unnumbered(depth), Self::bullet(depth)]
    }

    /// Level by index, or the deepest defined level past the end.
    pub fn level(&self, level: u8) -> Option<&NumberingLevel> {
        self.levels
            .get(usize::from(level))
            .or_else(|| self.levels.last())
    }
}

fn lower_letter(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    out.iter().rev().collect()
}

fn lower_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}
