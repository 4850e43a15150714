//! Flattening inline markup into plain text plus style ranges.

use serde::{Deserialize, Serialize};

use crate::tree::{InlineNode, InlineTag};

/// One inline style flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleFlag {
    /// From `strong` / `b`
    Bold,
    /// From `em` / `i`
    Italic,
    /// From `u`
    Underline,
    /// From `s` / `strike` / `del`
    Strike,
}

impl StyleFlag {
    /// Every flag, in a fixed order.
    pub const ALL: [StyleFlag; 4] = [
        StyleFlag::Bold,
        StyleFlag::Italic,
        StyleFlag::Underline,
        StyleFlag::Strike,
    ];

    /// The flag a wrapper tag turns on, if any.
    pub fn for_tag(tag: &InlineTag) -> Option<Self> {
        match tag {
            InlineTag::Strong | InlineTag::B => Some(StyleFlag::Bold),
            InlineTag::Em | InlineTag::I => Some(StyleFlag::Italic),
            InlineTag::U => Some(StyleFlag::Underline),
            InlineTag::S | InlineTag::Strike | InlineTag::Del => Some(StyleFlag::Strike),
            InlineTag::Span | InlineTag::Other(_) => None,
        }
    }
}

/// The set of flags active at some point of the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleFlags {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
}

impl StyleFlags {
    /// Whether `flag` is set.
    pub fn get(&self, flag: StyleFlag) -> bool {
        match flag {
            StyleFlag::Bold => self.bold,
            StyleFlag::Italic => self.italic,
            StyleFlag::Underline => self.underline,
            StyleFlag::Strike => self.strike,
        }
    }

    /// Set `flag`.
    pub fn set(&mut self, flag: StyleFlag, on: bool) {
        match flag {
            StyleFlag::Bold => self.bold = on,
            StyleFlag::Italic => self.italic = on,
            StyleFlag::Underline => self.underline = on,
            StyleFlag::Strike => self.strike = on,
        }
    }

    /// Copy with the flag of `tag` turned on.
    pub fn inherit(mut self, tag: &InlineTag) -> Self {
        if let Some(flag) = StyleFlag::for_tag(tag) {
            self.set(flag, true);
        }
        self
    }

    /// Whether no flag is set.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// An inclusive character interval `[start, end]` where one flag holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingRange {
    pub flag: StyleFlag,
    pub start: usize,
    pub end: usize,
}

impl FormattingRange {
    /// Whether the half-open slice `[from, to)` lies inside this range.
    pub fn covers(&self, from: usize, to: usize) -> bool {
        self.start <= from && to <= self.end + 1
    }
}

/// Contiguous text sharing one set of flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub flags: StyleFlags,
}

/// A slice of text with the flags that fully cover it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledPiece {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
}

impl StyledPiece {
    /// Flags of this piece.
    pub fn flags(&self) -> StyleFlags {
        StyleFlags {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            strike: self.strike,
        }
    }
}

/// Flattened text of an inline fragment and where each flag holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formatting {
    /// Plain text
    pub text: String,
    /// Styled runs, concatenating to `text`
    pub runs: Vec<Run>,
    /// Maximal disjoint ranges, grouped by flag in [`StyleFlag::ALL`] order
    pub ranges: Vec<FormattingRange>,
}

impl Formatting {
    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Ranges for one flag.
    pub fn ranges_for(&self, flag: StyleFlag) -> impl Iterator<Item = &FormattingRange> {
        self.ranges.iter().filter(move |r| r.flag == flag)
    }

    /// Flags active at a character offset.
    pub fn flags_at(&self, offset: usize) -> StyleFlags {
        let mut flags = StyleFlags::default();
        for range in &self.ranges {
            if range.start <= offset && offset <= range.end {
                flags.set(range.flag, true);
            }
        }
        flags
    }

    /// Re-project the ranges onto the half-open character slice `[from, to)`.
    ///
    /// Piece boundaries are the slice bounds plus every range boundary that
    /// falls inside the slice. A piece's flag is set only when one range
    /// covers the whole piece.
    pub fn pieces(&self, from: usize, to: usize) -> Vec<StyledPiece> {
        if from >= to {
            return Vec::new();
        }

        let mut cuts = vec![from, to];
        for range in &self.ranges {
            for edge in [range.start, range.end + 1] {
                if edge > from && edge < to {
                    cuts.push(edge);
                }
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        let chars: Vec<char> = self.text.chars().collect();
        cuts.windows(2)
            .map(|w| {
                let (a, b) = (w[0], w[1]);
                let covered =
                    |flag| self.ranges_for(flag).any(|r| r.covers(a, b));
                StyledPiece {
                    text: chars[a.min(chars.len())..b.min(chars.len())].iter().collect(),
                    bold: covered(StyleFlag::Bold),
                    italic: covered(StyleFlag::Italic),
                    underline: covered(StyleFlag::Underline),
                    strike: covered(StyleFlag::Strike),
                }
            })
            .collect()
    }
}

/// Walks inline markup depth-first, inheriting flags from ancestor wrappers.
#[derive(Debug, Default)]
pub struct FormattingRangeExtractor {
    runs: Vec<Run>,
}

impl FormattingRangeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `nodes`. Hard breaks contribute no text.
    pub fn extract(mut self, nodes: &[InlineNode]) -> Formatting {
        self.walk(nodes, StyleFlags::default());

        let text: String = self.runs.iter().map(|r| r.text.as_str()).collect();
        let mut ranges = Vec::new();
        for flag in StyleFlag::ALL {
            let mut offset = 0;
            let mut open: Option<FormattingRange> = None;
            for run in &self.runs {
                let len = run.text.chars().count();
                if run.flags.get(flag) {
                    match open.as_mut() {
                        Some(range) => range.end = offset + len - 1,
                        None => {
                            open = Some(FormattingRange {
                                flag,
                                start: offset,
                                end: offset + len - 1,
                            })
                        }
                    }
                } else if let Some(range) = open.take() {
                    ranges.push(range);
                }
                offset += len;
            }
            ranges.extend(open);
        }

        Formatting {
            text,
            runs: self.runs,
            ranges,
        }
    }

    fn walk(&mut self, nodes: &[InlineNode], flags: StyleFlags) {
        for node in nodes {
            match node {
                InlineNode::Text { text } if !text.is_empty() => self.push(text, flags),
                InlineNode::Text { .. } | InlineNode::Break { .. } => {}
                InlineNode::Element { tag, children } => self.walk(children, flags.inherit(tag)),
            }
        }
    }

    fn push(&mut self, text: &str, flags: StyleFlags) {
        match self.runs.last_mut() {
            Some(last) if last.flags == flags => last.text.push_str(text),
            _ => self.runs.push(Run {
                text: text.to_string(),
                flags,
            }),
        }
    }
}

/// Flatten an inline fragment.
pub fn extract(nodes: &[InlineNode]) -> Formatting {
    FormattingRangeExtractor::new().extract(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: InlineTag, children: Vec<InlineNode>) -> InlineNode {
        InlineNode::element(tag, children)
    }

    fn t(text: &str) -> InlineNode {
        InlineNode::text(text)
    }

    #[test]
    fn test_nested_flags() {
        // a<b>b<i>c</i></b><u>d</u>
        let nodes = vec![
            t("a"),
            el(InlineTag::B, vec![t("b"), el(InlineTag::I, vec![t("c")])]),
            el(InlineTag::U, vec![t("d")]),
        ];
        let f = extract(&nodes);
        assert_eq!(f.text, "abcd");
        assert_eq!(
            f.ranges,
            vec![
                FormattingRange { flag: StyleFlag::Bold, start: 1, end: 2 },
                FormattingRange { flag: StyleFlag::Italic, start: 2, end: 2 },
                FormattingRange { flag: StyleFlag::Underline, start: 3, end: 3 },
            ]
        );
        assert!(f.flags_at(2).bold && f.flags_at(2).italic);
        assert!(f.flags_at(0).is_plain());
    }

    #[test]
    fn test_adjacent_runs_merge() {
        // <strong>ab</strong><b>cd</b>
        let nodes = vec![
            el(InlineTag::Strong, vec![t("ab")]),
            el(InlineTag::B, vec![t("cd")]),
        ];
        let f = extract(&nodes);
        assert_eq!(f.runs.len(), 1);
        assert_eq!(
            f.ranges,
            vec![FormattingRange { flag: StyleFlag::Bold, start: 0, end: 3 }]
        );
    }

    #[test]
    fn test_bold_spanning_italic_runs_is_one_range() {
        // <b>x<i>y</i>z</b>
        let nodes = vec![el(
            InlineTag::B,
            vec![t("x"), el(InlineTag::I, vec![t("y")]), t("z")],
        )];
        let f = extract(&nodes);
        assert_eq!(f.runs.len(), 3);
        assert_eq!(f.ranges_for(StyleFlag::Bold).count(), 1);
    }

    #[test]
    fn test_pieces_split_on_range_edges() {
        // plain <b>bold</b> tail
        let nodes = vec![t("plain "), el(InlineTag::B, vec![t("bold")]), t(" tail")];
        let f = extract(&nodes);

        let pieces = f.pieces(3, 12);
        let texts: Vec<&str> = pieces.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["in ", "bold", " ta"]);
        assert!(!pieces[0].bold);
        assert!(pieces[1].bold);
        assert!(!pieces[2].bold);
    }

    #[test]
    fn test_pieces_empty_slice() {
        let f = extract(&[t("abc")]);
        assert!(f.pieces(2, 2).is_empty());
    }

    #[test]
    fn test_unicode_offsets_are_chars() {
        let nodes = vec![t("é"), el(InlineTag::Em, vec![t("ü")])];
        let f = extract(&nodes);
        assert_eq!(
            f.ranges,
            vec![FormattingRange { flag: StyleFlag::Italic, start: 1, end: 1 }]
        );
        assert_eq!(f.pieces(0, 2)[1].text, "ü");
    }
}
