//! Measured line segmentation.

use log::trace;
use serde::{Deserialize, Serialize};

use super::formatting::{extract, Formatting, StyledPiece};
use crate::error::{Error, Result};
use crate::measure::{MeasureSession, MeasurementOracle, StyleProfile};
use crate::tree::{inline, Document, DocumentNode, NodeKind};

/// Vertical spacing of one exported line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Spacing {
    /// Line height only ("at least")
    Line {
        /// Line height in pixels
        line: f64,
    },
    /// Line height plus space after the block
    LineAndAfter {
        /// Line height in pixels
        line: f64,
        /// Space after in pixels
        after: f64,
    },
}

impl Spacing {
    /// Line height in pixels.
    pub fn line(&self) -> f64 {
        match *self {
            Spacing::Line { line } | Spacing::LineAndAfter { line, .. } => line,
        }
    }

    /// Space after in pixels; zero for line-only spacing.
    pub fn after(&self) -> f64 {
        match *self {
            Spacing::Line { .. } => 0.0,
            Spacing::LineAndAfter { after, .. } => after,
        }
    }
}

/// A slice of a block's text assigned to one visual line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Index of the hard line this segment came from
    pub line: usize,
    /// Character offset of the segment within its hard line
    pub start: usize,
    /// Segment text, trailing whitespace trimmed
    pub text: String,
    /// Styled pieces concatenating to `text`
    pub pieces: Vec<StyledPiece>,
    /// Spacing descriptor
    pub spacing: Spacing,
}

/// Where a wrapped line ends and the next one resumes, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Break {
    end: usize,
    resume: usize,
}

fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '-' | '?')
}

/// Rightmost delimiter in `window` past its first character. A trailing
/// space is skipped in favour of an earlier delimiter.
fn last_delimiter(window: &[char]) -> Option<usize> {
    let found = window.iter().rposition(|&c| is_delimiter(c))?;
    let found = if found + 1 == window.len() && window[found] == ' ' {
        window[..found].iter().rposition(|&c| is_delimiter(c))?
    } else {
        found
    };
    (found > 0).then_some(found)
}

/// Splits blocks into measured line segments.
pub struct ParagraphSegmenter<'o, O: MeasurementOracle + ?Sized> {
    oracle: &'o mut O,
}

impl<'o, O: MeasurementOracle + ?Sized> ParagraphSegmenter<'o, O> {
    pub fn new(oracle: &'o mut O) -> Self {
        Self { oracle }
    }

    /// Segment the text block at `path`, with after-spacing resolved from its
    /// neighbours in `doc`.
    pub fn segment_at(&mut self, doc: &Document, path: &[usize]) -> Result<Vec<LineSegment>> {
        let node = doc
            .node_at(path)
            .ok_or_else(|| Error::PathNotFound(path.to_vec()))?;
        let after = after_spacing(doc, path);
        self.segment(node, after)
    }

    /// Segment one text block. `after` is the space added below its last
    /// segment.
    pub fn segment(&mut self, node: &DocumentNode, after: f64) -> Result<Vec<LineSegment>> {
        let mut content = node.inline.clone();
        inline::strip_trailing_breaks(&mut content);

        let profile = StyleProfile::from_style(&node.style);
        let line_height = node.style.line_height;
        let lines = inline::split_lines(&content);
        let line_count = lines.len();

        let mut segments = Vec::new();
        let mut session = MeasureSession::open(&mut *self.oracle, profile)?;

        for (line_idx, line) in lines.iter().enumerate() {
            let formatting = extract(line);
            let chars: Vec<char> = formatting.text.chars().collect();
            let breaks = discover_breaks(&mut session, &chars)?;
            let mut line_segments = slice_line(&formatting, &chars, &breaks, line_idx, line_height);

            if line_idx + 1 == line_count {
                if let Some(last) = line_segments.last_mut() {
                    last.spacing = Spacing::LineAndAfter {
                        line: line_height,
                        after,
                    };
                }
            }
            segments.append(&mut line_segments);
        }

        trace!(
            "{} <{}>: {} segments from {} lines ({} measurements via {})",
            node.id,
            node.kind.tag(),
            segments.len(),
            line_count,
            session.measurements(),
            session.oracle_name(),
        );
        Ok(segments)
    }

    /// Wrap points of a plain string, as `(end, resume)` character offsets.
    pub fn break_points(&mut self, text: &str, profile: StyleProfile) -> Result<Vec<(usize, usize)>> {
        let chars: Vec<char> = text.chars().collect();
        let mut session = MeasureSession::open(&mut *self.oracle, profile)?;
        Ok(discover_breaks(&mut session, &chars)?
            .into_iter()
            .map(|b| (b.end, b.resume))
            .collect())
    }
}

/// Grow a candidate one character at a time; every height increase is a
/// wrap, broken at the last delimiter since the previous break.
fn discover_breaks<O: MeasurementOracle + ?Sized>(
    session: &mut MeasureSession<'_, O>,
    chars: &[char],
) -> Result<Vec<Break>> {
    let mut breaks = Vec::new();
    let mut line_start = 0;
    let mut candidate = String::new();
    session.reset();

    let mut i = 0;
    while i < chars.len() {
        candidate.push(chars[i]);
        if !session.wraps(&candidate)? {
            i += 1;
            continue;
        }

        let window = &chars[line_start..=i];
        let brk = match last_delimiter(window) {
            Some(pos) => {
                let at = line_start + pos;
                if chars[at] == ' ' {
                    Break { end: at, resume: at + 1 }
                } else {
                    Break { end: at + 1, resume: at + 1 }
                }
            }
            None if i > line_start => Break { end: i, resume: i },
            None => Break { end: i + 1, resume: i + 1 },
        };
        trace!(
            "wrap at char {}: line {}..{}, resume {}",
            i,
            line_start,
            brk.end,
            brk.resume
        );
        breaks.push(brk);

        line_start = brk.resume;
        candidate = chars[line_start..=i].iter().collect();
        session.reset();
        if !candidate.is_empty() {
            session.wraps(&candidate)?;
        }
        i += 1;
    }

    Ok(breaks)
}

/// Cut one hard line at its breaks into trimmed, non-empty segments. An
/// empty line still yields one empty segment.
fn slice_line(
    formatting: &Formatting,
    chars: &[char],
    breaks: &[Break],
    line: usize,
    line_height: f64,
) -> Vec<LineSegment> {
    let mut bounds = Vec::with_capacity(breaks.len() + 1);
    let mut start = 0;
    for brk in breaks {
        bounds.push((start, brk.end));
        start = brk.resume;
    }
    bounds.push((start, chars.len()));

    let mut segments: Vec<LineSegment> = bounds
        .into_iter()
        .filter_map(|(start, end)| {
            let mut end = end.min(chars.len());
            while end > start && chars[end - 1].is_whitespace() {
                end -= 1;
            }
            (end > start).then(|| LineSegment {
                line,
                start,
                text: chars[start..end].iter().collect(),
                pieces: formatting.pieces(start, end),
                spacing: Spacing::Line { line: line_height },
            })
        })
        .collect();

    if segments.is_empty() {
        segments.push(LineSegment {
            line,
            start: 0,
            text: String::new(),
            pieces: Vec::new(),
            spacing: Spacing::Line { line: line_height },
        });
    }
    segments
}

/// Space below the block at `path`: its own bottom margin plus the top
/// margin of the block that follows it.
///
/// The follower is the next sibling when that is a paragraph, otherwise the
/// first block found by climbing ancestors and descending into the next
/// sibling found.
pub fn after_spacing(doc: &Document, path: &[usize]) -> f64 {
    let Some(node) = doc.node_at(path) else {
        return 0.0;
    };

    let next = match doc.next_sibling(path) {
        Some(sibling) if sibling.kind == NodeKind::Paragraph => Some(sibling),
        _ => doc.next_block_after(path),
    };

    node.style.margin_bottom + next.map_or(0.0, |n| n.style.margin_top)
}
