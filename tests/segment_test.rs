//! Integration tests for line segmentation and formatting recovery.

use pageflow::measure::{FnOracle, MeasurementOracle, MetricsOracle, StyleProfile};
use pageflow::segment::{extract, ParagraphSegmenter, StyleFlags};
use pageflow::tree::{DocumentNode, InlineNode, InlineTag, NodeId, ResolvedStyle};
use proptest::prelude::*;

/// Greedy word wrap over a fixed number of character cells per line.
/// Trailing spaces hang past the edge.
fn word_wrap_lines(text: &str, cells: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    let mut lines = 1;
    let mut used = 0;
    for word in text.split(' ') {
        let len = word.chars().count();
        let need = if used == 0 { len } else { used + 1 + len };
        if need <= cells || len == 0 {
            used = need.min(cells);
        } else {
            lines += 1;
            used = len;
        }
    }
    lines
}

fn word_wrap_oracle(cells: usize) -> impl MeasurementOracle {
    FnOracle::new(move |text: &str, p: &StyleProfile| {
        word_wrap_lines(text, cells) as f64 * p.line_height
    })
}

/// Ten characters per line, wrapping anywhere.
fn ten_per_line() -> impl MeasurementOracle {
    FnOracle::new(|text: &str, p: &StyleProfile| {
        text.trim_end().chars().count().div_ceil(10) as f64 * p.line_height
    })
}

fn paragraph(inline: Vec<InlineNode>) -> DocumentNode {
    DocumentNode::paragraph(NodeId::new(1), inline)
}

#[test]
fn test_wrap_after_brown_breaks_at_space() {
    // "The quick brown " fits; the "f" of "fox" overflows.
    let mut oracle = word_wrap_oracle(16);
    let node = paragraph(vec![InlineNode::text(
        "The quick brown fox jumps over the lazy dog",
    )]);
    let segments = ParagraphSegmenter::new(&mut oracle)
        .segment(&node, 0.0)
        .unwrap();

    let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts[0], "The quick brown");
    assert_eq!(texts, vec!["The quick brown", "fox jumps over", "the lazy dog"]);
    for segment in &segments {
        assert!(!segment.text.starts_with(' '));
        assert!(!segment.text.ends_with(' '));
    }
}

#[test]
fn test_formatting_survives_wrapping() {
    let mut oracle = ten_per_line();
    let node = paragraph(vec![
        InlineNode::text("plain "),
        InlineNode::element(
            InlineTag::Em,
            vec![InlineNode::text("italic "), InlineNode::bold("both")],
        ),
    ]);
    let segments = ParagraphSegmenter::new(&mut oracle)
        .segment(&node, 0.0)
        .unwrap();

    let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["plain", "italic", "both"]);
    assert!(segments[0].pieces[0].flags().is_plain());
    assert!(segments[1].pieces[0].italic);
    assert!(!segments[1].pieces[0].bold);
    assert!(segments[2].pieces[0].italic);
    assert!(segments[2].pieces[0].bold);
}

#[test]
fn test_metrics_oracle_segments_headlessly() {
    let mut oracle = MetricsOracle::new();
    let style = ResolvedStyle::body();
    let node = paragraph(vec![InlineNode::text("word ".repeat(80))]).styled(style);
    let segments = ParagraphSegmenter::new(&mut oracle)
        .segment(&node, 16.0)
        .unwrap();

    assert!(segments.len() > 1);
    assert!(segments.iter().all(|s| s.text.split(' ').all(|w| w == "word")));
    assert_eq!(segments.last().unwrap().spacing.after(), 16.0);
}

/// A well-nested inline tree over `b`, `i`, `u` and `s`.
fn inline_tree() -> impl Strategy<Value = Vec<InlineNode>> {
    let leaf = "[a-z ]{1,6}".prop_map(|text: String| InlineNode::text(text));
    let tree = leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop::sample::select(vec![InlineTag::B, InlineTag::I, InlineTag::U, InlineTag::S]),
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(tag, children)| InlineNode::element(tag, children))
    });
    prop::collection::vec(tree, 1..5)
}

/// Flags active at every character, computed straight from the tree.
fn expected_flags(nodes: &[InlineNode], active: StyleFlags, out: &mut Vec<StyleFlags>) {
    for node in nodes {
        match node {
            InlineNode::Text { text } => out.extend(text.chars().map(|_| active)),
            InlineNode::Break { .. } => {}
            InlineNode::Element { tag, children } => {
                expected_flags(children, active.inherit(tag), out)
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_extract_recovers_flags(nodes in inline_tree()) {
        let formatting = extract(&nodes);
        let mut expected = Vec::new();
        expected_flags(&nodes, StyleFlags::default(), &mut expected);

        prop_assert_eq!(formatting.char_len(), expected.len());
        for (offset, flags) in expected.iter().enumerate() {
            prop_assert_eq!(formatting.flags_at(offset), *flags, "offset {}", offset);
        }
    }

    #[test]
    fn prop_segments_cover_text(words in prop::collection::vec("[a-z]{1,14}", 1..30)) {
        let text = words.join(" ");
        let chars: Vec<char> = text.chars().collect();
        let mut oracle = ten_per_line();
        let node = paragraph(vec![InlineNode::text(text.clone())]);
        let segments = ParagraphSegmenter::new(&mut oracle).segment(&node, 0.0).unwrap();

        for segment in &segments {
            let len = segment.text.chars().count();
            let source: String = chars[segment.start..segment.start + len].iter().collect();
            prop_assert_eq!(&source, &segment.text);
        }

        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        prop_assert_eq!(strip(&joined), strip(&text));
    }
}
