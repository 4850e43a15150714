//! Integration tests for export assembly.

use pageflow::export::{DocumentAssembler, ExportOptions};
use pageflow::measure::MetricsOracle;
use pageflow::model::{Block, ExportDocument, Paragraph};
use pageflow::parser::{parse_html, ParseOptions};
use pageflow::writer::TextWriter;
use pageflow::{EditorSession, Error, PageGeometry};

fn export(html: &str) -> ExportDocument {
    let doc = parse_html(html, &ParseOptions::default()).unwrap();
    DocumentAssembler::default()
        .assemble(&doc, &mut MetricsOracle::new())
        .unwrap()
}

fn paragraphs(doc: &ExportDocument) -> Vec<&Paragraph> {
    doc.paragraphs().collect()
}

#[test]
fn test_nested_list_exports_five_paragraphs() {
    let doc = export(
        "<ol><li>one</li><li>two<ul><li>alpha</li><li>beta</li></ul></li><li>three</li></ol>",
    );
    let paras = paragraphs(&doc);
    assert_eq!(paras.len(), 5);

    let texts: Vec<String> = paras.iter().map(|p| p.plain_text()).collect();
    assert_eq!(texts, vec!["one", "two", "alpha", "beta", "three"]);

    let numbering: Vec<_> = paras
        .iter()
        .map(|p| p.style.numbering.clone().unwrap())
        .collect();
    let parent = numbering[0].instance;
    for outer in [&numbering[0], &numbering[1], &numbering[4]] {
        assert_eq!(outer.level, 0);
        assert_eq!(outer.instance, parent);
        assert_eq!(outer.reference, "numbered");
    }
    for nested in [&numbering[2], &numbering[3]] {
        assert_eq!(nested.level, 1);
        assert_ne!(nested.instance, parent);
        assert_eq!(nested.reference, "bullet");
    }
}

#[test]
fn test_independent_lists_restart_numbering() {
    let doc = export(
        "<ol><li>a</li><li>b<ol><li>inner</li></ol></li></ol>\
         <p>between</p>\
         <ol><li>c</li><li>d</li></ol>",
    );

    let text = TextWriter::new().render(&doc);
    assert_eq!(text, "1. a\n2. b\n  a. inner\nbetween\n1. c\n2. d\n");
}

#[test]
fn test_instances_restart_per_export() {
    let html = "<ol><li>a</li></ol><ol><li>b</li></ol>";
    let first = export(html);
    let second = export(html);

    let instances = |doc: &ExportDocument| -> Vec<u32> {
        doc.paragraphs()
            .filter_map(|p| p.style.numbering.as_ref().map(|n| n.instance))
            .collect()
    };
    assert_eq!(instances(&first), vec![1, 2]);
    assert_eq!(instances(&second), instances(&first));
}

#[test]
fn test_wrapped_item_continues_unnumbered() {
    let long = "word ".repeat(60);
    let doc = export(&format!("<ul><li>{}</li></ul>", long));
    let paras = paragraphs(&doc);
    assert!(paras.len() > 1);

    assert_eq!(paras[0].style.numbering.as_ref().unwrap().reference, "bullet");
    for continuation in &paras[1..] {
        let numbering = continuation.style.numbering.as_ref().unwrap();
        assert_eq!(numbering.reference, "unnumbered");
        assert_eq!(numbering.level, 0);
    }
}

#[test]
fn test_table_export_keeps_header_and_breaks() {
    let doc = export(
        "<table><tr><th>Name</th><th>Qty</th></tr>\
         <tr class=\"spacer\" style=\"height: 80px\"></tr>\
         <tr><td>Pens</td><td>4</td></tr></table>",
    );
    assert_eq!(doc.block_count(), 1);
    let Block::Table(table) = &doc.blocks[0] else {
        panic!("expected a table");
    };
    assert_eq!(table.rows.len(), 2);
    assert!(table.rows[0].cells[0].is_header);
    assert!(!table.rows[0].page_break_before);
    assert!(table.rows[1].page_break_before);
    assert_eq!(table.rows[1].plain_text(), "Pens\t4");
}

#[test]
fn test_session_export_marks_on_screen_breaks() {
    let html: String = (0..60)
        .map(|i| format!("<p>Paragraph number {}</p>", i))
        .collect();
    let doc = parse_html(&html, &ParseOptions::default()).unwrap();

    let mut session = EditorSession::new(doc, PageGeometry::default())
        .with_export_options(ExportOptions::default().with_title("Report"));
    assert!(matches!(session.export(), Err(Error::ViewUnavailable)));

    session.bind_oracle(MetricsOracle::new());
    let report = session.settle(std::time::Instant::now()).unwrap();
    assert!(!report.decorations.is_empty());

    let export = session.export().unwrap();
    assert_eq!(export.metadata.title.as_deref(), Some("Report"));
    assert_eq!(export.paragraphs().count(), 60);

    let breaks = export
        .paragraphs()
        .filter(|p| p.style.page_break_after || p.style.page_break_before)
        .count();
    assert_eq!(breaks, report.decorations.len());
}
