//! HTML to document tree.

use std::collections::{HashMap, HashSet};

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use log::{debug, warn};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;

use super::ParseOptions;
use crate::error::{Error, Result};
use crate::tree::{inline, Document, DocumentNode, InlineNode, InlineTag, NodeId, NodeKind};

/// Elements that only group blocks; their children are parsed in place.
const TRANSPARENT_TAGS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "thead", "tbody",
    "tfoot",
];

/// Elements whose content is never document text.
const SKIPPED_TAGS: &[&str] = &["head", "title", "style", "script", "colgroup"];

const INLINE_TAGS: &[&str] = &[
    "strong", "b", "em", "i", "u", "s", "strike", "del", "span", "a", "code", "mark", "small",
    "sub", "sup", "br",
];

/// Class the editor puts on a break that only keeps an empty last line open.
const TRAILING_BREAK_CLASS: &str = "ProseMirror-trailingBreak";

/// Deepest heading level the editor schema has.
const MAX_HEADING_LEVEL: u8 = 3;

/// Class of the blank blocks pagination inserts.
const SPACER_CLASS: &str = "spacer";

#[derive(Debug, Clone, PartialEq)]
enum HtmlNode {
    Element(HtmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct HtmlElement {
    tag: String,
    attrs: HashMap<String, String>,
    children: Vec<HtmlNode>,
}

impl HtmlElement {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: HashMap::new(),
            children: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    fn is_inline(&self) -> bool {
        INLINE_TAGS.contains(&self.tag.as_str())
    }
}

impl HtmlNode {
    fn is_inline(&self) -> bool {
        match self {
            HtmlNode::Text(_) => true,
            HtmlNode::Element(el) => el.is_inline(),
        }
    }
}

/// Parser for the editor's HTML.
///
/// Understands the block structure the editor emits (paragraphs, headings,
/// lists, tables, pagination spacers) and the inline formatting tags. Other
/// block tags become [`NodeKind::Unknown`] nodes so export can report and
/// skip them.
pub struct HtmlParser {
    options: ParseOptions,
    space_re: Regex,
    height_re: Regex,
}

impl HtmlParser {
    /// Create a parser.
    pub fn new(options: ParseOptions) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::HtmlParse(format!("bad pattern: {}", e)))
        };
        Ok(Self {
            options,
            space_re: compile(r"[ \t\r\n\x0C]+")?,
            height_re: compile(r"height\s*:\s*([0-9]+(?:\.[0-9]+)?)px")?,
        })
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a document.
    pub fn parse(&self, html: &str) -> Result<Document> {
        let roots = self.tree(html)?;
        let first_free = roots
            .iter()
            .filter_map(max_data_id)
            .max()
            .map_or(1, |max| max.saturating_add(1));

        let mut builder = Builder {
            parser: self,
            next_id: first_free,
            seen: HashSet::new(),
        };
        let blocks = builder.blocks(&roots, self.options.stylesheet.content_width)?;
        debug!("parsed {} top-level blocks", blocks.len());
        Ok(Document::new(blocks))
    }

    /// Parse an inline fragment on its own.
    pub fn parse_inline(&self, html: &str) -> Result<Vec<InlineNode>> {
        let roots = self.tree(html)?;
        let mut nodes = self.inline(&roots);
        trim_edges(&mut nodes);
        Ok(nodes)
    }

    /// Build the element tree: the children of `<body>`.
    ///
    /// Markup is parsed as a full HTML document, so entities, quoted
    /// attributes and implied end tags follow the HTML rules. Strict mode
    /// rejects anything the tree builder had to repair.
    fn tree(&self, html: &str) -> Result<Vec<HtmlNode>> {
        let source = if has_doctype(html) {
            html.to_string()
        } else {
            format!("<!DOCTYPE html>{}", html)
        };
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source.as_str());

        let errors = dom.errors.borrow();
        if let Some(first) = errors.first() {
            if !self.options.is_lenient() {
                return Err(Error::HtmlParse(first.to_string()));
            }
            for error in errors.iter() {
                warn!("repaired markup: {}", error);
            }
        }

        let Some(body) = find_body(&dom.document) else {
            return Ok(Vec::new());
        };
        let children = body.children.borrow();
        Ok(children.iter().filter_map(convert).collect())
    }

    /// Collapse whitespace runs.
    fn text(&self, raw: &str) -> String {
        self.space_re.replace_all(raw, " ").into_owned()
    }

    fn inline(&self, nodes: &[HtmlNode]) -> Vec<InlineNode> {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                HtmlNode::Text(raw) => {
                    let text = self.text(raw);
                    if !text.is_empty() {
                        out.push(InlineNode::text(text));
                    }
                }
                HtmlNode::Element(el) if el.tag == "br" => out.push(InlineNode::Break {
                    trailing: el.has_class(TRAILING_BREAK_CLASS),
                }),
                HtmlNode::Element(el) if SKIPPED_TAGS.contains(&el.tag.as_str()) => {}
                HtmlNode::Element(el) => {
                    let children = self.inline(&el.children);
                    if !children.is_empty() {
                        out.push(InlineNode::element(InlineTag::from_name(&el.tag), children));
                    }
                }
            }
        }
        out
    }

    fn spacer_height(&self, el: &HtmlElement) -> f64 {
        el.attr("style")
            .and_then(|style| self.height_re.captures(style))
            .and_then(|c| c.get(1)?.as_str().parse().ok())
            .unwrap_or(0.0)
    }
}

fn has_doctype(html: &str) -> bool {
    html.trim_start()
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
}

fn find_body(handle: &Handle) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data {
            match &*name.local {
                "body" => return Some(child.clone()),
                "html" => {
                    if let Some(body) = find_body(child) {
                        return Some(body);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// Copy a DOM subtree into an owned element tree; comments and other
/// non-content nodes are dropped.
fn convert(handle: &Handle) -> Option<HtmlNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(HtmlNode::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let mut element = HtmlElement::new(name.local.to_string());
            element.attrs = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            element.children = handle.children.borrow().iter().filter_map(convert).collect();
            Some(HtmlNode::Element(element))
        }
        _ => None,
    }
}

/// Largest `data-id` in a subtree.
fn max_data_id(node: &HtmlNode) -> Option<u64> {
    let HtmlNode::Element(el) = node else {
        return None;
    };
    let own = el.attr("data-id").and_then(|v| v.trim().parse::<u64>().ok());
    el.children.iter().filter_map(max_data_id).chain(own).max()
}

/// Converts the element tree into document nodes, assigning ids.
struct Builder<'p> {
    parser: &'p HtmlParser,
    next_id: u64,
    seen: HashSet<u64>,
}

impl Builder<'_> {
    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = self.next_id;
            self.next_id += 1;
            if self.seen.insert(id) {
                return NodeId::new(id);
            }
        }
    }

    fn id_for(&mut self, el: &HtmlElement) -> Result<NodeId> {
        match el.attr("data-id").and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(id) if self.seen.insert(id) => Ok(NodeId::new(id)),
            Some(id) if !self.parser.options.is_lenient() => {
                Err(Error::HtmlParse(format!("duplicate data-id {}", id)))
            }
            Some(id) => {
                let fresh = self.fresh_id();
                warn!("duplicate data-id {} on <{}>; using {}", id, el.tag, fresh);
                Ok(fresh)
            }
            None => Ok(self.fresh_id()),
        }
    }

    fn node(&self, id: NodeId, kind: NodeKind, width: f64) -> DocumentNode {
        let style = self.parser.options.stylesheet.resolve(&kind, width);
        DocumentNode::new(id, kind).styled(style)
    }

    /// Block sequence; loose inline content becomes an implicit paragraph.
    fn blocks(&mut self, nodes: &[HtmlNode], width: f64) -> Result<Vec<DocumentNode>> {
        let mut out = Vec::new();
        let mut loose: Vec<HtmlNode> = Vec::new();

        for node in nodes {
            if node.is_inline() {
                loose.push(node.clone());
                continue;
            }
            self.flush_loose(&mut loose, width, &mut out);
            if let HtmlNode::Element(el) = node {
                self.block(el, width, &mut out)?;
            }
        }
        self.flush_loose(&mut loose, width, &mut out);
        Ok(out)
    }

    fn flush_loose(&mut self, loose: &mut Vec<HtmlNode>, width: f64, out: &mut Vec<DocumentNode>) {
        if loose.is_empty() {
            return;
        }
        let mut content = self.parser.inline(loose);
        loose.clear();
        trim_edges(&mut content);
        if inline::text_content(&content).trim().is_empty() {
            return;
        }
        let id = self.fresh_id();
        let mut node = self.node(id, NodeKind::Paragraph, width);
        node.inline = content;
        out.push(node);
    }

    fn block(&mut self, el: &HtmlElement, width: f64, out: &mut Vec<DocumentNode>) -> Result<()> {
        let tag = el.tag.as_str();
        match tag {
            "p" => out.push(self.text_block(el, NodeKind::Paragraph, width)?),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level: u8 = tag[1..].parse().unwrap_or(3);
                if level > MAX_HEADING_LEVEL {
                    warn!("<{}> exported as a level {} heading", tag, MAX_HEADING_LEVEL);
                }
                out.push(self.text_block(el, NodeKind::heading(level), width)?);
            }
            "ol" => out.push(self.list(el, NodeKind::OrderedList, width)?),
            "ul" => out.push(self.list(el, NodeKind::BulletList, width)?),
            "table" => out.push(self.table(el, width)?),
            "div" if el.has_class(SPACER_CLASS) => out.push(self.spacer(el)?),
            _ if TRANSPARENT_TAGS.contains(&tag) => out.extend(self.blocks(&el.children, width)?),
            _ if SKIPPED_TAGS.contains(&tag) => {}
            _ => {
                let id = self.id_for(el)?;
                let mut node = self.node(id, NodeKind::Unknown { tag: tag.to_string() }, width);
                node.inline = self.parser.inline(&el.children);
                out.push(node);
            }
        }
        Ok(())
    }

    fn text_block(&mut self, el: &HtmlElement, kind: NodeKind, width: f64) -> Result<DocumentNode> {
        let id = self.id_for(el)?;
        let mut node = self.node(id, kind, width);
        node.inline = self.parser.inline(&el.children);
        trim_edges(&mut node.inline);
        Ok(node)
    }

    fn spacer(&mut self, el: &HtmlElement) -> Result<DocumentNode> {
        let id = self.id_for(el)?;
        Ok(DocumentNode::spacer(id, self.parser.spacer_height(el)))
    }

    fn list(&mut self, el: &HtmlElement, kind: NodeKind, width: f64) -> Result<DocumentNode> {
        let id = self.id_for(el)?;
        let mut list = self.node(id, kind, width);
        let inner = width - self.parser.options.stylesheet.list_indent;

        for child in &el.children {
            let HtmlNode::Element(item) = child else { continue };
            match item.tag.as_str() {
                "li" => {
                    let item_id = self.id_for(item)?;
                    let mut node = self.node(item_id, NodeKind::ListItem, inner);
                    node.children = self.blocks(&item.children, inner)?;
                    list.children.push(node);
                }
                "div" if item.has_class(SPACER_CLASS) => list.children.push(self.spacer(item)?),
                other => warn!("ignoring <{}> directly inside <{}>", other, el.tag),
            }
        }
        Ok(list)
    }

    fn table(&mut self, el: &HtmlElement, width: f64) -> Result<DocumentNode> {
        let id = self.id_for(el)?;
        let mut table = self.node(id, NodeKind::Table, width);

        let mut rows = Vec::new();
        collect_rows(el, &mut rows);
        let columns = rows
            .iter()
            .map(|r| r.children.iter().filter(|c| is_cell(c)).count())
            .max()
            .unwrap_or(1)
            .max(1);
        let padding = self.parser.options.stylesheet.cell_padding;
        let cell_width = width / columns as f64 - 2.0 * padding;

        for row in rows {
            if row.has_class(SPACER_CLASS) {
                table.children.push(self.spacer(row)?);
                continue;
            }
            let row_id = self.id_for(row)?;
            let mut row_node = self.node(row_id, NodeKind::TableRow, width);
            for cell in &row.children {
                let HtmlNode::Element(cell) = cell else { continue };
                if !matches!(cell.tag.as_str(), "td" | "th") {
                    continue;
                }
                let cell_id = self.id_for(cell)?;
                let kind = NodeKind::TableCell {
                    header: cell.tag == "th",
                };
                let mut cell_node = self.node(cell_id, kind, cell_width);
                cell_node.style.padding_left = padding;
                cell_node.children = self.blocks(&cell.children, cell_width)?;
                row_node.children.push(cell_node);
            }
            table.children.push(row_node);
        }
        Ok(table)
    }
}

fn is_cell(node: &HtmlNode) -> bool {
    matches!(node, HtmlNode::Element(el) if el.tag == "td" || el.tag == "th")
}

/// Rows of a table, looking through row groups. Spacers inside a table
/// are rows with the spacer class, since HTML moves any other element out.
fn collect_rows<'e>(el: &'e HtmlElement, rows: &mut Vec<&'e HtmlElement>) {
    for child in &el.children {
        let HtmlNode::Element(child) = child else { continue };
        match child.tag.as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
            _ => {}
        }
    }
}

/// Trim whitespace at the start and end of a text block.
fn trim_edges(nodes: &mut Vec<InlineNode>) {
    if let Some(text) = first_text_mut(nodes) {
        *text = text.trim_start().to_string();
    }
    if let Some(text) = last_text_mut(nodes) {
        *text = text.trim_end().to_string();
    }
    let pruned = inline::prune(std::mem::take(nodes));
    *nodes = pruned;
}

fn first_text_mut(nodes: &mut [InlineNode]) -> Option<&mut String> {
    for node in nodes.iter_mut() {
        match node {
            InlineNode::Text { text } => return Some(text),
            InlineNode::Element { children, .. } => {
                if let Some(text) = first_text_mut(children) {
                    return Some(text);
                }
            }
            InlineNode::Break { .. } => return None,
        }
    }
    None
}

fn last_text_mut(nodes: &mut [InlineNode]) -> Option<&mut String> {
    for node in nodes.iter_mut().rev() {
        match node {
            InlineNode::Text { text } => return Some(text),
            InlineNode::Element { children, .. } => {
                if let Some(text) = last_text_mut(children) {
                    return Some(text);
                }
            }
            InlineNode::Break { trailing: true } => {}
            InlineNode::Break { .. } => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> HtmlParser {
        HtmlParser::new(ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_quoted_attributes_and_named_entities() {
        let doc = parser()
            .parse(r#"<p title="a>b">x &mdash; y &amp; z&nbsp;&hellip;</p>"#)
            .unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text_content(), "x \u{2014} y & z\u{a0}\u{2026}");
    }

    #[test]
    fn test_deep_headings_clamp_to_level_three() {
        let doc = parser().parse("<h3>a</h3><h5>b</h5>").unwrap();
        assert_eq!(doc.blocks[0].kind, NodeKind::heading(3));
        assert_eq!(doc.blocks[1].kind, NodeKind::Heading { level: 3 });
        assert_eq!(doc.blocks[1].text_content(), "b");
    }

    #[test]
    fn test_paragraph_with_formatting() {
        let doc = parser()
            .parse("<p data-id=\"7\">Hello <strong>big</strong>\n  world<br class=\"ProseMirror-trailingBreak\"></p>")
            .unwrap();
        let p = &doc.blocks[0];
        assert_eq!(p.id, NodeId::new(7));
        assert_eq!(p.kind, NodeKind::Paragraph);
        assert_eq!(p.text_content(), "Hello big world");
        assert_eq!(p.inline.last(), Some(&InlineNode::trailing_break()));
        assert_eq!(p.style.margin_top, 16.0);
    }

    #[test]
    fn test_missing_ids_follow_explicit_ones() {
        let doc = parser().parse("<p>a</p><p data-id=\"40\">b</p><h2>c</h2>").unwrap();
        let ids: Vec<u64> = doc.blocks.iter().map(|b| b.id.value()).collect();
        assert_eq!(ids, vec![41, 40, 42]);
        assert_eq!(doc.blocks[2].kind, NodeKind::heading(2));
    }

    #[test]
    fn test_lists_and_spacers() {
        let html = "<ol><li><p>one</p></li><li><div class=\"spacer\" style=\"height: 120.5px\"></div><p>two</p><ul><li>loose</li></ul></li></ol>";
        let doc = parser().parse(html).unwrap();
        let list = &doc.blocks[0];
        assert_eq!(list.kind, NodeKind::OrderedList);
        assert_eq!(list.children.len(), 2);

        let item = &list.children[1];
        assert_eq!(item.children[0].kind, NodeKind::Spacer { height: 120.5 });
        assert_eq!(item.children[1].style.width, 643.0 - 40.0);

        let nested = &item.children[2];
        assert_eq!(nested.kind, NodeKind::BulletList);
        let loose = &nested.children[0].children[0];
        assert_eq!(loose.kind, NodeKind::Paragraph);
        assert_eq!(loose.text_content(), "loose");
        assert_eq!(loose.style.width, 643.0 - 80.0);
    }

    #[test]
    fn test_table_spacer_rows() {
        let html = "<table><tr><td>a</td></tr>\
                    <tr class=\"spacer\" style=\"height: 40px\"></tr>\
                    <tr><td>b</td></tr></table>";
        let doc = parser().parse(html).unwrap();
        let table = &doc.blocks[0];
        assert_eq!(table.children.len(), 3);
        assert_eq!(table.children[1].kind, NodeKind::Spacer { height: 40.0 });
        assert_eq!(table.children[2].kind, NodeKind::TableRow);
    }

    #[test]
    fn test_table_row_groups() {
        let html = "<table><thead><tr><th><p>A</p></th><th><p>B</p></th></tr></thead>\
                    <tbody><tr><td><p>1</p></td><td>2</td></tr></tbody></table>";
        let doc = parser().parse(html).unwrap();
        let table = &doc.blocks[0];
        assert_eq!(table.children.len(), 2);
        assert_eq!(table.children[0].children[0].kind, NodeKind::TableCell { header: true });

        let cell = &table.children[1].children[1];
        assert_eq!(cell.children[0].text_content(), "2");
        assert_eq!(cell.style.width, 643.0 / 2.0 - 16.0);
    }

    #[test]
    fn test_unknown_block() {
        let doc = parser().parse("<blockquote>quoted</blockquote><hr>").unwrap();
        assert_eq!(doc.blocks[0].kind, NodeKind::Unknown { tag: "blockquote".into() });
        assert_eq!(doc.blocks[1].kind, NodeKind::Unknown { tag: "hr".into() });
    }

    #[test]
    fn test_strict_and_lenient() {
        assert!(matches!(parser().parse("<p>a</div>"), Err(Error::HtmlParse(_))));
        assert!(matches!(parser().parse("<p><em>a</p>"), Err(Error::HtmlParse(_))));
        assert!(matches!(parser().parse("<div>a"), Err(Error::HtmlParse(_))));
        assert!(parser().parse("<p>implied end").is_ok());
        assert!(matches!(
            parser().parse("<p data-id=\"1\">a</p><p data-id=\"1\">b</p>"),
            Err(Error::HtmlParse(_))
        ));

        let lenient = HtmlParser::new(ParseOptions::new().lenient()).unwrap();
        let doc = lenient.parse("<p><em>a</p><p data-id=\"1\">b</p><p data-id=\"1\">c").unwrap();
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.blocks[0].text_content(), "a");
        assert_ne!(doc.blocks[1].id, doc.blocks[2].id);
    }

    #[test]
    fn test_parse_inline() {
        let nodes = parser().parse_inline("  <b>x</b><i>y</i> ").unwrap();
        assert_eq!(
            nodes,
            vec![
                InlineNode::element(InlineTag::B, vec![InlineNode::text("x")]),
                InlineNode::element(InlineTag::I, vec![InlineNode::text("y")]),
            ]
        );
    }

    #[test]
    fn test_wrapper_and_comments_are_transparent() {
        let doc = parser()
            .parse("<!DOCTYPE html><div class=\"ProseMirror\"><!-- note --><p>x</p></div>")
            .unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text_content(), "x");
    }
}
