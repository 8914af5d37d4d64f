//! Content tree types: structural nodes and positioned fragments.

use serde::{Deserialize, Serialize};

use super::{StyleAttrs, TextAlign};

/// Text written in place of a node this crate does not know.
pub const UNSUPPORTED_PLACEHOLDER: &str = "[unsupported content]";

/// A node of one page's content tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    /// A table with explicit rows and cells
    Table(Table),

    /// An ordered or unordered list
    List(List),

    /// A heading (level 1-6)
    Heading {
        /// Heading level
        level: u8,
        /// Heading text
        text: String,
    },

    /// A paragraph or generic block container
    Paragraph {
        /// Inline runs and/or nested blocks
        #[serde(default)]
        children: Vec<ContentNode>,
    },

    /// A run of inline text
    InlineRun(InlineRun),

    /// An image, represented by its alternative text
    Image {
        /// Alternative text
        #[serde(default)]
        alt_text: Option<String>,
    },

    /// Text known only by its absolute page position
    PositionedFragment(PositionedFragment),

    /// A forced line break
    LineBreak,

    /// Any node kind this crate does not know
    #[serde(other)]
    Unsupported,
}

impl ContentNode {
    /// Create a paragraph holding a single plain run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentNode::Paragraph {
            children: vec![ContentNode::run(text)],
        }
    }

    /// Create a paragraph from child nodes.
    pub fn paragraph_with(children: Vec<ContentNode>) -> Self {
        ContentNode::Paragraph { children }
    }

    /// Create a heading node. The level is clamped to 1-6.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        ContentNode::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    /// Create a plain inline run.
    pub fn run(text: impl Into<String>) -> Self {
        ContentNode::InlineRun(InlineRun::new(text))
    }

    /// Create an image node.
    pub fn image(alt_text: Option<&str>) -> Self {
        ContentNode::Image {
            alt_text: alt_text.map(str::to_string),
        }
    }

    /// Whether the node occupies its own row(s) rather than flowing inline.
    pub fn is_block(&self) -> bool {
        !matches!(
            self,
            ContentNode::InlineRun(_) | ContentNode::PositionedFragment(_) | ContentNode::LineBreak
        )
    }

    /// Styling carried by an inline node, if any.
    pub fn inline_style(&self) -> Option<&StyleAttrs> {
        match self {
            ContentNode::InlineRun(run) => Some(&run.style),
            ContentNode::PositionedFragment(frag) => Some(&frag.style),
            _ => None,
        }
    }

    /// Get plain text content, flattening any nested structure.
    ///
    /// Inline pieces are space-joined; blocks are separated by newlines.
    pub fn plain_text(&self) -> String {
        match self {
            ContentNode::Table(table) => table.plain_text(),
            ContentNode::List(list) => list.plain_text(),
            ContentNode::Heading { text, .. } => text.trim().to_string(),
            ContentNode::Paragraph { children } => flatten_text(children),
            ContentNode::InlineRun(run) => run.text.trim().to_string(),
            ContentNode::Image { alt_text } => image_placeholder(alt_text.as_deref()),
            ContentNode::PositionedFragment(frag) => frag.text.trim().to_string(),
            ContentNode::LineBreak => String::new(),
            ContentNode::Unsupported => UNSUPPORTED_PLACEHOLDER.to_string(),
        }
    }

    /// Number of unknown nodes in this subtree, including itself.
    pub fn unsupported_count(&self) -> usize {
        match self {
            ContentNode::Unsupported => 1,
            ContentNode::Paragraph { children } => children.iter().map(Self::unsupported_count).sum(),
            ContentNode::Table(table) => table
                .rows
                .iter()
                .flat_map(|r| &r.cells)
                .flat_map(|c| &c.content)
                .map(Self::unsupported_count)
                .sum(),
            ContentNode::List(list) => list.unsupported_count(),
            _ => 0,
        }
    }
}

/// Space-join the text of inline nodes, skipping blocks.
pub fn inline_text(nodes: &[ContentNode]) -> String {
    nodes
        .iter()
        .filter(|n| !n.is_block())
        .map(ContentNode::plain_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flatten mixed inline and block nodes to text.
pub fn flatten_text(nodes: &[ContentNode]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut inline: Vec<String> = Vec::new();

    for node in nodes {
        if node.is_block() {
            if !inline.is_empty() {
                lines.push(inline.join(" "));
                inline.clear();
            }
            let text = node.plain_text();
            if !text.is_empty() {
                lines.push(text);
            }
        } else {
            let text = node.plain_text();
            if !text.is_empty() {
                inline.push(text);
            }
        }
    }
    if !inline.is_empty() {
        lines.push(inline.join(" "));
    }

    lines.join("\n")
}

/// Bracketed placeholder text for an image.
pub fn image_placeholder(alt_text: Option<&str>) -> String {
    match alt_text.map(str::trim).filter(|a| !a.is_empty()) {
        Some(alt) => format!("[Image: {}]", alt),
        None => "[Image]".to_string(),
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineRun {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(default)]
    pub style: StyleAttrs,
}

impl InlineRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: StyleAttrs::default(),
        }
    }

    /// Create a styled text run.
    pub fn styled(text: impl Into<String>, style: StyleAttrs) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A piece of text positioned absolutely on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionedFragment {
    /// The text content
    pub text: String,

    /// Distance from the top of the page
    pub top: f64,

    /// Distance from the left edge of the page
    pub left: f64,

    /// Text styling
    #[serde(default)]
    pub style: StyleAttrs,
}

impl PositionedFragment {
    /// Create a fragment with default style.
    pub fn new(text: impl Into<String>, top: f64, left: f64) -> Self {
        Self {
            text: text.into(),
            top,
            left,
            style: StyleAttrs::default(),
        }
    }

    /// Set the style and return self.
    pub fn with_style(mut self, style: StyleAttrs) -> Self {
        self.style = style;
        self
    }
}

/// A table structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row and return self.
    pub fn with_row(mut self, row: TableRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(TableCell::plain_text)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Table> for ContentNode {
    fn from(table: Table) -> Self {
        ContentNode::Table(table)
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }
}

/// A table cell.
///
/// Spans are signed so that malformed source values survive loading and can
/// be clamped during layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    #[serde(default)]
    pub content: Vec<ContentNode>,

    /// Number of rows this cell spans
    #[serde(default = "default_span")]
    pub row_span: i32,

    /// Number of columns this cell spans
    #[serde(default = "default_span")]
    pub col_span: i32,

    /// Whether this is a header cell
    #[serde(default)]
    pub is_header: bool,

    /// Cell alignment
    #[serde(default)]
    pub align: Option<TextAlign>,

    /// Cell styling
    #[serde(default)]
    pub style: StyleAttrs,
}

fn default_span() -> i32 {
    1
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(vec![ContentNode::run(text)])
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::with_content(Vec::new())
    }

    /// Create a cell from content nodes.
    pub fn with_content(content: Vec<ContentNode>) -> Self {
        Self {
            content,
            row_span: 1,
            col_span: 1,
            is_header: false,
            align: None,
            style: StyleAttrs::default(),
        }
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: i32) -> Self {
        self.col_span = span;
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: i32) -> Self {
        self.row_span = span;
        self
    }

    /// Mark as header cell and return self.
    pub fn header(mut self) -> Self {
        self.is_header = true;
        self
    }

    /// Set alignment and return self.
    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = Some(align);
        self
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        flatten_text(&self.content)
    }
}

/// An ordered or unordered list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct List {
    /// Numbered when true, bulleted otherwise
    #[serde(default)]
    pub ordered: bool,

    /// First number of an ordered list
    #[serde(default = "default_list_start")]
    pub start: u32,

    /// List items
    #[serde(default)]
    pub items: Vec<ListItem>,
}

fn default_list_start() -> u32 {
    1
}

impl List {
    /// Create an empty bulleted list.
    pub fn unordered() -> Self {
        Self {
            ordered: false,
            start: 1,
            items: Vec::new(),
        }
    }

    /// Create an empty numbered list.
    pub fn ordered() -> Self {
        Self {
            ordered: true,
            ..Self::unordered()
        }
    }

    /// Add an item and return self.
    pub fn with_item(mut self, item: ListItem) -> Self {
        self.items.push(item);
        self
    }

    fn unsupported_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| {
                let children: usize = item.children.iter().map(ContentNode::unsupported_count).sum();
                children + item.nested.as_ref().map_or(0, List::unsupported_count)
            })
            .sum()
    }

    /// Get plain text, one item per line.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for item in &self.items {
            let own = item.own_text();
            if !own.is_empty() {
                lines.push(own);
            }
            for child in item.children.iter().filter(|c| c.is_block()) {
                let text = child.plain_text();
                if !text.is_empty() {
                    lines.push(text);
                }
            }
            if let Some(nested) = &item.nested {
                let text = nested.plain_text();
                if !text.is_empty() {
                    lines.push(text);
                }
            }
        }
        lines.join("\n")
    }
}

impl From<List> for ContentNode {
    fn from(list: List) -> Self {
        ContentNode::List(list)
    }
}

/// A list item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListItem {
    /// Item text
    #[serde(default)]
    pub text: String,

    /// Additional inline runs or nested blocks
    #[serde(default)]
    pub children: Vec<ContentNode>,

    /// Nested sub-list
    #[serde(default)]
    pub nested: Option<List>,
}

impl ListItem {
    /// Create an item with text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
            nested: None,
        }
    }

    /// Attach a nested list and return self.
    pub fn with_nested(mut self, list: List) -> Self {
        self.nested = Some(list);
        self
    }

    /// Add a child node and return self.
    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// The item's own text: its text plus inline children.
    pub fn own_text(&self) -> String {
        let text = self.text.trim();
        let inline = inline_text(&self.children);
        match (text.is_empty(), inline.is_empty()) {
            (false, false) => format!("{} {}", text, inline),
            (false, true) => text.to_string(),
            (true, _) => inline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_text_skips_blocks() {
        let nodes = vec![
            ContentNode::run(" Hello "),
            ContentNode::heading(2, "ignored"),
            ContentNode::run("world"),
        ];
        assert_eq!(inline_text(&nodes), "Hello world");
    }

    #[test]
    fn test_flatten_text_separates_blocks() {
        let nodes = vec![
            ContentNode::run("intro"),
            ContentNode::paragraph("body"),
            ContentNode::run("outro"),
        ];
        assert_eq!(flatten_text(&nodes), "intro\nbody\noutro");
    }

    #[test]
    fn test_list_item_own_text() {
        let item = ListItem::new("Item")
            .with_child(ContentNode::run("tail"))
            .with_child(ContentNode::paragraph("block"));
        assert_eq!(item.own_text(), "Item tail");
    }

    #[test]
    fn test_image_placeholder() {
        assert_eq!(image_placeholder(Some("Logo")), "[Image: Logo]");
        assert_eq!(image_placeholder(Some("  ")), "[Image]");
        assert_eq!(image_placeholder(None), "[Image]");
    }

    #[test]
    fn test_deserialize_tagged_nodes() {
        let json = r#"[
            {"type": "heading", "level": 2, "text": "Title"},
            {"type": "table", "rows": [{"cells": [{"content": [{"type": "inline_run", "text": "A"}], "col_span": 2}]}]},
            {"type": "video", "src": "clip.mp4"}
        ]"#;
        let nodes: Vec<ContentNode> = serde_json::from_str(json).unwrap();
        assert!(matches!(nodes[0], ContentNode::Heading { level: 2, .. }));
        match &nodes[1] {
            ContentNode::Table(table) => {
                assert_eq!(table.rows[0].cells[0].col_span, 2);
                assert_eq!(table.rows[0].cells[0].row_span, 1);
            }
            other => panic!("Expected table, got {:?}", other),
        }
        assert!(matches!(nodes[2], ContentNode::Unsupported));
    }

    #[test]
    fn test_unsupported_nodes_counted_and_labelled() {
        let nodes = vec![
            ContentNode::run("before"),
            ContentNode::Unsupported,
            ContentNode::Paragraph {
                children: vec![ContentNode::Unsupported],
            },
        ];
        assert_eq!(
            flatten_text(&nodes),
            format!("before\n{0}\n{0}", UNSUPPORTED_PLACEHOLDER)
        );

        let table: ContentNode = Table::new()
            .with_row(TableRow::new(vec![TableCell::with_content(nodes)]))
            .into();
        assert_eq!(table.unsupported_count(), 2);
        assert_eq!(ContentNode::heading(1, "x").unsupported_count(), 0);
    }

    #[test]
    fn test_table_plain_text() {
        let table = Table::new()
            .with_row(TableRow::from_strings(["a", "b"]))
            .with_row(TableRow::from_strings(["c", "d"]));
        assert_eq!(table.plain_text(), "a\tb\nc\td");
    }
}
