//! The document model interface.
//!
//! Rules never parse office files themselves. They observe a loaded
//! document through [`DocumentModel`], which exposes sections, paragraphs,
//! tables, fields, bookmarks and pagination. This keeps the rule set
//! independent of any particular office library: [`crate::snapshot`]
//! implements it over a JSON snapshot, a real backend can implement it
//! over a rendering engine.
//!
//! Physical lengths are in points throughout (1 pt = 1/72 inch).
//! Page indices are 0-based.

use serde::{Deserialize, Serialize};

const POINTS_PER_MM: f64 = 72.0 / 25.4;

pub fn mm_to_points(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

pub fn points_to_mm(points: f64) -> f64 {
    points / POINTS_PER_MM
}

/// Equality within a relative tolerance of the larger magnitude.
pub fn is_close(a: f64, b: f64, rel_tol: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

/// Stable handle of a body paragraph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParagraphId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom,
}

impl std::fmt::Display for PaperSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::Custom => "Custom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub paper_size: PaperSize,
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default = "default_font_name")]
    pub font_name: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

fn default_font_name() -> String {
    "Times New Roman".to_string()
}

fn default_font_size() -> f64 {
    14.0
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            font_name: default_font_name(),
            font_size: default_font_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParagraphFormat {
    pub alignment: Alignment,
    pub left_indent: f64,
    pub first_line_indent: f64,
    pub space_before: f64,
    pub space_after: f64,
    pub line_spacing: f64,
    pub style_name: String,
}

impl Default for ParagraphFormat {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            left_indent: 0.0,
            first_line_indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
            line_spacing: 18.0,
            style_name: "Normal".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub text: String,
    pub runs: Vec<Run>,
    pub format: ParagraphFormat,
}

impl Paragraph {
    pub fn first_run(&self) -> Option<&Run> {
        self.runs.first()
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// What a table's horizontal position is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAnchor {
    Page,
    #[default]
    Margin,
    Column,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Table {
    pub rows: Vec<Row>,
    pub horizontal_anchor: HorizontalAnchor,
    /// Offset of the table from its anchor.
    pub horizontal_offset: f64,
}

impl Table {
    /// Anchor offset plus the widths of the first-row cells.
    pub fn horizontal_extent(&self) -> f64 {
        let widths: f64 = self
            .rows
            .first()
            .map(|row| row.cells.iter().map(|cell| cell.width).sum())
            .unwrap_or(0.0);
        self.horizontal_offset + widths
    }

    /// Concatenated text of the first column.
    pub fn first_column_text(&self) -> String {
        self.rows
            .iter()
            .filter_map(|row| row.cells.first())
            .map(|cell| cell.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn text(&self) -> String {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .map(|cell| cell.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Field kinds the rules care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// The table-of-contents marker field.
    Toc,
    Hyperlink {
        #[serde(default, rename = "subAddress")]
        sub_address: Option<String>,
    },
    /// A page-number field.
    Page,
    Other {
        #[serde(default)]
        code: String,
    },
}

/// A body field and the paragraph enclosing its start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    pub paragraph: ParagraphId,
}

/// Outcome of resolving a bookmark to its anchoring paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkResolution {
    Found(ParagraphId),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Header,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneVariant {
    Primary,
    Even,
    First,
}

/// Content of one header or footer story.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneContent {
    pub text: String,
    /// Content is not authored in this section but taken from the previous one.
    pub linked_to_previous: bool,
    pub fields: Vec<FieldKind>,
    pub tables: Vec<Table>,
}

impl ZoneContent {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn has_page_field(&self) -> bool {
        self.fields.iter().any(|kind| *kind == FieldKind::Page)
    }
}

/// Inclusive page range covered by a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
}

impl PageSpan {
    pub fn page_count(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn contains(&self, page: usize) -> bool {
        (self.start..=self.end).contains(&page)
    }
}

/// A block of a page-scoped fragment, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBlock {
    Paragraph(ParagraphId, Paragraph),
    Table(Table),
}

/// One page extracted as a standalone fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageFragment {
    pub index: usize,
    pub blocks: Vec<PageBlock>,
}

impl PageFragment {
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            PageBlock::Paragraph(_, paragraph) => Some(paragraph),
            PageBlock::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            PageBlock::Table(table) => Some(table),
            PageBlock::Paragraph(..) => None,
        })
    }

    /// Plain text of the whole page, paragraphs and table cells included.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                PageBlock::Paragraph(_, paragraph) => paragraph.text.clone(),
                PageBlock::Table(table) => table.text(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Read-only view of a loaded document.
///
/// Implementations must be total: unknown ids and out-of-range indices
/// yield `None` rather than panicking.
pub trait DocumentModel {
    /// Total number of rendered pages.
    fn page_count(&self) -> usize;

    fn section_count(&self) -> usize;

    fn page_setup(&self, section: usize) -> Option<&PageSetup>;

    /// Whether the section declares a distinct first-page header/footer.
    fn different_first_page(&self, section: usize) -> bool;

    /// Pages covered by a section.
    fn section_pages(&self, section: usize) -> Option<PageSpan>;

    /// Header or footer story of a section, absent when the section
    /// declares no override for that variant.
    fn zone(&self, section: usize, zone: Zone, variant: ZoneVariant) -> Option<&ZoneContent>;

    fn paragraph(&self, id: ParagraphId) -> Option<&Paragraph>;

    /// All body paragraphs in document order.
    fn paragraph_ids(&self) -> Vec<ParagraphId>;

    /// The next body paragraph after `id`, skipping tables.
    fn next_paragraph(&self, id: ParagraphId) -> Option<ParagraphId>;

    /// Page on which a paragraph starts.
    fn paragraph_page(&self, id: ParagraphId) -> Option<usize>;

    /// Document-wide fields in document order.
    fn fields(&self) -> Vec<Field>;

    fn resolve_bookmark(&self, name: &str) -> BookmarkResolution;

    /// Extract one page as a standalone fragment.
    fn page(&self, index: usize) -> Option<PageFragment>;

    fn page_text(&self, index: usize) -> Option<String> {
        self.page(index).map(|page| page.text())
    }
}
