//! JSON document snapshots.
//!
//! A snapshot is an already-paginated document: pages of blocks
//! (paragraphs and tables) plus a list of sections with their page setup
//! and header/footer stories. Fields and bookmarks are written inline on
//! the paragraph that encloses them, so a snapshot never refers to
//! paragraphs by index.
//!
//! ```json
//! {
//!   "sections": [{ "pageSetup": { ... }, "pages": 2, "footer": { "primary": { "text": "..." } } }],
//!   "pages": [
//!     { "blocks": [ { "paragraph": { "text": "СОДЕРЖАНИЕ", "fields": [{ "kind": "toc" }] } } ] }
//!   ]
//! }
//! ```
//!
//! [`SnapshotDocument`] indexes a snapshot and implements
//! [`DocumentModel`] over it. It is the model used by the CLI and by the
//! rule tests.

use crate::error::NormcheckError;
use crate::model::{
    BookmarkResolution, DocumentModel, Field, FieldKind, PageBlock, PageFragment, PageSetup,
    PageSpan, Paragraph, ParagraphFormat, ParagraphId, Run, Table, Zone, ZoneContent, ZoneVariant,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub sections: Vec<SnapshotSection>,
    pub pages: Vec<SnapshotPage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotPage {
    pub blocks: Vec<SnapshotBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotBlock {
    Paragraph(SnapshotParagraph),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotParagraph {
    pub text: String,
    /// Explicit runs. When absent the paragraph text forms a single run.
    pub runs: Option<Vec<Run>>,
    /// Boldness of the implicit single run.
    pub bold: bool,
    pub format: ParagraphFormat,
    pub bookmarks: Vec<String>,
    pub fields: Vec<FieldKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSection {
    pub page_setup: PageSetup,
    /// Number of pages the section spans.
    pub pages: usize,
    #[serde(default)]
    pub different_first_page: bool,
    #[serde(default)]
    pub header: ZoneSet,
    #[serde(default)]
    pub footer: ZoneSet,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneSet {
    pub primary: Option<ZoneContent>,
    pub even: Option<ZoneContent>,
    pub first: Option<ZoneContent>,
}

impl ZoneSet {
    fn get(&self, variant: ZoneVariant) -> Option<&ZoneContent> {
        match variant {
            ZoneVariant::Primary => self.primary.as_ref(),
            ZoneVariant::Even => self.even.as_ref(),
            ZoneVariant::First => self.first.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
enum IndexedBlock {
    Paragraph(ParagraphId),
    Table(Table),
}

#[derive(Debug, Clone)]
struct IndexedSection {
    page_setup: PageSetup,
    span: PageSpan,
    different_first_page: bool,
    header: ZoneSet,
    footer: ZoneSet,
}

/// An indexed snapshot implementing [`DocumentModel`].
#[derive(Debug, Clone)]
pub struct SnapshotDocument {
    pages: Vec<Vec<IndexedBlock>>,
    paragraphs: Vec<Paragraph>,
    paragraph_pages: Vec<usize>,
    fields: Vec<Field>,
    bookmarks: BTreeMap<String, ParagraphId>,
    sections: Vec<IndexedSection>,
}

impl SnapshotDocument {
    /// Index a snapshot, validating its structural preconditions.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, NormcheckError> {
        if snapshot.pages.is_empty() {
            return Err(NormcheckError::InvalidDocument(
                "document has no pages".to_string(),
            ));
        }
        if snapshot.sections.is_empty() {
            return Err(NormcheckError::InvalidDocument(
                "document has no sections".to_string(),
            ));
        }

        let mut sections = Vec::with_capacity(snapshot.sections.len());
        let mut next_page = 0usize;
        for (index, section) in snapshot.sections.into_iter().enumerate() {
            if section.pages == 0 {
                return Err(NormcheckError::InvalidDocument(format!(
                    "section {} spans no pages",
                    index + 1
                )));
            }
            let span = PageSpan {
                start: next_page,
                end: next_page + section.pages - 1,
            };
            next_page += section.pages;
            sections.push(IndexedSection {
                page_setup: section.page_setup,
                span,
                different_first_page: section.different_first_page,
                header: section.header,
                footer: section.footer,
            });
        }
        if next_page != snapshot.pages.len() {
            return Err(NormcheckError::InvalidDocument(format!(
                "sections span {next_page} pages but the document has {}",
                snapshot.pages.len()
            )));
        }

        let mut pages = Vec::with_capacity(snapshot.pages.len());
        let mut paragraphs = Vec::new();
        let mut paragraph_pages = Vec::new();
        let mut fields = Vec::new();
        let mut bookmarks = BTreeMap::new();

        for (page_index, page) in snapshot.pages.into_iter().enumerate() {
            let mut blocks = Vec::with_capacity(page.blocks.len());
            for block in page.blocks {
                match block {
                    SnapshotBlock::Table(table) => blocks.push(IndexedBlock::Table(table)),
                    SnapshotBlock::Paragraph(raw) => {
                        let id = ParagraphId(paragraphs.len());
                        for name in &raw.bookmarks {
                            if bookmarks.insert(name.clone(), id).is_some() {
                                return Err(NormcheckError::InvalidDocument(format!(
                                    "duplicate bookmark name: {name}"
                                )));
                            }
                        }
                        fields.extend(raw.fields.iter().cloned().map(|kind| Field {
                            kind,
                            paragraph: id,
                        }));
                        paragraphs.push(realize_paragraph(raw));
                        paragraph_pages.push(page_index);
                        blocks.push(IndexedBlock::Paragraph(id));
                    }
                }
            }
            pages.push(blocks);
        }

        Ok(Self {
            pages,
            paragraphs,
            paragraph_pages,
            fields,
            bookmarks,
            sections,
        })
    }

    pub fn from_value(value: Value) -> Result<Self, NormcheckError> {
        let snapshot: Snapshot =
            serde_json::from_value(value).map_err(|source| NormcheckError::ParseJson {
                path: "<value>".to_string(),
                source,
            })?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, NormcheckError> {
        let snapshot: Snapshot =
            serde_json::from_str(text).map_err(|source| NormcheckError::ParseJson {
                path: origin.to_string(),
                source,
            })?;
        Self::from_snapshot(snapshot)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NormcheckError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| NormcheckError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text, &path.display().to_string())
    }

    fn section(&self, index: usize) -> Option<&IndexedSection> {
        self.sections.get(index)
    }
}

fn realize_paragraph(raw: SnapshotParagraph) -> Paragraph {
    let runs = match raw.runs {
        Some(runs) => runs,
        None if raw.text.is_empty() => Vec::new(),
        None => vec![Run {
            bold: raw.bold,
            ..Run::plain(raw.text.clone())
        }],
    };
    let text = if raw.text.is_empty() {
        runs.iter().map(|run| run.text.as_str()).collect()
    } else {
        raw.text
    };
    Paragraph {
        text,
        runs,
        format: raw.format,
    }
}

impl DocumentModel for SnapshotDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn page_setup(&self, section: usize) -> Option<&PageSetup> {
        self.section(section).map(|s| &s.page_setup)
    }

    fn different_first_page(&self, section: usize) -> bool {
        self.section(section)
            .is_some_and(|s| s.different_first_page)
    }

    fn section_pages(&self, section: usize) -> Option<PageSpan> {
        self.section(section).map(|s| s.span)
    }

    fn zone(&self, section: usize, zone: Zone, variant: ZoneVariant) -> Option<&ZoneContent> {
        let section = self.section(section)?;
        match zone {
            Zone::Header => section.header.get(variant),
            Zone::Footer => section.footer.get(variant),
        }
    }

    fn paragraph(&self, id: ParagraphId) -> Option<&Paragraph> {
        self.paragraphs.get(id.0)
    }

    fn paragraph_ids(&self) -> Vec<ParagraphId> {
        (0..self.paragraphs.len()).map(ParagraphId).collect()
    }

    fn next_paragraph(&self, id: ParagraphId) -> Option<ParagraphId> {
        let next = ParagraphId(id.0 + 1);
        self.paragraphs.get(next.0).map(|_| next)
    }

    fn paragraph_page(&self, id: ParagraphId) -> Option<usize> {
        self.paragraph_pages.get(id.0).copied()
    }

    fn fields(&self) -> Vec<Field> {
        self.fields.clone()
    }

    fn resolve_bookmark(&self, name: &str) -> BookmarkResolution {
        match self.bookmarks.get(name) {
            Some(id) => BookmarkResolution::Found(*id),
            None => BookmarkResolution::NotFound,
        }
    }

    fn page(&self, index: usize) -> Option<PageFragment> {
        let blocks = self.pages.get(index)?;
        let blocks = blocks
            .iter()
            .filter_map(|block| match block {
                IndexedBlock::Table(table) => Some(PageBlock::Table(table.clone())),
                IndexedBlock::Paragraph(id) => self
                    .paragraph(*id)
                    .map(|paragraph| PageBlock::Paragraph(*id, paragraph.clone())),
            })
            .collect();
        Some(PageFragment { index, blocks })
    }
}
