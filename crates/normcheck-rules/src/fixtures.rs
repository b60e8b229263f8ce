//! Snapshot builders shared by the rule tests.

use normcheck_kernel::{SnapshotDocument, mm_to_points};
use serde_json::{Value, json};

pub const ID: &str = "AB.123.45.67-89 ТЗ 01-1";
pub const ID_LU: &str = "AB.123.45.67-89 ТЗ 01-1-ЛУ";

pub fn setup() -> Value {
    json!({
        "leftMargin": mm_to_points(20.0),
        "rightMargin": mm_to_points(10.0),
        "topMargin": mm_to_points(25.0),
        "bottomMargin": mm_to_points(15.0)
    })
}

pub fn para(text: &str) -> Value {
    json!({ "paragraph": { "text": text } })
}

/// A bold, bookmarked paragraph.
pub fn heading(text: &str, bookmark: &str, format: Value) -> Value {
    json!({ "paragraph": {
        "text": text,
        "bold": true,
        "bookmarks": [bookmark],
        "format": format
    }})
}

pub fn level_one(text: &str, bookmark: &str) -> Value {
    heading(text, bookmark, json!({ "alignment": "center", "spaceAfter": 36.0 }))
}

pub fn toc_marker(text: &str) -> Value {
    json!({ "paragraph": { "text": text, "fields": [{ "kind": "toc" }] } })
}

pub fn toc_line(text: &str, bookmark: &str) -> Value {
    json!({ "paragraph": {
        "text": text,
        "fields": [{ "kind": "hyperlink", "subAddress": bookmark }]
    }})
}

pub fn single_section(pages: Vec<Vec<Value>>) -> SnapshotDocument {
    let count = pages.len();
    let pages: Vec<Value> = pages
        .into_iter()
        .map(|blocks| json!({ "blocks": blocks }))
        .collect();
    SnapshotDocument::from_value(json!({
        "sections": [{ "pageSetup": setup(), "pages": count }],
        "pages": pages
    }))
    .expect("fixture document should index")
}

pub const GOOD_LINES: [(&str, &str); 5] = [
    ("Аннотация 2", "_Toc1"),
    ("1. Обзор  5", "_Toc2"),
    ("1.1. Детали  6", "_Toc3"),
    ("2. Итог  9", "_Toc4"),
    ("Лист регистрации изменений 10", "_Toc5"),
];

pub fn overview() -> Value {
    level_one("ОБЗОР", "_Toc2")
}

pub fn details() -> Value {
    heading("Детали", "_Toc3", json!({ "firstLineIndent": 35.0, "spaceAfter": 36.0 }))
}

/// Eleven pages: front matter, abstract (2), contents (3), body headings
/// on pages 5, 6 and 9, and the change-registration sheet (10).
pub fn contents_document(lines: &[(&str, &str)]) -> SnapshotDocument {
    body_document(lines, vec![overview()], vec![details(), para("Текст подраздела.")])
}

/// [`contents_document`] with pages 5 and 6 replaced.
pub fn body_document(
    lines: &[(&str, &str)],
    page_five: Vec<Value>,
    page_six: Vec<Value>,
) -> SnapshotDocument {
    let mut contents = vec![toc_marker("СОДЕРЖАНИЕ")];
    contents.extend(lines.iter().map(|(text, bookmark)| toc_line(text, bookmark)));

    single_section(vec![
        vec![para("ЛИСТ УТВЕРЖДЕНИЯ")],
        vec![para("Титульный лист")],
        vec![level_one("АННОТАЦИЯ", "_Toc1"), para("Краткое описание.")],
        contents,
        vec![para("Вводный текст.")],
        page_five,
        page_six,
        vec![para("Продолжение.")],
        vec![para("Продолжение.")],
        vec![level_one("ИТОГ", "_Toc4"), para("Заключение.")],
        vec![level_one("ЛИСТ РЕГИСТРАЦИИ ИЗМЕНЕНИЙ", "_Toc5")],
    ])
}
