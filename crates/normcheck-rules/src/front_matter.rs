//! Approval sheet (page 0) and title sheet (page 1).
//!
//! Both pages carry the document identifier at a fixed place, a
//! registration-and-storage table anchored to the page (outside the left
//! margin), and the year of approval on their last line.

use normcheck_kernel::identifier::{IdentifierForm, MatchMode};
use normcheck_kernel::model::{HorizontalAnchor, PageFragment};
use normcheck_kernel::profile::{FrontMatterProfile, StandardsProfile};
use normcheck_kernel::{CheckSession, DocumentModel, Paragraph, Table, Verdict, mm_to_points};
use regex::Regex;
use std::sync::OnceLock;

pub const APPROVAL_POSITION: &str = "Лист утверждения";
pub const TITLE_POSITION: &str = "Титульный лист";
pub const STANDARD: &str = "ГОСТ 19.104-78";
pub const REGISTRATION_STANDARD: &str = "ГОСТ.601-78";

pub const MSG_NO_APPROVAL_PAGE: &str = "В документе нет листа утверждения.";
pub const MSG_NO_TITLE_PAGE: &str = "В документе нет титульного листа.";
pub const MSG_NO_APPROVAL_CAPTION: &str = "Нет надписи \"Лист утверждения\" на первом листе.";
pub const MSG_IDENTIFIER_FORMAT: &str =
    "Идентификатор документа имеет неверный формат, отсутствует или находится в неположенном месте.";
pub const MSG_NO_SHEET_COUNT: &str = "Нет надписи о количестве листов на титульном листе.";
pub const MSG_WRONG_SHEET_COUNT: &str = "Некорректное число листов";
pub const MSG_APPROVAL_IDENTIFIER: &str =
    "Отсутствует или некорректен идентификатор листа утверждения";
pub const MSG_NO_APPROVAL_MARK: &str = "Отсутствует пометка об утверждении";
pub const MSG_YEAR_MARKER: &str =
    "Строка с указанием года издания (утверждения) не должна содержать 'г' или 'год'.";
pub const MSG_NO_YEAR: &str =
    "Внизу листа утверждения или титульного листа не содержится указание года издания (утверждения).";
pub const MSG_NO_REGISTRATION_TABLE: &str =
    "Нет таблицы регистрации и хранения или она расположена внутри отступов страницы.";
pub const MSG_EXTRA_REGISTRATION_TABLE: &str =
    "На листе должна быть только одна таблица регистрации и хранения.";
pub const MSG_REGISTRATION_WIDTH: &str =
    "Таблица регистрации и хранения должна быть за левым полем документа полностью.";
pub const MSG_REGISTRATION_LABELS: &str =
    "В таблице регистрации и хранения отсутствуют необходимые надписи.";

pub fn registration_rows_message(rows: usize) -> String {
    format!("В таблице регистрации и хранения должно быть {rows} колонок.")
}

fn approval_caption_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*лист.+утверждения").expect("approval caption regex must compile"))
}

fn sheet_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*листов\s*\d+").expect("sheet count regex must compile"))
}

fn approval_mark_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*УТВЕРЖД[ЁЕ]Н").expect("approval mark regex must compile"))
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}").expect("year regex must compile"))
}

/// Index of the first paragraph whose lower-cased text matches `re`.
fn index_paragraph(paragraphs: &[&Paragraph], re: &Regex) -> Option<usize> {
    paragraphs
        .iter()
        .position(|paragraph| re.is_match(&paragraph.text.to_lowercase()))
}

pub fn check_approval_page(
    doc: &dyn DocumentModel,
    session: &mut CheckSession,
    profile: &StandardsProfile,
) -> Verdict {
    let mut verdict = Verdict::scoped(APPROVAL_POSITION, STANDARD);
    let Some(page) = doc.page(0) else {
        tracing::warn!("approval page is missing");
        verdict.add_message(MSG_NO_APPROVAL_PAGE);
        return verdict;
    };
    let paragraphs: Vec<&Paragraph> = page.paragraphs().collect();
    let approval = IdentifierForm::Full {
        qualifier: Some(profile.identifier.approval_qualifier.as_str()),
    };

    match index_paragraph(&paragraphs, approval_caption_re()) {
        None => verdict.add_message(MSG_NO_APPROVAL_CAPTION),
        Some(index) => {
            if let Some(next) = paragraphs.get(index + 1) {
                if session
                    .identifiers
                    .matches(&next.text, approval, MatchMode::Exact)
                {
                    verdict += session.identifiers.similarity_verdict(&next.text);
                } else {
                    verdict.add_message(MSG_IDENTIFIER_FORMAT);
                }
            }
        }
    }

    verdict += check_bottom_year(last_text(&paragraphs));
    verdict += check_registration(&page, &profile.front_matter);
    verdict
}

pub fn check_title_page(
    doc: &dyn DocumentModel,
    session: &mut CheckSession,
    profile: &StandardsProfile,
) -> Verdict {
    let mut verdict = Verdict::scoped(TITLE_POSITION, STANDARD);
    let Some(page) = doc.page(1) else {
        tracing::warn!("title page is missing");
        verdict.add_message(MSG_NO_TITLE_PAGE);
        return verdict;
    };
    let paragraphs: Vec<&Paragraph> = page.paragraphs().collect();

    match index_paragraph(&paragraphs, sheet_count_re()) {
        None => verdict.add_message(MSG_NO_SHEET_COUNT),
        Some(index) => {
            let declared = paragraphs[index]
                .text
                .split_whitespace()
                .nth(1)
                .and_then(|token| token.parse::<usize>().ok());
            let expected = doc.page_count().saturating_sub(1);
            if declared != Some(expected) {
                tracing::debug!(?declared, expected, "declared sheet count differs");
                verdict.add_message(MSG_WRONG_SHEET_COUNT);
            }

            if let Some(previous) = index.checked_sub(1).and_then(|i| paragraphs.get(i)) {
                let plain = IdentifierForm::Full { qualifier: None };
                if session
                    .identifiers
                    .matches(&previous.text, plain, MatchMode::Exact)
                {
                    verdict += session.identifiers.similarity_verdict(&previous.text);
                } else {
                    verdict.add_message(MSG_IDENTIFIER_FORMAT);
                }
            }
        }
    }

    verdict += check_registration(&page, &profile.front_matter);

    let first = paragraphs.first().map(|p| p.text.as_str()).unwrap_or_default();
    if approval_mark_re().is_match(first) {
        if let Some(next) = paragraphs.get(1) {
            let approval = IdentifierForm::Full {
                qualifier: Some(profile.identifier.approval_qualifier.as_str()),
            };
            if session
                .identifiers
                .matches(&next.text, approval, MatchMode::Exact)
            {
                verdict += session.identifiers.similarity_verdict(&next.text);
            } else {
                verdict.add_message(MSG_APPROVAL_IDENTIFIER);
            }
        }
    } else {
        verdict.add_message(MSG_NO_APPROVAL_MARK);
    }

    verdict += check_bottom_year(last_text(&paragraphs));
    verdict
}

fn last_text<'a>(paragraphs: &[&'a Paragraph]) -> &'a str {
    paragraphs.last().map(|p| p.text.as_str()).unwrap_or_default()
}

/// The year line must hold a four-digit year and no "г"/"год" marker.
pub fn check_bottom_year(text: &str) -> Verdict {
    let mut verdict = Verdict::new().with_standard(REGISTRATION_STANDARD);
    let text = text.trim();
    if year_re().is_match(text) {
        if text.to_lowercase().contains('г') {
            verdict.add_message(MSG_YEAR_MARKER);
        }
    } else {
        verdict.add_message(MSG_NO_YEAR);
    }
    verdict
}

fn check_registration(page: &PageFragment, profile: &FrontMatterProfile) -> Verdict {
    let anchored: Vec<&Table> = page
        .tables()
        .filter(|table| table.horizontal_anchor == HorizontalAnchor::Page)
        .collect();

    let mut verdict = Verdict::new().with_standard(REGISTRATION_STANDARD);
    match anchored.as_slice() {
        [] => verdict.add_message(MSG_NO_REGISTRATION_TABLE),
        [table, rest @ ..] => {
            if !rest.is_empty() {
                verdict.add_message(MSG_EXTRA_REGISTRATION_TABLE);
            }
            verdict += check_registration_table(table, profile);
        }
    }
    verdict
}

/// Shape of a registration-and-storage table: row count, extent within
/// the left margin, and the labels of its first column.
pub fn check_registration_table(table: &Table, profile: &FrontMatterProfile) -> Verdict {
    let mut verdict = Verdict::new().with_standard(REGISTRATION_STANDARD);
    if table.rows.len() != profile.registration_rows {
        verdict.add_message(registration_rows_message(profile.registration_rows));
        return verdict;
    }

    if table.horizontal_extent() > mm_to_points(profile.registration_max_width_mm) {
        verdict.add_message(MSG_REGISTRATION_WIDTH);
    }

    let labels = table.first_column_text().to_lowercase();
    if !profile
        .registration_labels
        .iter()
        .all(|label| labels.contains(label.as_str()))
    {
        verdict.add_message(MSG_REGISTRATION_LABELS);
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use normcheck_kernel::SnapshotDocument;
    use normcheck_kernel::model::{Cell, Row};
    use serde_json::{Value, json};

    const ID: &str = "AB.123.45.67-89 ТЗ 01-1";
    const ID_LU: &str = "AB.123.45.67-89 ТЗ 01-1-ЛУ";

    fn para(text: &str) -> Value {
        json!({ "paragraph": { "text": text } })
    }

    fn registration() -> Value {
        json!({ "table": {
            "horizontalAnchor": "page",
            "horizontalOffset": 10.0,
            "rows": [
                { "cells": [{ "width": 20.0, "text": "Инв. № подл." }, { "width": 20.0, "text": "" }] },
                { "cells": [{ "width": 20.0, "text": "Подп. и дата" }] },
                { "cells": [{ "width": 20.0, "text": "Взам. инв. №" }] },
                { "cells": [{ "width": 20.0, "text": "Инв. № дубл." }] },
                { "cells": [{ "width": 20.0, "text": "Подп. и дата" }] }
            ]
        }})
    }

    fn document(approval: Vec<Value>, title: Vec<Value>) -> SnapshotDocument {
        SnapshotDocument::from_value(json!({
            "sections": [{
                "pageSetup": { "leftMargin": 56.7, "rightMargin": 28.35, "topMargin": 70.87, "bottomMargin": 42.52 },
                "pages": 3
            }],
            "pages": [
                { "blocks": approval },
                { "blocks": title },
                { "blocks": [para("Текст")] }
            ]
        }))
        .expect("front matter fixture should index")
    }

    fn good_approval() -> Vec<Value> {
        vec![
            para("УТВЕРЖДЕН"),
            para("ЛИСТ УТВЕРЖДЕНИЯ"),
            para(ID_LU),
            registration(),
            para("2024"),
        ]
    }

    fn good_title() -> Vec<Value> {
        vec![
            para("УТВЕРЖДЕН"),
            para(ID_LU),
            para(ID),
            para("Листов 2"),
            registration(),
            para("2024"),
        ]
    }

    fn session() -> CheckSession {
        CheckSession::new(&StandardsProfile::default()).unwrap()
    }

    #[test]
    fn conformant_front_matter_passes() {
        let doc = document(good_approval(), good_title());
        let profile = StandardsProfile::default();
        let mut session = session();
        let approval = check_approval_page(&doc, &mut session, &profile);
        assert!(approval.ok, "{:?}", approval.messages);
        let title = check_title_page(&doc, &mut session, &profile);
        assert!(title.ok, "{:?}", title.messages);
        assert_eq!(session.identifiers.canonical(), Some("AB.123.45.67-89"));
    }

    #[test]
    fn missing_caption_is_reported() {
        let doc = document(vec![para(ID_LU), registration(), para("2024")], good_title());
        let verdict =
            check_approval_page(&doc, &mut session(), &StandardsProfile::default());
        assert_eq!(verdict.message_texts(), vec![MSG_NO_APPROVAL_CAPTION]);
        assert_eq!(verdict.messages[0].position, APPROVAL_POSITION);
    }

    #[test]
    fn unqualified_identifier_on_approval_page_is_a_format_error() {
        let mut approval = good_approval();
        approval[2] = para(ID);
        let doc = document(approval, good_title());
        let verdict =
            check_approval_page(&doc, &mut session(), &StandardsProfile::default());
        assert_eq!(verdict.message_texts(), vec![MSG_IDENTIFIER_FORMAT]);
    }

    #[test]
    fn diverging_identifier_on_title_page_is_reported() {
        let mut title = good_title();
        title[2] = para("CD.123.45.67-89 ТЗ 01-1");
        let doc = document(good_approval(), title);
        let profile = StandardsProfile::default();
        let mut session = session();
        check_approval_page(&doc, &mut session, &profile);
        let verdict = check_title_page(&doc, &mut session, &profile);
        assert!(verdict.has_message(normcheck_kernel::identifier::MSG_IDENTIFIER_MISMATCH));
        assert_eq!(session.identifiers.canonical(), Some("AB.123.45.67-89"));
    }

    #[test]
    fn wrong_sheet_count_is_reported() {
        let mut title = good_title();
        title[3] = para("Листов 7");
        let doc = document(good_approval(), title);
        let verdict = check_title_page(&doc, &mut session(), &StandardsProfile::default());
        assert_eq!(verdict.message_texts(), vec![MSG_WRONG_SHEET_COUNT]);
    }

    #[test]
    fn missing_approval_mark_is_reported() {
        let mut title = good_title();
        title[0] = para("Согласовано");
        let doc = document(good_approval(), title);
        let verdict = check_title_page(&doc, &mut session(), &StandardsProfile::default());
        assert_eq!(verdict.message_texts(), vec![MSG_NO_APPROVAL_MARK]);
    }

    #[test]
    fn year_rules() {
        assert!(check_bottom_year("2024").ok);
        assert!(check_bottom_year("  2024\r").ok);
        assert_eq!(check_bottom_year("2024 г.").message_texts(), vec![MSG_YEAR_MARKER]);
        assert_eq!(check_bottom_year("2024 год").message_texts(), vec![MSG_YEAR_MARKER]);
        assert_eq!(check_bottom_year("Москва").message_texts(), vec![MSG_NO_YEAR]);
        assert_eq!(check_bottom_year("").messages[0].standard, REGISTRATION_STANDARD);
    }

    #[test]
    fn table_inside_margins_is_not_a_registration_table() {
        let mut approval = good_approval();
        approval[3] = json!({ "table": { "rows": [] } });
        let doc = document(approval, good_title());
        let verdict =
            check_approval_page(&doc, &mut session(), &StandardsProfile::default());
        assert_eq!(verdict.message_texts(), vec![MSG_NO_REGISTRATION_TABLE]);
    }

    #[test]
    fn second_anchored_table_is_reported() {
        let mut approval = good_approval();
        approval.insert(4, registration());
        let doc = document(approval, good_title());
        let verdict =
            check_approval_page(&doc, &mut session(), &StandardsProfile::default());
        assert_eq!(verdict.message_texts(), vec![MSG_EXTRA_REGISTRATION_TABLE]);
    }

    fn table(rows: usize, width: f64, label: &str) -> Table {
        Table {
            rows: (0..rows)
                .map(|_| Row {
                    cells: vec![Cell { width, text: label.to_string() }],
                })
                .collect(),
            horizontal_anchor: HorizontalAnchor::Page,
            horizontal_offset: 0.0,
        }
    }

    #[test]
    fn registration_table_shape() {
        let profile = FrontMatterProfile::default();
        assert!(check_registration_table(&table(5, 40.0, "Инв. Подп. и дата"), &profile).ok);
        assert_eq!(
            check_registration_table(&table(4, 40.0, "Инв. Подп. и дата"), &profile)
                .message_texts(),
            vec!["В таблице регистрации и хранения должно быть 5 колонок."]
        );
        assert_eq!(
            check_registration_table(&table(5, 80.0, "Инв. Подп. и дата"), &profile)
                .message_texts(),
            vec![MSG_REGISTRATION_WIDTH]
        );
        assert_eq!(
            check_registration_table(&table(5, 40.0, "Инв."), &profile).message_texts(),
            vec![MSG_REGISTRATION_LABELS]
        );
    }

    #[test]
    fn registration_rows_message_follows_profile() {
        let profile = FrontMatterProfile {
            registration_rows: 4,
            ..FrontMatterProfile::default()
        };
        assert!(check_registration_table(&table(4, 40.0, "Инв. Подп. и дата"), &profile).ok);
        assert_eq!(
            check_registration_table(&table(5, 40.0, "Инв. Подп. и дата"), &profile)
                .message_texts(),
            vec!["В таблице регистрации и хранения должно быть 4 колонок."]
        );
    }
}
