//! Running headers and footers.
//!
//! Sections are walked in order, once per zone. Each section gets a
//! [`ZoneState`]: computed from its own header/footer stories when it
//! declares any, inherited from its predecessor when it declares none.
//! The states are then judged against the page range each section covers:
//! front matter must carry nothing, the main body must carry the zone
//! with a correct identifier (and, for headers, a page number), and the
//! closing change-registration sheet needs no footer table.

use normcheck_kernel::identifier::{IdentifierForm, MatchMode};
use normcheck_kernel::profile::RunningProfile;
use normcheck_kernel::{
    CheckSession, DocumentModel, PageSpan, Table, Verdict, Zone, ZoneContent, ZoneVariant,
};
use regex::Regex;
use std::sync::OnceLock;

pub const POSITION: &str = "Весь документ";
pub const STANDARD: &str = "19.106-78";
pub const FOOTER_TABLE_STANDARD: &str = "ГОСТ 19.604-78";

pub const MSG_NO_PAGE_NUMBER: &str = "Нет номера страницы";
pub const MSG_BAD_IDENTIFIER: &str = "Некорректный идентификатор документа";
pub const MSG_REDUNDANT_FOOTER: &str =
    "Таблица в нижнем колонтитуле листа регистрации изменений избыточна";
pub const MSG_FOOTER_TABLES: &str =
    "Нижний колонтитул должен содержать только одну таблицу регистрации изменений.";
pub const MSG_FOOTER_ROWS: &str = "В таблице регистрации изменений недостаточно строк.";
pub const MSG_FOOTER_FIELDS: &str =
    "В таблице регистрации изменений не присутствуют все необходимые поля.";

fn document_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"№\s+док").expect("document number regex must compile"))
}

fn original_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"№\s+подл").expect("original number regex must compile"))
}

/// Computed header or footer state of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneState {
    /// Some story of the section has visible text.
    pub has_any: bool,
    /// Every non-blank story carries a page-number field.
    pub has_page_field: bool,
    /// Every non-blank story carries the document identifier.
    pub correct_identifier: bool,
    /// Some declared story of the section is blank.
    pub missing: bool,
}

impl ZoneState {
    /// State assumed before the first section.
    pub const NO_PREDECESSOR: ZoneState = ZoneState {
        has_any: false,
        has_page_field: false,
        correct_identifier: false,
        missing: true,
    };
}

struct ZoneWords {
    genitive: &'static str,
    nominative: &'static str,
    title: &'static str,
}

fn words(zone: Zone) -> ZoneWords {
    match zone {
        Zone::Header => ZoneWords {
            genitive: "верхнего",
            nominative: "верхний",
            title: "Верхний",
        },
        Zone::Footer => ZoneWords {
            genitive: "нижнего",
            nominative: "нижний",
            title: "Нижний",
        },
    }
}

/// Walk the sections and compute each one's state for `zone`.
///
/// The verdict collects findings from the stories themselves (identifier
/// mismatches, footer-table shape); judging the states is left to
/// [`check_zone`].
pub fn compute_zone_states(
    doc: &dyn DocumentModel,
    session: &mut CheckSession,
    zone: Zone,
    profile: &RunningProfile,
) -> (Verdict, Vec<ZoneState>) {
    let mut verdict = Verdict::scoped(POSITION, STANDARD);
    let mut states: Vec<ZoneState> = Vec::with_capacity(doc.section_count());

    for section in 0..doc.section_count() {
        let predecessor = states.last().copied();
        let mut variants = vec![ZoneVariant::Even, ZoneVariant::Primary];
        if doc.different_first_page(section) {
            variants.push(ZoneVariant::First);
        }
        let candidates: Vec<&ZoneContent> = variants
            .into_iter()
            .filter_map(|variant| doc.zone(section, zone, variant))
            .collect();

        if candidates.is_empty() {
            tracing::debug!(section, ?zone, "section declares no stories; inheriting state");
            states.push(predecessor.unwrap_or(ZoneState::NO_PREDECESSOR));
            continue;
        }

        let mut section_verdict = Verdict::scoped(
            format!("{} колонтитул раздела {}", words(zone).title, section + 1),
            STANDARD,
        );
        let mut state = ZoneState {
            has_any: false,
            has_page_field: true,
            correct_identifier: true,
            missing: false,
        };
        for content in candidates {
            if content.is_blank() {
                state.missing = true;
                continue;
            }
            state.has_any = true;

            let (has_page_field, correct_identifier) = if content.linked_to_previous {
                predecessor
                    .map(|prev| (prev.has_page_field, prev.correct_identifier))
                    .unwrap_or((false, false))
            } else {
                let (findings, correct) = match zone {
                    Zone::Header => header_identifier(session, &content.text),
                    Zone::Footer => footer_identifier(session, content, profile),
                };
                section_verdict += findings;
                (content.has_page_field(), correct)
            };
            state.has_page_field &= has_page_field;
            state.correct_identifier &= correct_identifier;
        }

        verdict += section_verdict;
        states.push(state);
    }

    (verdict, states)
}

/// A header must carry the full identifier; a missing one fails silently
/// and is reported by the zone walk.
fn header_identifier(session: &mut CheckSession, text: &str) -> (Verdict, bool) {
    let text = text.trim();
    let full = IdentifierForm::Full { qualifier: None };
    if session.identifiers.matches(text, full, MatchMode::Search) {
        let verdict = session.identifiers.similarity_verdict(text);
        let correct = verdict.ok;
        (verdict, correct)
    } else {
        (Verdict::failed(), false)
    }
}

/// Footer findings plus identifier correctness. Only the identifier
/// decides correctness; a footer without one is not marked incorrect.
fn footer_identifier(
    session: &mut CheckSession,
    content: &ZoneContent,
    profile: &RunningProfile,
) -> (Verdict, bool) {
    let mut verdict = check_footer_table(&content.tables, &content.text, &profile.footer_labels);
    let mut correct = true;
    if session
        .identifiers
        .matches(&content.text, IdentifierForm::Short, MatchMode::Search)
    {
        let similarity = session.identifiers.similarity_verdict(&content.text);
        correct = similarity.ok;
        verdict += similarity;
    }
    (verdict, correct)
}

/// Change-registration table in a footer: at most one table of at least
/// two rows, and every required label present.
pub fn check_footer_table(tables: &[Table], text: &str, labels: &[String]) -> Verdict {
    let mut verdict = Verdict::new().with_standard(FOOTER_TABLE_STANDARD);
    match tables {
        [] => {}
        [table] => {
            if table.rows.len() < 2 {
                verdict.add_message(MSG_FOOTER_ROWS);
            }
        }
        _ => verdict.add_message(MSG_FOOTER_TABLES),
    }

    let text = text.to_lowercase();
    let complete = labels.iter().all(|label| text.contains(label.as_str()))
        && document_number_re().is_match(&text)
        && original_number_re().is_match(&text);
    if !complete {
        verdict.add_message(MSG_FOOTER_FIELDS);
    }
    verdict
}

pub fn check_headers(
    doc: &dyn DocumentModel,
    session: &mut CheckSession,
    profile: &RunningProfile,
) -> Verdict {
    check_zone(doc, session, Zone::Header, profile)
}

pub fn check_footers(
    doc: &dyn DocumentModel,
    session: &mut CheckSession,
    profile: &RunningProfile,
) -> Verdict {
    check_zone(doc, session, Zone::Footer, profile)
}

/// Judge each section's state against the pages it covers.
pub fn check_zone(
    doc: &dyn DocumentModel,
    session: &mut CheckSession,
    zone: Zone,
    profile: &RunningProfile,
) -> Verdict {
    let (verdict, states) = compute_zone_states(doc, session, zone, profile);
    let last_page = doc.page_count().saturating_sub(1);
    let mut pages_before = 0usize;

    let findings: Vec<Verdict> = states
        .iter()
        .enumerate()
        .map(|(section, state)| {
            let placement = if pages_before < profile.front_matter_pages {
                Placement::FrontMatter
            } else if pages_before == last_page {
                Placement::LastPage
            } else {
                Placement::Body
            };
            pages_before += doc
                .section_pages(section)
                .map(|span: PageSpan| span.page_count())
                .unwrap_or_else(|| {
                    tracing::warn!(section, "section has no page span");
                    0
                });
            judge_section(zone, section, state, placement)
        })
        .collect();

    Verdict::fold(verdict, findings)
}

/// Where a section starts relative to the document's fixed pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    FrontMatter,
    LastPage,
    Body,
}

fn judge_section(zone: Zone, section: usize, state: &ZoneState, placement: Placement) -> Verdict {
    let words = words(zone);
    match placement {
        Placement::FrontMatter => {
            let mut finding = Verdict::scoped(POSITION, STANDARD);
            if state.has_any {
                finding.add_message(format!(
                    "На титульном листе и листе утверждения не должно быть {} колонтитула.",
                    words.genitive
                ));
            }
            finding
        }
        Placement::LastPage if zone == Zone::Footer => {
            let mut finding = Verdict::scoped(format!("Раздел {}", section + 1), STANDARD);
            if state.has_any {
                finding.add_message(MSG_REDUNDANT_FOOTER);
            }
            finding
        }
        _ if state.missing || !state.has_any => {
            let mut finding = Verdict::scoped(format!("Раздел {}", section + 1), STANDARD);
            finding.add_message(format!(
                "Пропущен {} колонтитул в основном тексте документа.",
                words.nominative
            ));
            finding
        }
        _ => {
            let mut finding = Verdict::scoped(
                format!("{} колонтитул раздела {}", words.title, section + 1),
                STANDARD,
            );
            if zone == Zone::Header && !state.has_page_field {
                finding.add_message(MSG_NO_PAGE_NUMBER);
            }
            if !state.correct_identifier {
                finding.add_message(MSG_BAD_IDENTIFIER);
            }
            finding
        }
    }
}
