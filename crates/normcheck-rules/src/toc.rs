//! Table-of-contents reconciliation.
//!
//! The contents of a document is a run of hyperlink fields pointing at
//! heading bookmarks. Each enclosing paragraph reads like
//! `1.2. Name<tab>7`: an optional dotted number, the heading name and
//! the printed page. The reconciler rebuilds the heading hierarchy from
//! these lines, cross-checks every line against the heading it points at
//! and validates numbering order and the placement of unnumbered
//! entries.
//!
//! Every finding is collected. The model is published only when the
//! whole contents is consistent: each line parsed and resolved, no
//! duplicate names or numbers, numbers in ascending order and no
//! numbering deeper than four levels. Downstream heading checks rely on
//! that guarantee.

use normcheck_kernel::error::HeadingNumberError;
use normcheck_kernel::profile::TocProfile;
use normcheck_kernel::{
    BookmarkResolution, CheckSession, DocumentModel, FieldKind, HeadingNumber, HeadingTarget,
    ParagraphId, TocIndex, TocModel, Verdict,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub const POSITION: &str = "Содержание";
pub const STANDARD: &str = "ГОСТ 19.106-78";

pub const MSG_NO_TOC: &str = "В документе нет содержания";
pub const MSG_NUMBER_DOT: &str = "Номера пунктов должны оканчиваться точкой";
pub const MSG_TOO_DEEP: &str = "Минимальная единица документа - подпункт с номером вида x.x.x.x. \
Более мелкие единицы относятся к перечислениям и в содержании не указываются";
pub const MSG_ORDER: &str = "Нарушен порядок нумерации в содержании и тексте документа";
pub const MSG_TOC_PLACEMENT: &str =
    "Содержание должно находиться перед основным текстом на отдельной странице.";
pub const MSG_ABSTRACT_NUMBERED: &str = "Аннотация не нумеруется";
pub const MSG_ABSTRACT_PLACEMENT: &str = "Аннотация должна быть перед содержанием";
pub const MSG_SELF_LISTED: &str = "Содержание не указывается в содержании и не нумеруется.";
pub const MSG_CHANGE_LOG: &str = "Лист регистрации изменений не нумеруется";

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^((\d+(\.\d+)*\.?\s+)|^)(.*?)\s+(\d+)$").expect("contents line regex must compile")
    })
}

/// One contents line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocLine<'a> {
    /// Dotted numbering group as written, e.g. `1.2.`.
    pub number: Option<&'a str>,
    pub name: &'a str,
    pub page: usize,
}

/// Split a trimmed contents line. Returns `None` when the line has no
/// trailing page number.
pub fn parse_toc_line(text: &str) -> Option<TocLine<'_>> {
    let caps = line_re().captures(text)?;
    let page = caps.get(5)?.as_str().parse().ok()?;
    Some(TocLine {
        number: caps.get(2).map(|m| m.as_str().trim()),
        name: caps.get(4).map(|m| m.as_str()).unwrap_or_default(),
        page,
    })
}

/// Run the reconciler and publish its model into the session.
pub fn check_table_of_contents(
    doc: &dyn DocumentModel,
    session: &mut CheckSession,
    profile: &TocProfile,
) -> Verdict {
    let (verdict, model) = reconcile(doc, profile);
    if let Some(index) = model.published() {
        tracing::debug!(
            numbered = index.sorted_numbers.len(),
            unnumbered = index.unnumbered.len(),
            "contents model published"
        );
    }
    session.publish_toc(model);
    verdict
}

/// Rebuild and validate the contents model without touching any session.
pub fn reconcile(doc: &dyn DocumentModel, profile: &TocProfile) -> (Verdict, TocModel) {
    let mut builder = TocBuilder::new(doc, profile);
    let mut toc_marker: Option<ParagraphId> = None;

    for field in doc.fields() {
        match &field.kind {
            FieldKind::Toc => {
                toc_marker.get_or_insert(field.paragraph);
            }
            FieldKind::Hyperlink {
                sub_address: Some(target),
            } if target.starts_with(profile.bookmark_prefix.as_str()) => {
                if let Err(Abort) = builder.ingest(field.paragraph, target) {
                    return (builder.verdict, TocModel::Unpublished);
                }
            }
            _ => {}
        }
    }

    let Some(marker) = toc_marker.filter(|_| builder.entries > 0) else {
        builder.verdict.add_message(MSG_NO_TOC);
        return (builder.verdict, TocModel::Unpublished);
    };
    builder.finish(marker)
}

/// Fatal structural error: stop reconciling.
struct Abort;

struct TocBuilder<'a> {
    doc: &'a dyn DocumentModel,
    profile: &'a TocProfile,
    verdict: Verdict,
    index: TocIndex,
    collected: Vec<HeadingNumber>,
    seen_names: BTreeSet<String>,
    numbering_started: bool,
    consistent: bool,
    entries: usize,
}

impl<'a> TocBuilder<'a> {
    fn new(doc: &'a dyn DocumentModel, profile: &'a TocProfile) -> Self {
        Self {
            doc,
            profile,
            verdict: Verdict::scoped(POSITION, STANDARD),
            index: TocIndex::default(),
            collected: Vec::new(),
            seen_names: BTreeSet::new(),
            numbering_started: false,
            consistent: true,
            entries: 0,
        }
    }

    fn ingest(&mut self, paragraph: ParagraphId, bookmark: &str) -> Result<(), Abort> {
        self.entries += 1;
        let text = self
            .doc
            .paragraph(paragraph)
            .map(|p| p.trimmed_text().to_string())
            .unwrap_or_default();

        let Some(line) = parse_toc_line(&text) else {
            self.verdict.add_message(format!(
                "Строка содержания \"{text}\" не соответствует формату \"номер название страница\""
            ));
            self.consistent = false;
            return Ok(());
        };

        let cleared = line.name.trim().to_lowercase();
        if !self.seen_names.insert(cleared.clone()) {
            self.verdict
                .add_message(format!("Пункт {} повторяется в содержании", line.name));
            self.consistent = false;
            return Ok(());
        }
        self.index.name_to_page.insert(cleared.clone(), line.page);

        match line.number {
            Some(group) => self.ingest_number(group, &cleared)?,
            None => self.ingest_unnumbered(line.name, &cleared),
        }

        self.index
            .name_to_bookmark
            .insert(cleared.clone(), bookmark.to_string());
        self.resolve(&line, &cleared, bookmark);
        Ok(())
    }

    fn ingest_number(&mut self, group: &str, cleared: &str) -> Result<(), Abort> {
        self.numbering_started = true;
        if !group.ends_with('.') {
            self.verdict.add_message(MSG_NUMBER_DOT);
        }

        let number = match HeadingNumber::parse(group) {
            Ok(number) => number,
            Err(HeadingNumberError::TooDeep { depth }) => {
                tracing::debug!(depth, group, "contents numbering too deep");
                self.verdict.add_message(MSG_TOO_DEEP);
                return Err(Abort);
            }
            Err(err) => {
                self.verdict
                    .add_message(format!("Некорректный номер пункта {group}: {err}"));
                self.consistent = false;
                return Ok(());
            }
        };

        if self.index.numbers_to_names.contains_key(&number) {
            self.verdict
                .add_message(format!("Номер пункта {number} повторяется в содержании"));
            self.consistent = false;
            return Ok(());
        }
        self.collected.push(number);
        self.index
            .names_to_numbers
            .insert(cleared.to_string(), number);
        self.index
            .numbers_to_names
            .insert(number, cleared.to_string());
        Ok(())
    }

    fn ingest_unnumbered(&mut self, name: &str, cleared: &str) {
        self.index.unnumbered.insert(cleared.to_string());
        let profile = self.profile;
        if self.numbering_started {
            let allowed = profile.allowed_after.iter().any(|label| label == cleared)
                || cleared.contains(profile.appendix_marker.as_str());
            if !allowed {
                self.verdict.add_message(format!(
                    "Пункт {name} должен быть пронумерован или находиться перед содержанием документа"
                ));
            }
        } else if !profile.allowed_before.iter().any(|label| label == cleared) {
            self.verdict.add_message(format!(
                "Пункт {name} должен быть пронумерован или находиться в конце документа"
            ));
        }
    }

    /// Find the heading a line points at: through its bookmark, or, when
    /// the bookmark is broken, by the name on the declared page.
    fn resolve(&mut self, line: &TocLine<'_>, cleared: &str, bookmark: &str) {
        let resolved = match self.doc.resolve_bookmark(bookmark) {
            BookmarkResolution::Found(id) => self
                .doc
                .paragraph(id)
                .map(|p| p.trimmed_text())
                .filter(|text| text.to_lowercase() == cleared)
                .map(|text| (HeadingTarget::Paragraph(id), text.to_string())),
            BookmarkResolution::NotFound => {
                tracing::debug!(
                    bookmark,
                    page = line.page,
                    "bookmark unresolved; looking for heading on declared page"
                );
                self.doc
                    .page_text(line.page)
                    .filter(|text| text.to_lowercase().contains(cleared))
                    .map(|_| (HeadingTarget::PageText, line.name.trim().to_string()))
            }
        };

        match resolved {
            Some((target, real_name)) => {
                self.index
                    .name_to_target
                    .insert(cleared.to_string(), target);
                self.index
                    .name_to_real_name
                    .insert(cleared.to_string(), real_name);
            }
            None => {
                self.verdict.add_message(format!(
                    "Заголовок содержания \"{}\" не совпадает с заголовком в тексте",
                    line.name
                ));
                self.consistent = false;
            }
        }
    }

    fn finish(mut self, marker: ParagraphId) -> (Verdict, TocModel) {
        let profile = self.profile;
        let toc_page = self.doc.paragraph_page(marker).unwrap_or_else(|| {
            tracing::warn!(?marker, "contents marker has no page; assuming page 0");
            0
        });
        self.index.toc_page = toc_page;

        let heading_present = self
            .doc
            .page_text(toc_page)
            .is_some_and(|text| text.contains(profile.heading.as_str()));
        if !heading_present {
            self.verdict.add_message(format!(
                "Страница содержания должна содержать заголовок '{}'",
                profile.heading
            ));
        }

        let mut sorted = self.collected.clone();
        sorted.sort();
        if sorted != self.collected {
            self.verdict.add_message(MSG_ORDER);
            self.consistent = false;
        }
        let first_page = sorted
            .first()
            .and_then(|number| self.index.numbers_to_names.get(number))
            .and_then(|name| self.index.name_to_page.get(name));
        if first_page.is_some_and(|page| *page <= toc_page) {
            self.verdict.add_message(MSG_TOC_PLACEMENT);
        }
        self.index.sorted_numbers = sorted;

        let unnumbered = &self.index.unnumbered;
        if unnumbered.contains(&profile.abstract_label) {
            let abstract_page = self.index.name_to_page.get(&profile.abstract_label);
            if abstract_page.is_some_and(|page| *page > toc_page) {
                self.verdict.add_message(MSG_ABSTRACT_PLACEMENT);
            }
        } else {
            self.verdict.add_message(MSG_ABSTRACT_NUMBERED);
        }
        if unnumbered.contains(&profile.self_label) {
            self.verdict.add_message(MSG_SELF_LISTED);
        }
        if !unnumbered.contains(&profile.change_log_label) {
            self.verdict.add_message(MSG_CHANGE_LOG);
        }

        let model = if self.consistent {
            TocModel::Published(self.index)
        } else {
            tracing::debug!("contents inconsistent; model not published");
            TocModel::Unpublished
        };
        (self.verdict, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{GOOD_LINES, contents_document, para, single_section, toc_line};
    use normcheck_kernel::StandardsProfile;

    fn run(lines: &[(&str, &str)]) -> (Verdict, TocModel) {
        reconcile(&contents_document(lines), &TocProfile::default())
    }

    #[test]
    fn parses_numbered_and_unnumbered_lines() {
        assert_eq!(
            parse_toc_line("1.2. Детали\t6"),
            Some(TocLine { number: Some("1.2."), name: "Детали", page: 6 })
        );
        assert_eq!(
            parse_toc_line("Аннотация 2"),
            Some(TocLine { number: None, name: "Аннотация", page: 2 })
        );
        assert_eq!(
            parse_toc_line("3 Итог 9"),
            Some(TocLine { number: Some("3"), name: "Итог", page: 9 })
        );
        assert_eq!(parse_toc_line("Без страницы"), None);
    }

    #[test]
    fn consistent_contents_is_published() {
        let (verdict, model) = run(&GOOD_LINES);
        assert!(verdict.ok, "{:?}", verdict.messages);
        let index = model.published().expect("model should be published");
        assert_eq!(
            index.numbers_to_names.get(&HeadingNumber::new([1, 0, 0, 0])),
            Some(&"обзор".to_string())
        );
        assert_eq!(
            index.sorted_numbers,
            vec![
                HeadingNumber::new([1, 0, 0, 0]),
                HeadingNumber::new([1, 1, 0, 0]),
                HeadingNumber::new([2, 0, 0, 0]),
            ]
        );
        assert_eq!(index.toc_page, 3);
        assert_eq!(index.name_to_real_name.get("обзор"), Some(&"ОБЗОР".to_string()));
        assert_eq!(index.name_to_bookmark.get("итог"), Some(&"_Toc4".to_string()));
        assert!(index.unnumbered.contains("аннотация"));
    }

    #[test]
    fn out_of_order_numbers_block_publication() {
        let (verdict, model) = run(&[
            ("Аннотация 2", "_Toc1"),
            ("2. Итог  9", "_Toc4"),
            ("1. Обзор  5", "_Toc2"),
            ("Лист регистрации изменений 10", "_Toc5"),
        ]);
        assert!(!verdict.ok);
        assert!(verdict.has_message(MSG_ORDER));
        assert_eq!(model, TocModel::Unpublished);
    }

    #[test]
    fn missing_trailing_dot_is_reported_but_published() {
        let mut lines = GOOD_LINES;
        lines[3] = ("2 Итог  9", "_Toc4");
        let (verdict, model) = run(&lines);
        assert_eq!(verdict.message_texts(), vec![MSG_NUMBER_DOT]);
        assert!(model.is_published());
    }

    #[test]
    fn five_level_numbering_aborts() {
        let mut lines = GOOD_LINES.to_vec();
        lines.insert(3, ("1.1.1.1.1. Мелочь  6", "_Toc3"));
        let (verdict, model) = run(&lines);
        assert!(verdict.has_message(MSG_TOO_DEEP));
        assert_eq!(model, TocModel::Unpublished);
    }

    #[test]
    fn mismatched_heading_text_is_reported() {
        let mut lines = GOOD_LINES;
        lines[3] = ("2. Выводы  9", "_Toc4");
        let (verdict, model) = run(&lines);
        insta::assert_snapshot!(
            verdict.message_texts().join("\n"),
            @r#"Заголовок содержания "Выводы" не совпадает с заголовком в тексте"#
        );
        assert_eq!(model, TocModel::Unpublished);
    }

    #[test]
    fn broken_bookmark_falls_back_to_page_text() {
        let mut lines = GOOD_LINES;
        lines[3] = ("2. Итог  9", "_TocMissing");
        let (verdict, model) = run(&lines);
        assert!(verdict.ok, "{:?}", verdict.messages);
        let index = model.published().unwrap();
        assert_eq!(index.name_to_target.get("итог"), Some(&HeadingTarget::PageText));
        assert_eq!(index.name_to_real_name.get("итог"), Some(&"Итог".to_string()));
    }

    #[test]
    fn broken_bookmark_with_wrong_page_fails() {
        let mut lines = GOOD_LINES;
        lines[3] = ("2. Итог  8", "_TocMissing");
        let (verdict, model) = run(&lines);
        assert!(!verdict.ok);
        assert!(!model.is_published());
    }

    #[test]
    fn misplaced_unnumbered_entries_are_named() {
        let (verdict, _) = run(&[
            ("Введение 4", "_TocX"),
            ("1. Обзор  5", "_Toc2"),
            ("Выводы 9", "_TocY"),
        ]);
        let texts = verdict.message_texts();
        assert!(texts.contains(&"Пункт Введение должен быть пронумерован или находиться в конце документа"));
        assert!(texts.contains(
            &"Пункт Выводы должен быть пронумерован или находиться перед содержанием документа"
        ));
        assert!(texts.contains(&MSG_ABSTRACT_NUMBERED));
        assert!(texts.contains(&MSG_CHANGE_LOG));
    }

    #[test]
    fn appendix_after_numbering_is_allowed() {
        let mut lines = GOOD_LINES.to_vec();
        lines.insert(4, ("Приложение 1 Итог 9", "_Toc4b"));
        let (verdict, _) = run(&lines);
        assert!(
            !verdict
                .message_texts()
                .iter()
                .any(|text| text.starts_with("Пункт Приложение"))
        );
    }

    #[test]
    fn unparsable_line_blocks_publication() {
        let mut lines = GOOD_LINES;
        lines[1] = ("1. Обзор", "_Toc2");
        let (verdict, model) = run(&lines);
        assert_eq!(
            verdict.message_texts(),
            vec![r#"Строка содержания "1. Обзор" не соответствует формату "номер название страница""#]
        );
        assert!(!model.is_published());
    }

    #[test]
    fn abstract_after_contents_is_reported() {
        let mut lines = GOOD_LINES;
        lines[0] = ("Аннотация 4", "_Toc1");
        let (verdict, model) = run(&lines);
        assert_eq!(verdict.message_texts(), vec![MSG_ABSTRACT_PLACEMENT]);
        assert!(model.is_published());
    }

    #[test]
    fn duplicate_numbers_block_publication() {
        let mut lines = GOOD_LINES.to_vec();
        lines.insert(4, ("2. Заключение  9", "_Toc6"));
        let (verdict, model) = run(&lines);
        assert_eq!(
            verdict.message_texts(),
            vec!["Номер пункта 2. повторяется в содержании"]
        );
        assert!(!model.is_published());
    }

    #[test]
    fn duplicate_names_block_publication() {
        let mut lines = GOOD_LINES.to_vec();
        lines.insert(4, ("3. Итог  9", "_Toc4"));
        let (verdict, model) = run(&lines);
        assert!(verdict.has_message("Пункт Итог повторяется в содержании"));
        assert!(!model.is_published());
    }

    #[test]
    fn listing_the_contents_itself_is_reported() {
        let mut lines = GOOD_LINES.to_vec();
        lines.insert(1, ("Содержание 3", "_TocSelf"));
        let (verdict, _) = run(&lines);
        assert!(verdict.has_message(MSG_SELF_LISTED));
    }

    #[test]
    fn numbered_entry_on_contents_page_is_reported() {
        let mut lines = GOOD_LINES;
        lines[1] = ("1. Обзор  3", "_TocMissing");
        let (verdict, _) = run(&lines);
        assert!(verdict.has_message(MSG_TOC_PLACEMENT));
    }

    #[test]
    fn document_without_contents() {
        let doc = single_section(vec![vec![para("Текст")], vec![para("Ещё")]]);
        let mut session = CheckSession::new(&StandardsProfile::default()).unwrap();
        let verdict = check_table_of_contents(&doc, &mut session, &TocProfile::default());
        assert_eq!(verdict.message_texts(), vec![MSG_NO_TOC]);
        assert_eq!(verdict.messages[0].position, POSITION);
        assert!(!session.toc().is_published());
    }

    #[test]
    fn hyperlinks_without_marker_are_not_a_contents() {
        let doc = single_section(vec![vec![toc_line("1. Обзор 1", "_Toc1")], vec![para("ОБЗОР")]]);
        let (verdict, model) = reconcile(&doc, &TocProfile::default());
        assert!(verdict.has_message(MSG_NO_TOC));
        assert!(!model.is_published());
    }

    #[test]
    fn missing_contents_heading_is_reported() {
        let doc = single_section(vec![
            vec![crate::fixtures::toc_marker("Оглавление"), toc_line("Аннотация 1", "_Toc1")],
            vec![crate::fixtures::level_one("АННОТАЦИЯ", "_Toc1")],
        ]);
        let (verdict, _) = reconcile(&doc, &TocProfile::default());
        assert!(verdict.has_message("Страница содержания должна содержать заголовок 'СОДЕРЖАНИЕ'"));
    }

    #[test]
    fn check_publishes_into_session() {
        let doc = contents_document(&GOOD_LINES);
        let mut session = CheckSession::new(&StandardsProfile::default()).unwrap();
        let verdict = check_table_of_contents(&doc, &mut session, &TocProfile::default());
        assert!(verdict.ok);
        assert!(session.toc().is_published());
    }
}
