//! Heading typography and placement, driven by the published contents
//! model. Without a published model the check is a no-op.

use normcheck_kernel::model::{Alignment, PageBlock};
use normcheck_kernel::profile::HeadingProfile;
use normcheck_kernel::{
    CheckSession, DocumentModel, HeadingNumber, HeadingTarget, MAX_DEPTH, Paragraph, TocIndex,
    Verdict,
};

pub const POSITION: &str = "Заголовки";
pub const STANDARD: &str = "ГОСТ 19.106-78";

/// At least one cased character and no lower-case ones.
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

pub fn check_headings(
    doc: &dyn DocumentModel,
    session: &CheckSession,
    profile: &HeadingProfile,
) -> Verdict {
    let Some(index) = session.toc().published() else {
        tracing::debug!("contents model unpublished; skipping heading checks");
        return Verdict::new();
    };

    let mut walk = HeadingWalk {
        doc,
        index,
        min_spacing: profile.min_spacing_pt(),
        min_lines: profile.min_spacing_lines,
        last_indent: [0.0; MAX_DEPTH],
        verdict: Verdict::scoped(POSITION, STANDARD),
    };
    for (position, number) in index.sorted_numbers.iter().enumerate() {
        walk.visit(position, number);
    }
    walk.verdict
}

struct HeadingWalk<'a> {
    doc: &'a dyn DocumentModel,
    index: &'a TocIndex,
    min_spacing: f64,
    min_lines: f64,
    /// Indent of the most recent heading at each level.
    last_indent: [f64; MAX_DEPTH],
    verdict: Verdict,
}

impl HeadingWalk<'_> {
    fn visit(&mut self, position: usize, number: &HeadingNumber) {
        let doc = self.doc;
        let index = self.index;
        let Some(name) = index.name_of(number) else {
            return;
        };
        let id = match index.name_to_target.get(name) {
            Some(HeadingTarget::Paragraph(id)) => *id,
            _ => {
                tracing::debug!(name, "heading located by page text only; skipping style checks");
                return;
            }
        };
        let Some(heading) = doc.paragraph(id) else {
            return;
        };
        let Some(first_run) = heading.first_run() else {
            tracing::debug!(name, "heading has no runs; skipping style checks");
            return;
        };

        let text = heading.trimmed_text();
        let real_name = index.name_to_real_name.get(name).map(String::as_str).unwrap_or(text);
        let next = doc.next_paragraph(id).and_then(|next| doc.paragraph(next));
        let next_text = next.map(Paragraph::trimmed_text).unwrap_or_default();
        let spacing =
            heading.format.space_after + next.map(|p| p.format.space_before).unwrap_or(0.0);

        let level = number.level();
        if level == 0 {
            tracing::warn!(name, "heading number has no level; skipping style checks");
            return;
        }
        let indent = heading.format.left_indent + heading.format.first_line_indent;
        let followed_by_subheading = index
            .sorted_numbers
            .get(position + 1)
            .filter(|following| following.level() > level)
            .and_then(|following| index.real_name_of(following))
            .is_some_and(|following| !following.trim().is_empty() && next_text.contains(following.trim()));

        if !first_run.bold {
            self.verdict
                .add_message(format!("Заголовок '{text}' не выделен жирным шрифтом."));
        }
        if text.ends_with('.') {
            self.verdict
                .add_message(format!("Заголовок '{text}' оканчивается точкой."));
        }

        if level == 1 {
            self.last_indent[0] = indent;
            if heading.format.alignment != Alignment::Center {
                self.verdict
                    .add_message(format!("Заголовок '{text}' не центрирован."));
            }
            if !is_upper(real_name) {
                self.verdict.add_message(format!(
                    "Заголовок уровня 1 '{text}' написан не прописными буквами."
                ));
            }
            let page = index.name_to_page.get(name).copied();
            if !page.is_some_and(|page| self.opens_page(page, real_name)) {
                self.verdict.add_message(format!(
                    "Заголовок уровня 1 '{text}' находится не в начале страницы."
                ));
            }
            if followed_by_subheading && spacing < self.min_spacing {
                self.verdict.add_message(format!(
                    "Расстояние между заголовком раздела '{text}' и заголовком подраздела менее, чем {} высоты шрифта",
                    self.min_lines
                ));
            }
            return;
        }

        if is_upper(real_name) {
            self.verdict.add_message(format!(
                "Заголовок уровня {level} '{text}' написан прописными буквами."
            ));
        }

        if indent <= self.last_indent[level - 2] {
            self.verdict.add_message(format!(
                "Отступ заголовка уровня {level} '{text}' меньше, чем у заголовка предыдущего уровня"
            ));
        }
        self.last_indent[level - 1] = indent;

        if !followed_by_subheading && spacing < self.min_spacing && !next_text.is_empty() {
            self.verdict.add_message(format!(
                "Расстояние между заголовком '{text}' и следующим текстом менее, чем {} высоты шрифта",
                self.min_lines
            ));
        }
    }

    /// Whether the first block of `page` is a paragraph reading `real_name`.
    fn opens_page(&self, page: usize, real_name: &str) -> bool {
        self.doc
            .page(page)
            .and_then(|fragment| fragment.blocks.into_iter().next())
            .is_some_and(|block| match block {
                PageBlock::Paragraph(_, paragraph) => paragraph.trimmed_text() == real_name,
                PageBlock::Table(_) => false,
            })
    }
}
