//! Body typography: font face and size of every run, line spacing of
//! running text. Findings are grouped per page.

use crate::headings::is_upper;
use normcheck_kernel::profile::TypographyProfile;
use normcheck_kernel::{DocumentModel, Paragraph, Verdict, is_close};
use std::collections::BTreeSet;

pub const POSITION: &str = "Весь документ";
pub const STANDARD: &str = "ГОСТ 19.106-78";

pub const MSG_LINE_SPACING: &str = "Используется некорректный межстрочный интервал";

const SIZE_TOLERANCE: f64 = 1e-6;
const SPACING_TOLERANCE: f64 = 1e-3;

/// Physical page label, 1-based.
fn page_label(index: usize) -> String {
    format!("Страница {}", index + 1)
}

pub fn check_fonts(doc: &dyn DocumentModel, profile: &TypographyProfile) -> Verdict {
    let mut pages = BTreeSet::new();
    for id in doc.paragraph_ids() {
        let Some(paragraph) = doc.paragraph(id) else {
            continue;
        };
        let wrong_font = paragraph.runs.iter().any(|run| {
            run.font_name != profile.font_name
                || !profile
                    .font_sizes
                    .iter()
                    .any(|size| is_close(run.font_size, *size, SIZE_TOLERANCE))
        });
        if wrong_font {
            if let Some(page) = doc.paragraph_page(id) {
                pages.insert(page);
            }
        }
    }

    let sizes: Vec<String> = profile.font_sizes.iter().map(f64::to_string).collect();
    let mut verdict = Verdict::scoped(POSITION, STANDARD);
    for page in pages {
        verdict.add_message_at(
            format!(
                "Используется некорректный шрифт, используйте \"{}\" {}",
                profile.font_name,
                sizes.join(" или ")
            ),
            page_label(page),
        );
    }
    verdict
}

/// Running text between the title sheet and the final sheet must use the
/// profile line spacing. Heading styles, empty paragraphs and bold
/// upper-case captions are exempt.
pub fn check_line_spacing(doc: &dyn DocumentModel, profile: &TypographyProfile) -> Verdict {
    let last_page = doc.page_count().saturating_sub(1);
    let mut pages = BTreeSet::new();
    for id in doc.paragraph_ids() {
        let Some(paragraph) = doc.paragraph(id) else {
            continue;
        };
        let Some(page) = doc.paragraph_page(id) else {
            continue;
        };
        if page > 1 && page < last_page && has_wrong_spacing(paragraph, profile) {
            pages.insert(page);
        }
    }

    let mut verdict = Verdict::scoped(POSITION, STANDARD);
    for page in pages {
        verdict.add_message_at(MSG_LINE_SPACING, page_label(page));
    }
    verdict
}

fn has_wrong_spacing(paragraph: &Paragraph, profile: &TypographyProfile) -> bool {
    if paragraph.format.style_name.starts_with("Heading") {
        return false;
    }
    let Some(first_run) = paragraph.first_run() else {
        return false;
    };
    if is_close(
        paragraph.format.line_spacing,
        profile.line_spacing_pt,
        SPACING_TOLERANCE,
    ) {
        return false;
    }
    let text = paragraph.trimmed_text();
    !text.is_empty() && !(first_run.bold && is_upper(text))
}
