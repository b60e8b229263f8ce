//! Page geometry: orientation, paper size and the four margins.

use normcheck_kernel::model::{Orientation, PageSetup};
use normcheck_kernel::profile::GeometryProfile;
use normcheck_kernel::{DocumentModel, Verdict, is_close, mm_to_points};

pub const POSITION: &str = "Весь документ";
pub const STANDARD: &str = "ГОСТ 19.106-78";

pub const MSG_ORIENTATION: &str = "Некорректная ориентация страницы. Она должна быть книжной.";

/// Check the document's page setup (the first section's) against the
/// profile. Every violated dimension yields its own message.
pub fn check_page_geometry(doc: &dyn DocumentModel, profile: &GeometryProfile) -> Verdict {
    let mut verdict = Verdict::scoped(POSITION, STANDARD);
    let Some(setup) = doc.page_setup(0) else {
        tracing::warn!("document has no page setup; skipping geometry check");
        return verdict;
    };
    check_setup(&mut verdict, setup, profile);
    verdict
}

fn check_setup(verdict: &mut Verdict, setup: &PageSetup, profile: &GeometryProfile) {
    if setup.orientation != Orientation::Portrait {
        verdict.add_message(MSG_ORIENTATION);
    }
    if setup.paper_size != profile.paper_size {
        verdict.add_message(format!(
            "Документация оформляется на листах формата {}. Ваш формат - {}",
            profile.paper_size, setup.paper_size
        ));
    }

    let margins = [
        ("слева", setup.left_margin, profile.left_mm),
        ("справа", setup.right_margin, profile.right_mm),
        ("снизу", setup.bottom_margin, profile.bottom_mm),
        ("сверху", setup.top_margin, profile.top_mm),
    ];
    for (side, actual, expected_mm) in margins {
        if !is_close(actual, mm_to_points(expected_mm), profile.relative_tolerance) {
            tracing::debug!(side, actual, expected_mm, "margin out of tolerance");
            verdict.add_message(format!(
                "Неверный отступ {side}. Требуемый - {expected_mm}мм."
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normcheck_kernel::model::PaperSize;

    fn conformant() -> PageSetup {
        PageSetup {
            orientation: Orientation::Portrait,
            paper_size: PaperSize::A4,
            left_margin: mm_to_points(20.0),
            right_margin: mm_to_points(10.0),
            top_margin: mm_to_points(25.0),
            bottom_margin: mm_to_points(15.0),
        }
    }

    fn run(setup: &PageSetup) -> Verdict {
        let mut verdict = Verdict::scoped(POSITION, STANDARD);
        check_setup(&mut verdict, setup, &GeometryProfile::default());
        verdict
    }

    #[test]
    fn conformant_setup_passes() {
        let verdict = run(&conformant());
        assert!(verdict.ok);
        assert!(verdict.messages.is_empty());
    }

    #[test]
    fn margin_within_tolerance_passes() {
        let mut setup = conformant();
        setup.left_margin = mm_to_points(20.001);
        assert!(run(&setup).ok);
    }

    #[test]
    fn wide_left_margin_yields_one_message() {
        let mut setup = conformant();
        setup.left_margin = mm_to_points(20.5);
        let verdict = run(&setup);
        assert_eq!(
            verdict.message_texts(),
            vec!["Неверный отступ слева. Требуемый - 20мм."]
        );
        assert_eq!(verdict.messages[0].position, POSITION);
        assert_eq!(verdict.messages[0].standard, STANDARD);
    }

    #[test]
    fn all_margins_are_checked_independently() {
        let setup = PageSetup {
            left_margin: 0.0,
            right_margin: 0.0,
            top_margin: 0.0,
            bottom_margin: 0.0,
            ..conformant()
        };
        assert_eq!(run(&setup).messages.len(), 4);
    }

    #[test]
    fn landscape_letter_is_reported() {
        let setup = PageSetup {
            orientation: Orientation::Landscape,
            paper_size: PaperSize::Letter,
            ..conformant()
        };
        let verdict = run(&setup);
        assert_eq!(verdict.messages.len(), 2);
        assert!(verdict.has_message(MSG_ORIENTATION));
        insta::assert_snapshot!(
            verdict.messages[1].text,
            @"Документация оформляется на листах формата A4. Ваш формат - Letter"
        );
    }
}
