//! # Normcheck Rules
//!
//! The conformance rule set and its aggregator.
//!
//! Every check observes a [`DocumentModel`] and returns a [`Verdict`].
//! Checks that need cross-check state take the run's [`CheckSession`]:
//! the front-matter, header and footer checks record and compare the
//! document identifier, the contents reconciler publishes the heading
//! model the heading check consumes.
//!
//! [`run_conformance`] runs the whole set in a fixed order and folds the
//! verdicts into a [`ConformanceReport`].

pub mod front_matter;
pub mod geometry;
pub mod headings;
pub mod running;
pub mod toc;
pub mod typography;

#[cfg(test)]
mod fixtures;

use normcheck_kernel::{
    CheckSession, DocumentModel, Message, NormcheckError, StandardsProfile, Verdict,
};
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA: u32 = 1;
pub const REPORT_KIND: &str = "normcheck.conformance.v1";

/// One check of the rule set, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    PageGeometry,
    ApprovalPage,
    TitlePage,
    TableOfContents,
    Headings,
    Headers,
    Footers,
    Fonts,
    LineSpacing,
}

impl Check {
    /// Run order. The contents reconciler precedes the heading check.
    pub const ALL: [Check; 9] = [
        Check::PageGeometry,
        Check::ApprovalPage,
        Check::TitlePage,
        Check::TableOfContents,
        Check::Headings,
        Check::Headers,
        Check::Footers,
        Check::Fonts,
        Check::LineSpacing,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::PageGeometry => "page_geometry",
            Self::ApprovalPage => "approval_page",
            Self::TitlePage => "title_page",
            Self::TableOfContents => "table_of_contents",
            Self::Headings => "headings",
            Self::Headers => "headers",
            Self::Footers => "footers",
            Self::Fonts => "fonts",
            Self::LineSpacing => "line_spacing",
        }
    }

    pub fn run(
        self,
        doc: &dyn DocumentModel,
        session: &mut CheckSession,
        profile: &StandardsProfile,
    ) -> Verdict {
        match self {
            Self::PageGeometry => geometry::check_page_geometry(doc, &profile.geometry),
            Self::ApprovalPage => front_matter::check_approval_page(doc, session, profile),
            Self::TitlePage => front_matter::check_title_page(doc, session, profile),
            Self::TableOfContents => toc::check_table_of_contents(doc, session, &profile.toc),
            Self::Headings => headings::check_headings(doc, session, &profile.headings),
            Self::Headers => running::check_headers(doc, session, &profile.running),
            Self::Footers => running::check_footers(doc, session, &profile.running),
            Self::Fonts => typography::check_fonts(doc, &profile.typography),
            Self::LineSpacing => typography::check_line_spacing(doc, &profile.typography),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub check_id: String,
    pub ok: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConformanceReport {
    pub schema: u32,
    pub report_kind: String,
    pub profile_digest: String,
    /// `accepted` when every check passed, `rejected` otherwise.
    pub result: String,
    pub checks: Vec<CheckOutcome>,
    /// All messages in check order.
    pub messages: Vec<Message>,
}

impl ConformanceReport {
    pub fn is_conformant(&self) -> bool {
        self.result == "accepted"
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|check| !check.ok)
    }
}

/// Run every check against `doc` and aggregate the verdicts.
///
/// Fails only when the profile cannot produce a session (an identifier
/// pattern that does not compile); checks themselves never fail.
pub fn run_conformance(
    doc: &dyn DocumentModel,
    profile: &StandardsProfile,
) -> Result<ConformanceReport, NormcheckError> {
    let mut session = CheckSession::new(profile)?;
    let mut checks = Vec::with_capacity(Check::ALL.len());

    for check in Check::ALL {
        let verdict = check.run(doc, &mut session, profile);
        tracing::info!(
            check = check.id(),
            ok = verdict.ok,
            messages = verdict.messages.len(),
            "check finished"
        );
        checks.push(CheckOutcome {
            check_id: check.id().to_string(),
            ok: verdict.ok,
            messages: verdict.messages,
        });
    }

    let conformant = checks.iter().all(|check| check.ok);
    let messages = checks
        .iter()
        .flat_map(|check| check.messages.iter().cloned())
        .collect();

    Ok(ConformanceReport {
        schema: REPORT_SCHEMA,
        report_kind: REPORT_KIND.to_string(),
        profile_digest: profile.digest(),
        result: if conformant {
            "accepted".to_string()
        } else {
            "rejected".to_string()
        },
        checks,
        messages,
    })
}
