//! Document identifier matching and tracking.
//!
//! A document identifier looks like `AB.123.45.67-89 ТЗ 01-1-ЛУ`: two
//! capital latin letters and four numeric groups (the canonical part),
//! then the document type, the type number and an optional page-type
//! qualifier. The first canonical part seen anywhere in the document
//! becomes the reference every later occurrence is compared against.

use crate::error::{IdentifierError, NormcheckError};
use crate::profile::IdentifierProfile;
use crate::verdict::Verdict;
use regex::Regex;
use std::sync::OnceLock;

pub const MSG_IDENTIFIER_MISMATCH: &str = "Несовпадение идентификатора документа.";

const CANONICAL_PATTERN: &str = r"[A-Z]{2}\.\d+\.\d{2}\.\d{2}-\d{2}";

fn canonical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CANONICAL_PATTERN).expect("canonical identifier regex must compile"))
}

fn short_exact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^\s*{CANONICAL_PATTERN}(?:\s|$)"))
            .expect("short identifier regex must compile")
    })
}

fn short_search_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"{CANONICAL_PATTERN}(?:\s|$)"))
            .expect("short identifier regex must compile")
    })
}

/// Which part of the identifier must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierForm<'a> {
    /// Canonical part followed by type, type number and, when given,
    /// exactly this page-type qualifier.
    Full { qualifier: Option<&'a str> },
    /// Canonical part only.
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The whole text (modulo surrounding whitespace) is the identifier.
    Exact,
    /// The identifier occurs somewhere in the text.
    Search,
}

/// Extract the canonical `LL.NNN.NN.NN-NN` part of a text.
pub fn canonical_identifier(text: &str) -> Option<&str> {
    canonical_re().find(text).map(|m| m.as_str())
}

/// Compiled identifier patterns for one document type.
#[derive(Debug, Clone)]
pub struct IdentifierMatcher {
    full_exact: Regex,
    full_search: Regex,
}

impl IdentifierMatcher {
    pub fn new(profile: &IdentifierProfile) -> Result<Self, NormcheckError> {
        let body = format!(
            r"{CANONICAL_PATTERN}\s{}\s{}(?:-(?P<qualifier>\w+))?",
            regex::escape(profile.doc_type.trim()),
            regex::escape(profile.doc_type_id.trim()),
        );
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|err| {
                NormcheckError::InvalidProfile(format!("identifier pattern does not compile: {err}"))
            })
        };
        Ok(Self {
            full_exact: compile(format!(r"^\s*{body}\s*$"))?,
            full_search: compile(body)?,
        })
    }

    pub fn matches(&self, text: &str, form: IdentifierForm<'_>, mode: MatchMode) -> bool {
        match (form, mode) {
            (IdentifierForm::Short, MatchMode::Exact) => short_exact_re().is_match(text),
            (IdentifierForm::Short, MatchMode::Search) => short_search_re().is_match(text),
            (IdentifierForm::Full { qualifier }, MatchMode::Exact) => self
                .full_exact
                .captures(text)
                .is_some_and(|caps| caps.name("qualifier").map(|m| m.as_str()) == qualifier),
            (IdentifierForm::Full { qualifier: None }, MatchMode::Search) => {
                self.full_search.is_match(text)
            }
            (IdentifierForm::Full { qualifier: Some(expected) }, MatchMode::Search) => self
                .full_search
                .captures_iter(text)
                .any(|caps| caps.name("qualifier").map(|m| m.as_str()) == Some(expected)),
        }
    }
}

/// Matcher plus the canonical identifier recorded so far.
#[derive(Debug, Clone)]
pub struct IdentifierTracker {
    matcher: IdentifierMatcher,
    canonical: Option<String>,
}

impl IdentifierTracker {
    pub fn new(profile: &IdentifierProfile) -> Result<Self, NormcheckError> {
        Ok(Self {
            matcher: IdentifierMatcher::new(profile)?,
            canonical: None,
        })
    }

    pub fn matcher(&self) -> &IdentifierMatcher {
        &self.matcher
    }

    pub fn matches(&self, text: &str, form: IdentifierForm<'_>, mode: MatchMode) -> bool {
        self.matcher.matches(text, form, mode)
    }

    /// The first canonical identifier seen, if any.
    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }

    /// Compare the canonical part of `text` with the recorded identifier.
    ///
    /// The first call records the identifier. A later divergence yields a
    /// failed verdict; the recorded value is never replaced. Callers must
    /// establish with [`IdentifierTracker::matches`] that `text` holds an
    /// identifier.
    pub fn check_similarity(&mut self, text: &str) -> Result<Verdict, IdentifierError> {
        let found = canonical_identifier(text)
            .ok_or_else(|| IdentifierError::NotFound(text.to_string()))?;

        let mut verdict = Verdict::new();
        match self.canonical.as_deref() {
            None => {
                tracing::debug!(identifier = found, "recorded canonical document identifier");
                self.canonical = Some(found.to_string());
            }
            Some(recorded) if recorded != found => {
                tracing::debug!(recorded, found, "document identifier diverges");
                verdict.add_message(MSG_IDENTIFIER_MISMATCH);
            }
            Some(_) => {}
        }
        Ok(verdict)
    }

    /// [`IdentifierTracker::check_similarity`] for call sites that already
    /// matched the text; an unexpected miss is reported, not raised.
    pub fn similarity_verdict(&mut self, text: &str) -> Verdict {
        self.check_similarity(text).unwrap_or_else(|err| {
            let mut verdict = Verdict::new();
            verdict.add_message(err.to_string());
            verdict
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> IdentifierTracker {
        IdentifierTracker::new(&IdentifierProfile::default()).expect("default profile compiles")
    }

    const FULL: IdentifierForm<'static> = IdentifierForm::Full { qualifier: None };

    #[test]
    fn full_form_matches() {
        let t = tracker();
        assert!(t.matches("AB.123.45.67-89 ТЗ 01-1", FULL, MatchMode::Exact));
        assert!(t.matches("  AB.123.45.67-89 ТЗ 01-1\r", FULL, MatchMode::Exact));
    }

    #[test]
    fn bare_identifier_matches_short_form_only() {
        let t = tracker();
        assert!(!t.matches("AB.123.45.67-89", FULL, MatchMode::Exact));
        assert!(!t.matches("AB.123.45.67-89", FULL, MatchMode::Search));
        assert!(t.matches("AB.123.45.67-89", IdentifierForm::Short, MatchMode::Exact));
        assert!(t.matches("AB.123.45.67-89", IdentifierForm::Short, MatchMode::Search));
    }

    #[test]
    fn lowercase_prefix_never_matches() {
        let t = tracker();
        assert!(!t.matches("ab.123.45.67-89 ТЗ 01-1", FULL, MatchMode::Exact));
        assert!(!t.matches("ab.123.45.67-89 ТЗ 01-1", FULL, MatchMode::Search));
        assert!(!t.matches("ab.123.45.67-89", IdentifierForm::Short, MatchMode::Search));
    }

    #[test]
    fn qualifier_must_match_exactly() {
        let t = tracker();
        let approval = IdentifierForm::Full { qualifier: Some("ЛУ") };
        assert!(t.matches("AB.123.45.67-89 ТЗ 01-1-ЛУ", approval, MatchMode::Exact));
        assert!(!t.matches("AB.123.45.67-89 ТЗ 01-1", approval, MatchMode::Exact));
        assert!(!t.matches("AB.123.45.67-89 ТЗ 01-1-ЛУ", FULL, MatchMode::Exact));
    }

    #[test]
    fn search_finds_identifier_inside_text() {
        let t = tracker();
        let header = "Лист 3 AB.123.45.67-89 ТЗ 01-1 ";
        assert!(t.matches(header, FULL, MatchMode::Search));
        assert!(!t.matches(header, FULL, MatchMode::Exact));
    }

    #[test]
    fn other_document_type_is_rejected() {
        let t = tracker();
        assert!(!t.matches("AB.123.45.67-89 РП 01-1", FULL, MatchMode::Exact));
    }

    #[test]
    fn first_identifier_is_recorded_and_kept() {
        let mut t = tracker();
        let first = t.check_similarity("AB.123.45.67-89 ТЗ 01-1-ЛУ").unwrap();
        assert!(first.ok);
        assert_eq!(t.canonical(), Some("AB.123.45.67-89"));

        let same = t.check_similarity("AB.123.45.67-89 ТЗ 01-1").unwrap();
        assert!(same.ok);

        let other = t.check_similarity("CD.123.45.67-89 ТЗ 01-1").unwrap();
        assert!(!other.ok);
        assert!(other.has_message(MSG_IDENTIFIER_MISMATCH));
        assert_eq!(t.canonical(), Some("AB.123.45.67-89"));
    }

    #[test]
    fn similarity_without_identifier_is_an_error() {
        let mut t = tracker();
        assert_eq!(
            t.check_similarity("no identifier here"),
            Err(IdentifierError::NotFound("no identifier here".to_string()))
        );
        assert!(t.canonical().is_none());
        assert!(!t.similarity_verdict("still nothing").ok);
    }
}
