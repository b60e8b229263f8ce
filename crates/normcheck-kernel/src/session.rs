//! State shared between checks of one conformance run.
//!
//! A [`CheckSession`] is created once per document and threaded through
//! the checks in order. It holds the only cross-check state: the
//! canonical document identifier and the published table-of-contents
//! model. Both are write-once: the identifier is recorded on first
//! sight, the contents model is published at most once by the
//! reconciler.

use crate::error::NormcheckError;
use crate::identifier::IdentifierTracker;
use crate::model::ParagraphId;
use crate::numbering::HeadingNumber;
use crate::profile::StandardsProfile;
use std::collections::{BTreeMap, BTreeSet};

/// Where a contents entry's heading was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingTarget {
    /// Resolved through the entry's bookmark.
    Paragraph(ParagraphId),
    /// Bookmark broken; the heading text was found on the declared page.
    PageText,
}

/// The consistent contents model published by the reconciler.
///
/// Keys are cleared entry names (trimmed, lower-cased).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TocIndex {
    pub names_to_numbers: BTreeMap<String, HeadingNumber>,
    pub numbers_to_names: BTreeMap<HeadingNumber, String>,
    pub name_to_page: BTreeMap<String, usize>,
    pub name_to_bookmark: BTreeMap<String, String>,
    pub name_to_target: BTreeMap<String, HeadingTarget>,
    /// Heading text as written in the body.
    pub name_to_real_name: BTreeMap<String, String>,
    pub sorted_numbers: Vec<HeadingNumber>,
    pub unnumbered: BTreeSet<String>,
    /// Page index of the contents itself.
    pub toc_page: usize,
}

impl TocIndex {
    pub fn name_of(&self, number: &HeadingNumber) -> Option<&str> {
        self.numbers_to_names.get(number).map(String::as_str)
    }

    pub fn real_name_of(&self, number: &HeadingNumber) -> Option<&str> {
        self.name_of(number)
            .and_then(|name| self.name_to_real_name.get(name))
            .map(String::as_str)
    }
}

/// Contents model as seen by downstream checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TocModel {
    /// The reconciler has not run, or found the contents inconsistent.
    #[default]
    Unpublished,
    Published(TocIndex),
}

impl TocModel {
    pub fn published(&self) -> Option<&TocIndex> {
        match self {
            Self::Published(index) => Some(index),
            Self::Unpublished => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }
}

#[derive(Debug, Clone)]
pub struct CheckSession {
    pub identifiers: IdentifierTracker,
    toc: TocModel,
}

impl CheckSession {
    pub fn new(profile: &StandardsProfile) -> Result<Self, NormcheckError> {
        Ok(Self {
            identifiers: IdentifierTracker::new(&profile.identifier)?,
            toc: TocModel::Unpublished,
        })
    }

    pub fn toc(&self) -> &TocModel {
        &self.toc
    }

    /// Record the reconciler's model. A model that is already published
    /// is kept; a second publication is ignored.
    pub fn publish_toc(&mut self, model: TocModel) {
        if self.toc.is_published() {
            tracing::warn!("contents model already published; ignoring republication");
            return;
        }
        self.toc = model;
    }
}
