//! # Normcheck Kernel
//!
//! Core types of the document-conformance engine: the read-only
//! document model the rules observe, the verdict algebra they report
//! through, the standards profile they compare against, and the
//! per-run session carrying the two pieces of cross-check state.
//!
//! This crate knows nothing about individual rules; those live in
//! `normcheck-rules`.
//!
//! ## Architecture
//!
//! ```text
//! StandardsProfile      ← Every constant a rule compares against
//!     │
//! DocumentModel         ← Sections, paragraphs, tables, fields, pages
//!     │                   (SnapshotDocument implements it over JSON)
//! CheckSession          ← Canonical identifier + published TOC model
//!     │
//! Verdict               ← ok flag + ordered messages, composed with `+`
//! ```

pub mod error;
pub mod identifier;
pub mod model;
pub mod numbering;
pub mod profile;
pub mod session;
pub mod snapshot;
pub mod verdict;

pub use error::{HeadingNumberError, IdentifierError, NormcheckError};
pub use identifier::{
    IdentifierForm, IdentifierMatcher, IdentifierTracker, MatchMode, canonical_identifier,
};
pub use model::{
    Alignment, BookmarkResolution, DocumentModel, Field, FieldKind, PageBlock, PageFragment,
    PageSetup, PageSpan, Paragraph, ParagraphId, Table, Zone, ZoneContent, ZoneVariant,
    is_close, mm_to_points, points_to_mm,
};
pub use numbering::{HeadingNumber, MAX_DEPTH};
pub use profile::StandardsProfile;
pub use session::{CheckSession, HeadingTarget, TocIndex, TocModel};
pub use snapshot::{Snapshot, SnapshotDocument};
pub use verdict::{Message, Verdict};
