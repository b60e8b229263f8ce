//! Error types for normcheck kernel operations.
//!
//! Checks themselves never fail: they report through [`crate::Verdict`].
//! These errors cover the edges of the engine only (loading a profile or
//! a document snapshot, and the few precondition-guarded helpers).

/// Errors raised while loading inputs for a conformance run.
#[derive(Debug, thiserror::Error)]
pub enum NormcheckError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render profile: {0}")]
    RenderToml(#[from] toml::ser::Error),

    /// The document snapshot violates a structural precondition.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A standards profile value is out of range.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

/// Errors from the identifier matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// No `LL.NNN.NN.NN-NN` substring was present.
    #[error("no document identifier in text: {0:?}")]
    NotFound(String),
}

/// Errors converting a dotted numbering group into a [`crate::HeadingNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeadingNumberError {
    #[error("empty numbering group")]
    Empty,

    /// More components than the numbering scheme can represent.
    #[error("numbering has {depth} levels, at most 4 are allowed")]
    TooDeep { depth: usize },

    #[error("invalid numbering component: {0:?}")]
    InvalidComponent(String),

    /// Every component is zero, so the number has no level.
    #[error("numbering {0:?} has no non-zero component")]
    AllZero(String),
}
