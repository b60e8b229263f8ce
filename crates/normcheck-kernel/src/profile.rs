//! Standards profile: every constant the rules compare against.
//!
//! The default profile encodes the ГОСТ 19 family as applied to a
//! technical specification ("ТЗ 01-1"). A profile can be loaded from
//! TOML; every field is optional and falls back to the default.

use crate::error::NormcheckError;
use crate::model::PaperSize;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub const PROFILE_DIGEST_PREFIX: &str = "prof1_";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StandardsProfile {
    pub identifier: IdentifierProfile,
    pub geometry: GeometryProfile,
    pub front_matter: FrontMatterProfile,
    pub toc: TocProfile,
    pub headings: HeadingProfile,
    pub running: RunningProfile,
    pub typography: TypographyProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct IdentifierProfile {
    /// Document type code following the identifier, e.g. `ТЗ`.
    pub doc_type: String,
    /// Document type number, e.g. `01-1`.
    pub doc_type_id: String,
    /// Page-type qualifier of the approval sheet identifier.
    pub approval_qualifier: String,
}

impl Default for IdentifierProfile {
    fn default() -> Self {
        Self {
            doc_type: "ТЗ".to_string(),
            doc_type_id: "01-1".to_string(),
            approval_qualifier: "ЛУ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeometryProfile {
    pub paper_size: PaperSize,
    pub left_mm: f64,
    pub right_mm: f64,
    pub bottom_mm: f64,
    pub top_mm: f64,
    pub relative_tolerance: f64,
}

impl Default for GeometryProfile {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            left_mm: 20.0,
            right_mm: 10.0,
            bottom_mm: 15.0,
            top_mm: 25.0,
            relative_tolerance: 1e-3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FrontMatterProfile {
    pub registration_rows: usize,
    /// The registration table must end within this distance from the
    /// page edge (i.e. entirely inside the left margin).
    pub registration_max_width_mm: f64,
    pub registration_labels: Vec<String>,
}

impl Default for FrontMatterProfile {
    fn default() -> Self {
        Self {
            registration_rows: 5,
            registration_max_width_mm: 20.0,
            registration_labels: vec!["инв".into(), "под".into(), "дата".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TocProfile {
    /// Hyperlink sub-addresses with this prefix point at headings.
    pub bookmark_prefix: String,
    /// Literal heading required on the contents page (case-sensitive).
    pub heading: String,
    pub allowed_before: Vec<String>,
    pub allowed_after: Vec<String>,
    pub appendix_marker: String,
    pub abstract_label: String,
    pub change_log_label: String,
    pub self_label: String,
}

impl Default for TocProfile {
    fn default() -> Self {
        Self {
            bookmark_prefix: "_Toc".to_string(),
            heading: "СОДЕРЖАНИЕ".to_string(),
            allowed_before: vec!["аннотация".into()],
            allowed_after: vec!["лист регистрации изменений".into()],
            appendix_marker: "приложение".to_string(),
            abstract_label: "аннотация".to_string(),
            change_log_label: "лист регистрации изменений".to_string(),
            self_label: "содержание".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct HeadingProfile {
    pub line_height_pt: f64,
    pub min_spacing_lines: f64,
}

impl Default for HeadingProfile {
    fn default() -> Self {
        Self {
            line_height_pt: 12.0,
            min_spacing_lines: 3.0,
        }
    }
}

impl HeadingProfile {
    pub fn min_spacing_pt(&self) -> f64 {
        self.line_height_pt * self.min_spacing_lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RunningProfile {
    /// Pages (approval sheet + title sheet) that must carry no header/footer.
    pub front_matter_pages: usize,
    pub footer_labels: Vec<String>,
}

impl Default for RunningProfile {
    fn default() -> Self {
        Self {
            front_matter_pages: 2,
            footer_labels: vec!["изм".into(), "лист".into(), "подп".into(), "дата".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TypographyProfile {
    pub font_name: String,
    pub font_sizes: Vec<f64>,
    pub line_spacing_pt: f64,
}

impl Default for TypographyProfile {
    fn default() -> Self {
        Self {
            font_name: "Times New Roman".to_string(),
            font_sizes: vec![12.0, 14.0],
            line_spacing_pt: 18.0,
        }
    }
}

impl StandardsProfile {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, NormcheckError> {
        let profile: Self = toml::from_str(text).map_err(|source| NormcheckError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NormcheckError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| NormcheckError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    pub fn to_toml_string(&self) -> Result<String, NormcheckError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), NormcheckError> {
        let geometry = &self.geometry;
        for (name, value) in [
            ("geometry.left_mm", geometry.left_mm),
            ("geometry.right_mm", geometry.right_mm),
            ("geometry.bottom_mm", geometry.bottom_mm),
            ("geometry.top_mm", geometry.top_mm),
            ("geometry.relative_tolerance", geometry.relative_tolerance),
            (
                "front_matter.registration_max_width_mm",
                self.front_matter.registration_max_width_mm,
            ),
            ("headings.line_height_pt", self.headings.line_height_pt),
            ("typography.line_spacing_pt", self.typography.line_spacing_pt),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(NormcheckError::InvalidProfile(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if self.identifier.doc_type.trim().is_empty() || self.identifier.doc_type_id.trim().is_empty()
        {
            return Err(NormcheckError::InvalidProfile(
                "identifier.doc_type and identifier.doc_type_id must be non-empty".to_string(),
            ));
        }
        if self.front_matter.registration_labels.is_empty() {
            return Err(NormcheckError::InvalidProfile(
                "front_matter.registration_labels must be non-empty".to_string(),
            ));
        }
        if self.typography.font_sizes.is_empty() {
            return Err(NormcheckError::InvalidProfile(
                "typography.font_sizes must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Stable digest of the profile, bound into conformance reports.
    pub fn digest(&self) -> String {
        // Serialization of plain data into TOML cannot fail; fall back to
        // the debug rendering rather than panic.
        let canonical = toml::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        let hash = Sha256::digest(canonical.as_bytes());
        let hex: String = hash.iter().map(|b| format!("{b:02x}")).collect();
        format!("{PROFILE_DIGEST_PREFIX}{hex}")
    }
}
