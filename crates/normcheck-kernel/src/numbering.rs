//! Structured heading numbers.
//!
//! A heading number is exactly four non-negative components
//! (section.subsection.sub-subsection.item), right-padded with zeros.
//! Ordering is lexicographic over the components, which is the order
//! headings must appear in the body.

use crate::error::HeadingNumberError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deepest nesting representable by the numbering scheme.
pub const MAX_DEPTH: usize = 4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct HeadingNumber(pub [u32; MAX_DEPTH]);

impl HeadingNumber {
    pub const fn new(components: [u32; MAX_DEPTH]) -> Self {
        Self(components)
    }

    /// Parse a numbering group such as `"1.2.3."` or `"4"`.
    ///
    /// Surrounding whitespace and trailing dots are ignored; the caller is
    /// responsible for flagging a missing trailing dot.
    pub fn parse(group: &str) -> Result<Self, HeadingNumberError> {
        let trimmed = group.trim().trim_end_matches('.');
        if trimmed.is_empty() {
            return Err(HeadingNumberError::Empty);
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() > MAX_DEPTH {
            return Err(HeadingNumberError::TooDeep { depth: parts.len() });
        }

        let mut components = [0u32; MAX_DEPTH];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u32>()
                .map_err(|_| HeadingNumberError::InvalidComponent(part.to_string()))?;
        }
        if components.iter().all(|c| *c == 0) {
            return Err(HeadingNumberError::AllZero(group.trim().to_string()));
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> [u32; MAX_DEPTH] {
        self.0
    }

    /// Nesting level: four minus the count of trailing zeros. Parsed
    /// numbers are always 1..=4; only an all-zero `new` yields 0.
    pub fn level(&self) -> usize {
        let trailing_zeros = self.0.iter().rev().take_while(|c| **c == 0).count();
        MAX_DEPTH - trailing_zeros
    }

    /// Whether `other` sits strictly below `self` in the hierarchy.
    pub fn is_ancestor_of(&self, other: &HeadingNumber) -> bool {
        let level = self.level();
        other.level() > level && self.0[..level] == other.0[..level]
    }

    /// Dotted form without padding, e.g. `1.2.` for `(1, 2, 0, 0)`.
    pub fn dotted(&self) -> String {
        let level = self.level().max(1);
        let mut out = String::new();
        for component in &self.0[..level] {
            out.push_str(&component.to_string());
            out.push('.');
        }
        out
    }
}

impl fmt::Display for HeadingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}
