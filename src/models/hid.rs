use std::fmt;

use thiserror::Error;

/// Canonical join key, shaped `NNN-15` with at least three zero-padded digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Build the key for a cohort number given as ASCII digits.
    ///
    /// Leading zeros are dropped before padding, so the digit string may be any
    /// length; wide numbers are never truncated.
    pub(crate) fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        let number = if trimmed.is_empty() { "0" } else { trimmed };
        CanonicalId(format!("{number:0>3}-15"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalId> for String {
    fn from(id: CanonicalId) -> Self {
        id.0
    }
}

/// Why a raw identifier could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidIdentifier {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier '{raw}' has no digits after the HM15- prefix")]
    MissingDigits { raw: String },

    #[error("identifier '{raw}' has non-digit characters after the HM15- prefix")]
    NonDigit { raw: String },
}
