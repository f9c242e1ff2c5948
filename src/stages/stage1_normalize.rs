use crate::models::{CanonicalId, InvalidIdentifier, Row};

/// Column carrying the raw identifier in the anxiety dataset
pub const ANXIETY_ID_COLUMN: &str = "Homeless ID";

const ID_PREFIX: &str = "HM15-";

/// Why an anxiety row was left out of the join
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The identifier column is absent or empty
    MissingId,
    /// The identifier could not be normalized
    InvalidId(InvalidIdentifier),
}

/// Normalize a raw identifier into its canonical join key.
///
/// The first occurrence of `HM15-` is removed and the remainder must be
/// ASCII digits: `HM15-1` becomes `001-15`, `HM15-1234` becomes `1234-15`.
pub fn normalize(raw: &str) -> Result<CanonicalId, InvalidIdentifier> {
    if raw.is_empty() {
        return Err(InvalidIdentifier::Empty);
    }

    let digits = raw.replacen(ID_PREFIX, "", 1);
    if digits.is_empty() {
        return Err(InvalidIdentifier::MissingDigits {
            raw: raw.to_string(),
        });
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidIdentifier::NonDigit {
            raw: raw.to_string(),
        });
    }

    Ok(CanonicalId::from_digits(&digits))
}

/// Resolve the canonical key of one anxiety row without failing the run
pub fn resolve_row_id(row: &Row) -> Result<CanonicalId, SkipReason> {
    let raw = row.non_empty(ANXIETY_ID_COLUMN).ok_or(SkipReason::MissingId)?;
    normalize(raw).map_err(SkipReason::InvalidId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pads_to_three_digits() {
        assert_eq!(normalize("HM15-1").unwrap().as_str(), "001-15");
        assert_eq!(normalize("HM15-0").unwrap().as_str(), "000-15");
        assert_eq!(normalize("HM15-42").unwrap().as_str(), "042-15");
        assert_eq!(normalize("HM15-007").unwrap().as_str(), "007-15");
    }

    #[test]
    fn test_normalize_keeps_wide_numbers() {
        assert_eq!(normalize("HM15-1234").unwrap().as_str(), "1234-15");
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert_eq!(normalize(""), Err(InvalidIdentifier::Empty));
        assert_eq!(
            normalize("HM15-abc"),
            Err(InvalidIdentifier::NonDigit {
                raw: "HM15-abc".to_string()
            })
        );
        assert!(matches!(normalize("XX-1"), Err(InvalidIdentifier::NonDigit { .. })));
        assert!(matches!(normalize("HM15-"), Err(InvalidIdentifier::MissingDigits { .. })));
        assert!(matches!(normalize("HM15- 1"), Err(InvalidIdentifier::NonDigit { .. })));
        assert!(matches!(normalize("HM15-1-2"), Err(InvalidIdentifier::NonDigit { .. })));
        assert!(matches!(normalize("HM15-HM15-1"), Err(InvalidIdentifier::NonDigit { .. })));
        assert!(matches!(normalize("HM15-١"), Err(InvalidIdentifier::NonDigit { .. })));
    }

    #[test]
    fn test_resolve_row_id() {
        let row: Row = [("Homeless ID", "HM15-3"), ("Score", "9")].into_iter().collect();
        assert_eq!(resolve_row_id(&row).unwrap().as_str(), "003-15");

        let row: Row = [("Homeless ID", "")].into_iter().collect();
        assert_eq!(resolve_row_id(&row), Err(SkipReason::MissingId));

        let row: Row = [("Score", "9")].into_iter().collect();
        assert_eq!(resolve_row_id(&row), Err(SkipReason::MissingId));

        let row: Row = [("Homeless ID", "HM15-x")].into_iter().collect();
        assert!(matches!(resolve_row_id(&row), Err(SkipReason::InvalidId(_))));
    }
}
