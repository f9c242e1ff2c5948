use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::models::{Dataset, Row};
use crate::stages::stage1_normalize::{resolve_row_id, SkipReason, ANXIETY_ID_COLUMN};

/// Canonical identifier column, present in demographics and added to anxiety rows
pub const HID_COLUMN: &str = "HID";

/// Result of Stage 2 join
#[derive(Debug, Default)]
pub struct Stage2Result {
    /// Merged rows in anxiety input order
    pub merged: Vec<Row>,
    /// Anxiety rows left out of the output (missing id, invalid id, or no match)
    pub skipped: usize,
    /// Anxiety rows with a valid id but no demographics partner
    pub unmatched: usize,
    /// Distinct identifiers in the demographics lookup
    pub lookup_size: usize,
    /// One message per skipped demographics row and per rejected anxiety row
    pub warnings: Vec<String>,
}

/// Index demographics rows by their HID value.
///
/// Rows without a usable HID are skipped with a warning. When an HID repeats,
/// the last row in input order is kept.
pub fn build_lookup<'a>(
    demographics: &'a Dataset,
    warnings: &mut Vec<String>,
) -> HashMap<&'a str, &'a Row> {
    let mut lookup = HashMap::with_capacity(demographics.len());

    for (index, row) in demographics.rows.iter().enumerate() {
        match row.non_empty(HID_COLUMN) {
            Some(hid) => {
                if lookup.insert(hid, row).is_some() {
                    debug!("Demographics HID {} repeats at row {}, keeping the later row", hid, index + 1);
                }
            }
            None => {
                let message = format!(
                    "Demographics row {} skipped (missing or empty '{}' value)",
                    index + 1,
                    HID_COLUMN
                );
                warn!("{}", message);
                warnings.push(message);
            }
        }
    }

    lookup
}

/// Execute Stage 2: inner hash join of anxiety rows against demographics.
///
/// Each anxiety row gets its normalized id under `HID`; matched rows are
/// combined with their demographics row, demographics values winning on a
/// shared column.
pub fn execute_stage2(anxiety: &Dataset, demographics: &Dataset) -> Stage2Result {
    let mut result = Stage2Result::default();
    let lookup = build_lookup(demographics, &mut result.warnings);
    result.lookup_size = lookup.len();

    for (index, row) in anxiety.rows.iter().enumerate() {
        let hid = match resolve_row_id(row) {
            Ok(hid) => hid,
            Err(reason) => {
                let message = match reason {
                    SkipReason::MissingId => format!(
                        "Skipping anxiety row {}: '{}' is missing",
                        index + 1,
                        ANXIETY_ID_COLUMN
                    ),
                    SkipReason::InvalidId(err) => format!(
                        "Skipping anxiety row {} due to invalid '{}' format: {}",
                        index + 1,
                        ANXIETY_ID_COLUMN,
                        err
                    ),
                };
                warn!("{}", message);
                result.warnings.push(message);
                result.skipped += 1;
                continue;
            }
        };

        match lookup.get(hid.as_str()) {
            Some(partner) => {
                let mut keyed = row.clone();
                keyed.insert(HID_COLUMN, hid);
                result.merged.push(keyed.merged_with(partner));
            }
            None => {
                debug!("No matching demographic data found for HID: {}", hid);
                result.unmatched += 1;
                result.skipped += 1;
            }
        }
    }

    info!("Merged {} rows successfully", result.merged.len());
    result
}
