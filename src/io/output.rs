use std::collections::BTreeSet;

use crate::models::{Dataset, Row};

/// Output header: union of the merged rows' columns, or of the fallback
/// datasets' columns when nothing merged. Sorted ascending either way.
pub fn output_header(rows: &[Row], fallback: &[&Dataset]) -> Vec<String> {
    let mut columns = BTreeSet::new();
    if rows.is_empty() {
        for dataset in fallback {
            columns.extend(dataset.column_names());
        }
    } else {
        for row in rows {
            columns.extend(row.columns().map(str::to_string));
        }
    }
    columns.into_iter().collect()
}

/// Render rows as CSV text with a sorted header line.
///
/// Columns a row lacks are written as empty fields. With no columns at all
/// there is no header to write and the output is empty.
pub fn serialize(rows: &[Row], fallback: &[&Dataset]) -> Result<String, csv::Error> {
    let header = output_header(rows, fallback);
    if header.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&header)?;
    for row in rows {
        writer.write_record(header.iter().map(|column| row.get(column).unwrap_or("")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    // every field came from a &str, so the buffer is valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::input::parse_csv;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_header_sorted_and_missing_columns_blank() {
        let rows = vec![
            row(&[("HID", "001-15"), ("Score", "5"), ("Age", "34")]),
            row(&[("HID", "002-15"), ("Gender", "F")]),
        ];

        let csv = serialize(&rows, &[]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Age,Gender,HID,Score");
        assert_eq!(lines[1], "34,,001-15,5");
        assert_eq!(lines[2], ",F,002-15,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_rows_use_fallback_header() {
        let anxiety = parse_csv("Homeless ID,Score\n").unwrap();
        let demographics = parse_csv("HID,Age\nABC,30\n").unwrap();

        let csv = serialize(&[], &[&anxiety, &demographics]).unwrap();

        assert_eq!(csv, "Age,HID,Homeless ID,Score\n");
    }

    #[test]
    fn test_no_columns_anywhere() {
        let csv = serialize(&[], &[&Dataset::default()]).unwrap();
        assert!(csv.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let rows = vec![
            row(&[("HID", "001-15"), ("Note", "likes, commas"), ("Quote", "say \"hi\"")]),
            row(&[("HID", "002-15"), ("Note", "line\nbreak"), ("Quote", "")]),
        ];

        let csv = serialize(&rows, &[]).unwrap();
        let parsed = parse_csv(&csv).unwrap();

        assert_eq!(parsed.headers, vec!["HID", "Note", "Quote"]);
        assert_eq!(parsed.rows, rows);
    }
}
