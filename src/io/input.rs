use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::error::MergeError;
use crate::io::store::ObjectStorage;
use crate::models::{Dataset, Row};

/// Fetch an object and parse it as a headed CSV document
pub async fn load<S: ObjectStorage>(
    storage: &S,
    bucket: &str,
    key: &str,
) -> Result<Dataset, MergeError> {
    info!("Reading s3://{}/{}", bucket, key);

    let bytes = storage
        .fetch(bucket, key)
        .await
        .map_err(|e| MergeError::from_storage(bucket, key, e))?;

    let text = String::from_utf8(bytes).map_err(|source| MergeError::Decode {
        bucket: bucket.to_string(),
        key: key.to_string(),
        source,
    })?;

    parse_csv(&text).map_err(|source| MergeError::Csv {
        bucket: bucket.to_string(),
        key: key.to_string(),
        source,
    })
}

/// Parse a local CSV file into a Dataset
pub fn parse_csv_file(path: &Path) -> Result<Dataset> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_csv(&content).with_context(|| format!("Failed to parse CSV: {:?}", path))
}

/// Parse CSV text whose first line is the header.
///
/// Short records are padded with empty strings, surplus fields are dropped,
/// and when a header name repeats the later column wins.
pub fn parse_csv(text: &str) -> Result<Dataset, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            debug!(
                "Record {} has {} fields for {} columns, dropping the surplus",
                index + 1,
                record.len(),
                headers.len()
            );
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok(Dataset { headers, rows })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::{ErrorKind, StorageError};

    #[derive(Default)]
    struct FixedStorage {
        objects: HashMap<(String, String), Vec<u8>>,
    }

    impl FixedStorage {
        fn with(mut self, bucket: &str, key: &str, body: &[u8]) -> Self {
            self.objects
                .insert((bucket.to_string(), key.to_string()), body.to_vec());
            self
        }
    }

    impl ObjectStorage for FixedStorage {
        async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
            self.objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| StorageError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
        }

        async fn store(
            &self,
            _bucket: &str,
            _key: &str,
            _body: Vec<u8>,
            _content_type: &str,
        ) -> Result<(), StorageError> {
            unreachable!("loader never stores")
        }
    }

    #[test]
    fn test_parse_csv() {
        let dataset = parse_csv("Homeless ID,Score\nHM15-1,5\nHM15-2,7\n").unwrap();

        assert_eq!(dataset.headers, vec!["Homeless ID", "Score"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows[0].get("Homeless ID"), Some("HM15-1"));
        assert_eq!(dataset.rows[1].get("Score"), Some("7"));
    }

    #[test]
    fn test_parse_csv_quoting() {
        let dataset = parse_csv("HID,Note\n001-15,\"likes, commas\"\n002-15,\"say \"\"hi\"\"\"\n")
            .unwrap();

        assert_eq!(dataset.rows[0].get("Note"), Some("likes, commas"));
        assert_eq!(dataset.rows[1].get("Note"), Some("say \"hi\""));
    }

    #[test]
    fn test_short_rows_padded_and_long_rows_trimmed() {
        let dataset = parse_csv("HID,Age,Gender\n001-15\n002-15,40,F,extra\n").unwrap();

        assert_eq!(dataset.rows[0].get("Age"), Some(""));
        assert_eq!(dataset.rows[0].get("Gender"), Some(""));
        assert_eq!(dataset.rows[1].get("Gender"), Some("F"));
        assert_eq!(dataset.rows[1].len(), 3);
    }

    #[test]
    fn test_duplicate_header_later_column_wins() {
        let dataset = parse_csv("HID,Age,Age\n001-15,30,31\n").unwrap();
        assert_eq!(dataset.rows[0].get("Age"), Some("31"));
        assert_eq!(dataset.rows[0].len(), 2);
    }

    #[test]
    fn test_header_only_and_empty_input() {
        let dataset = parse_csv("HID,Age\n").unwrap();
        assert_eq!(dataset.headers, vec!["HID", "Age"]);
        assert!(dataset.is_empty());

        let dataset = parse_csv("").unwrap();
        assert!(dataset.headers.is_empty());
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_storage() {
        let storage = FixedStorage::default().with("raw", "demo.csv", b"HID,Age\n001-15,34\n");

        let dataset = load(&storage, "raw", "demo.csv").await.unwrap();
        assert_eq!(dataset.rows[0].get("Age"), Some("34"));
    }

    #[tokio::test]
    async fn test_load_missing_object() {
        let storage = FixedStorage::default();

        let err = load(&storage, "raw", "demo.csv").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "CSV file not found: demo.csv in bucket raw");
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_utf8() {
        let storage = FixedStorage::default().with("raw", "demo.csv", b"HID\n\xff\xfe");

        let err = load(&storage, "raw", "demo.csv").await.unwrap_err();
        assert!(matches!(err, MergeError::Decode { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
