use serde::Serialize;
use thiserror::Error;

/// Failure reported by the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("no store configured for bucket '{0}'")]
    UnknownBucket(String),

    #[error("failed to create store for bucket '{bucket}'")]
    Connect {
        bucket: String,
        #[source]
        source: object_store::Error,
    },

    #[error("failed to prepare local bucket directory {path:?}")]
    LocalRoot {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid object key '{key}' for bucket '{bucket}'")]
    InvalidKey {
        bucket: String,
        key: String,
        #[source]
        source: object_store::path::Error,
    },

    #[error("storage request for s3://{bucket}/{key} failed")]
    Backend {
        bucket: String,
        key: String,
        #[source]
        source: object_store::Error,
    },
}

/// Fatal errors. Any of these ends the invocation with a `failed` outcome.
#[derive(Debug, Error)]
pub enum MergeError {
    // ── Configuration ─────────────────────────────────────────────────────────
    #[error("missing required configuration: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    // ── Storage ───────────────────────────────────────────────────────────────
    #[error("CSV file not found: {key} in bucket {bucket}")]
    NotFound { bucket: String, key: String },

    #[error("failed to set up object storage")]
    Connect(#[source] StorageError),

    #[error("storage error on s3://{bucket}/{key}")]
    Storage {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    // ── CSV ───────────────────────────────────────────────────────────────────
    #[error("s3://{bucket}/{key} is not valid UTF-8")]
    Decode {
        bucket: String,
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("malformed CSV in s3://{bucket}/{key}")]
    Csv {
        bucket: String,
        key: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render merged CSV")]
    Render(#[source] csv::Error),
}

/// Coarse classification surfaced in the outcome record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    NotFound,
    Io,
}

impl MergeError {
    /// Wrap a storage failure, keeping a missing object distinct from other I/O.
    pub fn from_storage(bucket: &str, key: &str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { bucket, key } => MergeError::NotFound { bucket, key },
            other => MergeError::Storage {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: other,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MergeError::Configuration { .. } => ErrorKind::Configuration,
            MergeError::NotFound { .. } => ErrorKind::NotFound,
            MergeError::Connect(_)
            | MergeError::Storage { .. }
            | MergeError::Decode { .. }
            | MergeError::Csv { .. }
            | MergeError::Render(_) => ErrorKind::Io,
        }
    }
}
