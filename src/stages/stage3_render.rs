use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::MergeError;
use crate::io::{serialize, ObjectStorage, CSV_CONTENT_TYPE};
use crate::models::{Dataset, Row};

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct Stage3Result {
    /// Key written in the output bucket
    pub output_key: String,
}

/// Execute Stage 3: render the merged rows as CSV and store them.
///
/// When nothing merged, the header is taken from the source datasets so the
/// output still carries a schema.
pub async fn execute_stage3<S: ObjectStorage>(
    storage: &S,
    config: &PipelineConfig,
    merged: &[Row],
    sources: &[&Dataset],
) -> Result<Stage3Result, MergeError> {
    if merged.is_empty() {
        warn!("No rows merged. Output file will contain only headers");
    }

    let body = serialize(merged, sources).map_err(MergeError::Render)?.into_bytes();
    let bytes_written = body.len();

    storage
        .store(&config.output_bucket, &config.output_key, body, CSV_CONTENT_TYPE)
        .await
        .map_err(|e| MergeError::from_storage(&config.output_bucket, &config.output_key, e))?;

    info!(
        "Wrote merged file ({} bytes) to s3://{}/{}",
        bytes_written, config.output_bucket, config.output_key
    );

    Ok(Stage3Result {
        output_key: config.output_key.clone(),
    })
}
