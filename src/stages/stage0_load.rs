use tracing::info;

use crate::config::PipelineConfig;
use crate::error::MergeError;
use crate::io::{load, ObjectStorage};
use crate::models::Dataset;

/// Both source datasets, as read from the input bucket
#[derive(Debug)]
pub struct Stage0Result {
    pub anxiety: Dataset,
    pub demographics: Dataset,
}

/// Execute Stage 0: fetch and parse the anxiety and demographics CSVs
pub async fn execute_stage0<S: ObjectStorage>(
    storage: &S,
    config: &PipelineConfig,
) -> Result<Stage0Result, MergeError> {
    let anxiety = load(storage, &config.input_bucket, &config.anxiety_key).await?;
    let demographics = load(storage, &config.input_bucket, &config.demographics_key).await?;

    info!("Read {} rows from {}", anxiety.len(), config.anxiety_key);
    info!("Read {} rows from {}", demographics.len(), config.demographics_key);

    Ok(Stage0Result {
        anxiety,
        demographics,
    })
}
