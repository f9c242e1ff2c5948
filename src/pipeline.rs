//! Orchestration of one merge invocation.
//!
//! [`execute`] runs the stages and propagates fatal errors; [`handle`] is the
//! top level that turns every fatal error into a `failed` [`Outcome`].

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::MergeError;
use crate::io::ObjectStorage;
use crate::models::{Outcome, PipelineReport};
use crate::stages::{execute_stage0, execute_stage2, execute_stage3};

/// Load both inputs, join them and store the merged CSV
pub async fn execute<S: ObjectStorage>(
    storage: &S,
    config: &PipelineConfig,
) -> Result<PipelineReport, MergeError> {
    // Stage 0: Load
    let loaded = execute_stage0(storage, config).await?;

    // Stage 1 & 2: Normalize and join
    let joined = execute_stage2(&loaded.anxiety, &loaded.demographics);
    info!(
        "Join: {} merged, {} skipped ({} unmatched), {} warnings",
        joined.merged.len(),
        joined.skipped,
        joined.unmatched,
        joined.warnings.len()
    );

    // Stage 3: Render and store
    let rendered = execute_stage3(
        storage,
        config,
        &joined.merged,
        &[&loaded.anxiety, &loaded.demographics],
    )
    .await?;

    Ok(PipelineReport {
        output_key: rendered.output_key,
        rows_merged: joined.merged.len(),
        rows_skipped: joined.skipped,
        warnings: joined.warnings.len(),
    })
}

/// Run one invocation and report its outcome.
///
/// A configuration error is reported before `connect` is called, so no
/// storage is touched. The storage handle lives only for this invocation.
pub async fn handle<S, F>(config: Result<PipelineConfig, MergeError>, connect: F) -> Outcome
where
    S: ObjectStorage,
    F: FnOnce(&PipelineConfig) -> Result<S, MergeError>,
{
    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("merge", run_id = %run_id);

    async move {
        info!("Merge triggered");

        let result = async move {
            let config = config?;
            let storage = connect(&config)?;
            execute(&storage, &config).await
        }
        .await;

        match result {
            Ok(report) => Outcome::success(&run_id, report),
            Err(err) => {
                let outcome = Outcome::failed(&run_id, err);
                error!(
                    "An error occurred: {}",
                    outcome.message.as_deref().unwrap_or_default()
                );
                outcome
            }
        }
    }
    .instrument(span)
    .await
}
