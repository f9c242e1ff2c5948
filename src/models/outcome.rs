use serde::Serialize;

use crate::error::{ErrorKind, MergeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// Structured result of one invocation, printed as JSON by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub status: Status,
    pub run_id: String,
    /// Key written in the output bucket (success only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    /// Human-readable error chain (failure only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub rows_merged: usize,
    pub rows_skipped: usize,
    pub warnings: usize,
    pub finished_at: String,
}

/// Counters reported by a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub output_key: String,
    pub rows_merged: usize,
    pub rows_skipped: usize,
    pub warnings: usize,
}

impl Outcome {
    pub fn success(run_id: &str, report: PipelineReport) -> Self {
        Self {
            status: Status::Success,
            run_id: run_id.to_string(),
            output_key: Some(report.output_key),
            message: None,
            error_kind: None,
            rows_merged: report.rows_merged,
            rows_skipped: report.rows_skipped,
            warnings: report.warnings,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn failed(run_id: &str, err: MergeError) -> Self {
        let kind = err.kind();
        Self {
            status: Status::Failed,
            run_id: run_id.to_string(),
            output_key: None,
            message: Some(format!("{:#}", anyhow::Error::new(err))),
            error_kind: Some(kind),
            rows_merged: 0,
            rows_skipped: 0,
            warnings: 0,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_json_omits_failure_fields() {
        let outcome = Outcome::success(
            "run-1",
            PipelineReport {
                output_key: "processed/merged.csv".to_string(),
                rows_merged: 2,
                rows_skipped: 1,
                warnings: 1,
            },
        );

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["output_key"], "processed/merged.csv");
        assert_eq!(json["rows_merged"], 2);
        assert!(json.get("message").is_none());
        assert!(json.get("error_kind").is_none());
    }

    #[test]
    fn test_failed_json_carries_message_and_kind() {
        let outcome = Outcome::failed(
            "run-2",
            MergeError::NotFound {
                bucket: "raw".to_string(),
                key: "anxiety.csv".to_string(),
            },
        );

        assert!(!outcome.is_success());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_kind"], "not_found");
        assert_eq!(json["message"], "CSV file not found: anxiety.csv in bucket raw");
        assert!(json.get("output_key").is_none());
    }
}
