use crate::error::MergeError;

/// Output key used when OUTPUT_KEY is not set
pub const DEFAULT_OUTPUT_KEY: &str = "processed/merged.csv";

const INPUT_BUCKET: &str = "INPUT_BUCKET";
const OUTPUT_BUCKET: &str = "OUTPUT_BUCKET";
const ANXIETY_KEY: &str = "ANXIETY_KEY";
const DEMOGRAPHICS_KEY: &str = "DEMOGRAPHICS_KEY";
const OUTPUT_KEY: &str = "OUTPUT_KEY";

/// Configuration for a single merge invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bucket holding both source CSVs (INPUT_BUCKET)
    pub input_bucket: String,
    /// Bucket receiving the merged CSV (OUTPUT_BUCKET)
    pub output_bucket: String,
    /// Key of the anxiety CSV (ANXIETY_KEY)
    pub anxiety_key: String,
    /// Key of the demographics CSV (DEMOGRAPHICS_KEY)
    pub demographics_key: String,
    /// Key of the merged CSV (OUTPUT_KEY)
    pub output_key: String,
}

impl PipelineConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, MergeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any name lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MergeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            let value = get(name);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let input_bucket = require(INPUT_BUCKET);
        let output_bucket = require(OUTPUT_BUCKET);
        let anxiety_key = require(ANXIETY_KEY);
        let demographics_key = require(DEMOGRAPHICS_KEY);

        if !missing.is_empty() {
            return Err(MergeError::Configuration { missing });
        }

        Ok(Self {
            input_bucket,
            output_bucket,
            anxiety_key,
            demographics_key,
            output_key: get(OUTPUT_KEY).unwrap_or_else(|| DEFAULT_OUTPUT_KEY.to_string()),
        })
    }
}
