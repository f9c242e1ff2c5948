pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use config::{PipelineConfig, DEFAULT_OUTPUT_KEY};
pub use error::{ErrorKind, MergeError, StorageError};
pub use io::{load, parse_csv, parse_csv_file, serialize, ObjectStorage, ObjectStoreStorage};
pub use models::{CanonicalId, Dataset, InvalidIdentifier, Outcome, PipelineReport, Row, Status};
pub use pipeline::{execute, handle};
pub use stages::{
    execute_stage0, execute_stage2, execute_stage3, normalize, resolve_row_id, SkipReason,
};
