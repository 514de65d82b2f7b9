use std::time::Duration;

use thiserror::Error;

/// The only failure that leaves the core: the dataset never became usable.
/// Validation drops, unknown labels and empty selections are absorbed with
/// fallback values instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to load dataset {origin}: {cause:#}")]
    Load { origin: String, cause: anyhow::Error },

    #[error("dataset {origin} was not ready within {timeout:?}")]
    Timeout { origin: String, timeout: Duration },

    #[error("loading dataset {origin} was aborted: {reason}")]
    Aborted { origin: String, reason: String },
}

pub type IngestResult<T> = Result<T, IngestError>;
