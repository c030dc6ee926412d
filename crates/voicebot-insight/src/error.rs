use thiserror::Error;

/// Errors that can occur in the metrics and report pipeline.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("data source unavailable: {0}")]
    DataSourceUnavailable(String),
    #[error("data source not configured")]
    NotConfigured,
    #[error("chart error ({chart}): {reason}")]
    Chart { chart: String, reason: String },
    #[error("document error: {0}")]
    Document(String),
    #[error("artifact error: {0}")]
    Artifact(String),
    #[error("report stage {stage} failed: {reason}")]
    StageFailed { stage: String, reason: String },
    #[error("report compilation superseded")]
    Superseded,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        InsightError::Document(err.to_string())
    }
}
