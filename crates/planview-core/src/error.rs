use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanviewError>;

/// Unified error type for all planview core operations.
#[derive(Error, Debug)]
pub enum PlanviewError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("plan file not found: {0}")]
    PlanNotFound(String),

    #[error("not a plan file: {0}")]
    NotAPlanFile(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid planning mode: {0}")]
    InvalidMode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
