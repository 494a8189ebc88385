use thiserror::Error;

#[derive(Error, Debug)]
pub enum CiboardError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("GitLab API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No project found with name: {0}")]
    ProjectNotFound(String),

    #[error("Project search '{query}' is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousProject {
        query: String,
        candidates: Vec<String>,
    },

    #[error("Pipeline {0} not found in any tracked project")]
    PipelineNotFound(u64),

    #[error("Cutoff time does not exist in the reference time zone: {0}")]
    InvalidCutoff(String),
}

pub type Result<T> = std::result::Result<T, CiboardError>;
