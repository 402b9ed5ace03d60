use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("home directory not found")]
    NoHomeDir,

    #[error("io error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Other(String),
}
