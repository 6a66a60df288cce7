use thiserror::Error;

pub type Result<T> = std::result::Result<T, TagnetError>;

#[derive(Error, Debug)]
pub enum TagnetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
