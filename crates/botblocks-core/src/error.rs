use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("action not found: {0}")]
    ActionNotFound(u64),

    #[error("unknown block kind: {0}")]
    UnknownKind(String),

    #[error("invalid direction '{0}': expected forward or backward")]
    InvalidDirection(String),

    #[error("unknown field '{field}' for {kind} block")]
    UnknownField { kind: String, field: String },

    #[error("invalid patch for action {id}: {reason}")]
    InvalidPatch { id: u64, reason: String },

    #[error("invalid robot url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
