use crate::remote::error::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("malformed identifier: '{0}' does not end in a numeric path segment")]
    MalformedIdentifier(String),

    #[error("invalid page size {0}: limit must be at least 1")]
    InvalidPageSize(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogueError {
    /// The transport failure behind this error, if any.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            CatalogueError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogueError>;
