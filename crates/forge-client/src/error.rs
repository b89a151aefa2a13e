use thiserror::Error;

/// Errors surfaced by console API operations.
///
/// Server-reported failures keep the response body's message verbatim;
/// callers decide how to present it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not read {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("variable name must not be empty")]
    EmptyKey,
}

pub type Result<T> = std::result::Result<T, ClientError>;
