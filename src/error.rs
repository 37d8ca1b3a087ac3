use std::path::PathBuf;

use thiserror::Error;

/// Every failure the remote can hit while talking to the player service.
///
/// None of these are fatal: the controller catches them at the call site,
/// logs them and turns them into a transient notice.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Server(String),
    #[error("unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Build a logical failure from the server's optional `error` message.
    pub fn server(message: Option<&str>, fallback: &str) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback);
        RemoteError::Server(message.to_string())
    }

    /// Whether the server answered and refused, as opposed to the request
    /// never completing.
    pub fn is_logical(&self) -> bool {
        matches!(self, RemoteError::Server(_))
    }
}
