use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Api {
        status: u16,
        message: Option<String>,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unreadable access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl ClientError {
    /// The message the server put in its `{ "error": ... }` body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
