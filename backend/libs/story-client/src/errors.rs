use thiserror::Error;

/// Story client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Story API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode story API response: {0}")]
    Decode(String),

    /// Action reserved for the story's owner
    #[error("Only the owner can delete this story")]
    NotOwner,

    /// The viewer has no story open to act on
    #[error("No story is open")]
    NothingOpen,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
