use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the leaders API.
///
/// `Transport` and `Malformed` are absorbed by the chat session and
/// rendered inline. `Unauthorized` is returned to the caller so it can
/// send the user back through login.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Not authorized ({status}): {message}")]
    Unauthorized { status: StatusCode, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// The reason to show the user: the server's own message when it
    /// sent one.
    pub fn reason(&self) -> String {
        match self {
            ApiError::Transport(e) => e.to_string(),
            ApiError::Status { message, .. } | ApiError::Unauthorized { message, .. } => {
                message.clone()
            }
            ApiError::Malformed(_) => "Unexpected response from the server".to_string(),
        }
    }
}
