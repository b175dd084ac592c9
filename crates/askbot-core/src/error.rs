use reqwest::StatusCode;
use thiserror::Error;

/// Shown when the endpoint cannot be reached at all.
pub const CONNECTIVITY_MESSAGE: &str =
    "Cannot connect to the server. Please check if the chat backend is running.";

/// Shown for every other failure.
pub const GENERIC_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

/// Errors raised while asking the remote responder.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("could not reach the responder: {0}")]
    Connect(String),

    #[error("responder returned HTTP {0}")]
    Status(StatusCode),

    #[error("malformed responder reply: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl AskError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, AskError::Connect(_))
    }

    /// The text appended to the transcript for this failure.
    pub fn user_message(&self) -> &'static str {
        if self.is_connectivity() {
            CONNECTIVITY_MESSAGE
        } else {
            GENERIC_MESSAGE
        }
    }
}
