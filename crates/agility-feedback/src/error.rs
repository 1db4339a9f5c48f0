// error.rs - Error types for generation and feedback flows.

use agility_ticket::TicketError;

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("API key not found: set the {var} environment variable")]
    MissingApiKey { var: String },

    #[error("model request failed: {0}")]
    Http(String),

    #[error("model service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("unexpected model response: {0}")]
    ModelResponse(String),

    #[error("invalid config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ticket(#[from] TicketError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FeedbackError {
    fn from(err: reqwest::Error) -> Self {
        FeedbackError::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
