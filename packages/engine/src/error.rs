use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed engine response: {0}")]
    MalformedResponse(String),

    #[error("Engine returned {actual} tokens for {expected} jobs")]
    TokenCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
