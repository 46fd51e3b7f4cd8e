use std::fmt;

/// Errors surfaced by outbound API calls.
///
/// Each variant maps to one phase of the request pipeline
/// (validate, dispatch, status check, decode). Nothing is retried
/// internally; every failure reaches the caller exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be built (malformed URL, method or header).
    InvalidInput(String),
    /// Network-level failure: DNS, refused connection, timeout, broken read.
    Transport(String),
    /// The server answered outside [200, 300). Carries the raw body.
    HttpStatus { code: u16, body: String },
    /// The response body was not valid JSON.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ApiError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ApiError::HttpStatus { code, body } => {
                write!(f, "HTTP error: {} - Response: {}", code, body)
            }
            ApiError::Decode(msg) => write!(f, "JSON decoding error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    /// Converts a `reqwest::Error` into an `ApiError`.
    ///
    /// Errors out of the transport layer (connect, timeout, body read)
    /// all land in `Transport`; decode failures never originate from
    /// reqwest here because bodies are parsed with `serde_json` directly.
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
