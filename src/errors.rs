use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// A request from the same controller is still pending.
    #[error("a request is already in flight")]
    Busy,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard(message.into())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
