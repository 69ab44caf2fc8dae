use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API url `{url}`")]
    InvalidUrl { url: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned error status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}
