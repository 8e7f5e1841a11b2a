use thiserror::Error;

/// Errors that can occur when talking to the inventory API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The backend answered with a non-success status
    #[error("API error {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Credentials were rejected and no session was stored
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The stored token was rejected; stored credentials have been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Reading or writing stored credentials failed
    #[error("Credential storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status of the failure, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized(_) | ApiError::SessionExpired => Some(401),
            _ => None,
        }
    }
}
