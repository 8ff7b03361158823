//! Typed failures at the HTTP boundary.

use serde::Deserialize;
use thiserror::Error;

/// Shown when the backend gives no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a backend call can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 on any authenticated call.
    #[error("Not signed in or session expired. Run `taskify login` first.")]
    Unauthorized,

    /// 401 on the login call itself.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to API at {0}. Is the backend running?")]
    Connect(String),

    #[error("Failed to decode API response: {0}")]
    Decode(String),

    #[error("Failed to send request: {0}")]
    Transport(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Map a non-success status and its body to an error.
    pub fn from_status(status: u16, body: &str, path: &str) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(path.to_string()),
            _ => ApiError::Status {
                status,
                message: extract_message(body)
                    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            },
        }
    }

    /// Whether the server rejected the bearer token, so the user has to sign in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Pull `message` out of a JSON error body.
pub fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
