//! Error types shared by the discovery and playlist pipelines

use serde::Deserialize;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for discovery and playlist operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} API key is required")]
    MissingApiKey(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("JSON parse failed: {0}")]
    ParseFailed(String),

    #[error("No tracks found under `playlist` or `songs`")]
    NoTracks,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error envelope used by the YouTube, OpenAI and Gemini APIs
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl Error {
    /// Error for a non-success response, carrying the API's own message when it sent one
    pub(crate) fn upstream(service: &'static str, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        Error::Upstream {
            service,
            status,
            message,
        }
    }

    /// Message shown to the user at the end of a failed action
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingApiKey(service) => format!("Please enter your {} API key.", service),
            Error::ParseFailed(detail) => format!(
                "Could not read the JSON. Make sure you copied the whole code block to the end. ({})",
                detail
            ),
            Error::NoTracks => {
                "No track data found. Check that the JSON has a `playlist` (or `songs`) list.".to_string()
            }
            Error::Upstream { .. } | Error::Http(_) | Error::UnexpectedResponse(_) => {
                format!("API error: {}", self)
            }
            other => format!("Error: {}", other),
        }
    }

    /// True when the failure happened before any network call was attempted
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::MissingApiKey(_) | Error::InvalidParameter(_))
    }
}
