use std::time::Duration;

use reqwest::StatusCode;

/// Everything that can go wrong while turning a stop ID into a stop record.
///
/// The `Display` text is what the user gets to see.
#[derive(thiserror::Error, Debug)]
pub enum ResolutionError {
    #[error("Failed to reach the stop lookup service. Please try again.")]
    Http(#[source] reqwest::Error),

    #[error("The stop lookup service answered with {status}. Please check the ID.")]
    Status { status: StatusCode, body: String },

    #[error("The stop lookup took longer than {} seconds.", .0.as_secs())]
    Timeout(Duration),

    #[error("No stop was found for this ID. Please check the ID.")]
    EmptyResponse,

    #[error("Failed to read the bus stop data. Please check the ID.")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("The bus stop data has an invalid {field} ({value}). Please check the ID.")]
    InvalidCoordinate { field: &'static str, value: f64 },
}

impl ResolutionError {
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ResolutionError::Timeout(timeout)
        } else {
            ResolutionError::Http(err)
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or API_KEY) is not set")]
    MissingApiKey,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
