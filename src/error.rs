use thiserror::Error;

/// Errors returned by fetch and render operations.
///
/// Cache failures never show up here: a broken cache only costs latency.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote answered with a not-found status
    #[error("Resource not found at '{url}'")]
    NotFound { url: String },

    /// Any other unsuccessful status, or an error envelope inside a JSON body
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Raw error object returned by the API, when there was one
        payload: Option<serde_json::Value>,
    },

    /// A structured fetch got a body that is not a JSON object
    #[error("Expected a JSON object from '{url}'\nResponse Body (truncated): {body}")]
    NotJson {
        url: String,
        /// Truncated copy of the offending body
        body: String,
    },

    /// Transport-level failure while sending the request or reading the body
    #[error("Network error while fetching '{url}': {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A success status with nothing in the body
    #[error("Received empty response body for '{url}'")]
    EmptyBody { url: String },

    /// A content unit's text location is missing or does not resolve
    #[error("Invalid text location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the raw API payload carried by an `Api` error
    pub fn api_payload(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Api { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}
