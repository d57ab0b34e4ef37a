//! Error types for the Pingdom API client.

use serde::Deserialize;
use thiserror::Error;

/// Base error type for Pingdom operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable credential, or some other unusable client setting.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Connection or protocol failure reported by the transport.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response carrying the service's error envelope.
    #[error("Pingdom error: {0}")]
    Pingdom(#[from] PingdomError),

    /// Malformed JSON in a success or error body.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No destination provided for response body")]
    NoDestination,

    /// A 2xx response whose body could not be decoded. Carries the response
    /// so the status, headers and body stay available.
    #[error("Failed to decode {} response: {source}", .response.status())]
    Decode {
        response: Box<crate::request::RawResponse>,
        #[source]
        source: Box<Error>,
    },

    /// A payload was rejected before being sent.
    #[error("Invalid value for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// The raw response attached to a decode failure.
    pub fn response(&self) -> Option<&crate::request::RawResponse> {
        match self {
            Error::Decode { response, .. } => Some(&**response),
            _ => None,
        }
    }

    /// The service error envelope, if this is one.
    pub fn as_pingdom(&self) -> Option<&PingdomError> {
        match self {
            Error::Pingdom(e) => Some(e),
            _ => None,
        }
    }
}

/// Error envelope returned by the API on non-2xx responses.
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[error("{status_code} {status_desc}: {message}")]
pub struct PingdomError {
    #[serde(rename = "statuscode")]
    pub status_code: u16,
    #[serde(rename = "statusdesc")]
    pub status_desc: String,
    #[serde(rename = "errormessage")]
    pub message: String,
}

impl PingdomError {
    pub fn new(
        status_code: u16,
        status_desc: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            status_desc: status_desc.into(),
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: PingdomError,
}
