//! Error types for the remote API boundary.
//!
//! Every remote call funnels its failures into [`ApiError`]. Callers never let
//! these escape to the composition root; they are projected into session state
//! (banner, file-operation message) at the point of the call.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for remote calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures of the request/response plumbing, as opposed to failures of the
/// executed program itself.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend could not be reached at all (refused, DNS, reset before reply).
    #[error("Network error: Could not connect to the backend. Please ensure the backend is running.")]
    Connect,

    /// No response within the configured bound.
    #[error("Request timed out after {}", humantime::format_duration(*after))]
    Timeout { after: Duration },

    /// Non-2xx reply. `detail` comes from the `{detail}` body when present.
    #[error("{}", status_message(*status, detail.as_deref()))]
    Status { status: u16, detail: Option<String> },

    /// 2xx reply whose body did not match the expected shape.
    #[error("Unexpected response from backend: {message}")]
    Decode { message: String },

    /// Any other transport failure reported by the HTTP client.
    #[error("Request failed: {message}")]
    Request { message: String },
}

fn status_message(status: u16, detail: Option<&str>) -> String {
    match detail {
        Some(d) if !d.trim().is_empty() => d.to_string(),
        _ => format!("HTTP error! status: {status}"),
    }
}

impl ApiError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Text shown to the user in a banner or status line.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// True when the remote side answered with "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ApiError::Connect
        } else if e.is_decode() {
            ApiError::decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            ApiError::request(e.to_string())
        }
    }
}
