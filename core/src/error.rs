//! Error types for the HubSpot contacts client.
//!
//! # Design
//! Client errors (4xx) carry the vendor's message verbatim so callers see
//! exactly what HubSpot said about the offending property. Every other
//! unexpected status lands in `HttpError` with the raw status code and body.
//! Formatting failures are reported before any request is sent.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by `HubspotClient` and the top-level operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HubSpot rejected the request as invalid (any 4xx).
    #[error("{message}")]
    Client {
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    /// HubSpot returned a status that is neither the expected one nor a 4xx.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The transport could not complete the round-trip. The underlying
    /// error is kept as the source so callers can downcast it.
    #[error("transport failed for {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A local value cannot be coerced into its declared property type.
    #[error("invalid value for property {property:?}: {reason}")]
    InvalidPropertyValue { property: String, reason: String },

    /// The property is not declared and unknown properties are rejected.
    #[error("property {0:?} is not defined")]
    UnknownProperty(String),

    /// Updating a contact requires the VID assigned by HubSpot.
    #[error("contact has no vid")]
    MissingVid,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    pub fn transport(path: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ApiError::Transport {
            path: path.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid_value(property: &str, reason: impl Into<String>) -> Self {
        ApiError::InvalidPropertyValue {
            property: property.to_string(),
            reason: reason.into(),
        }
    }

    /// Build a `Client` error from a 4xx response body.
    ///
    /// HubSpot answers with `{"status":"error","message":..,"requestId":..}`;
    /// anything else is kept as the message unchanged. `correlation_header`
    /// is used as the request id when the body carries none.
    pub(crate) fn from_client_response(status: u16, body: &str, correlation_header: Option<&str>) -> Self {
        let header = correlation_header.map(str::to_string);
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => ApiError::Client {
                status,
                message: parsed.message,
                request_id: parsed.request_id.or(parsed.correlation_id).or(header),
            },
            Err(_) => ApiError::Client {
                status,
                message: body.to_string(),
                request_id: header,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: String,
    request_id: Option<String>,
    correlation_id: Option<String>,
}
