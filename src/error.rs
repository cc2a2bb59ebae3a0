//! Error types used across the library.

use thiserror::Error;

/// The error type returned by pretty much everything in the library.
///
/// You can match on the variant to figure out what went wrong. The first five
/// variants come from the object model and the gateway handshake; the rest are
/// transport failures bubbling up from the REST and WebSocket clients.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A model was connected with an empty or non-numeric snowflake.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The entity is read only, or the field is locked (explicitly, or
    /// because it is an ID, a date or a nested object).
    #[error("Field \"{field}\" of {entity} is read only")]
    ImmutableField { entity: &'static str, field: String },

    /// The factory was asked for a type it doesn't know, or for a type of the
    /// wrong category (an entity through `connect_model`, or the reverse).
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Anything that goes wrong during the identify handshake. `payload`
    /// holds the raw frame the gateway sent, when there was one.
    #[error("Gateway error: {message}{}", payload_suffix(.payload))]
    Gateway {
        message: String,
        payload: Option<String>,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Not for bad status codes like 403 or 404 -- those show up as
    /// [`Api`](ClientError::Api). This is for transport-level stuff like
    /// DNS failures, TLS errors, timeouts, etc.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The string contains the status and body, like
    /// `"HTTP 403: {\"message\": \"Missing Permissions\"}"`.
    #[error("API error: {0}")]
    Api(String),
}

impl ClientError {
    pub(crate) fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
            payload: None,
        }
    }

    pub(crate) fn gateway_with_payload(message: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
            payload: Some(payload.into()),
        }
    }

    /// The raw gateway frame attached to a [`Gateway`](ClientError::Gateway) error.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Gateway { payload, .. } => payload.as_deref(),
            _ => None,
        }
    }
}

fn payload_suffix(payload: &Option<String>) -> String {
    payload
        .as_deref()
        .map(|p| format!(" with response:\n{p}"))
        .unwrap_or_default()
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_includes_payload() {
        let err = ClientError::gateway_with_payload("Bad response from gateway", "{\"op\":5}");
        assert_eq!(err.payload(), Some("{\"op\":5}"));
        assert!(err.to_string().contains("{\"op\":5}"));
    }

    #[test]
    fn test_immutable_field_names_field() {
        let err = ClientError::ImmutableField {
            entity: "Message",
            field: "author".into(),
        };
        assert_eq!(err.to_string(), "Field \"author\" of Message is read only");
    }
}
