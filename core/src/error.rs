//! Error types for the RT REST 2.0 client.
//!
//! # Design
//! `InvalidField` is raised locally before any request exists, so callers can
//! tell a rejected field name apart from a server that said no. `NotFound`
//! gets a dedicated variant because callers frequently distinguish "the
//! resource does not exist" from "the server returned an unexpected status."
//! Every other status mismatch lands in `UnexpectedStatus` with the status the
//! operation expected, the status it got, and whatever body came back.

use serde_json::Value;
use thiserror::Error;

use crate::fields::ResourceKind;

/// Errors returned by `RtClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A supplied field name is not on the resource's allow-list. No request
    /// was built.
    #[error(
        "{field} is not a valid {resource} field; valid {resource} fields: {}",
        .allowed.join(", ")
    )]
    InvalidField {
        field: String,
        resource: ResourceKind,
        allowed: &'static [&'static str],
    },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound { body: Option<Value> },

    /// The server answered with a status other than the one the operation
    /// documents as success.
    #[error("HTTP {status} (expected {expected})")]
    UnexpectedStatus {
        expected: u16,
        status: u16,
        body: Option<Value>,
    },

    /// A successful response did not carry a field the operation returns.
    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The HTTP status that caused this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The error body returned by the server, parsed as JSON when possible.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::NotFound { body } | ApiError::UnexpectedStatus { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}
