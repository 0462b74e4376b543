//! Errors surfaced by `Session`.
//!
//! # Design
//! Contract failures (bad field names, unexpected statuses) come from
//! `rt-core` unchanged. Transport failures are ureq's own error and are not
//! translated, so callers see exactly what the network layer reported.

use rt_core::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Validation or status failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Network unreachable, TLS failure and the like.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The file to upload could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The HTTP status behind this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => err.status(),
            _ => None,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }
}
