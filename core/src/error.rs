//! Error types for the Crisp API client.
//!
//! # Design
//! Two families live in one enum. `InvalidArgument` and `NotImplemented` are
//! raised while composing a request, before the transport is ever invoked.
//! The remaining variants describe transport failures surfaced by
//! `CrispClient::parse_*` once the host has executed the round-trip.

use thiserror::Error;

/// Errors returned by resources and by `CrispClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A parameter was rejected before any request was built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation exists but its endpoint is not wired yet.
    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The server answered 2xx but flagged the envelope with `error: true`.
    #[error("service error: {reason}")]
    Service { reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}
