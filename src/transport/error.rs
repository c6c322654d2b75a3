use http::StatusCode;
use thiserror::Error;

/// Errors from executing one registry operation across an endpoint's attempt list.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The attempt list was empty after split/trim, or every attempt failed.
    #[error("no endpoint available: {0}")]
    NoEndpointAvailable(String),
    /// An attempt returned a response, but not the expected status code.
    #[error("expected status {expected} actual {actual}")]
    StatusMismatch {
        expected: StatusCode,
        actual: StatusCode,
    },
    /// A successful response's body did not parse into the expected shape.
    #[error("could not decode response body: {0}")]
    WireDecodeError(#[from] serde_json::Error),
}
