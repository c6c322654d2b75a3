use thiserror::Error;

use crate::transport::TransportError;

/// Errors from the registration agent's public operations.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// `change_status` was called with a value outside `{UP, DOWN, STARTING, OUT_OF_SERVICE, UNKNOWN}`.
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    /// `registry_enabled` is false; every mutating operation short-circuits to this.
    #[error("registry feature is disabled")]
    FeatureDisabled,
    #[error(transparent)]
    Transport(#[from] TransportError),
}
