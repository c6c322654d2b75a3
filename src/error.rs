use thiserror::Error;

use crate::config::ConfigError;
use crate::query::QueryError;
use crate::registration::RegistrationError;
use crate::transport::TransportError;

/// The top-level error type returned by [`crate::Client`]'s public operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A query or mutation was attempted before `start` ever succeeded.
    #[error("client has not been started")]
    NotStarted,
    /// `start` was called on a Client whose scope is already running.
    #[error("client is already running")]
    AlreadyRunning,
    /// An operation was attempted after `stop` or `force_stop` cancelled the scope.
    #[error("client has already been stopped")]
    AlreadyStopped,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A background or foreground task panicked; the panic was caught at the task boundary and
    /// never propagated further.
    #[error("internal panic: {0}")]
    InternalPanic(String),
}
