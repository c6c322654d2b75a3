use thiserror::Error;

/// Errors from [`super::resolver::Resolver::resolve`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The default host probe could not determine a hostname or a non-loopback IPv4 address
    /// and no override was configured.
    #[error("host probe failed: {0}")]
    HostProbeFailed(String),
}
