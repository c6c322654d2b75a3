use thiserror::Error;

/// Errors from the query engine's public operations.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("discovery feature is disabled")]
    FeatureDisabled,
    #[error("no available service for {0}")]
    NoAvailableService(String),
    #[error("no available instance for {0}")]
    NoAvailableInstance(String),
}
