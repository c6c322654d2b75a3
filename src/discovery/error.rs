use thiserror::Error;

/// Errors surfaced by the discovery agent's public surface. The fetch cycle itself never
/// fails outward — a zone that errors simply contributes an empty `App` list to the snapshot.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery feature is disabled")]
    FeatureDisabled,
}
