//! Configuration resolution: turns user-supplied, mostly-optional structs into the frozen
//! settings the rest of the client depends on.

mod client_config;
mod defaults;
mod error;
mod host_probe;
mod instance_config;
mod resolver;

use std::collections::HashMap;
use std::sync::RwLock;

pub use client_config::{ClientConfig, ClientSettings};
pub use error::ConfigError;
pub use host_probe::{DefaultHostProbe, HostProbe, HostProbeError};
pub use instance_config::{InstanceConfig, InstanceSettings};
pub use resolver::Resolver;

/// Frozen configuration shared by every component of the client.
///
/// `instance` and `client` never change after resolution. `metadata` is the one exception: the
/// registration agent mutates it in place when a caller changes instance metadata, and every
/// other reader sees the update on its next read.
#[derive(Debug)]
pub struct Config {
    pub instance: InstanceSettings,
    pub client: ClientSettings,
    metadata: RwLock<HashMap<String, String>>,
}

impl Config {
    pub(crate) fn new(
        instance: InstanceSettings,
        metadata: HashMap<String, String>,
        client: ClientSettings,
    ) -> Self {
        Self {
            instance,
            client,
            metadata: RwLock::new(metadata),
        }
    }

    /// A defensive copy of the current metadata map.
    pub fn metadata(&self) -> HashMap<String, String> {
        self.metadata.read().expect("metadata lock poisoned").clone()
    }

    pub fn set_metadata(&self, new_metadata: HashMap<String, String>) {
        *self.metadata.write().expect("metadata lock poisoned") = new_metadata;
    }

    pub fn merge_metadata(&self, updates: HashMap<String, String>) {
        let mut guard = self.metadata.write().expect("metadata lock poisoned");
        guard.extend(updates);
    }
}
