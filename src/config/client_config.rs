use std::collections::HashMap;
use std::time::Duration;

use crate::model::Endpoint;

/// User-supplied client/discovery configuration, prior to normalization.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub discovery_enabled: Option<bool>,
    pub registry_fetch_interval_seconds: Option<u32>,
    pub prefer_same_zone_eureka: Option<bool>,
    pub region: Option<String>,
    pub zone: Option<String>,
    /// region -> comma-separated list of zones in that region.
    pub available_zones: HashMap<String, String>,
    pub service_url_of_default_zone: Option<String>,
    /// zone -> comma-separated list of registry base URLs.
    pub service_url_of_all_zone: HashMap<String, String>,
    pub eureka_server_username: Option<String>,
    pub eureka_server_password: Option<String>,
    pub eureka_server_read_timeout_seconds: Option<u64>,
    pub eureka_server_connect_timeout_seconds: Option<u64>,
}

/// Fully-resolved client/discovery settings, including the zone -> [`Endpoint`] map built by
/// the resolver's "Zone map construction" rules.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub discovery_enabled: bool,
    pub registry_fetch_interval: Duration,
    pub prefer_same_zone_eureka: bool,
    pub region: String,
    pub zone: String,
    pub zones_in_region: Vec<String>,
    pub endpoints_by_zone: HashMap<String, Endpoint>,
}

impl ClientSettings {
    pub fn endpoint_for(&self, zone: &str) -> Option<&Endpoint> {
        self.endpoints_by_zone.get(zone)
    }

    pub fn home_zone_endpoint(&self) -> Option<&Endpoint> {
        self.endpoint_for(&self.zone)
    }
}
